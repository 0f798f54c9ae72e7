/// a module turns a String expression into a symbolic expression
///# Example
/// ```
/// use RustedAsymptotics::symbolic::symbolic_engine::Expr;
/// let input = "1/(1 - z)^2 + exp(k/n)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// assert!(parsed_expression.contains_variable("k"));
/// ```
//  grammar, loosest binding first:
//      sum     := product (('+' | '-') product)*
//      product := unary (('*' | '/') unary)*
//      unary   := '-' unary | power
//      power   := atom (('^' | '**') unary)?
//      atom    := number | name '(' sum ')' | name | '(' sum ')'
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{delimited, pair, preceded},
};

use crate::symbolic::symbolic_engine::{Expr, SymbolicError};
use crate::symbolic::utils::decimal_to_rational;

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    let mut parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    parser.parse(input)
}

fn parse_number(input: &str) -> IResult<&str, Expr> {
    let literal = recognize(pair(digit1, opt(pair(char('.'), digit1))));
    let mut parser = map_res(literal, |s: &str| {
        decimal_to_rational(s)
            .map(Expr::Const)
            .ok_or("invalid number")
    });
    parser.parse(input)
}

fn apply_function(name: &str, arg: Expr) -> Option<Expr> {
    let expr = match name {
        "exp" => arg.exp(),
        "log" | "ln" => arg.ln(),
        "abs" => arg.abs(),
        "sin" => arg.sin(),
        "cos" => arg.cos(),
        "sqrt" => arg.sqrt(),
        _ => return None,
    };
    Some(expr)
}

fn parse_call_or_symbol(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = parse_identifier(input)?;
    let (after_name, _) = multispace0(rest)?;
    let mut call = delimited(
        pair(char('('), multispace0),
        parse_sum,
        pair(multispace0, char(')')),
    );
    match call.parse(after_name) {
        Ok((rest, arg)) => match apply_function(name, arg) {
            Some(expr) => Ok((rest, expr)),
            None => Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify))),
        },
        Err(_) => Ok((rest, Expr::Var(name.to_string()))),
    }
}

fn parse_atom(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    let bracketed = delimited(
        pair(char('('), multispace0),
        parse_sum,
        pair(multispace0, char(')')),
    );
    alt((parse_number, parse_call_or_symbol, bracketed)).parse(input)
}

fn parse_power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = parse_atom(input)?;
    let operator = delimited(multispace0, alt((tag("**"), tag("^"))), multispace0);
    let (input, exponent) = opt(preceded(operator, parse_unary)).parse(input)?;
    Ok((
        input,
        match exponent {
            Some(exponent) => base.pow(exponent),
            None => base,
        },
    ))
}

fn parse_unary(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    let negated = map(preceded(pair(char('-'), multispace0), parse_unary), |expr| {
        match expr {
            Expr::Const(value) => Expr::Const(-value),
            expr => -expr,
        }
    });
    alt((negated, parse_power)).parse(input)
}

fn parse_product(input: &str) -> IResult<&str, Expr> {
    let (input, first) = parse_unary(input)?;
    let operator = delimited(multispace0, alt((char('*'), char('/'))), multispace0);
    let (input, rest) = many0(pair(operator, parse_unary)).parse(input)?;
    let product = rest.into_iter().fold(first, |acc, (op, factor)| match op {
        '*' => acc * factor,
        _ => acc / factor,
    });
    Ok((input, product))
}

fn parse_sum(input: &str) -> IResult<&str, Expr> {
    let (input, first) = parse_product(input)?;
    let operator = delimited(multispace0, alt((char('+'), char('-'))), multispace0);
    let (input, rest) = many0(pair(operator, parse_product)).parse(input)?;
    let sum = rest.into_iter().fold(first, |acc, (op, term)| match op {
        '+' => acc + term,
        _ => acc - term,
    });
    Ok((input, sum))
}

/// Parses the whole input; trailing garbage is an error.
pub fn parse_expression_func(input: &str) -> Result<Expr, SymbolicError> {
    let mut parser = all_consuming(delimited(multispace0, parse_sum, multispace0));
    match parser.parse(input) {
        Ok((_, expr)) => Ok(expr),
        Err(e) => Err(SymbolicError::Parse(format!("{}: {}", input, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::BigRational;

    #[test]
    fn test_parse_exponential() {
        let expr = parse_expression_func("exp(x)").unwrap();
        assert_eq!(expr, Expr::Exp(Box::new(Expr::Var("x".to_string()))));
    }

    #[test]
    fn test_parse_constant() {
        let expr = parse_expression_func("42").unwrap();
        assert_eq!(expr, Expr::from(42));
        let expr = parse_expression_func("0.25").unwrap();
        assert_eq!(expr, Expr::rational(1, 4));
    }

    #[test]
    fn test_parse_variable() {
        let expr = parse_expression_func("x").unwrap();
        assert_eq!(expr, Expr::Var("x".to_string()));
    }

    #[test]
    fn test_parse_addition() {
        let expr = parse_expression_func("x + 2").unwrap();
        assert_eq!(
            expr,
            Expr::Add(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::from(2))
            )
        );
    }

    #[test]
    fn test_parse_subtraction_is_left_associative() {
        let expr = parse_expression_func("x - 2 - y").unwrap();
        assert_eq!(
            expr,
            Expr::Sub(
                Box::new(Expr::Sub(
                    Box::new(Expr::Var("x".to_string())),
                    Box::new(Expr::from(2))
                )),
                Box::new(Expr::Var("y".to_string()))
            )
        );
    }

    #[test]
    fn test_parse_precedence() {
        let expr = parse_expression_func("1 + k*n^2").unwrap();
        let expected = Expr::one() + Expr::var("k") * Expr::var("n").pow(Expr::from(2));
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_parse_negative_exponent() {
        let expr = parse_expression_func("n^-1").unwrap();
        let expected = Expr::var("n").pow(Expr::Const(-BigRational::from_integer(1.into())));
        assert_eq!(expr, expected);
        let starred = parse_expression_func("n**(-1)").unwrap();
        assert_eq!(starred.simplify().unwrap(), expr.simplify().unwrap());
    }

    #[test]
    fn test_parse_functions() {
        let expr = parse_expression_func("abs(k - 1) + sqrt(10) + log(z)").unwrap();
        assert!(expr.contains_variable("k"));
        assert!(expr.contains_variable("z"));
        assert!(parse_expression_func("sin(x)*cos(x)").is_ok());
    }

    #[test]
    fn test_parse_brackets() {
        let expr = parse_expression_func("1/(1 - k/n)").unwrap();
        let k = Expr::var("k");
        let n = Expr::var("n");
        assert_eq!(expr, Expr::one() / (Expr::one() - k / n));
    }

    #[test]
    fn test_invalid_expression() {
        assert!(parse_expression_func("x +").is_err());
        assert!(parse_expression_func("(x + 1").is_err());
        assert!(parse_expression_func("foo(x)").is_err());
    }
}
