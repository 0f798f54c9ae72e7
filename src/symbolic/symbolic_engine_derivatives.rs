//! Analytical differentiation and string parsing for `Expr`.
//!
//! `n_th_derivative` simplifies after every step, so the derivatives needed for Taylor
//! remainders stay small. Powers use the general rule `d(b^e) = b^e*(e'*log(b) + e*b'/b)`,
//! reduced to `e*b^(e-1)*b'` when the exponent does not depend on the variable.

use crate::symbolic::parse_expr::parse_expression_func;
use crate::symbolic::symbolic_engine::{Expr, SymbolicError};

impl Expr {
    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements all standard differentiation rules from calculus:
    /// - Power rule: d/dx(x^n) = n*x^(n-1)
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule: d/dx(f(g(x))) = f'(g(x))*g'(x)
    ///
    /// The result is not simplified.
    ///
    /// # Arguments
    /// * `var` - Variable name to differentiate with respect to
    ///
    /// # Examples
    /// ```
    /// use RustedAsymptotics::symbolic::symbolic_engine::Expr;
    /// let z = Expr::var("z");
    /// let f = z.clone() * z; // z^2
    /// let df = f.diff("z").simplify().unwrap();
    /// assert_eq!(df, (Expr::from(2) * Expr::var("z")).simplify().unwrap());
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::one()
                } else {
                    Expr::zero()
                }
            }
            Expr::Const(_) => Expr::zero(),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(Box::new(rhs.diff(var)), lhs.clone())),
                )),
                Box::new(Expr::Mul(rhs.clone(), rhs.clone())),
            ),
            Expr::Pow(base, exp) if !exp.contains_variable(var) => Expr::Mul(
                Box::new(Expr::Mul(
                    exp.clone(),
                    Box::new(Expr::Pow(
                        base.clone(),
                        Box::new(Expr::Sub(exp.clone(), Box::new(Expr::one()))),
                    )),
                )),
                Box::new(base.diff(var)),
            ),
            Expr::Pow(base, exp) => Expr::Mul(
                Box::new(self.clone()),
                Box::new(Expr::Add(
                    Box::new(Expr::Mul(
                        Box::new(exp.diff(var)),
                        Box::new(Expr::Ln(base.clone())),
                    )),
                    Box::new(Expr::Div(
                        Box::new(Expr::Mul(exp.clone(), Box::new(base.diff(var)))),
                        base.clone(),
                    )),
                )),
            ),
            // |u|' = u/|u| * u'
            Expr::Abs(expr) => Expr::Mul(
                Box::new(Expr::Div(expr.clone(), Box::new(Expr::Abs(expr.clone())))),
                Box::new(expr.diff(var)),
            ),
            Expr::Exp(expr) => {
                Expr::Mul(Box::new(Expr::Exp(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::Ln(expr) => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            Expr::sin(expr) => {
                Expr::Mul(Box::new(Expr::cos(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::cos(expr) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(-Expr::one()),
                    Box::new(Expr::sin(expr.clone())),
                )),
                Box::new(expr.diff(var)),
            ),
        }
    } // end of diff

    /// n-th derivative, simplified after every step.
    ///
    /// # Arguments
    /// * `var` - Variable name to differentiate with respect to
    /// * `n` - order of the derivative, `0` returns the simplified expression itself
    pub fn n_th_derivative(&self, var: &str, n: usize) -> Result<Expr, SymbolicError> {
        let mut derivative = self.simplify()?;
        for _ in 0..n {
            derivative = derivative.diff(var).simplify()?;
        }
        Ok(derivative)
    }

    /// Parses a string like `"1/(1 - z)^2 + exp(k/n)"` into an expression.
    pub fn parse_expression(input: &str) -> Result<Expr, SymbolicError> {
        parse_expression_func(input)
    }
}
