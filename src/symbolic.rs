#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedAsymptotics::symbolic::symbolic_engine::Expr;
/// let input = "k^2 + 2*k*n^(1/2)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// assert_eq!(parsed_expression.variables().len(), 2);
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) holds the exact symbolic expression type `Expr` used for coefficients
/// 2) substitutes variables by numbers or expressions
/// 3) differentiates analytically
///# Example#
/// ```
/// use RustedAsymptotics::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("1/(1 - z)").unwrap();
/// // third derivative divided by 3! is (1 - z)^(-4)
/// let d3 = f.n_th_derivative("z", 3).unwrap();
/// let expected = Expr::parse_expression("6/(1 - z)^4").unwrap().simplify().unwrap();
/// assert_eq!(d3, expected);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
///________________________________________________________________________________________________________________________________________________
///
/// canonical simplification, optionally under positivity assumptions
/// Example#
/// ```
/// use RustedAsymptotics::symbolic::symbolic_engine::Expr;
/// use RustedAsymptotics::symbolic::symbolic_simplify::Assumptions;
/// let coefficient = Expr::parse_expression("abs(k^3) + abs(-1)").unwrap();
/// let simplified = coefficient.simplify_with(&Assumptions::positive("k")).unwrap();
/// assert_eq!(simplified.to_string(), "k^3 + 1");
/// ```
pub mod symbolic_simplify;
pub(crate) mod canonical;
///______________________________________________________________________________________________________________________________________________
/// outward rounded interval arithmetic for rigorous numeric bounds
/// _____________________________________________________________________________________________________________________________________________
pub mod interval;
///______________________________________________________________________________________________________________________________________________
/// the collection of utility functions for exact rational arithmetic
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
