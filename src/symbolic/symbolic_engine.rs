//! # Symbolic Engine Module
//!
//! This module provides the symbolic expression type used for the coefficients of asymptotic
//! expansions. Coefficients are exact: constants are arbitrary precision rationals, radicals
//! such as `10^(1/2)` stay symbolic, and free variables (the dependent variable `k` of a ring,
//! or any other parameter) are carried through every computation.
//!
//! ## Purpose
//!
//! The symbolic engine allows users to:
//! - Parse and create symbolic mathematical expressions
//! - Perform analytical differentiation
//! - Simplify expressions into a canonical, fully expanded form (see `symbolic_simplify`)
//! - Substitute variables by numbers or by other expressions
//! - Support `abs`, exponential, logarithmic and trigonometric functions
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! The core symbolic expression type supporting:
//! - **Variables**: `Var(String)` - symbolic variables like "n", "k"
//! - **Constants**: `Const(BigRational)` - exact rational constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Abs`, `Exp`, `Ln`, `sin`, `cos`
//!
//! ### Key Methods
//! - `Symbols(symbols: &str)` - Create multiple variables from comma-separated string
//! - `diff(var: &str)` - Analytical differentiation
//! - `simplify()` / `simplify_with(&Assumptions)` - canonical simplification
//! - `set_variable()` / `substitute_variable()` - Substitute variables with values
//! - `variables()` - all free variables of the expression
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Expression Tree**: Uses Box<Expr> for nested expressions, enabling
//!    arbitrarily complex mathematical structures
//!
//! 2. **Operator Overloading**: Implements std::ops traits (Add, Sub, Mul, Div, Neg) for
//!    natural mathematical syntax: `x + y * z`
//!
//! 3. **Exact arithmetic**: constants never round, so a bound computed symbolically is
//!    the bound that gets reported
//!
//! 4. **Precedence-aware printing**: `Display` only emits the parentheses that are needed,
//!    e.g. `k^3 + 3*k^2 + 3*k + 1` or `n^(-1)`

#![allow(non_camel_case_types)]

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use num::{BigInt, BigRational, One, Signed, Zero};

/// Errors raised by the symbolic layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolicError {
    DivisionByZero,
    /// a variable has no value where a number was required
    UnboundVariable(String),
    Parse(String),
    Unsupported(String),
}

impl fmt::Display for SymbolicError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymbolicError::DivisionByZero => write!(f, "division by zero"),
            SymbolicError::UnboundVariable(var) => {
                write!(f, "variable {} has no value", var)
            }
            SymbolicError::Parse(msg) => write!(f, "could not parse expression: {}", msg),
            SymbolicError::Unsupported(msg) => write!(f, "unsupported operation: {}", msg),
        }
    }
}

impl std::error::Error for SymbolicError {}

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// Each variant represents a different type of mathematical construct, from simple variables
/// and constants to nested operations. The enum uses Box<Expr> for recursive structures,
/// allowing arbitrarily deep expression trees.
///
/// # Examples
/// ```
/// use RustedAsymptotics::symbolic::symbolic_engine::Expr;
/// let k = Expr::Var("k".to_string());
/// let expr = k + Expr::from(2);
/// assert_eq!(format!("{}", expr), "k + 2");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "n", "k")
    Var(String),
    /// Exact rational constant
    Const(BigRational),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Absolute value: |x|
    Abs(Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
}

// binding strength used by Display
const PREC_SUM: u8 = 1;
const PREC_PRODUCT: u8 = 2;
const PREC_UNARY: u8 = 3;
const PREC_POWER: u8 = 4;
const PREC_ATOM: u8 = 5;

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => PREC_SUM,
            Expr::Mul(lhs, _) if lhs.is_minus_one() => PREC_UNARY,
            Expr::Mul(..) | Expr::Div(..) => PREC_PRODUCT,
            Expr::Const(c) if c.is_negative() => PREC_UNARY,
            Expr::Const(c) if !c.is_integer() => PREC_PRODUCT,
            Expr::Pow(..) => PREC_POWER,
            _ => PREC_ATOM,
        }
    }

    fn fmt_with(&self, f: &mut fmt::Formatter, min_prec: u8) -> fmt::Result {
        if self.precedence() < min_prec {
            write!(f, "(")?;
            self.fmt_with(f, 0)?;
            return write!(f, ")");
        }
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => {
                lhs.fmt_with(f, PREC_SUM)?;
                match rhs.negated_display() {
                    Some(positive) => {
                        write!(f, " - ")?;
                        positive.fmt_with(f, PREC_PRODUCT)
                    }
                    None => {
                        write!(f, " + ")?;
                        rhs.fmt_with(f, PREC_SUM)
                    }
                }
            }
            Expr::Sub(lhs, rhs) => {
                lhs.fmt_with(f, PREC_SUM)?;
                write!(f, " - ")?;
                rhs.fmt_with(f, PREC_PRODUCT)
            }
            Expr::Mul(lhs, rhs) if lhs.is_minus_one() => {
                write!(f, "-")?;
                rhs.fmt_with(f, PREC_PRODUCT)
            }
            Expr::Mul(lhs, rhs) => {
                lhs.fmt_with(f, PREC_PRODUCT)?;
                write!(f, "*")?;
                rhs.fmt_with(f, PREC_POWER)
            }
            Expr::Div(lhs, rhs) => {
                lhs.fmt_with(f, PREC_PRODUCT)?;
                write!(f, "/")?;
                rhs.fmt_with(f, PREC_POWER)
            }
            Expr::Pow(base, exp) => {
                base.fmt_with(f, PREC_ATOM)?;
                match exp.as_ref() {
                    Expr::Const(e) if e.is_integer() && !e.is_negative() => write!(f, "^{}", e),
                    Expr::Var(_) => write!(f, "^{}", exp),
                    _ => write!(f, "^({})", exp),
                }
            }
            Expr::Abs(expr) => write!(f, "abs({})", expr),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "log({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
        }
    }

    /// `Some(x)` if self prints as `-x`
    fn negated_display(&self) -> Option<Expr> {
        match self {
            Expr::Const(c) if c.is_negative() => Some(Expr::Const(-c)),
            Expr::Mul(lhs, rhs) if lhs.is_minus_one() => Some(rhs.as_ref().clone()),
            Expr::Mul(lhs, rhs) => match lhs.as_ref() {
                Expr::Const(c) if c.is_negative() => {
                    Some(Expr::Mul(Expr::Const(-c).boxed(), rhs.clone()))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// true if the expression prints as a sum, i.e. needs brackets when used as a factor
    pub fn is_sum(&self) -> bool {
        self.precedence() == PREC_SUM
    }

    fn is_minus_one(&self) -> bool {
        matches!(self, Expr::Const(c) if *c == -BigRational::one())
    }
}

/// Display implementation for pretty printing symbolic expressions.
///
/// Only the parentheses required by operator precedence are printed, negative exponents are
/// always bracketed: `n^(-1)`, `10^(1/2)`, `(k + 1)^2`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_with(f, 0)
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}
impl std::ops::AddAssign for Expr {
    fn add_assign(&mut self, rhs: Self) {
        *self = Expr::Add(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::SubAssign for Expr {
    fn sub_assign(&mut self, rhs: Self) {
        *self = Expr::Sub(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::MulAssign for Expr {
    fn mul_assign(&mut self, rhs: Self) {
        *self = Expr::Mul(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::DivAssign for Expr {
    fn div_assign(&mut self, rhs: Self) {
        *self = Expr::Div(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-BigRational::one())), Box::new(self))
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Const(BigRational::from_integer(BigInt::from(value)))
    }
}

impl From<BigRational> for Expr {
    fn from(value: BigRational) -> Self {
        Expr::Const(value)
    }
}

impl From<BigInt> for Expr {
    fn from(value: BigInt) -> Self {
        Expr::Const(BigRational::from_integer(value))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Creates multiple symbolic variables from a comma-separated string.
    ///
    /// # Arguments
    /// * `symbols` - Comma-separated string of variable names (e.g., "n, k")
    ///
    /// # Returns
    /// Vector of Expr::Var instances for each variable name
    ///
    /// # Examples
    /// ```
    /// use RustedAsymptotics::symbolic::symbolic_engine::Expr;
    /// let vars = Expr::Symbols("n, k");
    /// assert_eq!(vars.len(), 2);
    /// ```
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Expr::Var(s.to_string()))
            .collect()
    }

    /// variable with the given name
    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    /// exact constant `numer/denom`; panics on a zero denominator like `BigRational::new`
    pub fn rational(numer: i64, denom: i64) -> Expr {
        Expr::Const(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn zero() -> Expr {
        Expr::Const(BigRational::zero())
    }

    pub fn one() -> Expr {
        Expr::Const(BigRational::one())
    }

    /// Applies `f` to every direct child of the node and rebuilds it.
    pub(crate) fn map_args<F>(&self, mut f: F) -> Expr
    where
        F: FnMut(&Expr) -> Expr,
    {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Sub(lhs, rhs) => Expr::Sub(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Mul(lhs, rhs) => Expr::Mul(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Div(lhs, rhs) => Expr::Div(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Pow(base, exp) => Expr::Pow(f(base).boxed(), f(exp).boxed()),
            Expr::Abs(expr) => Expr::Abs(f(expr).boxed()),
            Expr::Exp(expr) => Expr::Exp(f(expr).boxed()),
            Expr::Ln(expr) => Expr::Ln(f(expr).boxed()),
            Expr::sin(expr) => Expr::sin(f(expr).boxed()),
            Expr::cos(expr) => Expr::cos(f(expr).boxed()),
        }
    }

    /// Direct children of the node.
    pub(crate) fn args(&self) -> Vec<&Expr> {
        match self {
            Expr::Var(_) | Expr::Const(_) => Vec::new(),
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Abs(expr)
            | Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr) => vec![expr.as_ref()],
        }
    }

    /// Substitutes a variable with a constant value throughout the expression.
    ///
    /// # Arguments
    /// * `var` - Name of the variable to substitute
    /// * `value` - Exact value to substitute for the variable
    ///
    /// # Returns
    /// New expression with the variable substituted (not simplified)
    pub fn set_variable(&self, var: &str, value: BigRational) -> Expr {
        self.substitute_variable(var, &Expr::Const(value))
    }

    /// Substitutes multiple variables with constant values using a HashMap.
    ///
    /// Only variables present in the map are substituted.
    pub fn set_variable_from_map(&self, var_map: &HashMap<String, BigRational>) -> Expr {
        match self {
            Expr::Var(name) => match var_map.get(name) {
                Some(value) => Expr::Const(value.clone()),
                None => self.clone(),
            },
            _ => self.map_args(|arg| arg.set_variable_from_map(var_map)),
        }
    }

    /// Renames a variable throughout the expression.
    pub fn rename_variable(&self, old_var: &str, new_var: &str) -> Expr {
        match self {
            Expr::Var(name) if name == old_var => Expr::Var(new_var.to_string()),
            _ => self.map_args(|arg| arg.rename_variable(old_var, new_var)),
        }
    }

    /// substitute a variable with an expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            _ => self.map_args(|arg| arg.substitute_variable(var, expr)),
        }
    }

    /// substitute several variables at once; replacements are not substituted again
    pub fn substitute_variables(&self, var_map: &HashMap<String, Expr>) -> Expr {
        match self {
            Expr::Var(name) => var_map.get(name).cloned().unwrap_or_else(|| self.clone()),
            _ => self.map_args(|arg| arg.substitute_variables(var_map)),
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            _ => self.args().iter().any(|arg| arg.contains_variable(var_name)),
        }
    }

    /// All free variables of the expression, sorted by name.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        self.collect_variables(&mut found);
        found
    }

    fn collect_variables(&self, found: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                found.insert(name.clone());
            }
            _ => {
                for arg in self.args() {
                    arg.collect_variables(found);
                }
            }
        }
    }

    /// true if the expression has no free variables
    pub fn is_constant(&self) -> bool {
        self.variables().is_empty()
    }

    /// true for a bare variable such as `k`
    pub fn is_symbol(&self) -> bool {
        matches!(self, Expr::Var(_))
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Var(name) => Some(name),
            _ => None,
        }
    }

    /// The value of a `Const` node.
    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Expr::Const(value) => Some(value),
            _ => None,
        }
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates exponential function e^(self).
    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    /// Creates natural logarithm ln(self).
    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// Creates |self|.
    pub fn abs(self) -> Expr {
        Expr::Abs(self.boxed())
    }

    pub fn sin(self) -> Expr {
        Expr::sin(self.boxed())
    }

    pub fn cos(self) -> Expr {
        Expr::cos(self.boxed())
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// self^(numer/denom)
    pub fn pow_rational(self, exponent: BigRational) -> Expr {
        Expr::Pow(self.boxed(), Expr::Const(exponent).boxed())
    }

    pub fn sqrt(self) -> Expr {
        self.pow(Expr::rational(1, 2))
    }

    /// Checks if expression is literally the constant 0 (no simplification).
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if val.is_zero())
    }

    /// Checks if expression is literally the constant 1 (no simplification).
    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(val) if val.is_one())
    }
}

//___________________________________MACROS____________________________________

/// Macro to create symbolic variables from a comma-separated list
/// Usage: symbols!(n, k) -> creates variables n, k
#[macro_export]
macro_rules! symbols {
    ($($var:ident),+ $(,)?) => {
        (
            $(
                $crate::symbolic::symbolic_engine::Expr::Var(stringify!($var).to_string())
            ),+
        )
    };
}
