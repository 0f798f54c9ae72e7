//! Evaluation of symbolic expressions in other algebras.
//!
//! `evaluate` walks an `Expr` and rebuilds it with the operations of an `Algebra`. Variables
//! found in `bindings` are replaced by the bound elements, all other variables are handed to
//! `Algebra::symbol`. The result lives wherever the algebra puts it: an `Expr`, an `Interval`
//! enclosure or an asymptotic `Expansion` (see `AsymptoticRing`).
//!
//! # Examples
//! ```
//! use std::collections::HashMap;
//! use RustedAsymptotics::asymptotic::evaluate::{evaluate, SymbolicAlgebra};
//! use RustedAsymptotics::symbolic::symbolic_engine::Expr;
//! let expr = Expr::parse_expression("a + b").unwrap();
//! let bindings = HashMap::from([("b".to_string(), Expr::from(42))]);
//! let result = evaluate(&expr, &SymbolicAlgebra, &bindings).unwrap();
//! assert_eq!(result.to_string(), "a + 42");
//! ```
use std::collections::HashMap;

use num::{BigRational, ToPrimitive};
use strum_macros::{Display, EnumIter};

use crate::symbolic::interval::Interval;
use crate::symbolic::symbolic_engine::{Expr, SymbolicError};

/// Elementary functions an algebra has to provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Function {
    Exp,
    Log,
    Sin,
    Cos,
}

impl Function {
    /// `self(arg)` as an expression
    pub fn apply_expr(&self, arg: Expr) -> Expr {
        match self {
            Function::Exp => arg.exp(),
            Function::Log => arg.ln(),
            Function::Sin => arg.sin(),
            Function::Cos => arg.cos(),
        }
    }
}

pub trait Algebra {
    type Element: Clone;
    type Error: From<SymbolicError>;

    fn constant(&self, value: &BigRational) -> Result<Self::Element, Self::Error>;
    /// a variable without binding
    fn symbol(&self, name: &str) -> Result<Self::Element, Self::Error>;
    fn add(&self, lhs: &Self::Element, rhs: &Self::Element) -> Result<Self::Element, Self::Error>;
    fn mul(&self, lhs: &Self::Element, rhs: &Self::Element) -> Result<Self::Element, Self::Error>;
    fn neg(&self, value: &Self::Element) -> Result<Self::Element, Self::Error>;
    fn div(&self, lhs: &Self::Element, rhs: &Self::Element) -> Result<Self::Element, Self::Error>;
    fn pow_rational(
        &self,
        base: &Self::Element,
        exp: &BigRational,
    ) -> Result<Self::Element, Self::Error>;
    fn abs(&self, value: &Self::Element) -> Result<Self::Element, Self::Error>;
    fn apply(&self, function: Function, arg: &Self::Element) -> Result<Self::Element, Self::Error>;

    fn sub(&self, lhs: &Self::Element, rhs: &Self::Element) -> Result<Self::Element, Self::Error> {
        self.add(lhs, &self.neg(rhs)?)
    }

    /// `base^exp` for a non-constant exponent, `exp(exp*log(base))` by default
    fn pow(&self, base: &Self::Element, exp: &Self::Element) -> Result<Self::Element, Self::Error> {
        let log = self.apply(Function::Log, base)?;
        self.apply(Function::Exp, &self.mul(exp, &log)?)
    }
}

/// Evaluates `expr` in `algebra`.
pub fn evaluate<A: Algebra>(
    expr: &Expr,
    algebra: &A,
    bindings: &HashMap<String, A::Element>,
) -> Result<A::Element, A::Error> {
    let eval = |e: &Expr| evaluate(e, algebra, bindings);
    match expr {
        Expr::Var(name) => match bindings.get(name) {
            Some(value) => Ok(value.clone()),
            None => algebra.symbol(name),
        },
        Expr::Const(value) => algebra.constant(value),
        Expr::Add(lhs, rhs) => algebra.add(&eval(lhs)?, &eval(rhs)?),
        Expr::Sub(lhs, rhs) => algebra.sub(&eval(lhs)?, &eval(rhs)?),
        Expr::Mul(lhs, rhs) => algebra.mul(&eval(lhs)?, &eval(rhs)?),
        Expr::Div(lhs, rhs) => algebra.div(&eval(lhs)?, &eval(rhs)?),
        Expr::Pow(base, exp) => {
            let constant_exp = if exp.is_constant() {
                exp.to_rational()?
            } else {
                None
            };
            match constant_exp {
                Some(exp) => algebra.pow_rational(&eval(base)?, &exp),
                None => algebra.pow(&eval(base)?, &eval(exp)?),
            }
        }
        Expr::Abs(arg) => algebra.abs(&eval(arg)?),
        Expr::Exp(arg) => algebra.apply(Function::Exp, &eval(arg)?),
        Expr::Ln(arg) => algebra.apply(Function::Log, &eval(arg)?),
        Expr::sin(arg) => algebra.apply(Function::Sin, &eval(arg)?),
        Expr::cos(arg) => algebra.apply(Function::Cos, &eval(arg)?),
    }
}

/// Plain substitution: the result is again an (unsimplified) expression.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymbolicAlgebra;

impl Algebra for SymbolicAlgebra {
    type Element = Expr;
    type Error = SymbolicError;

    fn constant(&self, value: &BigRational) -> Result<Expr, SymbolicError> {
        Ok(Expr::Const(value.clone()))
    }

    fn symbol(&self, name: &str) -> Result<Expr, SymbolicError> {
        Ok(Expr::var(name))
    }

    fn add(&self, lhs: &Expr, rhs: &Expr) -> Result<Expr, SymbolicError> {
        Ok(lhs.clone() + rhs.clone())
    }

    fn sub(&self, lhs: &Expr, rhs: &Expr) -> Result<Expr, SymbolicError> {
        Ok(lhs.clone() - rhs.clone())
    }

    fn mul(&self, lhs: &Expr, rhs: &Expr) -> Result<Expr, SymbolicError> {
        Ok(lhs.clone() * rhs.clone())
    }

    fn neg(&self, value: &Expr) -> Result<Expr, SymbolicError> {
        Ok(-value.clone())
    }

    fn div(&self, lhs: &Expr, rhs: &Expr) -> Result<Expr, SymbolicError> {
        Ok(lhs.clone() / rhs.clone())
    }

    fn pow_rational(&self, base: &Expr, exp: &BigRational) -> Result<Expr, SymbolicError> {
        Ok(base.clone().pow_rational(exp.clone()))
    }

    fn pow(&self, base: &Expr, exp: &Expr) -> Result<Expr, SymbolicError> {
        Ok(base.clone().pow(exp.clone()))
    }

    fn abs(&self, value: &Expr) -> Result<Expr, SymbolicError> {
        Ok(value.clone().abs())
    }

    fn apply(&self, function: Function, arg: &Expr) -> Result<Expr, SymbolicError> {
        Ok(function.apply_expr(arg.clone()))
    }
}

/// Rigorous enclosures; every variable has to be bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntervalAlgebra;

impl Algebra for IntervalAlgebra {
    type Element = Interval;
    type Error = SymbolicError;

    fn constant(&self, value: &BigRational) -> Result<Interval, SymbolicError> {
        Ok(Interval::from_rational(value))
    }

    fn symbol(&self, name: &str) -> Result<Interval, SymbolicError> {
        Err(SymbolicError::UnboundVariable(name.to_string()))
    }

    fn add(&self, lhs: &Interval, rhs: &Interval) -> Result<Interval, SymbolicError> {
        Ok(lhs.add(rhs))
    }

    fn sub(&self, lhs: &Interval, rhs: &Interval) -> Result<Interval, SymbolicError> {
        Ok(lhs.sub(rhs))
    }

    fn mul(&self, lhs: &Interval, rhs: &Interval) -> Result<Interval, SymbolicError> {
        Ok(lhs.mul(rhs))
    }

    fn neg(&self, value: &Interval) -> Result<Interval, SymbolicError> {
        Ok(value.neg())
    }

    fn div(&self, lhs: &Interval, rhs: &Interval) -> Result<Interval, SymbolicError> {
        Ok(lhs.div(rhs))
    }

    fn pow_rational(&self, base: &Interval, exp: &BigRational) -> Result<Interval, SymbolicError> {
        if exp.is_integer() {
            if let Some(n) = exp.to_integer().to_i32() {
                return Ok(base.powi(n));
            }
        }
        let exp = Interval::from_rational(exp);
        if !exp.is_bounded() {
            return Err(SymbolicError::Unsupported(format!("exponent {}", exp)));
        }
        Ok(base.powf_between(exp.lower(), exp.upper()))
    }

    fn pow(&self, base: &Interval, exp: &Interval) -> Result<Interval, SymbolicError> {
        Ok(exp.mul(&base.ln()).exp())
    }

    fn abs(&self, value: &Interval) -> Result<Interval, SymbolicError> {
        Ok(value.abs())
    }

    fn apply(&self, function: Function, arg: &Interval) -> Result<Interval, SymbolicError> {
        Ok(match function {
            Function::Exp => arg.exp(),
            Function::Log => arg.ln(),
            Function::Sin => arg.sin(),
            Function::Cos => arg.cos(),
        })
    }
}

impl Expr {
    /// Enclosure of a constant expression, e.g. `[3.1622..., 3.1622...]` for `10^(1/2)`.
    pub fn to_interval(&self) -> Result<Interval, SymbolicError> {
        evaluate(self, &IntervalAlgebra, &HashMap::new())
    }

    /// Enclosure of the range of the expression when its variables range over the given intervals.
    pub fn enclose(&self, bindings: &HashMap<String, Interval>) -> Result<Interval, SymbolicError> {
        evaluate(self, &IntervalAlgebra, bindings)
    }
}
