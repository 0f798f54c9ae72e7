//! # Symbolic Expression Simplification Module
//!
//! Simplification converts an expression into the canonical expanded form of the `canonical`
//! module and back. The result is a sum of monomials with exact rational coefficients:
//!
//! 1. **Constant Folding**: `2/4 + 1` becomes `3/2`, `4^(1/2)` becomes `2`
//! 2. **Expansion**: positive integer powers and products of sums are multiplied out
//! 3. **Like Term Collection**: `3*k*n + 2*n*k` becomes `5*k*n`
//! 4. **Radicals**: `10^(1/2)*10^(1/2)` becomes `10`, `10^(-1/2)` becomes `1/10*10^(1/2)`
//! 5. **Sign assumptions**: with `Assumptions::positive("k")`, `abs(k^3)` becomes `k^3`
//!
//! The result is idempotent: simplifying a simplified expression returns it unchanged, so
//! simplified expressions can be compared with `==`.

use std::collections::BTreeSet;

use num::BigRational;

use crate::symbolic::canonical::Poly;
use crate::symbolic::symbolic_engine::{Expr, SymbolicError};

/// Variables that are known to be strictly positive for the duration of a computation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assumptions {
    positive: BTreeSet<String>,
}

impl Assumptions {
    /// no assumptions at all
    pub fn none() -> Self {
        Self::default()
    }

    pub fn positive(var: &str) -> Self {
        Self::none().and_positive(var)
    }

    pub fn and_positive(mut self, var: &str) -> Self {
        self.positive.insert(var.to_string());
        self
    }

    pub fn is_positive(&self, var: &str) -> bool {
        self.positive.contains(var)
    }
}

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Simplifies the expression without sign assumptions.
    ///
    /// # Errors
    /// `SymbolicError::DivisionByZero` for divisions by an expression that simplifies to 0.
    ///
    /// # Examples
    /// ```
    /// use RustedAsymptotics::symbolic::symbolic_engine::Expr;
    /// let k = Expr::var("k");
    /// let square = (k.clone() + Expr::one()).pow(Expr::from(2)) - k.clone() * k;
    /// assert_eq!(square.simplify().unwrap().to_string(), "2*k + 1");
    /// ```
    pub fn simplify(&self) -> Result<Expr, SymbolicError> {
        self.simplify_with(&Assumptions::none())
    }

    /// Simplifies the expression using the given sign assumptions.
    pub fn simplify_with(&self, assumptions: &Assumptions) -> Result<Expr, SymbolicError> {
        Ok(Poly::from_expr(self, assumptions)?.to_expr())
    }

    /// The additive parts of the simplified expression (a single part if it is not a sum).
    ///
    /// Zero has no parts.
    pub fn summands(&self, assumptions: &Assumptions) -> Result<Vec<Expr>, SymbolicError> {
        let poly = Poly::from_expr(self, assumptions)?;
        Ok(poly.terms().iter().map(Poly::to_expr).collect())
    }

    /// The expression as a polynomial in `var`: pairs `(exponent, coefficient)` sorted by
    /// exponent. Coefficients are simplified and free of `var` outside of `abs` and functions.
    pub fn coefficients(
        &self,
        var: &str,
        assumptions: &Assumptions,
    ) -> Result<Vec<(BigRational, Expr)>, SymbolicError> {
        let poly = Poly::from_expr(self, assumptions)?;
        Ok(poly
            .coefficients(var)
            .into_iter()
            .map(|(exp, coefficient)| (exp, coefficient.to_expr()))
            .collect())
    }

    /// Exact value of the expression if it simplifies to a rational number.
    pub fn to_rational(&self) -> Result<Option<BigRational>, SymbolicError> {
        Ok(Poly::from_expr(self, &Assumptions::none())?.as_constant())
    }

    /// true if the expression simplifies to 0
    pub fn is_zero_simplified(&self) -> Result<bool, SymbolicError> {
        Ok(Poly::from_expr(self, &Assumptions::none())?.is_zero())
    }
}
