//! Term monoids: one per kind of summand, optionally aware of a dependent variable.
//!
//! A ring with a dependent variable `k` attaches the same `VariableBounds` to all three
//! monoids. The bounds are growths in the ring's variable, `lower <= k <= upper`, and are used
//! to estimate how fast a coefficient containing `k` can grow: the coefficient is evaluated at
//! both endpoints and each value is converted into an O-term.
use std::collections::HashMap;
use std::fmt;

use log::debug;
use strum_macros::{Display, EnumIter};

use crate::asymptotic::errors::AsymptoticError;
use crate::asymptotic::evaluate::evaluate;
use crate::asymptotic::expansion::Expansion;
use crate::asymptotic::growth::Growth;
use crate::asymptotic::ring::AsymptoticRing;
use crate::asymptotic::terms::Summand;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_simplify::Assumptions;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum TermKind {
    #[strum(serialize = "exact")]
    Exact,
    #[strum(serialize = "B")]
    B,
    #[strum(serialize = "O")]
    O,
}

/// The bound triple `(dependent_variable, lower, upper)` of a ring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableBounds {
    dependent_variable: String,
    lower: Growth,
    upper: Growth,
}

impl VariableBounds {
    /// Checks that `dependent_variable` is a bare symbol and that both bounds are given.
    pub fn new(
        dependent_variable: &str,
        lower: Option<Growth>,
        upper: Option<Growth>,
    ) -> Result<VariableBounds, AsymptoticError> {
        let parsed = Expr::parse_expression(dependent_variable)
            .map_err(|_| AsymptoticError::InvalidDependentVariable(dependent_variable.to_string()))?;
        let name = parsed
            .as_symbol()
            .ok_or_else(|| AsymptoticError::InvalidDependentVariable(dependent_variable.to_string()))?;
        let lower = lower.ok_or_else(|| AsymptoticError::MissingBound("lower".to_string()))?;
        let upper = upper.ok_or_else(|| AsymptoticError::MissingBound("upper".to_string()))?;
        Ok(VariableBounds {
            dependent_variable: name.to_string(),
            lower,
            upper,
        })
    }

    pub fn dependent_variable(&self) -> &str {
        &self.dependent_variable
    }

    pub fn lower(&self) -> &Growth {
        &self.lower
    }

    pub fn upper(&self) -> &Growth {
        &self.upper
    }

    /// true if the coefficient mentions the dependent variable
    pub fn is_mentioned_in(&self, coefficient: &Expr) -> bool {
        coefficient.contains_variable(&self.dependent_variable)
    }

    /// `dependent_variable > 0`
    pub fn positivity(&self) -> Assumptions {
        Assumptions::positive(&self.dependent_variable)
    }

    /// `coefficient` with the dependent variable replaced by `bound`, as an expansion.
    pub fn evaluate_at(
        &self,
        coefficient: &Expr,
        bound: &Growth,
        ring: &AsymptoticRing,
    ) -> Result<Expansion, AsymptoticError> {
        let value = ring.monomial(bound.clone());
        let bindings = HashMap::from([(self.dependent_variable.clone(), value)]);
        evaluate(coefficient, ring, &bindings)
    }

    /// Growth of the single O-term `expansion.big_o()` collapses to.
    fn collapse(
        &self,
        expansion: &Expansion,
        coefficient: &Expr,
        bound: &Growth,
    ) -> Result<Growth, AsymptoticError> {
        let big_o = expansion.big_o()?;
        match big_o.single_term() {
            Some(term) => Ok(term.growth().clone()),
            None => Err(AsymptoticError::NonCollapsingBound {
                coefficient: coefficient.to_string(),
                bound: bound.to_string(),
            }),
        }
    }

    /// Growths of the coefficient at the lower and at the upper bound, computed under
    /// `dependent_variable > 0`. A coefficient vanishing at a bound counts as growth 1.
    pub fn boundary_growths(
        &self,
        coefficient: &Expr,
        ring: &AsymptoticRing,
    ) -> Result<(Growth, Growth), AsymptoticError> {
        let simplified = coefficient.simplify_with(&self.positivity())?;
        let mut growths = Vec::with_capacity(2);
        for bound in [&self.lower, &self.upper] {
            let mut value = self.evaluate_at(&simplified, bound, ring)?;
            if value.is_zero() {
                value = ring.one();
            }
            growths.push(self.collapse(&value, &simplified, bound)?);
        }
        let upper = growths.pop().unwrap_or_else(Growth::one);
        let lower = growths.pop().unwrap_or_else(Growth::one);
        Ok((lower, upper))
    }

    /// The factor an O-term with this coefficient has to be inflated by: the O-term of the
    /// sum of the coefficient evaluated at both bounds. No sign assumption is made.
    pub fn inflation(
        &self,
        coefficient: &Expr,
        ring: &AsymptoticRing,
    ) -> Result<Growth, AsymptoticError> {
        let at_lower = self.evaluate_at(coefficient, &self.lower, ring)?.big_o()?;
        let at_upper = self.evaluate_at(coefficient, &self.upper, ring)?.big_o()?;
        let sum = (&at_lower + &at_upper)?;
        let growth = match sum.single_term() {
            Some(term) => term.growth().clone(),
            None => {
                return Err(AsymptoticError::NonCollapsingBound {
                    coefficient: coefficient.to_string(),
                    bound: format!("{} and {}", self.lower, self.upper),
                });
            }
        };
        debug!("O-term coefficient {} inflates the growth by {}", coefficient, growth);
        Ok(growth)
    }
}

impl fmt::Display for VariableBounds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} <= {} <= {}",
            self.lower, self.dependent_variable, self.upper
        )
    }
}

/// The monoid of one kind of terms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermMonoid {
    kind: TermKind,
    bounds: Option<VariableBounds>,
}

impl TermMonoid {
    pub fn new(kind: TermKind, bounds: Option<VariableBounds>) -> TermMonoid {
        TermMonoid { kind, bounds }
    }

    pub fn kind(&self) -> TermKind {
        self.kind
    }

    /// `(dependent_variable, lower, upper)` for a bound-aware monoid
    pub fn variable_bounds(&self) -> Option<&VariableBounds> {
        self.bounds.as_ref()
    }

    pub fn dependent_variable(&self) -> Option<&str> {
        self.bounds.as_ref().map(VariableBounds::dependent_variable)
    }
}

impl fmt::Display for TermMonoid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.bounds {
            Some(bounds) => write!(f, "{}-term monoid with {}", self.kind, bounds),
            None => write!(f, "{}-term monoid", self.kind),
        }
    }
}

/// The three term monoids of a ring, sharing one set of bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermMonoidFactory {
    exact: TermMonoid,
    o: TermMonoid,
    b: TermMonoid,
}

impl TermMonoidFactory {
    /// monoids of a ring without dependent variable
    pub fn plain() -> TermMonoidFactory {
        TermMonoidFactory {
            exact: TermMonoid::new(TermKind::Exact, None),
            o: TermMonoid::new(TermKind::O, None),
            b: TermMonoid::new(TermKind::B, None),
        }
    }

    pub fn with_bounds(bounds: VariableBounds) -> TermMonoidFactory {
        TermMonoidFactory {
            exact: TermMonoid::new(TermKind::Exact, Some(bounds.clone())),
            o: TermMonoid::new(TermKind::O, Some(bounds.clone())),
            b: TermMonoid::new(TermKind::B, Some(bounds)),
        }
    }

    pub fn get(&self, kind: TermKind) -> &TermMonoid {
        match kind {
            TermKind::Exact => &self.exact,
            TermKind::O => &self.o,
            TermKind::B => &self.b,
        }
    }

    pub fn variable_bounds(&self) -> Option<&VariableBounds> {
        self.exact.variable_bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::{BigInt, BigRational};

    fn n_pow(num: i64, den: i64) -> Growth {
        Growth::monomial("n", BigRational::new(BigInt::from(num), BigInt::from(den)))
    }

    #[test]
    fn test_variable_bounds_validation() {
        let bounds = VariableBounds::new("k", Some(n_pow(0, 1)), Some(n_pow(1, 2))).unwrap();
        assert_eq!(bounds.dependent_variable(), "k");
        assert_eq!(bounds.to_string(), "1 <= k <= n^(1/2)");
        assert!(bounds.is_mentioned_in(&Expr::parse_expression("k^2 + 1").unwrap()));
        assert!(!bounds.is_mentioned_in(&Expr::parse_expression("n + 1").unwrap()));
        assert!(matches!(
            VariableBounds::new("2*k", Some(n_pow(0, 1)), Some(n_pow(1, 2))),
            Err(AsymptoticError::InvalidDependentVariable(_))
        ));
        assert_eq!(
            VariableBounds::new("k", Some(n_pow(0, 1)), None),
            Err(AsymptoticError::MissingBound("upper".to_string()))
        );
    }

    #[test]
    fn test_factory_kinds() {
        let factory = TermMonoidFactory::plain();
        assert_eq!(factory.get(TermKind::B).kind(), TermKind::B);
        assert!(factory.variable_bounds().is_none());
        assert_eq!(factory.get(TermKind::Exact).to_string(), "exact-term monoid");
    }
}
