//! Summands of asymptotic expansions.
//!
//! Three kinds of terms are used:
//! - `ExactTerm`: `c*g`, a symbolic coefficient times a growth;
//! - `OTerm`: `O(g)`, an unspecified function bounded by a constant times `g`;
//! - `BTerm`: `B(c*g, n >= n0)`, a function whose absolute value is at most `c*g` for all
//!   `n >= n0`. The coefficient is explicit and nonnegative.
//!
//! When the ring has a dependent variable `k`, a coefficient containing `k` may grow like any
//! power between the values at the two bounds. O-terms absorb that growth into `g` when they are
//! created, exact terms and B-terms carry it as their dependent growth range.
use std::collections::BTreeMap;
use std::fmt;

use enum_dispatch::enum_dispatch;
use itertools::Itertools;
use log::debug;
use num::{BigInt, BigRational};

use crate::asymptotic::errors::AsymptoticError;
use crate::asymptotic::expansion::Expansion;
use crate::asymptotic::growth::Growth;
use crate::asymptotic::ring::AsymptoticRing;
use crate::asymptotic::term_monoid::TermKind;
use crate::symbolic::symbolic_engine::{Expr, SymbolicError};
use crate::symbolic::symbolic_simplify::Assumptions;
use crate::symbolic::utils::{ceil_to_digits, rational_from_f64};

/// `(smallest, largest)` growth a term can have while `k` moves between its bounds
pub type GrowthRange = (Growth, Growth);

#[enum_dispatch]
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    Exact(ExactTerm),
    O(OTerm),
    B(BTerm),
}

#[enum_dispatch(Term)]
pub trait Summand {
    fn kind(&self) -> TermKind;
    fn growth(&self) -> &Growth;
    /// `None` for O-terms
    fn coefficient(&self) -> Option<&Expr>;
    fn dependent_growth_range(&self, ring: &AsymptoticRing)
    -> Result<GrowthRange, AsymptoticError>;
}

//___________________________________EXACT TERMS____________________________________

#[derive(Clone, Debug, PartialEq)]
pub struct ExactTerm {
    growth: Growth,
    coefficient: Expr,
}

impl ExactTerm {
    pub fn new(growth: Growth, coefficient: Expr) -> Result<ExactTerm, AsymptoticError> {
        Ok(ExactTerm {
            growth,
            coefficient: coefficient.simplify()?,
        })
    }

    /// `1*growth`
    pub fn monomial(growth: Growth) -> ExactTerm {
        ExactTerm {
            growth,
            coefficient: Expr::one(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    pub(crate) fn negated(&self) -> Result<ExactTerm, AsymptoticError> {
        ExactTerm::new(self.growth.clone(), -self.coefficient.clone())
    }

    /// `1/(c*g) = c^(-1) * g^(-1)`
    pub fn inverse(&self) -> Result<ExactTerm, AsymptoticError> {
        if self.is_zero() {
            return Err(SymbolicError::DivisionByZero.into());
        }
        ExactTerm::new(self.growth.recip(), Expr::one() / self.coefficient.clone())
    }

    /// `(c*g)^q = c^q * g^q`
    pub fn pow_rational(&self, exp: &BigRational) -> Result<ExactTerm, AsymptoticError> {
        ExactTerm::new(
            self.growth.pow(exp),
            self.coefficient.clone().pow_rational(exp.clone()),
        )
    }
}

impl Summand for ExactTerm {
    fn kind(&self) -> TermKind {
        TermKind::Exact
    }

    fn growth(&self) -> &Growth {
        &self.growth
    }

    fn coefficient(&self) -> Option<&Expr> {
        Some(&self.coefficient)
    }

    fn dependent_growth_range(
        &self,
        ring: &AsymptoticRing,
    ) -> Result<GrowthRange, AsymptoticError> {
        coefficient_range(&self.growth, &self.coefficient, ring)
    }
}

//___________________________________O-TERMS____________________________________

#[derive(Clone, Debug, PartialEq)]
pub struct OTerm {
    growth: Growth,
}

impl OTerm {
    /// `O(coefficient*growth)`. A coefficient containing the dependent variable is replaced by
    /// the growth it can reach at the bounds, every other coefficient is dropped.
    pub fn new(
        ring: &AsymptoticRing,
        growth: Growth,
        coefficient: Option<&Expr>,
    ) -> Result<OTerm, AsymptoticError> {
        let (Some(bounds), Some(coefficient)) = (ring.bounds(), coefficient) else {
            return Ok(OTerm { growth });
        };
        let coefficient = coefficient.simplify()?;
        if !bounds.is_mentioned_in(&coefficient) {
            return Ok(OTerm { growth });
        }
        let inflation = bounds.inflation(&coefficient, ring)?;
        Ok(OTerm {
            growth: growth.mul(&inflation),
        })
    }
}

impl Summand for OTerm {
    fn kind(&self) -> TermKind {
        TermKind::O
    }

    fn growth(&self) -> &Growth {
        &self.growth
    }

    fn coefficient(&self) -> Option<&Expr> {
        None
    }

    fn dependent_growth_range(
        &self,
        _ring: &AsymptoticRing,
    ) -> Result<GrowthRange, AsymptoticError> {
        Ok((self.growth.clone(), self.growth.clone()))
    }
}

//___________________________________B-TERMS____________________________________

#[derive(Clone, Debug, PartialEq)]
pub struct BTerm {
    growth: Growth,
    coefficient: Expr,
    valid_from: BTreeMap<String, u64>,
}

impl BTerm {
    /// Builds `B(|coefficient|*growth)` valid for every growth variable above its threshold.
    ///
    /// # Errors
    /// `MissingThreshold` if a variable of `growth` has no entry in `valid_from`.
    pub fn new(
        ring: &AsymptoticRing,
        growth: Growth,
        coefficient: &Expr,
        valid_from: BTreeMap<String, u64>,
    ) -> Result<BTerm, AsymptoticError> {
        if let Some(var) = growth.variables().find(|v| !valid_from.contains_key(*v)) {
            return Err(AsymptoticError::MissingThreshold {
                term: format!("B({})", format_product(coefficient, &growth)),
                variable: var.clone(),
            });
        }
        let mut coefficient = nonnegative_coefficient(coefficient, ring)?;
        if let Some(digits) = ring.options().bterm_round_to {
            coefficient = round_up_coefficient(&coefficient, digits, ring.dependent_variable())?;
        }
        Ok(BTerm {
            growth,
            coefficient,
            valid_from,
        })
    }

    pub fn valid_from(&self) -> &BTreeMap<String, u64> {
        &self.valid_from
    }

    pub fn threshold_for(&self, var: &str) -> Option<u64> {
        self.valid_from.get(var).copied()
    }

    /// Thresholds as exact numbers, ready for `Growth::evaluate_at`.
    pub fn threshold_values(&self) -> BTreeMap<String, BigRational> {
        threshold_values(&self.valid_from)
    }

    /// Raises thresholds to the given values; thresholds never decrease.
    pub(crate) fn raise_valid_from(&mut self, thresholds: &BTreeMap<String, u64>) {
        for (var, value) in thresholds {
            let entry = self.valid_from.entry(var.clone()).or_insert(*value);
            *entry = (*entry).max(*value);
        }
    }

    /// Replaces the coefficient as it is; the caller keeps it nonnegative.
    pub(crate) fn with_coefficient(&self, coefficient: Expr) -> BTerm {
        BTerm {
            growth: self.growth.clone(),
            coefficient,
            valid_from: self.valid_from.clone(),
        }
    }
}

impl Summand for BTerm {
    fn kind(&self) -> TermKind {
        TermKind::B
    }

    fn growth(&self) -> &Growth {
        &self.growth
    }

    fn coefficient(&self) -> Option<&Expr> {
        Some(&self.coefficient)
    }

    fn dependent_growth_range(
        &self,
        ring: &AsymptoticRing,
    ) -> Result<GrowthRange, AsymptoticError> {
        coefficient_range(&self.growth, &self.coefficient, ring)
    }
}

pub(crate) fn threshold_values(valid_from: &BTreeMap<String, u64>) -> BTreeMap<String, BigRational> {
    valid_from
        .iter()
        .map(|(var, n)| (var.clone(), BigRational::from_integer(BigInt::from(*n))))
        .collect()
}

pub(crate) fn merge_thresholds(
    a: &BTreeMap<String, u64>,
    b: &BTreeMap<String, u64>,
) -> BTreeMap<String, u64> {
    let mut merged = a.clone();
    for (var, value) in b {
        let entry = merged.entry(var.clone()).or_insert(*value);
        *entry = (*entry).max(*value);
    }
    merged
}

fn coefficient_range(
    growth: &Growth,
    coefficient: &Expr,
    ring: &AsymptoticRing,
) -> Result<GrowthRange, AsymptoticError> {
    match ring.bounds() {
        Some(bounds) if bounds.is_mentioned_in(coefficient) => {
            let (at_lower, at_upper) = bounds.boundary_growths(coefficient, ring)?;
            Ok((
                at_lower.meet(&at_upper).mul(growth),
                at_lower.join(&at_upper).mul(growth),
            ))
        }
        _ => Ok((growth.clone(), growth.clone())),
    }
}

/// `|coefficient|`; a sum containing the dependent variable becomes the sum of the absolute
/// values of its parts, everything simplified under `k > 0`.
fn nonnegative_coefficient(coefficient: &Expr, ring: &AsymptoticRing) -> Result<Expr, AsymptoticError> {
    let assumptions = match ring.bounds() {
        Some(bounds) if bounds.is_mentioned_in(coefficient) => bounds.positivity(),
        _ => return Ok(coefficient.clone().abs().simplify()?),
    };
    let parts = coefficient.summands(&assumptions)?;
    if parts.len() > 1 {
        let sum = parts
            .into_iter()
            .map(Expr::abs)
            .reduce(|acc, part| acc + part)
            .unwrap_or_else(Expr::zero);
        Ok(sum.simplify_with(&assumptions)?)
    } else {
        Ok(coefficient.clone().abs().simplify_with(&assumptions)?)
    }
}

/// Rounds a nonnegative coefficient up to `digits` decimals, separately for every power of the
/// dependent variable. Scalars that are neither rational nor constant are kept.
pub(crate) fn round_up_coefficient(
    coefficient: &Expr,
    digits: u32,
    dependent_variable: Option<&str>,
) -> Result<Expr, AsymptoticError> {
    match dependent_variable {
        Some(k) if coefficient.contains_variable(k) => {
            let assumptions = Assumptions::positive(k);
            let mut rounded = Expr::zero();
            for (exp, scalar) in coefficient.coefficients(k, &assumptions)? {
                let power = Expr::var(k).pow_rational(exp);
                rounded = rounded + round_up_scalar(&scalar, digits)? * power;
            }
            Ok(rounded.simplify_with(&assumptions)?)
        }
        _ => round_up_scalar(coefficient, digits),
    }
}

fn round_up_scalar(scalar: &Expr, digits: u32) -> Result<Expr, AsymptoticError> {
    if let Some(value) = scalar.to_rational()? {
        return Ok(Expr::Const(ceil_to_digits(&value, digits)));
    }
    if scalar.is_constant() {
        let upper = scalar.to_interval()?.upper();
        if let Some(value) = rational_from_f64(upper) {
            return Ok(Expr::Const(ceil_to_digits(&value, digits)));
        }
    }
    debug!("coefficient {} cannot be rounded, kept as it is", scalar);
    Ok(scalar.clone())
}

//___________________________________TERM ALGEBRA____________________________________

impl Term {
    pub fn is_exact(&self) -> bool {
        matches!(self, Term::Exact(_))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Term::Exact(term) if term.is_zero())
    }

    /// Product of two terms. Error terms win: anything times an O-term is an O-term, exact
    /// terms times B-terms are B-terms.
    pub fn mul(&self, other: &Term, ring: &AsymptoticRing) -> Result<Term, AsymptoticError> {
        let growth = self.growth().mul(other.growth());
        let product = match (self, other) {
            (Term::Exact(a), Term::Exact(b)) => {
                ExactTerm::new(growth, a.coefficient.clone() * b.coefficient.clone())?.into()
            }
            (Term::O(_), Term::O(_)) => OTerm::new(ring, growth, None)?.into(),
            (Term::O(_), term) | (term, Term::O(_)) => {
                OTerm::new(ring, growth, term.coefficient())?.into()
            }
            (Term::B(a), Term::B(b)) => BTerm::new(
                ring,
                growth,
                &(a.coefficient.clone() * b.coefficient.clone()),
                merge_thresholds(&a.valid_from, &b.valid_from),
            )?
            .into(),
            (Term::B(b), Term::Exact(e)) | (Term::Exact(e), Term::B(b)) => BTerm::new(
                ring,
                growth,
                &(b.coefficient.clone() * e.coefficient.clone().abs()),
                b.valid_from.clone(),
            )?
            .into(),
        };
        Ok(product)
    }

    /// Only exact terms change sign.
    pub fn neg(&self) -> Result<Term, AsymptoticError> {
        match self {
            Term::Exact(term) => Ok(term.negated()?.into()),
            other => Ok(other.clone()),
        }
    }

    /// Whether `self` absorbs `other`, see `absorbs_ranged`.
    pub fn can_absorb(&self, other: &Term, ring: &AsymptoticRing) -> Result<bool, AsymptoticError> {
        let own_range = self.dependent_growth_range(ring)?;
        let other_range = other.dependent_growth_range(ring)?;
        Ok(absorbs_ranged(self, &own_range, other, &other_range))
    }

    /// Result of `self` absorbing `other`; `None` if both cancel. Only call this after
    /// `can_absorb` returned true.
    pub fn absorb(&self, other: &Term, ring: &AsymptoticRing) -> Result<Option<Term>, AsymptoticError> {
        match (self, other) {
            (Term::Exact(a), Term::Exact(b)) => {
                let sum = ExactTerm::new(
                    a.growth.clone(),
                    a.coefficient.clone() + b.coefficient.clone(),
                )?;
                Ok(if sum.is_zero() { None } else { Some(sum.into()) })
            }
            (Term::O(_), _) => Ok(Some(self.clone())),
            (Term::B(b), other) => {
                let valid_from = match other {
                    Term::B(other) => merge_thresholds(&b.valid_from, &other.valid_from),
                    _ => b.valid_from.clone(),
                };
                let other_coefficient = other.coefficient().cloned().unwrap_or_else(Expr::one);
                let ratio = other
                    .growth()
                    .div(&b.growth)
                    .evaluate_at(&threshold_values(&valid_from))?;
                let coefficient =
                    b.coefficient.clone().abs() + other_coefficient.abs() * ratio;
                Ok(Some(
                    BTerm::new(ring, b.growth.clone(), &coefficient, valid_from)?.into(),
                ))
            }
            (Term::Exact(_), _) => Err(AsymptoticError::Unsupported(format!(
                "{} cannot absorb {}",
                self, other
            ))),
        }
    }
}

/// Absorption rule with precomputed dependent growth ranges.
///
/// An exact term absorbs exact terms of the same growth. An O-term absorbs everything whose
/// largest possible growth is at most its own. A B-term absorbs exact terms and B-terms of at
/// most its growth whose coefficients swing by the same factors between the bounds.
pub(crate) fn absorbs_ranged(
    this: &Term,
    this_range: &GrowthRange,
    other: &Term,
    other_range: &GrowthRange,
) -> bool {
    match (this, other) {
        (Term::Exact(a), Term::Exact(b)) => a.growth == b.growth,
        (Term::O(o), other) => match other.coefficient() {
            Some(_) => other_range.0 <= o.growth && other_range.1 <= o.growth,
            None => *other.growth() <= o.growth,
        },
        (Term::B(b), Term::Exact(_) | Term::B(_)) => {
            b.growth >= *other.growth()
                && this_range.0.div(&b.growth) == other_range.0.div(other.growth())
                && this_range.1.div(&b.growth) == other_range.1.div(other.growth())
        }
        _ => false,
    }
}

//___________________________________THRESHOLDS____________________________________

/// Thresholds for `set_bterm_valid_from` and `AsymptoticRing::b`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidFrom {
    /// the same threshold for every variable
    Uniform(u64),
    PerVariable(BTreeMap<String, u64>),
}

impl ValidFrom {
    /// Thresholds keyed by anything naming a variable: a name, a symbol or a generator.
    pub fn per_variable<V, I>(entries: I) -> Result<ValidFrom, AsymptoticError>
    where
        V: VariableRef,
        I: IntoIterator<Item = (V, u64)>,
    {
        let mut map = BTreeMap::new();
        for (var, value) in entries {
            let name = var.variable_name().ok_or_else(|| {
                AsymptoticError::Unsupported(
                    "threshold keys must be variables or generators".to_string(),
                )
            })?;
            map.insert(name, value);
        }
        Ok(ValidFrom::PerVariable(map))
    }

    /// Threshold of `var`; variables missing from a map get 1.
    pub fn threshold_for(&self, var: &str) -> u64 {
        match self {
            ValidFrom::Uniform(value) => *value,
            ValidFrom::PerVariable(map) => map.get(var).copied().unwrap_or(1),
        }
    }

    /// Thresholds of a new B-term: a uniform value applies to every variable of the ring,
    /// a map is taken as it is.
    pub fn thresholds(&self, ring_variables: &[String]) -> BTreeMap<String, u64> {
        match self {
            ValidFrom::Uniform(value) => ring_variables
                .iter()
                .map(|var| (var.clone(), *value))
                .collect(),
            ValidFrom::PerVariable(map) => map.clone(),
        }
    }
}

impl From<u64> for ValidFrom {
    fn from(value: u64) -> Self {
        ValidFrom::Uniform(value)
    }
}

impl From<BTreeMap<String, u64>> for ValidFrom {
    fn from(map: BTreeMap<String, u64>) -> Self {
        ValidFrom::PerVariable(map)
    }
}

/// Something that names a growth variable.
pub trait VariableRef {
    fn variable_name(&self) -> Option<String>;
}

impl VariableRef for &str {
    fn variable_name(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl VariableRef for String {
    fn variable_name(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl VariableRef for Expr {
    fn variable_name(&self) -> Option<String> {
        self.as_symbol().map(String::from)
    }
}

impl VariableRef for Expansion {
    fn variable_name(&self) -> Option<String> {
        self.as_generator().map(String::from)
    }
}

impl VariableRef for &Expansion {
    fn variable_name(&self) -> Option<String> {
        self.as_generator().map(String::from)
    }
}

//___________________________________DISPLAY____________________________________

/// `c*g` the way summands print: `n`, `-n`, `3*n^2`, `(k + 1)*n`, `1/2`.
pub(crate) fn format_product(coefficient: &Expr, growth: &Growth) -> String {
    if growth.is_one() {
        return coefficient.to_string();
    }
    if coefficient.is_one() {
        return growth.to_string();
    }
    if *coefficient == Expr::from(-1) {
        return format!("-{}", growth);
    }
    if coefficient.is_sum() {
        format!("({})*{}", coefficient, growth)
    } else {
        format!("{}*{}", coefficient, growth)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Exact(term) => write!(f, "{}", format_product(&term.coefficient, &term.growth)),
            Term::O(term) => write!(f, "O({})", term.growth),
            Term::B(term) => {
                let body = format_product(&term.coefficient, &term.growth);
                if term.valid_from.is_empty() {
                    return write!(f, "B({})", body);
                }
                let thresholds = term
                    .valid_from
                    .iter()
                    .map(|(var, n)| format!("{} >= {}", var, n))
                    .join(", ");
                write!(
                    f,
                    "B({}, {})",
                    body, thresholds
                )
            }
        }
    }
}
