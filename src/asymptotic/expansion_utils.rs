//! Post-processing of expansions with explicit error terms.
//!
//! - `simplify_expansion` distributes coefficients containing the dependent variable, so that
//!   error terms can absorb parts of them
//! - `round_bterm_coefficients` rounds B-term coefficients up
//! - `set_bterm_valid_from` raises B-term thresholds
//! - `expansion_upper_bound` turns B-terms into exact terms, symbolically or as a number
//! - `taylor_with_explicit_error` expands `f(term)` with a B-term remainder
use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::asymptotic::errors::AsymptoticError;
use crate::asymptotic::expansion::Expansion;
use crate::asymptotic::growth::Growth;
use crate::asymptotic::terms::{
    BTerm, ExactTerm, Summand, Term, ValidFrom, round_up_coefficient, threshold_values,
};
use crate::symbolic::interval::Interval;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{ceil_f64, rational_from_f64};

/// Re-adds every summand whose coefficient contains the dependent variable part by part, so
/// that error terms get the chance to absorb single parts. Error terms are added first.
///
/// With `simplify_bterm_growth`, a B-term `B(c(k)*g)` becomes `c(upper)*B(g)` instead: the
/// dependent variable is replaced by its upper bound and moved into the growth.
pub fn simplify_expansion(
    expansion: &Expansion,
    simplify_bterm_growth: bool,
) -> Result<Expansion, AsymptoticError> {
    let ring = expansion.ring();
    let Some(bounds) = ring.bounds() else {
        return Ok(expansion.clone());
    };
    let positivity = bounds.positivity();
    let mut error_terms: Vec<Term> = Vec::new();
    let mut exact_terms: Vec<Term> = Vec::new();
    for term in expansion.terms() {
        let coefficient = match term.coefficient() {
            Some(coefficient) if bounds.is_mentioned_in(coefficient) => coefficient,
            _ => {
                if term.is_exact() {
                    exact_terms.push(term.clone());
                } else {
                    error_terms.push(term.clone());
                }
                continue;
            }
        };
        let expanded = coefficient.simplify_with(&positivity)?;
        match term {
            Term::B(b) if simplify_bterm_growth => {
                let at_upper = bounds.evaluate_at(&expanded, bounds.upper(), ring)?;
                let rest = ring.b_term(
                    Expr::one(),
                    b.growth().clone(),
                    ValidFrom::PerVariable(b.valid_from().clone()),
                )?;
                error_terms.extend((&at_upper * &rest)?.terms().cloned());
            }
            Term::B(b) => {
                for part in expanded.summands(&positivity)? {
                    error_terms.push(
                        BTerm::new(ring, b.growth().clone(), &part, b.valid_from().clone())?.into(),
                    );
                }
            }
            _ => {
                for part in expanded.summands(&positivity)? {
                    exact_terms.push(ExactTerm::new(term.growth().clone(), part)?.into());
                }
            }
        }
    }
    ring.from_terms(error_terms.into_iter().chain(exact_terms))
}

/// A copy of the expansion with every B-term coefficient rounded up to the given number of
/// decimals, separately for each power of the dependent variable.
///
/// # Examples
/// ```
/// use RustedAsymptotics::asymptotic::expansion_utils::round_bterm_coefficients;
/// use RustedAsymptotics::asymptotic::ring::{AsymptoticRing, RingOptions};
/// let ring = AsymptoticRing::new("n^QQ", RingOptions::default()).unwrap();
/// let error = ring.b(&ring.parse("27/23*n^(-2)").unwrap(), 10).unwrap();
/// let expansion = (&ring.generator() - &error).unwrap();
/// assert_eq!(expansion.to_string(), "n + B(27/23*n^(-2), n >= 10)");
/// let rounded = round_bterm_coefficients(&expansion, 0).unwrap();
/// assert_eq!(rounded.to_string(), "n + B(2*n^(-2), n >= 10)");
/// ```
pub fn round_bterm_coefficients(
    expansion: &Expansion,
    floating_point_digits: u32,
) -> Result<Expansion, AsymptoticError> {
    let mut rounded = expansion.clone();
    let dependent_variable = expansion.ring().dependent_variable();
    for term in rounded.summands_mut().terms_mut() {
        if let Term::B(b) = term {
            let coefficient = b.coefficient().cloned().unwrap_or_else(Expr::one);
            let coefficient =
                round_up_coefficient(&coefficient, floating_point_digits, dependent_variable)?;
            *b = b.with_coefficient(coefficient);
        }
    }
    Ok(rounded)
}

/// Raises the thresholds of all B-terms of the expansion in place. Thresholds for variables a
/// B-term does not have are ignored, variables missing from a map count as 1.
pub fn set_bterm_valid_from(
    expansion: &mut Expansion,
    valid_from: impl Into<ValidFrom>,
) -> &mut Expansion {
    let valid_from = valid_from.into();
    for term in expansion.summands_mut().terms_mut() {
        if let Term::B(b) = term {
            let thresholds: BTreeMap<String, u64> = b
                .valid_from()
                .keys()
                .map(|var| (var.clone(), valid_from.threshold_for(var)))
                .collect();
            b.raise_valid_from(&thresholds);
        }
    }
    expansion
}

/// Result of `expansion_upper_bound`.
#[derive(Clone, Debug, PartialEq)]
pub enum UpperBound {
    /// an exact expansion with the same growth
    Symbolic(Expansion),
    /// a number valid from the thresholds of all B-terms on
    Numeric(Expr),
}

impl UpperBound {
    pub fn symbolic(self) -> Option<Expansion> {
        match self {
            UpperBound::Symbolic(expansion) => Some(expansion),
            UpperBound::Numeric(_) => None,
        }
    }

    pub fn numeric(self) -> Option<Expr> {
        match self {
            UpperBound::Numeric(value) => Some(value),
            UpperBound::Symbolic(_) => None,
        }
    }
}

/// Upper bound of the absolute value of an expansion: every coefficient is replaced by its
/// absolute value and every B-term becomes an exact term.
///
/// With `numeric`, the bound is evaluated at the thresholds: every variable at the largest
/// threshold of all B-terms (at least `valid_from`, or 1), the dependent variable at its upper
/// bound.
///
/// # Errors
/// - `NoSameOrderBound` if the expansion contains an O-term
/// - `NotBounded` in numeric mode if the bound is not `O(1)`
pub fn expansion_upper_bound(
    expansion: &Expansion,
    numeric: bool,
    valid_from: Option<u64>,
) -> Result<UpperBound, AsymptoticError> {
    let ring = expansion.ring();
    let mut thresholds: BTreeMap<String, u64> = ring
        .variable_names()
        .iter()
        .map(|var| (var.clone(), valid_from.unwrap_or(1)))
        .collect();
    let mut terms: Vec<Term> = Vec::with_capacity(expansion.len());
    for term in expansion.terms() {
        let coefficient = match term {
            Term::O(_) => return Err(AsymptoticError::NoSameOrderBound(term.to_string())),
            _ => term.coefficient().cloned().unwrap_or_else(Expr::one),
        };
        terms.push(ExactTerm::new(term.growth().clone(), coefficient.abs())?.into());
        if let Term::B(b) = term {
            for (var, value) in b.valid_from() {
                let entry = thresholds.entry(var.clone()).or_insert(*value);
                *entry = (*entry).max(*value);
            }
        }
    }
    let bound = ring.from_terms(terms)?;
    if !numeric {
        return Ok(UpperBound::Symbolic(bound));
    }

    let constant_order = ring.o_term(Growth::one())?;
    if let Some(big_o) = constant_order.single_term() {
        for term in bound.terms() {
            if !big_o.can_absorb(term, ring)? {
                return Err(AsymptoticError::NotBounded(bound.to_string()));
            }
        }
    }
    let values = threshold_values(&thresholds);
    let bound = match ring.bounds() {
        Some(bounds) => {
            let upper_value = ring.monomial(bounds.upper().clone()).subs(&values)?;
            bound.map_coefficients(|c| {
                c.substitute_variable(bounds.dependent_variable(), &upper_value)
            })?
        }
        None => bound,
    };
    Ok(UpperBound::Numeric(bound.subs(&values)?))
}

/// Taylor expansion of `f` at `term` up to `order` summands with an explicit B-term remainder.
///
/// The remainder is `C*term^order` where `C` bounds `|f^(order)(z)/order!|` for `z` between 0
/// and the numeric upper bound of `term`, computed with interval arithmetic. `term` has to tend
/// to 0.
///
/// # Examples
/// ```
/// use RustedAsymptotics::asymptotic::expansion_utils::taylor_with_explicit_error;
/// use RustedAsymptotics::asymptotic::ring::{AsymptoticRing, RingOptions};
/// use RustedAsymptotics::symbolic::symbolic_engine::Expr;
/// let ring = AsymptoticRing::new("n^QQ", RingOptions::default()).unwrap();
/// let term = ring.parse("1/n").unwrap();
/// let f = |t: Expr| Expr::one() / (Expr::one() - t);
/// // |(1 - z)^(-3)| <= 27/8 for 0 <= z <= 1/3
/// let expansion = taylor_with_explicit_error(f, &term, Some(2), Some(3), true).unwrap();
/// assert_eq!(expansion.to_string(), "1 + n^(-1) + B(4*n^(-2), n >= 3)");
/// ```
pub fn taylor_with_explicit_error<F>(
    f: F,
    term: &Expansion,
    order: Option<usize>,
    valid_from: Option<u64>,
    round_constant: bool,
) -> Result<Expansion, AsymptoticError>
where
    F: Fn(Expr) -> Expr,
{
    if !term.is_little_o_of_one() {
        return Err(AsymptoticError::NotTendingToZero(term.to_string()));
    }
    let ring = term.ring();
    let mut term = term.clone();
    if let Some(valid_from) = valid_from {
        set_bterm_valid_from(&mut term, valid_from);
    }
    let order = order.unwrap_or_else(|| ring.default_prec());

    let z = "z";
    let mut derivative = f(Expr::var(z));
    let mut taylor = ring.zero();
    let mut term_power = ring.one();
    for j in 0..order {
        let at_zero = derivative.substitute_variable(z, &Expr::zero()).simplify()?;
        taylor = (&taylor + &term_power.scale(&at_zero)?)?;
        derivative = (derivative.diff(z) / Expr::from(j as i64 + 1)).simplify()?;
        term_power = (&term_power * &term)?;
    }

    let term_bound = expansion_upper_bound(&term, true, valid_from)?
        .numeric()
        .ok_or_else(|| AsymptoticError::NotBounded(term.to_string()))?;
    let upper = term_bound.to_interval()?.upper();
    let bindings = HashMap::from([(z.to_string(), Interval::exact(0.0, upper))]);
    let supremum = derivative.enclose(&bindings)?.abs().upper();
    if !supremum.is_finite() {
        return Err(AsymptoticError::NoFiniteBound {
            derivative: derivative.to_string(),
            upper: term_bound.to_string(),
        });
    }
    let constant = if round_constant {
        ceil_f64(supremum)
    } else {
        rational_from_f64(supremum)
    }
    .ok_or_else(|| AsymptoticError::NoFiniteBound {
        derivative: derivative.to_string(),
        upper: term_bound.to_string(),
    })?;
    debug!(
        "remainder constant {} for {} on [0, {}]",
        constant, derivative, term_bound
    );

    let remainder = term_power.scale(&Expr::Const(constant))?;
    let thresholds = match valid_from {
        Some(valid_from) => ValidFrom::Uniform(valid_from),
        None => {
            let mut thresholds: BTreeMap<String, u64> = ring
                .variable_names()
                .iter()
                .map(|var| (var.clone(), 1))
                .collect();
            for summand in remainder.terms() {
                if let Term::B(b) = summand {
                    for (var, value) in thresholds.iter_mut() {
                        *value = (*value).max(b.threshold_for(var).unwrap_or(1));
                    }
                }
            }
            ValidFrom::PerVariable(thresholds)
        }
    };
    let remainder = ring.b(&remainder, thresholds)?;
    &taylor + &remainder
}
