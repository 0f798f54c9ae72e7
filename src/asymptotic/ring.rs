//! Asymptotic rings and the factory for rings with a dependent variable.
//!
//! A ring fixes the growth variables, the options and the term monoids. Rings are cheap to
//! clone and shared by every expansion built in them.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use num::{BigRational, One};

use crate::asymptotic::errors::AsymptoticError;
use crate::asymptotic::evaluate::{Algebra, Function, evaluate};
use crate::asymptotic::expansion::Expansion;
use crate::asymptotic::growth::{Growth, GrowthGroup};
use crate::asymptotic::poset::{SortKey, SummandPoset};
use crate::asymptotic::term_monoid::{TermKind, TermMonoid, TermMonoidFactory, VariableBounds};
use crate::asymptotic::terms::{BTerm, ExactTerm, OTerm, Summand, Term, ValidFrom};
use crate::symbolic::symbolic_engine::Expr;

//___________________________________OPTIONS____________________________________

/// Options shared by all expansions of a ring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingOptions {
    /// number of terms kept by series expansions (inversion, elementary functions, Taylor)
    pub default_prec: usize,
    /// round every new B-term coefficient up to this many decimals
    pub bterm_round_to: Option<u32>,
}

impl Default for RingOptions {
    fn default() -> Self {
        RingOptions {
            default_prec: 20,
            bterm_round_to: None,
        }
    }
}

impl RingOptions {
    pub fn with_default_prec(mut self, default_prec: usize) -> Self {
        self.default_prec = default_prec;
        self
    }

    pub fn with_bterm_round_to(mut self, digits: u32) -> Self {
        self.bterm_round_to = Some(digits);
        self
    }

    /// Reads options from a TOML document with an optional `[ring]` table:
    /// ```toml
    /// [ring]
    /// default_prec = 4
    /// bterm_round_to = 3
    /// ```
    /// Missing keys keep their defaults, unknown keys are rejected.
    pub fn from_toml_str(document: &str) -> Result<RingOptions, AsymptoticError> {
        let table = document.parse::<toml::Table>()?;
        let mut options = RingOptions::default();
        let Some(ring) = table.get("ring") else {
            return Ok(options);
        };
        let ring = ring
            .as_table()
            .ok_or_else(|| AsymptoticError::Config("[ring] must be a table".to_string()))?;
        for (key, value) in ring {
            let number = value
                .as_integer()
                .ok_or_else(|| AsymptoticError::Config(format!("{} must be an integer", key)))?;
            match key.as_str() {
                "default_prec" => {
                    if number < 1 {
                        return Err(AsymptoticError::Config(
                            "default_prec must be at least 1".to_string(),
                        ));
                    }
                    options.default_prec = number as usize;
                }
                "bterm_round_to" => {
                    let digits = u32::try_from(number).map_err(|_| {
                        AsymptoticError::Config(format!("bterm_round_to out of range: {}", number))
                    })?;
                    options.bterm_round_to = Some(digits);
                }
                other => {
                    return Err(AsymptoticError::Config(format!("unknown option {}", other)));
                }
            }
        }
        Ok(options)
    }
}

//___________________________________RING____________________________________

#[derive(Debug, PartialEq)]
struct RingData {
    growth_group: GrowthGroup,
    options: RingOptions,
    term_monoids: TermMonoidFactory,
}

#[derive(Clone, Debug)]
pub struct AsymptoticRing {
    inner: Arc<RingData>,
}

impl PartialEq for AsymptoticRing {
    fn eq(&self, other: &AsymptoticRing) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl fmt::Display for AsymptoticRing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Asymptotic Ring <{}> over Symbolic Ring", self.inner.growth_group)?;
        if let Some(bounds) = self.bounds() {
            write!(f, " with {}", bounds)?;
        }
        Ok(())
    }
}

impl AsymptoticRing {
    /// A ring without dependent variable, e.g. `AsymptoticRing::new("n^QQ", RingOptions::default())`.
    pub fn new(growth_group: &str, options: RingOptions) -> Result<AsymptoticRing, AsymptoticError> {
        let growth_group: GrowthGroup = growth_group.parse()?;
        Ok(AsymptoticRing::from_parts(
            growth_group,
            options,
            TermMonoidFactory::plain(),
        ))
    }

    fn from_parts(
        growth_group: GrowthGroup,
        options: RingOptions,
        term_monoids: TermMonoidFactory,
    ) -> AsymptoticRing {
        AsymptoticRing {
            inner: Arc::new(RingData {
                growth_group,
                options,
                term_monoids,
            }),
        }
    }

    pub fn growth_group(&self) -> &GrowthGroup {
        &self.inner.growth_group
    }

    pub fn variable_names(&self) -> &[String] {
        self.inner.growth_group.variables()
    }

    pub fn options(&self) -> &RingOptions {
        &self.inner.options
    }

    pub fn default_prec(&self) -> usize {
        self.inner.options.default_prec
    }

    pub fn term_monoid(&self, kind: TermKind) -> &TermMonoid {
        self.inner.term_monoids.get(kind)
    }

    pub fn bounds(&self) -> Option<&VariableBounds> {
        self.inner.term_monoids.variable_bounds()
    }

    pub fn dependent_variable(&self) -> Option<&str> {
        self.bounds().map(VariableBounds::dependent_variable)
    }

    /// `(k, lower, upper)` with the bounds as expansions.
    pub fn variable_bounds(&self) -> Option<(Expr, Expansion, Expansion)> {
        self.bounds().map(|bounds| {
            (
                Expr::var(bounds.dependent_variable()),
                self.monomial(bounds.lower().clone()),
                self.monomial(bounds.upper().clone()),
            )
        })
    }

    //___________________________________ELEMENTS____________________________________

    pub fn zero(&self) -> Expansion {
        Expansion::from_poset(self.clone(), SummandPoset::new())
    }

    pub fn one(&self) -> Expansion {
        self.monomial(Growth::one())
    }

    /// `1*growth`
    pub fn monomial(&self, growth: Growth) -> Expansion {
        let key = SortKey {
            bound: growth.clone(),
            raw: growth.clone(),
        };
        let range = (growth.clone(), growth.clone());
        let term = ExactTerm::monomial(growth).into();
        Expansion::from_poset(self.clone(), SummandPoset::singleton(term, key, range))
    }

    pub fn constant(&self, value: Expr) -> Result<Expansion, AsymptoticError> {
        self.exact_term(value, Growth::one())
    }

    pub fn exact_term(&self, coefficient: Expr, growth: Growth) -> Result<Expansion, AsymptoticError> {
        self.from_terms([ExactTerm::new(growth, coefficient)?.into()])
    }

    pub fn o_term(&self, growth: Growth) -> Result<Expansion, AsymptoticError> {
        self.from_terms([OTerm::new(self, growth, None)?.into()])
    }

    pub fn b_term(
        &self,
        coefficient: Expr,
        growth: Growth,
        valid_from: impl Into<ValidFrom>,
    ) -> Result<Expansion, AsymptoticError> {
        let valid_from = valid_from.into().thresholds(self.variable_names());
        self.from_terms([BTerm::new(self, growth, &coefficient, valid_from)?.into()])
    }

    /// The first growth variable as an expansion.
    pub fn generator(&self) -> Expansion {
        self.gens().into_iter().next().unwrap_or_else(|| self.one())
    }

    pub fn gens(&self) -> Vec<Expansion> {
        self.variable_names()
            .iter()
            .map(|var| self.monomial(Growth::monomial(var, BigRational::one())))
            .collect()
    }

    /// `O(expansion)`
    pub fn o(&self, expansion: &Expansion) -> Result<Expansion, AsymptoticError> {
        self.check_ring(expansion)?;
        expansion.big_o()
    }

    /// Turns the exact summands of `expansion` into B-terms valid from the given thresholds.
    /// B-terms keep their coefficient and raise their thresholds.
    ///
    /// # Errors
    /// `Unsupported` if the expansion contains an O-term.
    pub fn b(
        &self,
        expansion: &Expansion,
        valid_from: impl Into<ValidFrom>,
    ) -> Result<Expansion, AsymptoticError> {
        self.check_ring(expansion)?;
        let valid_from = valid_from.into();
        let mut terms = Vec::with_capacity(expansion.len());
        for term in expansion.terms() {
            let thresholds = valid_from.thresholds(self.variable_names());
            let converted: Term = match term {
                Term::Exact(exact) => {
                    let coefficient = exact.coefficient().cloned().unwrap_or_else(Expr::one);
                    BTerm::new(self, exact.growth().clone(), &coefficient, thresholds)?.into()
                }
                Term::B(b) => {
                    let mut raised = b.clone();
                    raised.raise_valid_from(&thresholds);
                    raised.into()
                }
                Term::O(_) => {
                    return Err(AsymptoticError::Unsupported(format!(
                        "cannot convert {} into a B-term",
                        term
                    )));
                }
            };
            terms.push(converted);
        }
        self.from_terms(terms)
    }

    pub fn from_terms(
        &self,
        terms: impl IntoIterator<Item = Term>,
    ) -> Result<Expansion, AsymptoticError> {
        let mut summands = SummandPoset::new();
        for term in terms {
            summands.insert(term, self)?;
        }
        Ok(Expansion::from_poset(self.clone(), summands))
    }

    /// The expression as an expansion: growth variables become generators, every other
    /// variable stays in the coefficients.
    pub fn from_expr(&self, expr: &Expr) -> Result<Expansion, AsymptoticError> {
        evaluate(expr, self, &HashMap::new())
    }

    /// # Examples
    /// ```
    /// use RustedAsymptotics::asymptotic::ring::{AsymptoticRing, RingOptions};
    /// let ring = AsymptoticRing::new("n^QQ", RingOptions::default().with_default_prec(3)).unwrap();
    /// let x = ring.parse("1/(1 - 1/n)").unwrap();
    /// assert_eq!(x.to_string(), "1 + n^(-1) + n^(-2) + O(n^(-3))");
    /// ```
    pub fn parse(&self, input: &str) -> Result<Expansion, AsymptoticError> {
        self.from_expr(&Expr::parse_expression(input)?)
    }

    pub(crate) fn check_ring(&self, expansion: &Expansion) -> Result<(), AsymptoticError> {
        if expansion.ring() == self {
            Ok(())
        } else {
            Err(AsymptoticError::IncompatibleRings)
        }
    }
}

/// Evaluation of expressions into expansions of the ring.
impl Algebra for AsymptoticRing {
    type Element = Expansion;
    type Error = AsymptoticError;

    fn constant(&self, value: &BigRational) -> Result<Expansion, AsymptoticError> {
        AsymptoticRing::constant(self, Expr::Const(value.clone()))
    }

    fn symbol(&self, name: &str) -> Result<Expansion, AsymptoticError> {
        if self.growth_group().contains(name) {
            Ok(self.monomial(Growth::monomial(name, BigRational::one())))
        } else {
            AsymptoticRing::constant(self, Expr::var(name))
        }
    }

    fn add(&self, lhs: &Expansion, rhs: &Expansion) -> Result<Expansion, AsymptoticError> {
        lhs + rhs
    }

    fn sub(&self, lhs: &Expansion, rhs: &Expansion) -> Result<Expansion, AsymptoticError> {
        lhs - rhs
    }

    fn mul(&self, lhs: &Expansion, rhs: &Expansion) -> Result<Expansion, AsymptoticError> {
        lhs * rhs
    }

    fn neg(&self, value: &Expansion) -> Result<Expansion, AsymptoticError> {
        -value
    }

    fn div(&self, lhs: &Expansion, rhs: &Expansion) -> Result<Expansion, AsymptoticError> {
        lhs / rhs
    }

    fn pow_rational(&self, base: &Expansion, exp: &BigRational) -> Result<Expansion, AsymptoticError> {
        base.pow_rational(exp)
    }

    fn abs(&self, value: &Expansion) -> Result<Expansion, AsymptoticError> {
        value.abs()
    }

    fn apply(&self, function: Function, arg: &Expansion) -> Result<Expansion, AsymptoticError> {
        arg.apply_function(function)
    }
}

//___________________________________FACTORY____________________________________

/// Builds a univariate ring whose term monoids know that the dependent variable lies between
/// `generator^lower_bound_power` and `generator^upper_bound_power`.
///
/// Returns the ring, its generator and the dependent variable as a symbol.
///
/// # Errors
/// - `InvalidDependentVariable` if `dependent_variable` is not a bare symbol or is a growth variable
/// - `MissingBound` if one of the powers is `None`
/// - `Unsupported` for growth groups with more than one variable
///
/// # Examples
/// ```
/// use num::{BigInt, BigRational};
/// use RustedAsymptotics::asymptotic::ring::{asymptotic_ring_with_dependent_variable, RingOptions};
/// let half = BigRational::new(BigInt::from(1), BigInt::from(2));
/// let (ring, n, k) =
///     asymptotic_ring_with_dependent_variable("n^QQ", "k", -half.clone(), half, RingOptions::default())
///         .unwrap();
/// assert_eq!(k.to_string(), "k");
/// let term = (&ring.constant(k).unwrap() * &n).unwrap();
/// assert_eq!(ring.o(&term).unwrap().to_string(), "O(n^(3/2))");
/// ```
pub fn asymptotic_ring_with_dependent_variable(
    growth_group: &str,
    dependent_variable: &str,
    lower_bound_power: impl Into<Option<BigRational>>,
    upper_bound_power: impl Into<Option<BigRational>>,
    options: RingOptions,
) -> Result<(AsymptoticRing, Expansion, Expr), AsymptoticError> {
    let growth_group: GrowthGroup = growth_group.parse()?;
    let [variable] = growth_group.variables() else {
        return Err(AsymptoticError::Unsupported(format!(
            "a dependent variable needs a univariate growth group, got {}",
            growth_group
        )));
    };
    let variable = variable.clone();
    if growth_group.contains(dependent_variable.trim()) {
        return Err(AsymptoticError::InvalidDependentVariable(
            dependent_variable.to_string(),
        ));
    }
    let lower_power = lower_bound_power.into();
    let upper_power = upper_bound_power.into();
    if let (Some(lower), Some(upper)) = (&lower_power, &upper_power) {
        if lower > upper {
            warn!(
                "lower bound power {} exceeds upper bound power {} for {}",
                lower, upper, dependent_variable
            );
        }
    }
    let bounds = VariableBounds::new(
        dependent_variable,
        lower_power.map(|power| Growth::monomial(&variable, power)),
        upper_power.map(|power| Growth::monomial(&variable, power)),
    )?;
    info!("asymptotic ring <{}> with {}", growth_group, bounds);
    let k = Expr::var(bounds.dependent_variable());
    let ring = AsymptoticRing::from_parts(growth_group, options, TermMonoidFactory::with_bounds(bounds));
    let generator = ring.generator();
    Ok((ring, generator, k))
}
