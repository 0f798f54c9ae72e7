//! Asymptotic expansions: finite sums of exact terms, O-terms and B-terms.
//!
//! Expansions are values. The arithmetic operators are implemented on references and return
//! `Result`, since operands from different rings cannot be combined:
//! ```
//! use RustedAsymptotics::asymptotic::ring::{AsymptoticRing, RingOptions};
//! let ring = AsymptoticRing::new("n^QQ", RingOptions::default()).unwrap();
//! let n = ring.generator();
//! let x = (&n + &ring.one()).unwrap();
//! let square = (&x * &x).unwrap();
//! assert_eq!(square.to_string(), "n^2 + 2*n + 1");
//! ```
//! Series operations (`invert`, `pow_rational`, `exp`, `ln`) truncate after `default_prec`
//! terms of the ring and add an O-term for the rest.
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num::{BigInt, BigRational, One, Signed, ToPrimitive};

use crate::asymptotic::errors::AsymptoticError;
use crate::asymptotic::evaluate::Function;
use crate::asymptotic::growth::Growth;
use crate::asymptotic::poset::{Entry, SummandPoset};
use crate::asymptotic::ring::AsymptoticRing;
use crate::asymptotic::terms::{BTerm, ExactTerm, OTerm, Summand, Term};
use crate::symbolic::symbolic_engine::{Expr, SymbolicError};
use crate::symbolic::symbolic_simplify::Assumptions;

#[derive(Clone, Debug)]
pub struct Expansion {
    ring: AsymptoticRing,
    summands: SummandPoset,
}

impl PartialEq for Expansion {
    fn eq(&self, other: &Expansion) -> bool {
        self.ring == other.ring && self.terms().eq(other.terms())
    }
}

impl Expansion {
    pub(crate) fn from_poset(ring: AsymptoticRing, summands: SummandPoset) -> Expansion {
        Expansion { ring, summands }
    }

    pub fn ring(&self) -> &AsymptoticRing {
        &self.ring
    }

    pub fn summands(&self) -> &SummandPoset {
        &self.summands
    }

    pub(crate) fn summands_mut(&mut self) -> &mut SummandPoset {
        &mut self.summands
    }

    /// summands in display order
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.summands.terms()
    }

    pub fn len(&self) -> usize {
        self.summands.len()
    }

    pub fn is_zero(&self) -> bool {
        self.summands.is_empty()
    }

    /// true if there are no error terms
    pub fn is_exact(&self) -> bool {
        self.terms().all(Term::is_exact)
    }

    pub fn single_term(&self) -> Option<&Term> {
        match self.summands.entries() {
            [entry] => Some(&entry.term),
            _ => None,
        }
    }

    /// Name of the variable if the expansion is a generator of its ring.
    pub fn as_generator(&self) -> Option<&str> {
        let Some(Term::Exact(term)) = self.single_term() else {
            return None;
        };
        if !term.coefficient().is_some_and(Expr::is_one) {
            return None;
        }
        let mut variables = term.growth().variables();
        let var = variables.next()?;
        if variables.next().is_none() && term.growth().exponent(var).is_one() {
            Some(var.as_str())
        } else {
            None
        }
    }

    pub fn exact_part(&self) -> Result<Expansion, AsymptoticError> {
        self.ring
            .from_terms(self.terms().filter(|term| term.is_exact()).cloned())
    }

    /// the O-terms and B-terms
    pub fn error_part(&self) -> Result<Expansion, AsymptoticError> {
        self.ring
            .from_terms(self.terms().filter(|term| !term.is_exact()).cloned())
    }

    /// `factor * self` for a symbolic constant
    pub fn scale(&self, factor: &Expr) -> Result<Expansion, AsymptoticError> {
        &self.ring.constant(factor.clone())? * self
    }

    /// Every summand replaced by its O-term.
    pub fn big_o(&self) -> Result<Expansion, AsymptoticError> {
        let mut terms = Vec::with_capacity(self.len());
        for term in self.terms() {
            let o_term = match term {
                Term::O(_) => term.clone(),
                _ => OTerm::new(&self.ring, term.growth().clone(), term.coefficient())?.into(),
            };
            terms.push(o_term);
        }
        self.ring.from_terms(terms)
    }

    /// true if every summand tends to 0 for every admissible value of the dependent variable
    pub fn is_little_o_of_one(&self) -> bool {
        let one = Growth::one();
        self.summands.entries().iter().all(|entry| entry.range.1 < one)
    }

    /// The largest growth a summand can reach.
    fn largest_growth(&self) -> Growth {
        self.summands
            .entries()
            .iter()
            .map(|entry| entry.range.1.clone())
            .reduce(|acc, growth| acc.join(&growth))
            .unwrap_or_else(Growth::one)
    }

    /// `self = leading * (1 + r)` with `r = o(1)`, if the first summand is exact and dominates.
    fn split_leading(&self) -> Result<Option<(ExactTerm, Expansion)>, AsymptoticError> {
        let Some(Entry {
            term: Term::Exact(leading),
            ..
        }) = self.summands.first()
        else {
            return Ok(None);
        };
        let leading_inverse = self.ring.from_terms([leading.inverse()?.into()])?;
        let r = (&(self * &leading_inverse)? - &self.ring.one())?;
        if r.is_little_o_of_one() {
            Ok(Some((leading.clone(), r)))
        } else {
            Ok(None)
        }
    }

    /// `sum c_j * self^j + O(self^prec)` for the given coefficients `c_0, ..., c_(prec-1)`.
    /// `self` has to be `o(1)`.
    fn power_series(&self, coefficients: &[Expr]) -> Result<Expansion, AsymptoticError> {
        let ring = &self.ring;
        if self.is_zero() {
            return match coefficients.first() {
                Some(c) => ring.constant(c.clone()),
                None => Ok(ring.zero()),
            };
        }
        let prec = BigRational::from_integer(BigInt::from(coefficients.len()));
        let error = self.largest_growth().pow(&prec);
        let mut result = ring.o_term(error.clone())?;
        let mut power = ring.one();
        for (j, c) in coefficients.iter().enumerate() {
            if j > 0 {
                power = (&power * self)?;
                power
                    .summands
                    .retain(|entry| !(entry.range.0 <= error && entry.range.1 <= error));
            }
            result = (&result + &power.scale(c)?)?;
        }
        Ok(result)
    }

    /// `1/self`: a single exact term is inverted exactly, otherwise a geometric series around
    /// the leading exact term.
    ///
    /// # Errors
    /// `NotInvertible` if the leading summand is not exact or does not dominate the rest.
    pub fn invert(&self) -> Result<Expansion, AsymptoticError> {
        if self.is_zero() {
            return Err(SymbolicError::DivisionByZero.into());
        }
        if let Some(Term::Exact(term)) = self.single_term() {
            return self.ring.from_terms([term.inverse()?.into()]);
        }
        let (leading, r) = self
            .split_leading()?
            .ok_or_else(|| AsymptoticError::NotInvertible(self.to_string()))?;
        let leading_inverse = self.ring.from_terms([leading.inverse()?.into()])?;
        let coefficients = vec![Expr::one(); self.ring.default_prec()];
        let series = (-&r)?.power_series(&coefficients)?;
        &leading_inverse * &series
    }

    pub fn pow_int(&self, exp: u32) -> Result<Expansion, AsymptoticError> {
        let mut result = self.ring.one();
        let mut square = self.clone();
        let mut remaining = exp;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = (&result * &square)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                square = (&square * &square)?;
            }
        }
        Ok(result)
    }

    /// `self^exp`; non-integer powers of sums use the binomial series around the leading term.
    pub fn pow_rational(&self, exp: &BigRational) -> Result<Expansion, AsymptoticError> {
        if exp.is_integer() {
            let magnitude = exp
                .to_integer()
                .abs()
                .to_u32()
                .ok_or_else(|| AsymptoticError::Unsupported(format!("exponent {}", exp)))?;
            let power = self.pow_int(magnitude)?;
            return if exp.is_negative() {
                power.invert()
            } else {
                Ok(power)
            };
        }
        if let Some(Term::Exact(term)) = self.single_term() {
            return self.ring.from_terms([term.pow_rational(exp)?.into()]);
        }
        let (leading, r) = self.split_leading()?.ok_or_else(|| {
            AsymptoticError::Unsupported(format!("({})^({})", self, exp))
        })?;
        let mut binomial = BigRational::one();
        let mut coefficients = Vec::with_capacity(self.ring.default_prec());
        for j in 0..self.ring.default_prec() {
            coefficients.push(Expr::Const(binomial.clone()));
            let j = BigRational::from_integer(BigInt::from(j));
            binomial = binomial * (exp - &j) / (j + BigRational::one());
        }
        let leading_power = self.ring.from_terms([leading.pow_rational(exp)?.into()])?;
        &leading_power * &r.power_series(&coefficients)?
    }

    /// `f(self)` for `self = c + o(1)`: the Taylor series of `f` at `c` in the small part.
    pub fn apply_function(&self, function: Function) -> Result<Expansion, AsymptoticError> {
        let constant = self
            .terms()
            .find(|term| term.is_exact() && term.growth().is_one())
            .and_then(|term| term.coefficient().cloned())
            .unwrap_or_else(Expr::zero);
        let small = (self - &self.ring.constant(constant.clone())?)?;
        if !small.is_little_o_of_one() {
            return Err(AsymptoticError::NotTendingToZero(small.to_string()));
        }
        if function == Function::Log && constant.is_zero() {
            return Err(AsymptoticError::Unsupported(format!("log({})", self)));
        }
        let z = fresh_symbol(&constant);
        let mut derivative = function.apply_expr(Expr::var(&z));
        let mut factorial = BigRational::one();
        let mut coefficients = Vec::with_capacity(self.ring.default_prec());
        for j in 0..self.ring.default_prec() {
            if j > 0 {
                factorial *= BigRational::from_integer(BigInt::from(j));
                derivative = derivative.diff(&z).simplify()?;
            }
            let value = derivative.substitute_variable(&z, &constant);
            coefficients.push((value / Expr::Const(factorial.clone())).simplify()?);
        }
        small.power_series(&coefficients)
    }

    pub fn exp(&self) -> Result<Expansion, AsymptoticError> {
        self.apply_function(Function::Exp)
    }

    pub fn ln(&self) -> Result<Expansion, AsymptoticError> {
        self.apply_function(Function::Log)
    }

    /// `|self|`. For sums the sign of the leading exact coefficient has to be known.
    pub fn abs(&self) -> Result<Expansion, AsymptoticError> {
        match self.single_term() {
            None if self.is_zero() => return Ok(self.clone()),
            Some(Term::Exact(term)) => {
                let coefficient = term.coefficient().cloned().unwrap_or_else(Expr::one);
                let assumptions = self.positivity_for(&coefficient);
                let magnitude = coefficient.abs().simplify_with(&assumptions)?;
                return self.ring.exact_term(magnitude, term.growth().clone());
            }
            Some(_) => return Ok(self.clone()),
            None => {}
        }
        let sign = match self.split_leading()? {
            Some((leading, _)) => {
                let coefficient = leading.coefficient().cloned().unwrap_or_else(Expr::one);
                coefficient_sign(&coefficient, &self.positivity_for(&coefficient))?
            }
            None => None,
        };
        match sign {
            Some(true) => Ok(self.clone()),
            Some(false) => -self,
            None => Err(AsymptoticError::Unsupported(format!("abs({})", self))),
        }
    }

    fn positivity_for(&self, coefficient: &Expr) -> Assumptions {
        match self.ring.bounds() {
            Some(bounds) if bounds.is_mentioned_in(coefficient) => bounds.positivity(),
            _ => Assumptions::none(),
        }
    }

    /// Value of an exact expansion with the given variables replaced by numbers.
    ///
    /// # Errors
    /// `Unsupported` if the expansion contains an O-term or a B-term.
    pub fn subs(&self, values: &BTreeMap<String, BigRational>) -> Result<Expr, AsymptoticError> {
        let mut total = Expr::zero();
        for term in self.terms() {
            let Term::Exact(exact) = term else {
                return Err(AsymptoticError::Unsupported(format!(
                    "cannot substitute numbers into {}",
                    term
                )));
            };
            let mut coefficient = exact.coefficient().cloned().unwrap_or_else(Expr::one);
            for (var, value) in values {
                coefficient = coefficient.set_variable(var, value.clone());
            }
            total = total + coefficient * exact.growth().evaluate_at(values)?;
        }
        Ok(total.simplify()?)
    }

    /// Applies `f` to the coefficient of every exact term and B-term.
    pub fn map_coefficients<F>(&self, f: F) -> Result<Expansion, AsymptoticError>
    where
        F: Fn(&Expr) -> Expr,
    {
        let mut terms = Vec::with_capacity(self.len());
        for term in self.terms() {
            let mapped: Term = match term {
                Term::Exact(exact) => {
                    let coefficient = exact.coefficient().map(&f).unwrap_or_else(Expr::one);
                    ExactTerm::new(exact.growth().clone(), coefficient)?.into()
                }
                Term::B(b) => {
                    let coefficient = b.coefficient().map(&f).unwrap_or_else(Expr::one);
                    BTerm::new(&self.ring, b.growth().clone(), &coefficient, b.valid_from().clone())?
                        .into()
                }
                Term::O(_) => term.clone(),
            };
            terms.push(mapped);
        }
        self.ring.from_terms(terms)
    }
}

/// `Some(true)` for a positive, `Some(false)` for a negative coefficient.
fn coefficient_sign(
    coefficient: &Expr,
    assumptions: &Assumptions,
) -> Result<Option<bool>, AsymptoticError> {
    let coefficient = coefficient.simplify_with(assumptions)?;
    let magnitude = coefficient.clone().abs().simplify_with(assumptions)?;
    if magnitude == coefficient {
        return Ok(Some(true));
    }
    if magnitude == (-coefficient).simplify_with(assumptions)? {
        return Ok(Some(false));
    }
    Ok(None)
}

/// a variable name not used in `expr`
fn fresh_symbol(expr: &Expr) -> String {
    let used = expr.variables();
    (0..)
        .map(|i| if i == 0 { "z".to_string() } else { format!("z{}", i) })
        .find(|name| !used.contains(name))
        .unwrap_or_else(|| "z".to_string())
}

//___________________________________OPERATORS____________________________________

impl<'a> Add<&'a Expansion> for &'a Expansion {
    type Output = Result<Expansion, AsymptoticError>;

    fn add(self, rhs: &'a Expansion) -> Self::Output {
        self.ring.check_ring(rhs)?;
        let mut summands = self.summands.clone();
        for term in rhs.terms() {
            summands.insert(term.clone(), &self.ring)?;
        }
        Ok(Expansion::from_poset(self.ring.clone(), summands))
    }
}

impl<'a> Neg for &'a Expansion {
    type Output = Result<Expansion, AsymptoticError>;

    fn neg(self) -> Self::Output {
        let mut terms = Vec::with_capacity(self.len());
        for term in self.terms() {
            terms.push(term.neg()?);
        }
        self.ring.from_terms(terms)
    }
}

impl<'a> Sub<&'a Expansion> for &'a Expansion {
    type Output = Result<Expansion, AsymptoticError>;

    fn sub(self, rhs: &'a Expansion) -> Self::Output {
        self + &(-rhs)?
    }
}

impl<'a> Mul<&'a Expansion> for &'a Expansion {
    type Output = Result<Expansion, AsymptoticError>;

    fn mul(self, rhs: &'a Expansion) -> Self::Output {
        self.ring.check_ring(rhs)?;
        let mut summands = SummandPoset::new();
        for a in self.terms() {
            for b in rhs.terms() {
                summands.insert(a.mul(b, &self.ring)?, &self.ring)?;
            }
        }
        Ok(Expansion::from_poset(self.ring.clone(), summands))
    }
}

impl<'a> Div<&'a Expansion> for &'a Expansion {
    type Output = Result<Expansion, AsymptoticError>;

    fn div(self, rhs: &'a Expansion) -> Self::Output {
        self.ring.check_ring(rhs)?;
        self * &rhs.invert()?
    }
}

impl fmt::Display for Expansion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (i, term) in self.terms().enumerate() {
            let text = term.to_string();
            match (i, text.strip_prefix('-')) {
                (0, _) => write!(f, "{}", text)?,
                (_, Some(rest)) => write!(f, " - {}", rest)?,
                (_, None) => write!(f, " + {}", text)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asymptotic::ring::RingOptions;

    fn ring(prec: usize) -> AsymptoticRing {
        AsymptoticRing::new("n^QQ", RingOptions::default().with_default_prec(prec)).unwrap()
    }

    #[test]
    fn test_arithmetic_and_display() {
        let ring = ring(5);
        let n = ring.generator();
        let x = ring.parse("n^2 - 3*n + 1/2").unwrap();
        assert_eq!(x.to_string(), "n^2 - 3*n + 1/2");
        let y = (&x - &(&n * &n).unwrap()).unwrap();
        assert_eq!(y.to_string(), "-3*n + 1/2");
        assert!((&y - &y).unwrap().is_zero());
        assert_eq!(ring.zero().to_string(), "0");
    }

    #[test]
    fn test_o_terms_absorb() {
        let ring = ring(5);
        let x = ring.parse("n + 7").unwrap();
        let error = ring.o_term(Growth::monomial("n", BigRational::one())).unwrap();
        let sum = (&x + &error).unwrap();
        assert_eq!(sum.to_string(), "O(n)");
        let product = (&ring.generator() * &error).unwrap();
        assert_eq!(product.to_string(), "O(n^2)");
    }

    #[test]
    fn test_invert_geometric_series() {
        let ring = ring(3);
        let x = ring.parse("n - 1").unwrap();
        assert_eq!(x.invert().unwrap().to_string(), "n^(-1) + n^(-2) + n^(-3) + O(n^(-4))");
        let single = ring.parse("2*n^2").unwrap();
        assert_eq!(single.invert().unwrap().to_string(), "1/2*n^(-2)");
        assert_eq!(
            ring.zero().invert(),
            Err(AsymptoticError::Symbolic(SymbolicError::DivisionByZero))
        );
        let growing = ring.parse("1 + n").unwrap();
        assert!(growing.invert().is_ok());
    }

    #[test]
    fn test_powers() {
        let ring = ring(3);
        let x = ring.parse("n + 1").unwrap();
        assert_eq!(x.pow_int(2).unwrap().to_string(), "n^2 + 2*n + 1");
        assert!(x.pow_int(0).unwrap() == ring.one());
        let root = x
            .pow_rational(&BigRational::new(BigInt::from(1), BigInt::from(2)))
            .unwrap();
        assert_eq!(root.to_string(), "n^(1/2) + 1/2*n^(-1/2) - 1/8*n^(-3/2) + O(n^(-5/2))");
    }

    #[test]
    fn test_elementary_functions() {
        let ring = ring(3);
        let x = ring.parse("exp(1/n)").unwrap();
        assert_eq!(x.to_string(), "1 + n^(-1) + 1/2*n^(-2) + O(n^(-3))");
        let y = ring.parse("log(1 + 1/n)").unwrap();
        assert_eq!(y.to_string(), "n^(-1) - 1/2*n^(-2) + O(n^(-3))");
        assert!(matches!(
            ring.parse("exp(n)"),
            Err(AsymptoticError::NotTendingToZero(_))
        ));
    }

    #[test]
    fn test_abs_and_subs() {
        let ring = ring(3);
        let x = ring.parse("-n + 5").unwrap();
        assert_eq!(x.abs().unwrap().to_string(), "n - 5");
        let values = BTreeMap::from([("n".to_string(), BigRational::from_integer(BigInt::from(10)))]);
        assert_eq!(x.subs(&values).unwrap(), Expr::from(-5));
        let with_error = (&x + &ring.o_term(Growth::one()).unwrap()).unwrap();
        assert!(with_error.subs(&values).is_err());
    }

    #[test]
    fn test_generator() {
        let ring = AsymptoticRing::new("k^QQ * m^QQ", RingOptions::default()).unwrap();
        let names: Vec<_> = ring
            .gens()
            .iter()
            .map(|g| g.as_generator().map(String::from))
            .collect();
        assert_eq!(names, [Some("k".to_string()), Some("m".to_string())]);
        assert_eq!(ring.one().as_generator(), None);
    }
}
