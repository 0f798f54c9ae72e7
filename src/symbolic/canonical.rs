//! Canonical expanded normal form used by `Expr::simplify`.
//!
//! An expression is a `Poly`: a map from `Monomial` to a nonzero rational coefficient. A
//! monomial is a map from `Atom` to a nonzero rational exponent. Atoms are the pieces that
//! cannot be multiplied out any further: variables, integer radicals such as `10^(1/2)`,
//! `abs(..)`, elementary functions and "opaque" powers of sums like `(1 - z)^(-4)`.
//!
//! Invariants kept by every constructor:
//! - positive integer powers of sums are expanded;
//! - a radical `b^e` has `0 < e < 1`, the integer part is folded into the coefficient;
//! - an opaque sum raised to a negative integer power is scaled to leading coefficient 1;
//! - `abs(p)^m` with even `m` is replaced by `p^m`.
//!
//! Two expressions with the same canonical form convert back to the same `Expr`.
use std::collections::BTreeMap;

use itertools::Itertools;
use num::{BigInt, BigRational, Integer, One, Signed, ToPrimitive, Zero};

use crate::symbolic::symbolic_engine::{Expr, SymbolicError};
use crate::symbolic::symbolic_simplify::Assumptions;
use crate::symbolic::utils::checked_powi;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum FuncKind {
    Exp,
    Ln,
    Sin,
    Cos,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Atom {
    Var(String),
    /// integer base > 1
    Radical(BigInt),
    Abs(Poly),
    Func(FuncKind, Poly),
    Opaque(Poly),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Monomial(BTreeMap<Atom, BigRational>);

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Poly(BTreeMap<Monomial, BigRational>);

fn is_even_integer(exp: &BigRational) -> bool {
    exp.is_integer() && exp.to_integer().is_even()
}

impl Atom {
    /// the atom itself is known to be >= 0
    fn is_nonnegative(&self, ctx: &Assumptions) -> bool {
        match self {
            Atom::Var(name) => ctx.is_positive(name),
            Atom::Radical(_) | Atom::Abs(_) => true,
            Atom::Func(FuncKind::Exp, _) => true,
            Atom::Func(..) => false,
            Atom::Opaque(p) => p.is_nonnegative(ctx),
        }
    }

    /// `self^exp` is known to be >= 0
    fn power_is_nonnegative(&self, exp: &BigRational, ctx: &Assumptions) -> bool {
        self.is_nonnegative(ctx)
            || exp.numer().is_even()
            || exp.denom().is_even()
    }

    fn to_expr(&self) -> Expr {
        match self {
            Atom::Var(name) => Expr::Var(name.clone()),
            Atom::Radical(base) => Expr::from(base.clone()),
            Atom::Abs(p) => Expr::Abs(p.to_expr().boxed()),
            Atom::Func(kind, p) => {
                let arg = p.to_expr().boxed();
                match kind {
                    FuncKind::Exp => Expr::Exp(arg),
                    FuncKind::Ln => Expr::Ln(arg),
                    FuncKind::Sin => Expr::sin(arg),
                    FuncKind::Cos => Expr::cos(arg),
                }
            }
            Atom::Opaque(p) => p.to_expr(),
        }
    }
}

impl Monomial {
    fn one() -> Monomial {
        Monomial(BTreeMap::new())
    }

    fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds the product of `factors`, folding radicals and expanding what has to be expanded.
    fn normalize<I>(factors: I) -> Poly
    where
        I: IntoIterator<Item = (Atom, BigRational)>,
    {
        let mut coefficient = BigRational::one();
        let mut kept = BTreeMap::new();
        let mut expanded = Vec::new();
        for (atom, exp) in factors {
            if exp.is_zero() {
                continue;
            }
            match atom {
                Atom::Radical(base) => {
                    let whole = exp.floor();
                    let fraction = &exp - &whole;
                    match checked_powi(&BigRational::from_integer(base.clone()), &whole.to_integer())
                    {
                        Some(factor) => {
                            coefficient *= factor;
                            if !fraction.is_zero() {
                                kept.insert(Atom::Radical(base), fraction);
                            }
                        }
                        None => {
                            kept.insert(Atom::Radical(base), exp);
                        }
                    }
                }
                Atom::Opaque(p) if exp.is_integer() && exp.is_positive() => {
                    expanded.push((p, exp.to_integer()));
                }
                Atom::Abs(p) if is_even_integer(&exp) && exp.is_positive() => {
                    expanded.push((p, exp.to_integer()));
                }
                atom => {
                    kept.insert(atom, exp);
                }
            }
        }
        let mut result = Poly::from_monomial(Monomial(kept), coefficient);
        for (p, exp) in expanded {
            match exp.to_u32() {
                Some(n) => result = result.mul(&p.pow_nat(n)),
                None => {
                    let opaque = Poly::from_monomial(
                        Monomial([(Atom::Opaque(p), BigRational::from_integer(exp))].into()),
                        BigRational::one(),
                    );
                    result = result.mul(&opaque);
                }
            }
        }
        result
    }

    fn mul(&self, other: &Monomial) -> Poly {
        let mut factors = self.0.clone();
        for (atom, exp) in &other.0 {
            *factors.entry(atom.clone()).or_insert_with(BigRational::zero) += exp;
        }
        Monomial::normalize(factors)
    }

    fn is_nonnegative(&self, ctx: &Assumptions) -> bool {
        self.0
            .iter()
            .all(|(atom, exp)| atom.power_is_nonnegative(exp, ctx))
    }

    /// sum of the exponents of plain variables, used to order summands for printing
    fn degree(&self) -> BigRational {
        self.0
            .iter()
            .filter(|(atom, _)| matches!(atom, Atom::Var(_)))
            .map(|(_, exp)| exp.clone())
            .fold(BigRational::zero(), |acc, exp| acc + exp)
    }

    fn exponent_of(&self, var: &str) -> BigRational {
        self.0
            .get(&Atom::Var(var.to_string()))
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    fn without(&self, var: &str) -> Monomial {
        let mut factors = self.0.clone();
        factors.remove(&Atom::Var(var.to_string()));
        Monomial(factors)
    }

    fn to_expr(&self, coefficient: &BigRational) -> Expr {
        let mut factors = self.0.iter().map(|(atom, exp)| {
            let base = atom.to_expr();
            if exp.is_one() {
                base
            } else {
                base.pow_rational(exp.clone())
            }
        });
        let Some(first) = factors.next() else {
            return Expr::Const(coefficient.clone());
        };
        if coefficient.is_one() {
            factors.fold(first, |acc, factor| acc * factor)
        } else if *coefficient == -BigRational::one() {
            -factors.fold(first, |acc, factor| acc * factor)
        } else {
            let scaled = Expr::Const(coefficient.clone()) * first;
            factors.fold(scaled, |acc, factor| acc * factor)
        }
    }
}

impl Poly {
    pub(crate) fn zero() -> Poly {
        Poly(BTreeMap::new())
    }

    pub(crate) fn one() -> Poly {
        Poly::constant(BigRational::one())
    }

    pub(crate) fn constant(value: BigRational) -> Poly {
        Poly::from_monomial(Monomial::one(), value)
    }

    fn from_monomial(monomial: Monomial, coefficient: BigRational) -> Poly {
        let mut terms = BTreeMap::new();
        if !coefficient.is_zero() {
            terms.insert(monomial, coefficient);
        }
        Poly(terms)
    }

    fn from_atom(atom: Atom, exp: BigRational) -> Poly {
        Monomial::normalize([(atom, exp)])
    }

    pub(crate) fn variable(name: &str) -> Poly {
        Poly::from_atom(Atom::Var(name.to_string()), BigRational::one())
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// value of a polynomial without atoms
    pub(crate) fn as_constant(&self) -> Option<BigRational> {
        match self.0.len() {
            0 => Some(BigRational::zero()),
            1 => self
                .0
                .iter()
                .next()
                .filter(|(m, _)| m.is_one())
                .map(|(_, c)| c.clone()),
            _ => None,
        }
    }

    fn single_term(&self) -> Option<(&Monomial, &BigRational)> {
        if self.0.len() == 1 {
            self.0.iter().next()
        } else {
            None
        }
    }

    fn leading_coefficient(&self) -> BigRational {
        self.0
            .values()
            .next()
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    pub(crate) fn num_terms(&self) -> usize {
        self.0.len()
    }

    /// the summands of the polynomial, each as its own polynomial
    pub(crate) fn terms(&self) -> Vec<Poly> {
        self.ordered_terms()
            .map(|(m, c)| Poly::from_monomial(m.clone(), c.clone()))
            .collect()
    }

    fn ordered_terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.0.iter().sorted_by(|(a, _), (b, _)| {
            b.degree()
                .cmp(&a.degree())
                .then_with(|| b.cmp(a))
        })
    }

    fn add_scaled(&mut self, other: &Poly, scale: &BigRational) {
        for (monomial, coefficient) in &other.0 {
            let entry = self
                .0
                .entry(monomial.clone())
                .or_insert_with(BigRational::zero);
            *entry += coefficient * scale;
            if entry.is_zero() {
                self.0.remove(monomial);
            }
        }
    }

    pub(crate) fn add(&self, other: &Poly) -> Poly {
        let mut result = self.clone();
        result.add_scaled(other, &BigRational::one());
        result
    }

    pub(crate) fn neg(&self) -> Poly {
        self.scale(&-BigRational::one())
    }

    pub(crate) fn scale(&self, factor: &BigRational) -> Poly {
        if factor.is_zero() {
            return Poly::zero();
        }
        Poly(
            self.0
                .iter()
                .map(|(m, c)| (m.clone(), c * factor))
                .collect(),
        )
    }

    pub(crate) fn mul(&self, other: &Poly) -> Poly {
        if let Some(product) = self.cancel_into(other).or_else(|| other.cancel_into(self)) {
            return product;
        }
        let mut result = Poly::zero();
        for (m1, c1) in &self.0 {
            for (m2, c2) in &other.0 {
                result.add_scaled(&m1.mul(m2), &(c1 * c2));
            }
        }
        result
    }

    /// `self * other` when every summand of `other` carries `self^(-m)`
    fn cancel_into(&self, other: &Poly) -> Option<Poly> {
        if self.0.len() < 2 || other.is_zero() {
            return None;
        }
        let scale = self.leading_coefficient();
        let base = Atom::Opaque(self.scale(&scale.recip()));
        let divisible = other.0.keys().all(|m| {
            m.0.get(&base)
                .is_some_and(|exp| exp.is_integer() && exp.is_negative())
        });
        if !divisible {
            return None;
        }
        let mut result = Poly::zero();
        for (monomial, coefficient) in &other.0 {
            let mut factors = monomial.0.clone();
            if let Some(exp) = factors.get_mut(&base) {
                *exp += BigRational::one();
            }
            result.add_scaled(&Monomial::normalize(factors), &(coefficient * &scale));
        }
        Some(result)
    }

    fn pow_nat(&self, exp: u32) -> Poly {
        let mut result = Poly::one();
        let mut square = self.clone();
        let mut remaining = exp;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.mul(&square);
            }
            remaining >>= 1;
            if remaining > 0 {
                square = square.mul(&square);
            }
        }
        result
    }

    pub(crate) fn invert(&self) -> Result<Poly, SymbolicError> {
        if self.is_zero() {
            return Err(SymbolicError::DivisionByZero);
        }
        if let Some((monomial, coefficient)) = self.single_term() {
            let factors = monomial.0.iter().map(|(atom, exp)| (atom.clone(), -exp));
            return Ok(Monomial::normalize(factors).scale(&coefficient.recip()));
        }
        let scale = self.leading_coefficient().recip();
        let normalized = self.scale(&scale);
        Ok(Poly::from_atom(Atom::Opaque(normalized), -BigRational::one()).scale(&scale))
    }

    /// `self^exp`; fractional powers are only pushed into factors known to be nonnegative
    pub(crate) fn pow(&self, exp: &BigRational, ctx: &Assumptions) -> Result<Poly, SymbolicError> {
        if exp.is_zero() {
            return Ok(Poly::one());
        }
        if exp.is_integer() {
            let n = exp.to_integer();
            let magnitude = n
                .abs()
                .to_u32()
                .ok_or_else(|| SymbolicError::Unsupported(format!("exponent {} is too large", n)))?;
            let base = if n.is_negative() {
                self.invert()?
            } else {
                self.clone()
            };
            return Ok(base.pow_nat(magnitude));
        }
        if self.is_zero() {
            return if exp.is_positive() {
                Ok(Poly::zero())
            } else {
                Err(SymbolicError::DivisionByZero)
            };
        }
        if let Some((monomial, coefficient)) = self.single_term() {
            let atoms_nonnegative = monomial.0.keys().all(|atom| atom.is_nonnegative(ctx));
            if coefficient.is_positive() && atoms_nonnegative {
                let factors = monomial
                    .0
                    .iter()
                    .map(|(atom, e)| (atom.clone(), e * exp));
                return Ok(rational_power(coefficient, exp)?.mul(&Monomial::normalize(factors)));
            }
        }
        Ok(Poly::from_atom(Atom::Opaque(self.clone()), exp.clone()))
    }

    /// every summand is known to be >= 0
    fn is_nonnegative(&self, ctx: &Assumptions) -> bool {
        self.0
            .iter()
            .all(|(m, c)| c.is_positive() && m.is_nonnegative(ctx))
    }

    pub(crate) fn abs(&self, ctx: &Assumptions) -> Poly {
        if let Some(value) = self.as_constant() {
            return Poly::constant(value.abs());
        }
        let signs_known = self.0.keys().all(|m| m.is_nonnegative(ctx));
        if signs_known {
            if self.0.values().all(|c| c.is_positive()) {
                return self.clone();
            }
            if self.0.values().all(|c| c.is_negative()) {
                return self.neg();
            }
        }
        if let Some((monomial, coefficient)) = self.single_term() {
            let (known, unknown): (Vec<_>, Vec<_>) = monomial
                .0
                .iter()
                .map(|(atom, exp)| (atom.clone(), exp.clone()))
                .partition(|(atom, exp)| atom.power_is_nonnegative(exp, ctx));
            let inner = Poly::from_monomial(Monomial(unknown.into_iter().collect()), BigRational::one());
            let abs_part = Poly::from_atom(Atom::Abs(inner), BigRational::one());
            return Monomial::normalize(known)
                .scale(&coefficient.abs())
                .mul(&abs_part);
        }
        let inner = if self.leading_coefficient().is_negative() {
            self.neg()
        } else {
            self.clone()
        };
        Poly::from_atom(Atom::Abs(inner), BigRational::one())
    }

    pub(crate) fn apply(kind: FuncKind, arg: Poly) -> Poly {
        match kind {
            FuncKind::Exp if arg.is_zero() => return Poly::one(),
            FuncKind::Sin if arg.is_zero() => return Poly::zero(),
            FuncKind::Cos if arg.is_zero() => return Poly::one(),
            FuncKind::Ln if arg == Poly::one() => return Poly::zero(),
            _ => {}
        }
        // exp(log(x)) = x and log(exp(x)) = x
        let inverse = match kind {
            FuncKind::Exp => Some(FuncKind::Ln),
            FuncKind::Ln => Some(FuncKind::Exp),
            _ => None,
        };
        if let (Some(inverse), Some((monomial, coefficient))) = (inverse, arg.single_term()) {
            if coefficient.is_one() && monomial.0.len() == 1 {
                if let Some((Atom::Func(inner_kind, inner), exp)) = monomial.0.iter().next() {
                    if *inner_kind == inverse && exp.is_one() {
                        return inner.clone();
                    }
                }
            }
        }
        Poly::from_atom(Atom::Func(kind, arg), BigRational::one())
    }

    /// Groups the summands by the exponent of `var`: `[(exponent, coefficient)]`, ascending.
    pub(crate) fn coefficients(&self, var: &str) -> Vec<(BigRational, Poly)> {
        let mut grouped: BTreeMap<BigRational, Poly> = BTreeMap::new();
        for (monomial, coefficient) in &self.0 {
            let part = Poly::from_monomial(monomial.without(var), coefficient.clone());
            grouped
                .entry(monomial.exponent_of(var))
                .or_insert_with(Poly::zero)
                .add_scaled(&part, &BigRational::one());
        }
        grouped.into_iter().filter(|(_, p)| !p.is_zero()).collect()
    }

    pub(crate) fn from_expr(expr: &Expr, ctx: &Assumptions) -> Result<Poly, SymbolicError> {
        let poly = match expr {
            Expr::Var(name) => Poly::variable(name),
            Expr::Const(value) => Poly::constant(value.clone()),
            Expr::Add(lhs, rhs) => Poly::from_expr(lhs, ctx)?.add(&Poly::from_expr(rhs, ctx)?),
            Expr::Sub(lhs, rhs) => Poly::from_expr(lhs, ctx)?.add(&Poly::from_expr(rhs, ctx)?.neg()),
            Expr::Mul(lhs, rhs) => Poly::from_expr(lhs, ctx)?.mul(&Poly::from_expr(rhs, ctx)?),
            Expr::Div(lhs, rhs) => Poly::from_expr(lhs, ctx)?.mul(&Poly::reciprocal(rhs, ctx)?),
            Expr::Pow(base, exp) => {
                let base = Poly::from_expr(base, ctx)?;
                let exp = Poly::from_expr(exp, ctx)?;
                match exp.as_constant() {
                    Some(exp) => base.pow(&exp, ctx)?,
                    // b^e = exp(e*log(b))
                    None => Poly::apply(FuncKind::Exp, exp.mul(&Poly::apply(FuncKind::Ln, base))),
                }
            }
            Expr::Abs(arg) => Poly::from_expr(arg, ctx)?.abs(ctx),
            Expr::Exp(arg) => Poly::apply(FuncKind::Exp, Poly::from_expr(arg, ctx)?),
            Expr::Ln(arg) => {
                let arg = Poly::from_expr(arg, ctx)?;
                if arg.is_zero() {
                    return Err(SymbolicError::Unsupported("log(0)".to_string()));
                }
                Poly::apply(FuncKind::Ln, arg)
            }
            Expr::sin(arg) => Poly::apply(FuncKind::Sin, Poly::from_expr(arg, ctx)?),
            Expr::cos(arg) => Poly::apply(FuncKind::Cos, Poly::from_expr(arg, ctx)?),
        };
        Ok(poly)
    }

    /// `1/expr`, inverting powers and products factor by factor so that `1/(1 - z)^4` and
    /// `(1 - z)^(-4)` share one canonical form
    fn reciprocal(expr: &Expr, ctx: &Assumptions) -> Result<Poly, SymbolicError> {
        match expr {
            Expr::Mul(lhs, rhs) => {
                Ok(Poly::reciprocal(lhs, ctx)?.mul(&Poly::reciprocal(rhs, ctx)?))
            }
            Expr::Pow(base, exp) => {
                let exp = Poly::from_expr(exp, ctx)?;
                match exp.as_constant() {
                    Some(exp) => Poly::from_expr(base, ctx)?.pow(&-exp, ctx),
                    None => Poly::from_expr(expr, ctx)?.invert(),
                }
            }
            _ => Poly::from_expr(expr, ctx)?.invert(),
        }
    }

    pub(crate) fn to_expr(&self) -> Expr {
        let mut result: Option<Expr> = None;
        for (monomial, coefficient) in self.ordered_terms() {
            result = Some(match result {
                None => monomial.to_expr(coefficient),
                Some(acc) if coefficient.is_negative() => acc - monomial.to_expr(&-coefficient),
                Some(acc) => acc + monomial.to_expr(coefficient),
            });
        }
        result.unwrap_or_else(Expr::zero)
    }
}

/// `value^exp` for a positive rational and a fractional exponent; exact roots are taken
fn rational_power(value: &BigRational, exp: &BigRational) -> Result<Poly, SymbolicError> {
    let numer = integer_power(value.numer(), exp)?;
    let denom = integer_power(value.denom(), &-exp)?;
    Ok(numer.mul(&denom))
}

fn integer_power(base: &BigInt, exp: &BigRational) -> Result<Poly, SymbolicError> {
    if base.is_one() {
        return Ok(Poly::one());
    }
    let degree = exp
        .denom()
        .to_u32()
        .ok_or_else(|| SymbolicError::Unsupported(format!("root of degree {}", exp.denom())))?;
    let root = base.nth_root(degree);
    if root.pow(degree) == *base {
        let value = checked_powi(&BigRational::from_integer(root), exp.numer())
            .ok_or_else(|| SymbolicError::Unsupported(format!("exponent {}", exp)))?;
        return Ok(Poly::constant(value));
    }
    Ok(Poly::from_atom(Atom::Radical(base.clone()), exp.clone()))
}

impl PartialEq<BigRational> for Poly {
    fn eq(&self, other: &BigRational) -> bool {
        self.as_constant().as_ref() == Some(other)
    }
}
