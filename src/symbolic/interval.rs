//! Closed real intervals with outward rounding.
//!
//! Every operation returns an interval that contains all results of the operation applied to
//! points of the operands. Endpoints are pushed one ulp outwards after each correctly rounded
//! floating point operation and `LIBM_ULPS` ulps after calls into `exp`, `ln`, `powf`, `sin`
//! and `cos`, whose results are only faithful. Integer powers are built from outward rounded
//! products. An operation without a
//! finite enclosure (division by an interval containing 0, `ln` of an interval reaching 0)
//! returns an interval with infinite endpoints; `is_bounded` detects that.
use std::f64::consts::PI;
use std::fmt;

use num::{BigRational, ToPrimitive};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    lo: f64,
    hi: f64,
}

fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

/// widening applied to results of elementary functions
const LIBM_ULPS: u32 = 2;

impl Interval {
    /// `[lo, hi]`, widened by one ulp on each side
    pub fn new(lo: f64, hi: f64) -> Self {
        Self::outward(lo.min(hi), lo.max(hi))
    }

    /// `[lo, hi]` exactly as given
    pub fn exact(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn point(value: f64) -> Self {
        Self::exact(value, value)
    }

    /// the whole real line
    pub fn entire() -> Self {
        Self::exact(f64::NEG_INFINITY, f64::INFINITY)
    }

    fn outward(lo: f64, hi: f64) -> Self {
        Self::widened(lo, hi, 1)
    }

    fn widened(lo: f64, hi: f64, ulps: u32) -> Self {
        if lo.is_nan() || hi.is_nan() {
            return Self::entire();
        }
        let (mut lo, mut hi) = (lo, hi);
        for _ in 0..ulps {
            lo = next_down(lo);
            hi = next_up(hi);
        }
        Self { lo, hi }
    }

    /// Enclosure of an exact rational.
    pub fn from_rational(value: &BigRational) -> Self {
        match value.to_f64() {
            Some(x) if x.is_finite() => Self::outward(x, x),
            _ => Self::entire(),
        }
    }

    pub fn lower(&self) -> f64 {
        self.lo
    }

    pub fn upper(&self) -> f64 {
        self.hi
    }

    /// supremum of the interval
    pub fn sup(&self) -> f64 {
        self.hi
    }

    pub fn is_bounded(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    pub fn add(&self, other: &Self) -> Self {
        Self::outward(self.lo + other.lo, self.hi + other.hi)
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self::outward(self.lo - other.hi, self.hi - other.lo)
    }

    pub fn neg(&self) -> Self {
        Self::exact(-self.hi, -self.lo)
    }

    pub fn mul(&self, other: &Self) -> Self {
        // For multiplication, we need to consider all corner products
        let corners = [
            self.lo * other.lo,
            self.lo * other.hi,
            self.hi * other.lo,
            self.hi * other.hi,
        ];
        if corners.iter().any(|c| c.is_nan()) {
            return Self::entire();
        }
        let min = corners.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = corners.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Self::outward(min, max)
    }

    pub fn recip(&self) -> Self {
        if self.contains(0.0) {
            return Self::entire();
        }
        Self::outward(1.0 / self.hi, 1.0 / self.lo)
    }

    pub fn div(&self, other: &Self) -> Self {
        self.mul(&other.recip())
    }

    pub fn abs(&self) -> Self {
        if self.lo >= 0.0 {
            *self
        } else if self.hi <= 0.0 {
            self.neg()
        } else {
            Self::exact(0.0, (-self.lo).max(self.hi))
        }
    }

    pub fn powi(&self, exp: i32) -> Self {
        if exp < 0 {
            return self.powu(exp.unsigned_abs()).recip();
        }
        self.powu(exp.unsigned_abs())
    }

    fn powu(&self, exp: u32) -> Self {
        if exp == 0 {
            return Self::point(1.0);
        }
        if exp % 2 == 1 {
            return Self::exact(
                Self::point_power(self.lo, exp).lo,
                Self::point_power(self.hi, exp).hi,
            );
        }
        let base = self.abs();
        Self::exact(
            Self::point_power(base.lo, exp).lo.max(0.0),
            Self::point_power(base.hi, exp).hi,
        )
    }

    /// `x^exp` by repeated squaring
    fn point_power(x: f64, exp: u32) -> Self {
        let mut result = Self::point(1.0);
        let mut square = Self::point(x);
        let mut exp = exp;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.mul(&square);
            }
            exp >>= 1;
            if exp > 0 {
                square = square.mul(&square);
            }
        }
        result
    }

    /// `self^exp` for a real exponent; the base is restricted to its nonnegative part
    pub fn powf(&self, exp: f64) -> Self {
        self.powf_between(exp, exp)
    }

    /// `self^e` for every `e` in `[exp_lo, exp_hi]`, e.g. a rounded rational exponent
    pub fn powf_between(&self, exp_lo: f64, exp_hi: f64) -> Self {
        if self.hi < 0.0 || exp_lo.is_nan() || exp_hi.is_nan() {
            return Self::entire();
        }
        let lo = self.lo.max(0.0);
        // x^e is monotone in x and in e separately, so the extremes sit at the corners
        let corners = [
            lo.powf(exp_lo),
            lo.powf(exp_hi),
            self.hi.powf(exp_lo),
            self.hi.powf(exp_hi),
        ];
        if corners.iter().any(|c| c.is_nan()) {
            return Self::entire();
        }
        let min = corners.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = corners.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Self::widened(min, max, LIBM_ULPS).clamp_below(0.0)
    }

    pub fn sqrt(&self) -> Self {
        self.powf(0.5)
    }

    pub fn exp(&self) -> Self {
        Self::widened(self.lo.exp(), self.hi.exp(), LIBM_ULPS).clamp_below(0.0)
    }

    pub fn ln(&self) -> Self {
        if self.hi <= 0.0 {
            return Self::entire();
        }
        let lo = if self.lo <= 0.0 {
            f64::NEG_INFINITY
        } else {
            self.lo.ln()
        };
        Self::widened(lo, self.hi.ln(), LIBM_ULPS)
    }

    pub fn sin(&self) -> Self {
        self.periodic(|x| x.sin(), PI / 2.0, -PI / 2.0)
    }

    pub fn cos(&self) -> Self {
        self.periodic(|x| x.cos(), 0.0, PI)
    }

    /// sin/cos style enclosure with a maximum at `peak + 2πm` and a minimum at `trough + 2πm`
    fn periodic<F>(&self, f: F, peak: f64, trough: f64) -> Self
    where
        F: Fn(f64) -> f64,
    {
        if !self.is_bounded() || self.hi - self.lo >= 2.0 * PI {
            return Self::exact(-1.0, 1.0);
        }
        let a = f(self.lo);
        let b = f(self.hi);
        let hits = |point: f64| {
            let m = ((self.lo - point) / (2.0 * PI)).ceil();
            point + 2.0 * PI * m <= self.hi
        };
        let hi = if hits(peak) { 1.0 } else { a.max(b) };
        let lo = if hits(trough) { -1.0 } else { a.min(b) };
        let widened = Self::widened(lo, hi, LIBM_ULPS);
        Self::exact(widened.lo.max(-1.0), widened.hi.min(1.0))
    }

    /// lower endpoint never below `bound`
    fn clamp_below(self, bound: f64) -> Self {
        Self::exact(self.lo.max(bound), self.hi)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}
