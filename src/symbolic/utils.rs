// the collection of utility functions for exact rational arithmetic
use num::{BigInt, BigRational, One, Signed, ToPrimitive, Zero};

/// `base^exp` for an integer exponent, `None` if the exponent does not fit a machine word
/// or the base is zero with a negative exponent.
pub fn checked_powi(base: &BigRational, exp: &BigInt) -> Option<BigRational> {
    let magnitude = exp.abs().to_u32()?;
    if base.is_zero() && exp.is_negative() {
        return None;
    }
    let mut result = BigRational::one();
    let mut square = base.clone();
    let mut remaining = magnitude;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result *= &square;
        }
        square = &square * &square;
        remaining >>= 1;
    }
    if exp.is_negative() {
        result = result.recip();
    }
    Some(result)
}

/// Rounds `value` up to `digits` decimal places.
pub fn ceil_to_digits(value: &BigRational, digits: u32) -> BigRational {
    let scale = BigRational::from_integer(BigInt::from(10u32).pow(digits));
    (value * &scale).ceil() / scale
}

/// Parses a decimal literal like `12`, `0.25` into an exact rational.
pub fn decimal_to_rational(literal: &str) -> Option<BigRational> {
    match literal.split_once('.') {
        None => literal.parse::<BigInt>().ok().map(BigRational::from_integer),
        Some((whole, fraction)) => {
            let digits = format!("{}{}", whole, fraction);
            let numer = digits.parse::<BigInt>().ok()?;
            let denom = BigInt::from(10u32).pow(fraction.len() as u32);
            Some(BigRational::new(numer, denom))
        }
    }
}

/// Exact rational for a finite float; `None` for infinities and NaN.
pub fn rational_from_f64(value: f64) -> Option<BigRational> {
    BigRational::from_float(value)
}

/// ceil of a float as an exact integer rational
pub fn ceil_f64(value: f64) -> Option<BigRational> {
    rational_from_f64(value).map(|r| r.ceil())
}
