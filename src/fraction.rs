//! An exact rational data type: an arbitrary-precision numerator over a positive denominator,
//! always kept in lowest terms.
//!
//! Every [`Fraction`] is created through [`Fraction::reduce`] or one of the constructors built on
//! it, so the canonical form holds for every live value: the denominator is positive, numerator
//! and denominator are coprime, the sign lives on the numerator, and zero is exactly `0/1`.

use approx::{AbsDiffEq, RelativeEq};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{Float, FromPrimitive, Num, One, Signed, ToPrimitive, Zero};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

use crate::parsing;

/// Everything that can go wrong when building or operating on a [`Fraction`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FractionError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("value out of floating-point range")]
    Overflow,
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("invalid literal for a fraction: {0:?}")]
    InvalidFormat(String),
}

/// An exact rational number in canonical form.
///
/// Values are immutable: every operation produces a new `Fraction` (or an integer or float), so a
/// `Fraction` can be shared freely across threads.
#[derive(Clone, PartialEq, Eq)]
pub struct Fraction {
    numerator: BigInt,
    denominator: BigInt,
}

/// Anything exposing an integral numerator and a positive integral denominator. The pair doesn't
/// need to be reduced.
pub trait Rational {
    fn numer(&self) -> BigInt;
    fn denom(&self) -> BigInt;
}

impl Rational for Fraction {
    fn numer(&self) -> BigInt {
        self.numerator.clone()
    }

    fn denom(&self) -> BigInt {
        self.denominator.clone()
    }
}

impl Rational for BigInt {
    fn numer(&self) -> BigInt {
        self.clone()
    }

    fn denom(&self) -> BigInt {
        BigInt::one()
    }
}

macro_rules! integer_conversions {
    ($($int:ty),*) => {$(
        impl Rational for $int {
            fn numer(&self) -> BigInt {
                BigInt::from(*self)
            }

            fn denom(&self) -> BigInt {
                BigInt::one()
            }
        }

        impl From<$int> for Fraction {
            fn from(value: $int) -> Self {
                Self::from_integer(BigInt::from(value))
            }
        }
    )*};
}

integer_conversions!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Fraction {
    /// Creates the canonical fraction `numerator / denominator`.
    pub fn new<N: Into<BigInt>, D: Into<BigInt>>(
        numerator: N,
        denominator: D,
    ) -> Result<Self, FractionError> {
        let denominator = denominator.into();
        if denominator.is_zero() {
            return Err(FractionError::DivisionByZero);
        }
        Ok(Self::reduce(numerator.into(), denominator))
    }

    /// The integer `value` as a fraction over 1.
    pub fn from_integer(value: BigInt) -> Self {
        Self::from_canonical(value, BigInt::one())
    }

    /// Builds a fraction from any [`Rational`] value, reducing it if needed.
    pub fn from_rational<R: Rational + ?Sized>(value: &R) -> Result<Self, FractionError> {
        Self::new(value.numer(), value.denom())
    }

    /// The exact value of a finite float. Every finite binary64 value is a dyadic rational, so
    /// this never rounds.
    pub fn from_f64(value: f64) -> Result<Self, FractionError> {
        if value.is_nan() {
            Err(FractionError::InvalidValue(
                "cannot convert NaN to a fraction".to_owned(),
            ))
        } else if value.is_infinite() {
            Err(FractionError::Overflow)
        } else {
            Ok(Self::from_finite_f64(value))
        }
    }

    /// [`Fraction::from_f64`] without the finiteness checks. `value` must be finite.
    pub(crate) fn from_finite_f64(value: f64) -> Self {
        debug_assert!(value.is_finite());
        let (mantissa, exponent, sign) = Float::integer_decode(value);
        let numerator = BigInt::from(sign) * BigInt::from(mantissa);
        let shift = usize::from(exponent.unsigned_abs());
        if exponent >= 0 {
            Self::from_integer(numerator << shift)
        } else {
            Self::reduce(numerator, BigInt::one() << shift)
        }
    }

    /// Normalizes a raw pair into canonical form. `denominator` must be nonzero.
    pub(crate) fn reduce(numerator: BigInt, denominator: BigInt) -> Self {
        debug_assert!(!denominator.is_zero());
        // gcd(0, d) = |d|, so zero always comes out as 0/1.
        let divisor = numerator.gcd(&denominator);
        let (numerator, denominator) = if divisor.is_one() {
            (numerator, denominator)
        } else {
            (numerator / &divisor, denominator / &divisor)
        };
        if denominator.is_negative() {
            Self::from_canonical(-numerator, -denominator)
        } else {
            Self::from_canonical(numerator, denominator)
        }
    }

    /// Wraps a pair that is already coprime with a positive denominator.
    pub(crate) fn from_canonical(numerator: BigInt, denominator: BigInt) -> Self {
        debug_assert!(denominator.is_positive());
        debug_assert!(numerator.gcd(&denominator).is_one());
        Self {
            numerator,
            denominator,
        }
    }

    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    /// The canonical `(numerator, denominator)` pair. `Fraction::new(n, d)` on the result gives
    /// back an identical value.
    pub fn as_integer_ratio(&self) -> (BigInt, BigInt) {
        (self.numerator.clone(), self.denominator.clone())
    }

    /// Consumes the fraction, returning its canonical pair.
    pub fn into_parts(self) -> (BigInt, BigInt) {
        (self.numerator, self.denominator)
    }

    pub fn is_integer(&self) -> bool {
        self.denominator.is_one()
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<BigInt> for Fraction {
    fn from(value: BigInt) -> Self {
        Self::from_integer(value)
    }
}

impl From<&BigInt> for Fraction {
    fn from(value: &BigInt) -> Self {
        Self::from_integer(value.clone())
    }
}

impl From<BigUint> for Fraction {
    fn from(value: BigUint) -> Self {
        Self::from_integer(BigInt::from(value))
    }
}

impl TryFrom<f64> for Fraction {
    type Error = FractionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

impl From<Fraction> for f64 {
    fn from(value: Fraction) -> Self {
        value.to_f64()
    }
}

impl FromStr for Fraction {
    type Err = FractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parsing::parse_fraction(s)
    }
}

impl Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl std::fmt::Debug for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fraction({}, {})", self.numerator, self.denominator)
    }
}

impl Zero for Fraction {
    fn zero() -> Self {
        Self::from_integer(BigInt::zero())
    }

    fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }
}

impl One for Fraction {
    fn one() -> Self {
        Self::from_integer(BigInt::one())
    }

    fn is_one(&self) -> bool {
        self.numerator.is_one() && self.denominator.is_one()
    }
}

impl Num for Fraction {
    type FromStrRadixErr = FractionError;

    /// Reads `n` or `n/d` with both parts in the given radix. Only the numerator may carry a
    /// sign.
    fn from_str_radix(str: &str, radix: u32) -> Result<Self, Self::FromStrRadixErr> {
        let invalid = || FractionError::InvalidFormat(str.to_owned());
        let int = |part: &str| BigInt::from_str_radix(part, radix).map_err(|_e| invalid());
        match str.split_once('/') {
            Some((_, denominator)) if denominator.starts_with(['+', '-']) => Err(invalid()),
            Some((numerator, denominator)) => Self::new(int(numerator)?, int(denominator)?),
            None => int(str).map(Self::from_integer),
        }
    }
}

impl Signed for Fraction {
    fn abs(&self) -> Self {
        Self::from_canonical(self.numerator.abs(), self.denominator.clone())
    }

    fn abs_sub(&self, other: &Self) -> Self {
        if self <= other {
            Self::zero()
        } else {
            self - other
        }
    }

    fn signum(&self) -> Self {
        Self::from_integer(self.numerator.signum())
    }

    fn is_positive(&self) -> bool {
        self.numerator.is_positive()
    }

    fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }
}

impl FromPrimitive for Fraction {
    fn from_i64(n: i64) -> Option<Self> {
        Some(Self::from(n))
    }

    fn from_u64(n: u64) -> Option<Self> {
        Some(Self::from(n))
    }

    fn from_i128(n: i128) -> Option<Self> {
        Some(Self::from(n))
    }

    fn from_u128(n: u128) -> Option<Self> {
        Some(Self::from(n))
    }

    fn from_f64(n: f64) -> Option<Self> {
        Fraction::from_f64(n).ok()
    }
}

impl ToPrimitive for Fraction {
    fn to_i64(&self) -> Option<i64> {
        self.trunc().to_i64()
    }

    fn to_u64(&self) -> Option<u64> {
        self.trunc().to_u64()
    }

    fn to_i128(&self) -> Option<i128> {
        self.trunc().to_i128()
    }

    fn to_u128(&self) -> Option<u128> {
        self.trunc().to_u128()
    }

    fn to_f64(&self) -> Option<f64> {
        Some(Fraction::to_f64(self))
    }
}

impl AbsDiffEq for Fraction {
    type Epsilon = Self;

    fn default_epsilon() -> Self::Epsilon {
        Self::zero()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        (self - other).abs() <= epsilon
    }
}

impl RelativeEq for Fraction {
    fn default_max_relative() -> Self::Epsilon {
        Self::zero()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        let diff = (self - other).abs();
        if diff <= epsilon {
            return true;
        }
        let largest = std::cmp::max(self.abs(), other.abs());
        diff <= largest * max_relative
    }
}

/// Shorthand for fraction literals: `frac!(3 / 4)` or `frac!(-2)`. Panics on a zero denominator.
#[macro_export]
macro_rules! frac {
    ($num:literal / $denom:expr) => {
        match $crate::fraction::Fraction::new($num, $denom) {
            Ok(f) => f,
            Err(e) => panic!("Invalid fraction {}/{}: {}", $num, $denom, e),
        }
    };
    ($num:expr) => {
        $crate::fraction::Fraction::from($num)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frac;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn parts(f: &Fraction) -> (i64, i64) {
        (f.numerator().to_i64().unwrap(), f.denominator().to_i64().unwrap())
    }

    #[test]
    fn test_reduction() {
        assert_eq!(parts(&Fraction::new(6, 4).unwrap()), (3, 2));
        assert_eq!(parts(&Fraction::new(-6, 4).unwrap()), (-3, 2));
        assert_eq!(parts(&Fraction::new(6, -4).unwrap()), (-3, 2));
        assert_eq!(parts(&Fraction::new(-6, -4).unwrap()), (3, 2));
        assert_eq!(parts(&Fraction::new(0, 5).unwrap()), (0, 1));
        assert_eq!(parts(&Fraction::new(0, -5).unwrap()), (0, 1));
        assert_eq!(parts(&Fraction::new(7, 1).unwrap()), (7, 1));
    }

    #[test]
    fn test_zero_denominator() {
        assert_eq!(Fraction::new(1, 0), Err(FractionError::DivisionByZero));
        assert_eq!(Fraction::new(0, 0), Err(FractionError::DivisionByZero));
    }

    #[test]
    fn test_macro() {
        assert_eq!(frac!(1 / 2), Fraction::new(2, 4).unwrap());
        assert_eq!(frac!(-3 / 6), Fraction::new(1, -2).unwrap());
        assert_eq!(frac!(4), Fraction::new(8, 2).unwrap());
        assert_eq!(frac!(0), Fraction::default());
    }

    #[test]
    fn test_from_float() {
        assert_eq!(Fraction::from_f64(0.5).unwrap(), frac!(1 / 2));
        assert_eq!(Fraction::from_f64(-2.75).unwrap(), frac!(-11 / 4));
        assert_eq!(Fraction::from_f64(0.0).unwrap(), frac!(0));
        assert_eq!(Fraction::from_f64(-0.0).unwrap(), frac!(0));
        assert_eq!(Fraction::from_f64(1e20).unwrap(), frac!(100_000_000_000_000_000_000i128));
        // 0.1 is not 1/10 in binary.
        assert_eq!(
            Fraction::from_f64(0.1).unwrap(),
            Fraction::new(3602879701896397u64, 36028797018963968u64).unwrap()
        );
        let tiny = Fraction::from_f64(f64::from_bits(1)).unwrap();
        assert_eq!(tiny.numerator(), &BigInt::one());
        assert_eq!(tiny.denominator(), &(BigInt::one() << 1074));
    }

    #[test]
    fn test_from_float_errors() {
        assert_eq!(
            Fraction::from_f64(f64::INFINITY),
            Err(FractionError::Overflow)
        );
        assert_eq!(
            Fraction::from_f64(f64::NEG_INFINITY),
            Err(FractionError::Overflow)
        );
        assert!(matches!(
            Fraction::from_f64(f64::NAN),
            Err(FractionError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_from_rational() {
        struct Half;
        impl Rational for Half {
            fn numer(&self) -> BigInt {
                BigInt::from(-4)
            }

            fn denom(&self) -> BigInt {
                BigInt::from(8)
            }
        }

        assert_eq!(Fraction::from_rational(&Half).unwrap(), frac!(-1 / 2));
        assert_eq!(Fraction::from_rational(&7u8).unwrap(), frac!(7));
        assert_eq!(
            Fraction::from_rational(&frac!(2 / 3)).unwrap(),
            frac!(2 / 3)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(frac!(3 / 2).to_string(), "3/2");
        assert_eq!(frac!(-3 / 2).to_string(), "-3/2");
        assert_eq!(frac!(100).to_string(), "100");
        assert_eq!(frac!(0).to_string(), "0");
        assert_eq!(format!("{:?}", frac!(-3 / 2)), "Fraction(-3, 2)");
    }

    #[test]
    fn test_from_str_radix() {
        assert_eq!(Fraction::from_str_radix("ff/10", 16).unwrap(), frac!(255 / 16));
        assert_eq!(Fraction::from_str_radix("-101", 2).unwrap(), frac!(-5));
        assert_eq!(
            Fraction::from_str_radix("1/0", 10),
            Err(FractionError::DivisionByZero)
        );
        assert!(Fraction::from_str_radix("1/x", 10).is_err());
        assert_eq!(Fraction::from_str_radix("-1/2", 10).unwrap(), frac!(-1 / 2));
        for input in ["1/-2", "+1/+2", "-a/-b"] {
            assert_eq!(
                Fraction::from_str_radix(input, 16),
                Err(FractionError::InvalidFormat(input.to_owned()))
            );
        }
    }

    #[test]
    fn test_signed() {
        assert_eq!(frac!(-3 / 4).abs(), frac!(3 / 4));
        assert_eq!(frac!(-3 / 4).signum(), frac!(-1));
        assert_eq!(frac!(0).signum(), frac!(0));
        assert_eq!(frac!(1 / 2).abs_sub(&frac!(1 / 3)), frac!(1 / 6));
        assert_eq!(frac!(1 / 3).abs_sub(&frac!(1 / 2)), frac!(0));
    }

    #[test]
    fn test_approx_eq() {
        approx::assert_abs_diff_eq!(frac!(333 / 1000), frac!(1 / 3), epsilon = frac!(1 / 1000));
        approx::assert_abs_diff_ne!(frac!(33 / 100), frac!(1 / 3), epsilon = frac!(1 / 1000));
        approx::assert_relative_eq!(frac!(1001), frac!(1000), max_relative = frac!(1 / 100));
    }

    prop_compose! {
        fn any_pair()(n in any::<i64>(), d in any::<i64>().prop_filter("nonzero", |d| *d != 0))
            -> (i64, i64) {
            (n, d)
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]
        #[test]
        fn test_canonical_form((n, d) in any_pair()) {
            let f = Fraction::new(n, d).unwrap();
            prop_assert!(f.denominator().is_positive());
            prop_assert!(f.numerator().gcd(f.denominator()).is_one());
            if n == 0 {
                prop_assert!(f.denominator().is_one());
            }
            // Same value: n * d' == n' * d.
            prop_assert_eq!(
                BigInt::from(n) * f.denominator(),
                f.numerator() * BigInt::from(d)
            );
        }

        #[test]
        fn test_integer_ratio_roundtrip((n, d) in any_pair()) {
            let f = Fraction::new(n, d).unwrap();
            let (num, den) = f.as_integer_ratio();
            prop_assert_eq!(Fraction::new(num, den).unwrap(), f);
        }

        #[test]
        fn test_float_is_exact(x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
            let f = Fraction::from_f64(x).unwrap();
            prop_assert_eq!(f.to_f64(), x);
        }
    }
}
