//! Exact conversions to integers and the correctly rounded conversion to `f64`.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{Pow, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;

use crate::fraction::{Fraction, FractionError};

/// Bits in an `f64` significand, counting the implicit leading bit.
const MANTISSA_DIGITS: i64 = f64::MANTISSA_DIGITS as i64;
/// Binary exponent range of `f64`, in the `0.5 <= m < 1` convention.
const MIN_EXP: i64 = f64::MIN_EXP as i64;
const MAX_EXP: i64 = f64::MAX_EXP as i64;

/// `2^exponent` for `-1074 <= exponent <= 1023`.
fn pow2(exponent: i64) -> f64 {
    debug_assert!((-1074..=1023).contains(&exponent));
    if exponent >= -1022 {
        f64::from_bits(((exponent + 1023) as u64) << 52)
    } else {
        f64::from_bits(1u64 << (exponent + 1074))
    }
}

/// `a / b` rounded half-to-even to the nearest `f64`, for `b > 0`.
fn divide_to_f64(a: &BigUint, b: &BigUint) -> f64 {
    if a.is_zero() {
        return 0.0;
    }
    // Both sides are exact below 2^53, so one IEEE division rounds correctly.
    if a.bits() <= MANTISSA_DIGITS as u64 && b.bits() <= MANTISSA_DIGITS as u64 {
        if let (Some(a), Some(b)) = (a.to_f64(), b.to_f64()) {
            return a / b;
        }
    }

    let diff = a.bits() as i64 - b.bits() as i64;
    // 2^(diff - 1) < a / b < 2^(diff + 1)
    if diff > MAX_EXP {
        return f64::INFINITY;
    }
    if diff < MIN_EXP - MANTISSA_DIGITS - 1 {
        return 0.0;
    }

    // Scale so the integer quotient carries two or three bits beyond the target precision.
    let shift = diff.max(MIN_EXP) - MANTISSA_DIGITS - 2;
    let (quotient, remainder) = if shift >= 0 {
        a.div_rem(&(b << shift as usize))
    } else {
        (a << (-shift) as usize).div_rem(b)
    };
    let quotient_bits = quotient.bits() as i64;
    // The quotient is below 2^57, so its lowest digit is all of it.
    let mut q = quotient.iter_u64_digits().next().unwrap_or(0);
    if !remainder.is_zero() {
        q |= 1;
    }

    let extra = quotient_bits.max(MIN_EXP - shift) - MANTISSA_DIGITS;
    let mask = 1u64 << (extra - 1);
    if q & mask != 0 && q & (3 * mask - 1) != 0 {
        q += mask;
    }
    q &= !(2 * mask - 1);

    (q >> extra) as f64 * pow2(shift + extra)
}

impl Fraction {
    /// Rounds toward zero.
    pub fn trunc(&self) -> BigInt {
        self.numerator() / self.denominator()
    }

    pub fn floor(&self) -> BigInt {
        self.numerator().div_floor(self.denominator())
    }

    pub fn ceil(&self) -> BigInt {
        -(-self.numerator()).div_floor(self.denominator())
    }

    /// Same as [`Fraction::trunc`].
    pub fn to_integer(&self) -> BigInt {
        self.trunc()
    }

    /// The nearest integer, with exact halves going to the even neighbor.
    pub fn round(&self) -> BigInt {
        let (quotient, remainder) = self.numerator().div_mod_floor(self.denominator());
        let twice: BigInt = remainder * 2;
        match twice.cmp(self.denominator()) {
            Ordering::Less => quotient,
            Ordering::Greater => quotient + 1,
            Ordering::Equal if quotient.is_even() => quotient,
            Ordering::Equal => quotient + 1,
        }
    }

    /// Rounds half-to-even to a multiple of `10^-digits`. Negative `digits` round to tens,
    /// hundreds and so on, which always gives an integer.
    pub fn round_to(&self, digits: i32) -> Fraction {
        let scale: BigInt = Pow::pow(BigInt::from(10), digits.unsigned_abs());
        if digits >= 0 {
            let scaled = Fraction::reduce(self.numerator() * &scale, self.denominator().clone());
            Fraction::reduce(scaled.round(), scale)
        } else {
            let scaled = Fraction::reduce(self.numerator().clone(), self.denominator() * &scale);
            Fraction::from_integer(scaled.round() * scale)
        }
    }

    /// The nearest `f64`, ties to even. Fails with [`FractionError::Overflow`] when the value
    /// rounds beyond `f64::MAX`.
    pub fn checked_to_f64(&self) -> Result<f64, FractionError> {
        let value = self.to_f64();
        if value.is_infinite() {
            Err(FractionError::Overflow)
        } else {
            Ok(value)
        }
    }

    /// Lossy form of [`Fraction::checked_to_f64`] for plain float arithmetic: magnitudes beyond
    /// `f64::MAX` saturate to an infinity.
    pub fn to_f64(&self) -> f64 {
        let magnitude = divide_to_f64(self.numerator().magnitude(), self.denominator().magnitude());
        if self.numerator().is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frac;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn int(value: i64) -> BigInt {
        BigInt::from(value)
    }

    #[test]
    fn test_trunc_floor_ceil() {
        assert_eq!(frac!(7 / 2).trunc(), int(3));
        assert_eq!(frac!(-7 / 2).trunc(), int(-3));
        assert_eq!(frac!(7 / 2).floor(), int(3));
        assert_eq!(frac!(-7 / 2).floor(), int(-4));
        assert_eq!(frac!(7 / 2).ceil(), int(4));
        assert_eq!(frac!(-7 / 2).ceil(), int(-3));
        assert_eq!(frac!(5).floor(), int(5));
        assert_eq!(frac!(5).ceil(), int(5));
        assert_eq!(frac!(-5 / 3).to_integer(), int(-1));
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(frac!(5 / 2).round(), int(2));
        assert_eq!(frac!(7 / 2).round(), int(4));
        assert_eq!(frac!(-5 / 2).round(), int(-2));
        assert_eq!(frac!(-7 / 2).round(), int(-4));
        assert_eq!(frac!(1 / 2).round(), int(0));
        assert_eq!(frac!(3 / 2).round(), int(2));
        assert_eq!(frac!(8 / 3).round(), int(3));
        assert_eq!(frac!(-8 / 3).round(), int(-3));
        assert_eq!(frac!(7 / 3).round(), int(2));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(frac!(1 / 3).round_to(2), frac!(33 / 100));
        assert_eq!(frac!(2 / 3).round_to(2), frac!(67 / 100));
        // 0.125 is a tie at two digits and goes to the even 0.12.
        assert_eq!(frac!(1 / 8).round_to(2), frac!(3 / 25));
        assert_eq!(frac!(3 / 8).round_to(2), frac!(19 / 50));
        assert_eq!(frac!(1 / 3).round_to(0), frac!(0));
        assert_eq!(frac!(1234).round_to(-2), frac!(1200));
        assert_eq!(frac!(1250).round_to(-2), frac!(1200));
        assert_eq!(frac!(1350).round_to(-2), frac!(1400));
        assert_eq!(frac!(-1351).round_to(-1), frac!(-1350));
        assert!(frac!(12345 / 7).round_to(-3).is_integer());
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(frac!(1 / 2).to_f64(), 0.5);
        assert_eq!(frac!(-3 / 4).to_f64(), -0.75);
        assert_eq!(frac!(1 / 3).to_f64(), 1.0 / 3.0);
        assert_eq!(frac!(0).to_f64(), 0.0);
        assert_eq!(frac!(1 / 10).to_f64(), 0.1);
    }

    #[test]
    fn test_to_f64_large_parts() {
        // Both parts exceed 2^53, so the fast path is skipped.
        let big = BigInt::from(10).pow(30u32);
        let third = Fraction::new(&big + 1, &big * 3).unwrap();
        assert_eq!(third.to_f64(), 1.0 / 3.0);
        let max = Fraction::from_f64(f64::MAX).unwrap();
        assert_eq!(max.to_f64(), f64::MAX);
        assert_eq!(max.checked_to_f64(), Ok(f64::MAX));
    }

    #[test]
    fn test_checked_to_f64_out_of_range() {
        let huge = Fraction::new(BigInt::from(10).pow(400u32), 7).unwrap();
        assert_eq!(huge.checked_to_f64(), Err(FractionError::Overflow));
        assert_eq!((-&huge).checked_to_f64(), Err(FractionError::Overflow));
        assert_eq!(huge.to_f64(), f64::INFINITY);
        // Anything rounding to 2^1024 is out of range, even if it is below it.
        let max = Fraction::from_f64(f64::MAX).unwrap();
        let half_ulp = Fraction::from_f64(2f64.powi(970)).unwrap();
        assert_eq!((&max + &half_ulp).checked_to_f64(), Err(FractionError::Overflow));
        // Tiny values underflow to zero instead of failing.
        let tiny = Fraction::new(1, BigInt::from(10).pow(400u32)).unwrap();
        assert_eq!(tiny.checked_to_f64(), Ok(0.0));
    }

    #[test]
    fn test_to_f64_subnormal() {
        let tiny = Fraction::from_f64(5e-324).unwrap();
        assert_eq!(tiny.to_f64(), 5e-324);
        // A third of the smallest subnormal rounds to zero; two thirds rounds up to it.
        assert_eq!((&tiny / &frac!(3)).to_f64(), 0.0);
        assert_eq!((&tiny * &frac!(2 / 3)).to_f64(), 5e-324);
        let min_normal = Fraction::from_f64(f64::MIN_POSITIVE).unwrap();
        assert_eq!((&min_normal / &frac!(2)).to_f64(), f64::MIN_POSITIVE / 2.0);
    }

    #[test]
    fn test_to_f64_ties_to_even() {
        let two = BigInt::from(2);
        let above = two.pow(53u32);
        // 2^53 + 1 sits halfway between 2^53 and 2^53 + 2; ties go to 2^53.
        let tie = Fraction::from(&above + 1);
        assert_eq!(tie.to_f64(), 9_007_199_254_740_992.0);
        // 2^53 + 3 is halfway between 2^53 + 2 and 2^53 + 4; ties go to 2^53 + 4.
        let tie = Fraction::from(&above + 3);
        assert_eq!(tie.to_f64(), 9_007_199_254_740_996.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]
        #[test]
        fn test_matches_float_division(n in -(1i64 << 52)..(1i64 << 52), d in 1i64..(1i64 << 52)) {
            let f = Fraction::new(n, d).unwrap();
            prop_assert_eq!(f.to_f64(), n as f64 / d as f64);
        }

        #[test]
        fn test_floor_ceil_bracket(n in any::<i64>(), d in 1i64..10_000) {
            let f = Fraction::new(n, d).unwrap();
            let floor = Fraction::from(f.floor());
            let ceil = Fraction::from(f.ceil());
            prop_assert!(floor <= f && f <= ceil);
            prop_assert!(&ceil - &floor <= frac!(1));
            let rounded = Fraction::from(f.round());
            prop_assert!((&rounded - &f).abs() <= frac!(1 / 2));
        }
    }
}
