//! Arithmetic on [`Fraction`]s, on their mixtures with integers (exact, giving a `Fraction`), and
//! on their mixtures with floats (approximate, giving an `f64`).
//!
//! The operator impls on exact operands panic on a zero divisor, the way integer division does.
//! The named methods ([`Fraction::checked_div`], [`Fraction::floor_div`], [`Fraction::modulo`],
//! [`Fraction::div_mod`], [`Fraction::pow`]) report [`FractionError::DivisionByZero`] instead.
//! Division and modulo are floored: a remainder always has the sign of the divisor.

use either::Either;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Pow, Signed, Zero};
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

use crate::fraction::{Fraction, FractionError};

impl Fraction {
    /// Exact division.
    pub fn checked_div(&self, rhs: &Fraction) -> Result<Fraction, FractionError> {
        if rhs.is_zero() {
            return Err(FractionError::DivisionByZero);
        }
        Ok(Fraction::reduce(
            self.numerator() * rhs.denominator(),
            self.denominator() * rhs.numerator(),
        ))
    }

    /// `1 / self`.
    pub fn recip(&self) -> Result<Fraction, FractionError> {
        if self.is_zero() {
            return Err(FractionError::DivisionByZero);
        }
        if self.is_negative() {
            Ok(Fraction::from_canonical(
                -self.denominator(),
                -self.numerator(),
            ))
        } else {
            Ok(Fraction::from_canonical(
                self.denominator().clone(),
                self.numerator().clone(),
            ))
        }
    }

    /// The floor of the exact quotient.
    pub fn floor_div(&self, rhs: &Fraction) -> Result<BigInt, FractionError> {
        if rhs.is_zero() {
            return Err(FractionError::DivisionByZero);
        }
        Ok((self.numerator() * rhs.denominator()).div_floor(&(self.denominator() * rhs.numerator())))
    }

    /// The remainder of floored division, with the sign of `rhs`.
    pub fn modulo(&self, rhs: &Fraction) -> Result<Fraction, FractionError> {
        self.div_mod(rhs).map(|(_quotient, remainder)| remainder)
    }

    /// Floored division with remainder: returns `(q, r)` with `q = floor(self / rhs)` and
    /// `r = self - q * rhs`, so that `0 <= |r| < |rhs|` and `r` has the sign of `rhs` unless it is
    /// zero.
    pub fn div_mod(&self, rhs: &Fraction) -> Result<(BigInt, Fraction), FractionError> {
        if rhs.is_zero() {
            return Err(FractionError::DivisionByZero);
        }
        // self / rhs = n1 d2 / (n2 d1), and the remainder of that over n2 d1, scaled back by rhs,
        // sits over d1 d2.
        let (quotient, remainder) = (self.numerator() * rhs.denominator())
            .div_mod_floor(&(rhs.numerator() * self.denominator()));
        Ok((
            quotient,
            Fraction::reduce(remainder, self.denominator() * rhs.denominator()),
        ))
    }

    /// Exact integer power. A negative exponent inverts the base first, so a zero base with a
    /// negative exponent fails.
    pub fn pow(&self, exponent: &BigInt) -> Result<Fraction, FractionError> {
        let magnitude = exponent.magnitude();
        let (numerator, denominator) = if exponent.is_negative() {
            let inverse = self.recip()?;
            inverse.into_parts()
        } else {
            self.as_integer_ratio()
        };
        // Powers of coprime integers stay coprime.
        Ok(Fraction::from_canonical(
            Pow::pow(&numerator, magnitude),
            Pow::pow(&denominator, magnitude),
        ))
    }

    /// [`Fraction::pow`] with a machine-sized exponent.
    pub fn powi(&self, exponent: i64) -> Result<Fraction, FractionError> {
        self.pow(&BigInt::from(exponent))
    }

    /// Raises to a rational power. An integral exponent gives an exact result; any other exponent
    /// goes through `f64::powf`, so a negative base gives NaN. Operands beyond the float range
    /// fail with [`FractionError::Overflow`].
    pub fn pow_ratio(&self, exponent: &Fraction) -> Result<Either<Fraction, f64>, FractionError> {
        if exponent.is_integer() {
            self.pow(exponent.numerator()).map(Either::Left)
        } else {
            Ok(Either::Right(
                self.checked_to_f64()?.powf(exponent.checked_to_f64()?),
            ))
        }
    }

    /// Raises the float value of `self` to a float power.
    pub fn powf(&self, exponent: f64) -> f64 {
        self.to_f64().powf(exponent)
    }
}

/// Floored division and modulo on floats: `(floor(a / b), a - b * floor(a / b))` with the
/// remainder taking the sign of `b`. A zero divisor follows IEEE rules instead of failing: the
/// quotient is a signed infinity (or NaN) and the remainder is NaN.
pub fn float_divmod(dividend: f64, divisor: f64) -> (f64, f64) {
    if divisor == 0.0 {
        return ((dividend / divisor).floor(), f64::NAN);
    }
    let mut modulo = dividend % divisor;
    let mut quotient = (dividend - modulo) / divisor;
    if modulo != 0.0 {
        if (divisor < 0.0) != (modulo < 0.0) {
            modulo += divisor;
            quotient -= 1.0;
        }
    } else {
        modulo = 0.0f64.copysign(divisor);
    }
    let floor_quotient = if quotient != 0.0 {
        let floored = quotient.floor();
        // quotient is within rounding error of an integer here
        if quotient - floored > 0.5 {
            floored + 1.0
        } else {
            floored
        }
    } else {
        0.0f64.copysign(dividend / divisor)
    };
    (floor_quotient, modulo)
}

impl Neg for Fraction {
    type Output = Fraction;

    fn neg(self) -> Self::Output {
        let (numerator, denominator) = self.into_parts();
        Fraction::from_canonical(-numerator, denominator)
    }
}

impl Neg for &Fraction {
    type Output = Fraction;

    fn neg(self) -> Self::Output {
        Fraction::from_canonical(-self.numerator(), self.denominator().clone())
    }
}

impl<'a, 'b> Add<&'b Fraction> for &'a Fraction {
    type Output = Fraction;

    fn add(self, rhs: &'b Fraction) -> Self::Output {
        if self.denominator() == rhs.denominator() {
            return Fraction::reduce(
                self.numerator() + rhs.numerator(),
                self.denominator().clone(),
            );
        }
        Fraction::reduce(
            self.numerator() * rhs.denominator() + rhs.numerator() * self.denominator(),
            self.denominator() * rhs.denominator(),
        )
    }
}

impl<'a, 'b> Sub<&'b Fraction> for &'a Fraction {
    type Output = Fraction;

    fn sub(self, rhs: &'b Fraction) -> Self::Output {
        self + &(-rhs)
    }
}

impl<'a, 'b> Mul<&'b Fraction> for &'a Fraction {
    type Output = Fraction;

    fn mul(self, rhs: &'b Fraction) -> Self::Output {
        if self.is_zero() || rhs.is_zero() {
            return Fraction::zero();
        }
        // Cross-cancel first to keep the intermediate products small.
        let g1 = self.numerator().gcd(rhs.denominator());
        let g2 = rhs.numerator().gcd(self.denominator());
        Fraction::from_canonical(
            (self.numerator() / &g1) * (rhs.numerator() / &g2),
            (self.denominator() / &g2) * (rhs.denominator() / &g1),
        )
    }
}

impl<'a, 'b> Div<&'b Fraction> for &'a Fraction {
    type Output = Fraction;

    /// Panics if `rhs` is zero. Use [`Fraction::checked_div`] to get an error instead.
    fn div(self, rhs: &'b Fraction) -> Self::Output {
        match self.checked_div(rhs) {
            Ok(quotient) => quotient,
            Err(e) => panic!("Cannot divide {} by {}: {}", self, rhs, e),
        }
    }
}

impl<'a, 'b> Rem<&'b Fraction> for &'a Fraction {
    type Output = Fraction;

    /// Floored modulo: the result has the sign of `rhs`. Panics if `rhs` is zero.
    fn rem(self, rhs: &'b Fraction) -> Self::Output {
        match self.modulo(rhs) {
            Ok(remainder) => remainder,
            Err(e) => panic!("Cannot take {} modulo {}: {}", self, rhs, e),
        }
    }
}

/// Forwards the owned-operand forms of an operator to the `&Fraction op &Fraction` impl.
macro_rules! forward_binop {
    ($($imp:ident, $method:ident;)*) => {$(
        impl $imp<Fraction> for Fraction {
            type Output = Fraction;

            fn $method(self, rhs: Fraction) -> Self::Output {
                <&Fraction as $imp<&Fraction>>::$method(&self, &rhs)
            }
        }

        impl<'a> $imp<&'a Fraction> for Fraction {
            type Output = Fraction;

            fn $method(self, rhs: &'a Fraction) -> Self::Output {
                <&Fraction as $imp<&Fraction>>::$method(&self, rhs)
            }
        }

        impl<'a> $imp<Fraction> for &'a Fraction {
            type Output = Fraction;

            fn $method(self, rhs: Fraction) -> Self::Output {
                <&Fraction as $imp<&Fraction>>::$method(self, &rhs)
            }
        }
    )*};
}

forward_binop! {
    Add, add;
    Sub, sub;
    Mul, mul;
    Div, div;
    Rem, rem;
}

/// Mixed operators with integer types: the integer is promoted to a fraction, and the result is
/// exact.
macro_rules! integer_binop {
    ($int:ty, $imp:ident, $method:ident) => {
        impl $imp<$int> for Fraction {
            type Output = Fraction;

            fn $method(self, rhs: $int) -> Self::Output {
                <&Fraction as $imp<&Fraction>>::$method(&self, &Fraction::from(rhs))
            }
        }

        impl<'a> $imp<$int> for &'a Fraction {
            type Output = Fraction;

            fn $method(self, rhs: $int) -> Self::Output {
                <&Fraction as $imp<&Fraction>>::$method(self, &Fraction::from(rhs))
            }
        }

        impl $imp<Fraction> for $int {
            type Output = Fraction;

            fn $method(self, rhs: Fraction) -> Self::Output {
                <&Fraction as $imp<&Fraction>>::$method(&Fraction::from(self), &rhs)
            }
        }

        impl<'a> $imp<&'a Fraction> for $int {
            type Output = Fraction;

            fn $method(self, rhs: &'a Fraction) -> Self::Output {
                <&Fraction as $imp<&Fraction>>::$method(&Fraction::from(self), rhs)
            }
        }
    };
}

macro_rules! integer_binops {
    ($($int:ty),*) => {$(
        integer_binop!($int, Add, add);
        integer_binop!($int, Sub, sub);
        integer_binop!($int, Mul, mul);
        integer_binop!($int, Div, div);
        integer_binop!($int, Rem, rem);
    )*};
}

integer_binops!(i32, i64, u64, BigInt);

/// Mixed operators with floats: the fraction is rounded to the nearest `f64` and the float
/// operation does the rest, including propagating NaN and infinities.
macro_rules! float_binops {
    ($($imp:ident, $method:ident, $op:expr;)*) => {$(
        impl $imp<f64> for Fraction {
            type Output = f64;

            fn $method(self, rhs: f64) -> Self::Output {
                ($op)(self.to_f64(), rhs)
            }
        }

        impl<'a> $imp<f64> for &'a Fraction {
            type Output = f64;

            fn $method(self, rhs: f64) -> Self::Output {
                ($op)(self.to_f64(), rhs)
            }
        }

        impl $imp<Fraction> for f64 {
            type Output = f64;

            fn $method(self, rhs: Fraction) -> Self::Output {
                ($op)(self, rhs.to_f64())
            }
        }

        impl<'a> $imp<&'a Fraction> for f64 {
            type Output = f64;

            fn $method(self, rhs: &'a Fraction) -> Self::Output {
                ($op)(self, rhs.to_f64())
            }
        }
    )*};
}

float_binops! {
    Add, add, |a: f64, b: f64| a + b;
    Sub, sub, |a: f64, b: f64| a - b;
    Mul, mul, |a: f64, b: f64| a * b;
    Div, div, |a: f64, b: f64| a / b;
    Rem, rem, |a: f64, b: f64| float_divmod(a, b).1;
}
