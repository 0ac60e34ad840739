//! The numeric hash shared by integers, fractions and floats. Numerically equal values hash
//! equally whatever their kind: `2`, `2/1` and `2.0` all hash to 2.
//!
//! A rational `n/d` hashes to `|n| * d^-1 mod P` with the sign of `n` reapplied, where
//! `P = 2^61 - 1` is prime. When `d` is a multiple of `P` the inverse doesn't exist and the hash
//! is [`HASH_INF`] instead. Floats hash through their exact dyadic value, never through a cast.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed};

use crate::fraction::Fraction;

/// The Mersenne prime all hashes are reduced by.
pub const HASH_MODULUS: u64 = (1 << 61) - 1;

/// Hash of positive infinity, and of fractions whose denominator has no inverse modulo
/// [`HASH_MODULUS`].
pub const HASH_INF: i64 = 314_159;

/// Hash of NaN.
pub const HASH_NAN: i64 = 0;

/// `value mod HASH_MODULUS`, folding 64-bit digits from the most significant end.
fn reduce_modulus(value: &BigUint) -> u64 {
    let modulus = u128::from(HASH_MODULUS);
    value.iter_u64_digits().rev().fold(0u64, |acc, digit| {
        (((u128::from(acc) << 64) | u128::from(digit)) % modulus) as u64
    })
}

fn mul_mod(a: u64, b: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(HASH_MODULUS)) as u64
}

fn pow_mod(mut base: u64, mut exponent: u64) -> u64 {
    let mut result = 1;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = mul_mod(result, base);
        }
        base = mul_mod(base, base);
        exponent >>= 1;
    }
    result
}

/// Hash of `numerator / denominator`. The pair needn't be reduced, but `denominator` must be
/// positive.
pub fn hash_ratio(numerator: &BigInt, denominator: &BigInt) -> i64 {
    // Fermat: d^(P-2) is the inverse of d, or 0 if P divides d.
    let inverse = pow_mod(reduce_modulus(denominator.magnitude()), HASH_MODULUS - 2);
    let magnitude = if inverse == 0 {
        HASH_INF
    } else {
        mul_mod(reduce_modulus(numerator.magnitude()), inverse) as i64
    };
    let hash = if numerator.is_negative() {
        -magnitude
    } else {
        magnitude
    };
    // -1 is never a valid hash.
    if hash == -1 {
        -2
    } else {
        hash
    }
}

pub fn hash_integer(value: &BigInt) -> i64 {
    hash_ratio(value, &BigInt::one())
}

pub fn hash_float(value: f64) -> i64 {
    if value.is_nan() {
        HASH_NAN
    } else if value.is_infinite() {
        if value > 0.0 {
            HASH_INF
        } else {
            -HASH_INF
        }
    } else {
        Fraction::from_finite_f64(value).numeric_hash()
    }
}

impl Fraction {
    /// The numeric hash of this value, equal to the hash of any equal integer or float.
    pub fn numeric_hash(&self) -> i64 {
        hash_ratio(self.numerator(), self.denominator())
    }
}
