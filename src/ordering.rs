//! The total order on fractions and their comparisons with integers and floats.
//!
//! Mixed comparisons are always exact. A finite float is promoted to its exact rational value
//! before cross-multiplying, so a fraction is never rounded to a float just to be compared. NaN is
//! unordered against everything, and infinities lie beyond every fraction.

use num_bigint::BigInt;
use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use crate::fraction::Fraction;

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.denominator() == other.denominator() {
            self.numerator().cmp(other.numerator())
        } else {
            (self.numerator() * other.denominator()).cmp(&(other.numerator() * self.denominator()))
        }
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Consistent with equality, and with the numeric hash of equal integers and floats.
impl Hash for Fraction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.numeric_hash().hash(state);
    }
}

impl Fraction {
    /// Compares against an integer without building a fraction for it.
    pub fn cmp_integer(&self, other: &BigInt) -> Ordering {
        self.numerator().cmp(&(other * self.denominator()))
    }

    /// Compares against a float exactly. `None` if `other` is NaN.
    pub fn cmp_f64(&self, other: f64) -> Option<Ordering> {
        if other.is_nan() {
            None
        } else if other.is_infinite() {
            Some(if other > 0.0 {
                Ordering::Less
            } else {
                Ordering::Greater
            })
        } else {
            Some(self.cmp(&Fraction::from_finite_f64(other)))
        }
    }
}

impl PartialEq<BigInt> for Fraction {
    fn eq(&self, other: &BigInt) -> bool {
        self.is_integer() && self.numerator() == other
    }
}

impl PartialOrd<BigInt> for Fraction {
    fn partial_cmp(&self, other: &BigInt) -> Option<Ordering> {
        Some(self.cmp_integer(other))
    }
}

impl PartialEq<Fraction> for BigInt {
    fn eq(&self, other: &Fraction) -> bool {
        other == self
    }
}

impl PartialOrd<Fraction> for BigInt {
    fn partial_cmp(&self, other: &Fraction) -> Option<Ordering> {
        Some(other.cmp_integer(self).reverse())
    }
}

macro_rules! primitive_comparisons {
    ($($int:ty),*) => {$(
        impl PartialEq<$int> for Fraction {
            fn eq(&self, other: &$int) -> bool {
                *self == BigInt::from(*other)
            }
        }

        impl PartialOrd<$int> for Fraction {
            fn partial_cmp(&self, other: &$int) -> Option<Ordering> {
                Some(self.cmp_integer(&BigInt::from(*other)))
            }
        }

        impl PartialEq<Fraction> for $int {
            fn eq(&self, other: &Fraction) -> bool {
                other == self
            }
        }

        impl PartialOrd<Fraction> for $int {
            fn partial_cmp(&self, other: &Fraction) -> Option<Ordering> {
                other.partial_cmp(self).map(Ordering::reverse)
            }
        }
    )*};
}

primitive_comparisons!(i32, i64, u64);

impl PartialEq<f64> for Fraction {
    fn eq(&self, other: &f64) -> bool {
        self.cmp_f64(*other) == Some(Ordering::Equal)
    }
}

impl PartialOrd<f64> for Fraction {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.cmp_f64(*other)
    }
}

impl PartialEq<Fraction> for f64 {
    fn eq(&self, other: &Fraction) -> bool {
        other == self
    }
}

impl PartialOrd<Fraction> for f64 {
    fn partial_cmp(&self, other: &Fraction) -> Option<Ordering> {
        other.cmp_f64(*self).map(Ordering::reverse)
    }
}
