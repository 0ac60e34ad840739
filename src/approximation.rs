//! Best rational approximation under a denominator bound.
//!
//! The search walks the continued-fraction expansion of the value. Once the next convergent's
//! denominator would exceed the bound, the answer is either the last convergent or the largest
//! admissible semiconvergent between the last two, whichever lies closer.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use tracing::trace;

use crate::fraction::{Fraction, FractionError};

/// The bound [`Fraction::limit_denominator_default`] uses.
pub const DEFAULT_MAX_DENOMINATOR: u64 = 1_000_000;

impl Fraction {
    /// The closest fraction to `self` whose denominator is at most `max_denominator`.
    ///
    /// When the two candidates are exactly equidistant, the convergent wins over the
    /// semiconvergent. Fails with [`FractionError::InvalidValue`] if `max_denominator < 1`.
    pub fn limit_denominator<T: Into<BigInt>>(
        &self,
        max_denominator: T,
    ) -> Result<Fraction, FractionError> {
        let max_denominator = max_denominator.into();
        if max_denominator < BigInt::one() {
            return Err(FractionError::InvalidValue(format!(
                "max_denominator should be at least 1, got {max_denominator}"
            )));
        }
        Ok(self.approximate_within(&max_denominator))
    }

    /// [`Fraction::limit_denominator`] with [`DEFAULT_MAX_DENOMINATOR`].
    pub fn limit_denominator_default(&self) -> Fraction {
        self.approximate_within(&BigInt::from(DEFAULT_MAX_DENOMINATOR))
    }

    /// The search itself, for a bound already known to be at least 1.
    fn approximate_within(&self, max_denominator: &BigInt) -> Fraction {
        debug_assert!(max_denominator.is_positive());
        if self.denominator() <= max_denominator {
            return self.clone();
        }

        let (mut p0, mut q0, mut p1, mut q1) =
            (BigInt::zero(), BigInt::one(), BigInt::one(), BigInt::zero());
        let (mut n, mut d) = (self.numerator().clone(), self.denominator().clone());
        // d reaches zero only after the expansion terminates at self, whose denominator is known
        // to exceed the bound, so the loop always breaks on the bound first.
        loop {
            let a = n.div_floor(&d);
            let q2 = &q0 + &a * &q1;
            if &q2 > max_denominator {
                break;
            }
            let p2 = &p0 + &a * &p1;
            trace!(term = %a, numerator = %p2, denominator = %q2, "convergent");
            p0 = std::mem::replace(&mut p1, p2);
            q0 = std::mem::replace(&mut q1, q2);
            let remainder = &n - &a * &d;
            n = std::mem::replace(&mut d, remainder);
        }

        // The first term always fits a bound of at least 1, so q1 >= 1 here.
        let k = (max_denominator - &q0).div_floor(&q1);
        let semiconvergent = Fraction::reduce(&p0 + &k * &p1, &q0 + &k * &q1);
        let convergent = Fraction::reduce(p1, q1);
        let semiconvergent_error = (&semiconvergent - self).abs();
        let convergent_error = (&convergent - self).abs();
        trace!(%semiconvergent, %convergent, "bounding candidates");
        if convergent_error <= semiconvergent_error {
            convergent
        } else {
            semiconvergent
        }
    }
}
