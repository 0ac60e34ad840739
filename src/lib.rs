//! Exact rational arithmetic on arbitrary-precision integers.
//!
//! [`Fraction`] is always in lowest terms with a positive denominator, so equal values have equal
//! representations. It mixes exactly with integers, rounds once when mixed with floats, and
//! compares and hashes consistently with both. [`Value`] wraps it together with the other host
//! numbers for code that only knows its operand types at runtime.

pub mod approximation;
pub mod arithmetic;
pub mod fraction;
pub mod hashing;
pub mod number;
pub mod ordering;
pub mod parsing;
pub mod rounding;

pub use approximation::DEFAULT_MAX_DENOMINATOR;
pub use arithmetic::float_divmod;
pub use fraction::{Fraction, FractionError, Rational};
pub use number::{BinaryOp, DivMod, Kernel, Value};
