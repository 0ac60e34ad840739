//! Dynamically typed operands and the promotion rules between them.
//!
//! A [`Value`] is one of a closed set of host values: arbitrary-precision integers, fractions,
//! floats, text and nil. Every binary operator is evaluated by [`dispatch`] in two phases. The
//! left operand's handler runs first; if it declines, the right operand gets a reflected try when
//! it is a fraction, and only then does the operation fail with
//! [`FractionError::TypeMismatch`].
//!
//! The promotion rules follow the numeric tower. Integers and fractions combine exactly into a
//! fraction, anything combined with a float is computed in floating point, and two integers stay
//! integers except under true division, which rounds the exact quotient once to a float.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Pow, Signed, Zero};
use std::{
    cmp::Ordering,
    fmt::Display,
    hash::{Hash, Hasher},
};
use tracing::debug;

use crate::{
    arithmetic::float_divmod,
    fraction::{Fraction, FractionError},
    hashing::{hash_float, hash_integer},
};

/// A host value an operator can be applied to.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(BigInt),
    Fraction(Fraction),
    Float(f64),
    Text(String),
    Nil,
}

impl Value {
    /// The name of this value's kind, as used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "int",
            Value::Fraction(_) => "Fraction",
            Value::Float(_) => "float",
            Value::Text(_) => "str",
            Value::Nil => "nil",
        }
    }

    /// Whether this is an integer, fraction or float.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Integer(_) | Value::Fraction(_) | Value::Float(_)
        )
    }

    /// The integer this value is exactly equal to, if it is an integer or an integral fraction.
    fn as_integral(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            Value::Fraction(f) if f.is_integer() => Some(f.numerator()),
            _ => None,
        }
    }

    /// The numeric hash of this value, shared by equal integers, fractions and floats.
    pub fn numeric_hash(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(hash_integer(n)),
            Value::Fraction(f) => Some(f.numeric_hash()),
            Value::Float(x) => Some(hash_float(*x)),
            Value::Text(_) | Value::Nil => None,
        }
    }
}

impl From<Fraction> for Value {
    fn from(value: Fraction) -> Self {
        Value::Fraction(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Integer(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(BigInt::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Fraction(frac) => write!(f, "{frac}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Nil => write!(f, "nil"),
        }
    }
}

/// The binary operators on values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
    Mod,
    Pow,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::TrueDiv => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
        };
        write!(f, "{symbol}")
    }
}

/// Floored division with remainder, returning both parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivMod;

/// An operation evaluated in each of the three arithmetic domains.
pub trait Kernel {
    type Output;

    /// The operator's name in error messages.
    fn symbol(&self) -> String;

    /// Both operands rational, at least one of them a fraction.
    fn exact(&self, lhs: &Fraction, rhs: &Fraction) -> Result<Self::Output, FractionError>;

    /// At least one operand a float.
    fn approximate(&self, lhs: f64, rhs: f64) -> Result<Self::Output, FractionError>;

    /// Both operands integers.
    fn integral(&self, lhs: &BigInt, rhs: &BigInt) -> Result<Self::Output, FractionError>;
}

fn check_divisor(divisor: &BigInt) -> Result<(), FractionError> {
    if divisor.is_zero() {
        Err(FractionError::DivisionByZero)
    } else {
        Ok(())
    }
}

/// Converts an integer to the nearest float, failing with [`FractionError::Overflow`] beyond the
/// float range.
fn integer_to_f64(value: &BigInt) -> Result<f64, FractionError> {
    Fraction::from(value).checked_to_f64()
}

/// Whether `|base|^-exponent` is certainly below half the smallest subnormal, so that it rounds
/// to zero. `exponent` is negative and `base` nonzero.
fn underflows_f64(base: &BigInt, exponent: &BigInt) -> bool {
    // |base| >= 2^(bits - 1), and anything below 2^-1075 rounds to zero.
    let floor_log2 = BigUint::from(base.magnitude().bits() - 1);
    floor_log2 * exponent.magnitude() > BigUint::from(1075u32)
}

impl Kernel for BinaryOp {
    type Output = Value;

    fn symbol(&self) -> String {
        self.to_string()
    }

    fn exact(&self, lhs: &Fraction, rhs: &Fraction) -> Result<Value, FractionError> {
        Ok(match self {
            BinaryOp::Add => Value::Fraction(lhs + rhs),
            BinaryOp::Sub => Value::Fraction(lhs - rhs),
            BinaryOp::Mul => Value::Fraction(lhs * rhs),
            BinaryOp::TrueDiv => Value::Fraction(lhs.checked_div(rhs)?),
            BinaryOp::FloorDiv => Value::Integer(lhs.floor_div(rhs)?),
            BinaryOp::Mod => Value::Fraction(lhs.modulo(rhs)?),
            BinaryOp::Pow => lhs
                .pow_ratio(rhs)?
                .either(Value::Fraction, Value::Float),
        })
    }

    fn approximate(&self, lhs: f64, rhs: f64) -> Result<Value, FractionError> {
        Ok(Value::Float(match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::TrueDiv => lhs / rhs,
            BinaryOp::FloorDiv => float_divmod(lhs, rhs).0,
            BinaryOp::Mod => float_divmod(lhs, rhs).1,
            BinaryOp::Pow => lhs.powf(rhs),
        }))
    }

    fn integral(&self, lhs: &BigInt, rhs: &BigInt) -> Result<Value, FractionError> {
        Ok(match self {
            BinaryOp::Add => Value::Integer(lhs + rhs),
            BinaryOp::Sub => Value::Integer(lhs - rhs),
            BinaryOp::Mul => Value::Integer(lhs * rhs),
            BinaryOp::TrueDiv => {
                Value::Float(Fraction::new(lhs.clone(), rhs.clone())?.checked_to_f64()?)
            }
            BinaryOp::FloorDiv => {
                check_divisor(rhs)?;
                Value::Integer(lhs.div_floor(rhs))
            }
            BinaryOp::Mod => {
                check_divisor(rhs)?;
                Value::Integer(lhs.mod_floor(rhs))
            }
            BinaryOp::Pow if rhs.is_negative() && !lhs.is_zero() && underflows_f64(lhs, rhs) => {
                let negative = lhs.is_negative() && rhs.is_odd();
                Value::Float(if negative { -0.0 } else { 0.0 })
            }
            BinaryOp::Pow if rhs.is_negative() => {
                Value::Float(Fraction::from(lhs).pow(rhs)?.checked_to_f64()?)
            }
            BinaryOp::Pow => Value::Integer(Pow::pow(lhs, rhs.magnitude())),
        })
    }
}

impl Kernel for DivMod {
    type Output = (Value, Value);

    fn symbol(&self) -> String {
        "divmod()".to_owned()
    }

    fn exact(&self, lhs: &Fraction, rhs: &Fraction) -> Result<(Value, Value), FractionError> {
        let (quotient, remainder) = lhs.div_mod(rhs)?;
        Ok((Value::Integer(quotient), Value::Fraction(remainder)))
    }

    fn approximate(&self, lhs: f64, rhs: f64) -> Result<(Value, Value), FractionError> {
        let (quotient, remainder) = float_divmod(lhs, rhs);
        Ok((Value::Float(quotient), Value::Float(remainder)))
    }

    fn integral(&self, lhs: &BigInt, rhs: &BigInt) -> Result<(Value, Value), FractionError> {
        check_divisor(rhs)?;
        let (quotient, remainder) = lhs.div_mod_floor(rhs);
        Ok((Value::Integer(quotient), Value::Integer(remainder)))
    }
}

/// The result of a handler. `None` means the handler declined the operand pair.
type Handled<T> = Option<Result<T, FractionError>>;

/// Handles a fraction on the left.
fn fraction_handler<K: Kernel>(kernel: &K, lhs: &Fraction, rhs: &Value) -> Handled<K::Output> {
    match rhs {
        Value::Integer(n) => Some(kernel.exact(lhs, &Fraction::from(n))),
        Value::Fraction(f) => Some(kernel.exact(lhs, f)),
        Value::Float(x) => Some(
            lhs.checked_to_f64()
                .and_then(|lhs| kernel.approximate(lhs, *x)),
        ),
        Value::Text(_) | Value::Nil => None,
    }
}

/// Handles a fraction on the right, after the left operand's handler declined.
fn reflected_handler<K: Kernel>(kernel: &K, lhs: &Value, rhs: &Fraction) -> Handled<K::Output> {
    match lhs {
        Value::Integer(n) => Some(kernel.exact(&Fraction::from(n), rhs)),
        Value::Fraction(f) => Some(kernel.exact(f, rhs)),
        Value::Float(x) => Some(
            rhs.checked_to_f64()
                .and_then(|rhs| kernel.approximate(*x, rhs)),
        ),
        Value::Text(_) | Value::Nil => None,
    }
}

/// Handles the native integer and float pairs. Declines anything involving a fraction.
fn native_handler<K: Kernel>(kernel: &K, lhs: &Value, rhs: &Value) -> Handled<K::Output> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => Some(kernel.integral(a, b)),
        (Value::Integer(a), Value::Float(b)) => {
            Some(integer_to_f64(a).and_then(|a| kernel.approximate(a, *b)))
        }
        (Value::Float(a), Value::Integer(b)) => {
            Some(integer_to_f64(b).and_then(|b| kernel.approximate(*a, b)))
        }
        (Value::Float(a), Value::Float(b)) => Some(kernel.approximate(*a, *b)),
        _ => None,
    }
}

/// Evaluates `kernel` on two values: the left operand's handler first, then the reflected
/// handler of a fraction on the right.
pub fn dispatch<K: Kernel>(kernel: &K, lhs: &Value, rhs: &Value) -> Result<K::Output, FractionError> {
    let forward = match lhs {
        Value::Fraction(f) => fraction_handler(kernel, f, rhs),
        _ => native_handler(kernel, lhs, rhs),
    };
    if let Some(result) = forward {
        return result;
    }
    if let Value::Fraction(f) = rhs {
        if let Some(result) = reflected_handler(kernel, lhs, f) {
            return result;
        }
    }
    debug!(
        op = %kernel.symbol(),
        lhs = lhs.kind(),
        rhs = rhs.kind(),
        "no handler for operands"
    );
    Err(FractionError::TypeMismatch(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        kernel.symbol(),
        lhs.kind(),
        rhs.kind()
    )))
}

impl Value {
    /// Applies a binary operator with `self` on the left.
    pub fn apply(&self, op: BinaryOp, rhs: &Value) -> Result<Value, FractionError> {
        dispatch(&op, self, rhs)
    }

    /// Floored division with remainder: `(self // rhs, self % rhs)`.
    pub fn div_mod(&self, rhs: &Value) -> Result<(Value, Value), FractionError> {
        dispatch(&DivMod, self, rhs)
    }

    /// Raises `self` to `exponent`, reduced by `modulus` if one is given.
    ///
    /// With a modulus, the power must come out exact: a float base or exponent fails with
    /// [`FractionError::TypeMismatch`], as does a non-integer modulus when no fraction is
    /// involved. Integral bases and exponents with an integer modulus use modular
    /// exponentiation; everything else computes the exact power and reduces it with the `%`
    /// operator, so a float modulus gives a float.
    pub fn pow(&self, exponent: &Value, modulus: Option<&Value>) -> Result<Value, FractionError> {
        let Some(modulus) = modulus else {
            return dispatch(&BinaryOp::Pow, self, exponent);
        };
        let operands = [self, exponent, modulus];
        if operands.iter().any(|v| !v.is_numeric()) {
            return Err(FractionError::TypeMismatch(format!(
                "unsupported operand type(s) for pow(): '{}', '{}', '{}'",
                self.kind(),
                exponent.kind(),
                modulus.kind()
            )));
        }
        let all_integers = matches!((self, exponent), (Value::Integer(_), Value::Integer(_)));
        let float_power = matches!(self, Value::Float(_)) || matches!(exponent, Value::Float(_));
        if float_power || (all_integers && !matches!(modulus, Value::Integer(_))) {
            return Err(FractionError::TypeMismatch(
                "pow() 3rd argument not allowed unless all arguments are integers".to_owned(),
            ));
        }

        if let (Some(base), Some(power), Value::Integer(m)) =
            (self.as_integral(), exponent.as_integral(), modulus)
        {
            if !power.is_negative() || all_integers {
                let result = modular_pow(base, power, m)?;
                return Ok(if all_integers {
                    Value::Integer(result)
                } else {
                    Value::Fraction(Fraction::from(result))
                });
            }
        }

        match dispatch(&BinaryOp::Pow, self, exponent)? {
            Value::Float(_) => Err(FractionError::TypeMismatch(
                "pow() 3rd argument not allowed unless the power is exact".to_owned(),
            )),
            power => power.apply(BinaryOp::Mod, modulus),
        }
    }

    /// Negation.
    pub fn negate(&self) -> Result<Value, FractionError> {
        match self {
            Value::Integer(n) => Ok(Value::Integer(-n)),
            Value::Fraction(f) => Ok(Value::Fraction(-f)),
            Value::Float(x) => Ok(Value::Float(-x)),
            Value::Text(_) | Value::Nil => Err(bad_unary("-", self)),
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> Result<Value, FractionError> {
        match self {
            Value::Integer(n) => Ok(Value::Integer(n.abs())),
            Value::Fraction(f) => Ok(Value::Fraction(f.abs())),
            Value::Float(x) => Ok(Value::Float(x.abs())),
            Value::Text(_) | Value::Nil => Err(bad_unary("abs()", self)),
        }
    }

    /// Unary plus, which returns numbers unchanged.
    pub fn plus(&self) -> Result<Value, FractionError> {
        if self.is_numeric() {
            Ok(self.clone())
        } else {
            Err(bad_unary("+", self))
        }
    }

    /// Orders two values, failing for pairs that have no ordering at all. `Ok(None)` means the
    /// pair is numeric but unordered, which only happens with NaN.
    pub fn try_cmp(&self, other: &Value) -> Result<Option<Ordering>, FractionError> {
        let comparable = (self.is_numeric() && other.is_numeric())
            || matches!((self, other), (Value::Text(_), Value::Text(_)));
        if comparable {
            Ok(self.partial_cmp(other))
        } else {
            Err(FractionError::TypeMismatch(format!(
                "ordering not supported between '{}' and '{}'",
                self.kind(),
                other.kind()
            )))
        }
    }
}

fn bad_unary(symbol: &str, operand: &Value) -> FractionError {
    FractionError::TypeMismatch(format!(
        "bad operand type for unary {symbol}: '{}'",
        operand.kind()
    ))
}

/// `base^exponent mod modulus`, with the sign of `modulus`. A negative exponent uses the modular
/// inverse of `base`.
fn modular_pow(base: &BigInt, exponent: &BigInt, modulus: &BigInt) -> Result<BigInt, FractionError> {
    if modulus.is_zero() {
        return Err(FractionError::InvalidValue(
            "pow() 3rd argument cannot be 0".to_owned(),
        ));
    }
    if exponent.is_negative() {
        let extended = base.mod_floor(modulus).extended_gcd(modulus);
        if !extended.gcd.is_one() {
            return Err(FractionError::InvalidValue(
                "base is not invertible for the given modulus".to_owned(),
            ));
        }
        let inverse = extended.x.mod_floor(modulus);
        return Ok(inverse.modpow(&-exponent, modulus));
    }
    Ok(base.modpow(exponent, modulus))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Value {
    /// Numbers compare exactly across kinds, text compares with text, and nil only equals nil.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Fraction(b)) => Some(b.cmp_integer(a).reverse()),
            (Value::Fraction(a), Value::Integer(b)) => Some(a.cmp_integer(b)),
            (Value::Fraction(a), Value::Fraction(b)) => Some(a.cmp(b)),
            (Value::Fraction(a), Value::Float(b)) => a.cmp_f64(*b),
            (Value::Float(a), Value::Fraction(b)) => b.cmp_f64(*a).map(Ordering::reverse),
            (Value::Integer(a), Value::Float(b)) => Fraction::from(a).cmp_f64(*b),
            (Value::Float(a), Value::Integer(b)) => {
                Fraction::from(b).cmp_f64(*a).map(Ordering::reverse)
            }
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Nil, Value::Nil) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

/// Consistent with equality: numerically equal values hash equally whatever their kind.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Text(s) => s.hash(state),
            Value::Nil => ().hash(state),
            numeric => numeric.numeric_hash().hash(state),
        }
    }
}

impl Fraction {
    /// Converts a single value: integers and fractions exactly, finite floats exactly, and text
    /// through the textual grammar.
    pub fn from_value(value: &Value) -> Result<Fraction, FractionError> {
        match value {
            Value::Integer(n) => Ok(Fraction::from(n)),
            Value::Fraction(f) => Ok(f.clone()),
            Value::Float(x) => Fraction::from_f64(*x),
            Value::Text(s) => s.parse(),
            Value::Nil => Err(FractionError::TypeMismatch(
                "argument should be a string, a number or a Rational instance".to_owned(),
            )),
        }
    }

    /// Builds `numerator / denominator` from two values, both of which must be integers.
    pub fn from_values(numerator: &Value, denominator: &Value) -> Result<Fraction, FractionError> {
        let Value::Integer(numerator) = numerator else {
            return Err(FractionError::TypeMismatch(
                "numerator should be an integer when denominator is specified".to_owned(),
            ));
        };
        let Value::Integer(denominator) = denominator else {
            return Err(FractionError::TypeMismatch(
                "denominator should be an integer".to_owned(),
            ));
        };
        Fraction::new(numerator.clone(), denominator.clone())
    }
}
