//! Parsing fractions from the textual forms people type: `3/4`, `-12`, `1.5`, `2.5e-3`.
//!
//! The grammar, surrounded by optional whitespace:
//!
//! ```text
//! literal  := sign? (digits "/" digits | digits ("." digits)? (("e" | "E") sign? digits)?)
//! sign     := "+" | "-"
//! ```
//!
//! Both sides of the integer and slash forms are plain decimal digit runs, so
//! `Fraction::to_string` always parses back to the same value.

use nom::branch::alt;
use nom::character::complete::{char, digit1, multispace0, one_of};
use nom::combinator::{all_consuming, map, map_res, opt, recognize};
use nom::error::ParseError;
use nom::sequence::{delimited, pair, preceded, separated_pair, tuple};
use nom::IResult;
use num_bigint::BigInt;
use num_traits::Pow;
use tracing::debug;

use crate::fraction::{Fraction, FractionError};

/// A syntactically valid literal, before the value is built.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Literal {
    /// `numerator/denominator`. The denominator may still be zero.
    Ratio(BigInt, BigInt),
    /// `mantissa * 10^exponent`, with the decimal point folded into the exponent.
    Decimal { mantissa: BigInt, exponent: i64 },
}

/// A combinator that takes a parser `inner` and produces a parser that also consumes both leading and
/// trailing whitespace, returning the output of `inner`.
fn ws<'a, F: 'a, O, E: ParseError<&'a str>>(
    inner: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: FnMut(&'a str) -> IResult<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parses an optional sign, returning whether it was negative.
fn sign(input: &str) -> IResult<&str, bool> {
    map(opt(one_of("+-")), |s| s == Some('-'))(input)
}

/// Parses a run of decimal digits as a nonnegative integer.
fn natural(input: &str) -> IResult<&str, BigInt> {
    map_res(digit1, |digits: &str| digits.parse::<BigInt>())(input)
}

/// Parses the slash form, `3/4`.
fn ratio(input: &str) -> IResult<&str, Literal> {
    map(separated_pair(natural, char('/'), natural), |(n, d)| {
        Literal::Ratio(n, d)
    })(input)
}

/// Parses the signed exponent after an `e` or `E`.
fn exponent(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |e: &str| {
        e.parse::<i64>()
    })(input)
}

/// Parses the integer and decimal forms, `12`, `1.25` and `1.25e-3`.
fn decimal(input: &str) -> IResult<&str, Literal> {
    map_res(
        tuple((
            digit1,
            opt(preceded(char('.'), digit1)),
            opt(preceded(one_of("eE"), exponent)),
        )),
        |(whole, fraction, exp): (&str, Option<&str>, Option<i64>)| {
            let fraction = fraction.unwrap_or("");
            let mantissa = format!("{whole}{fraction}").parse::<BigInt>()?;
            let exponent = exp.unwrap_or(0).saturating_sub(fraction.len() as i64);
            Ok::<_, num_bigint::ParseBigIntError>(Literal::Decimal { mantissa, exponent })
        },
    )(input)
}

/// Parses a complete literal, whitespace included, returning its sign and body.
fn literal(input: &str) -> IResult<&str, (bool, Literal)> {
    all_consuming(ws(pair(sign, alt((ratio, decimal)))))(input)
}

/// Parses a fraction from text. Input outside the grammar fails with
/// [`FractionError::InvalidFormat`]; a well-formed `n/0` fails with
/// [`FractionError::DivisionByZero`].
pub fn parse_fraction(input: &str) -> Result<Fraction, FractionError> {
    let (_, (negative, literal)) = literal(input).map_err(|e| {
        debug!(input, error = %e, "rejected fraction literal");
        FractionError::InvalidFormat(input.to_owned())
    })?;
    let magnitude = match literal {
        Literal::Ratio(numerator, denominator) => Fraction::new(numerator, denominator)?,
        Literal::Decimal { mantissa, exponent } => {
            let scale = u32::try_from(exponent.unsigned_abs()).map_err(|_e| {
                debug!(input, exponent, "decimal exponent out of range");
                FractionError::InvalidFormat(input.to_owned())
            })?;
            let power: BigInt = Pow::pow(BigInt::from(10), scale);
            if exponent >= 0 {
                Fraction::from_integer(mantissa * power)
            } else {
                Fraction::reduce(mantissa, power)
            }
        }
    };
    Ok(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frac;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn parse(input: &str) -> Fraction {
        parse_fraction(input).unwrap()
    }

    #[test]
    fn test_slash_form() {
        assert_eq!(parse("3/4"), frac!(3 / 4));
        assert_eq!(parse(" -3/4 "), frac!(-3 / 4));
        assert_eq!(parse("+6/8"), frac!(3 / 4));
        assert_eq!(parse("007/014"), frac!(1 / 2));
        assert_eq!(parse("\t10/5\n"), frac!(2));
        assert_eq!(parse("0/7"), frac!(0));
    }

    #[test]
    fn test_integer_form() {
        assert_eq!(parse("12"), frac!(12));
        assert_eq!(parse("-12"), frac!(-12));
        assert_eq!(parse("-0"), frac!(0));
        assert_eq!(
            parse("123456789012345678901234567890"),
            Fraction::from("123456789012345678901234567890".parse::<BigInt>().unwrap())
        );
    }

    #[test]
    fn test_decimal_form() {
        assert_eq!(parse("1.5"), frac!(3 / 2));
        assert_eq!(parse("-2.50"), frac!(-5 / 2));
        assert_eq!(parse("0.1"), frac!(1 / 10));
        assert_eq!(parse("1E2"), frac!(100));
        assert_eq!(parse("1e+2"), frac!(100));
        assert_eq!(parse("1.5e-3"), frac!(3 / 2000));
        assert_eq!(parse("25e-2"), frac!(1 / 4));
        assert_eq!(parse("3.14159"), frac!(314159 / 100000));
    }

    #[test]
    fn test_zero_denominator() {
        assert_eq!(parse_fraction("1/0"), Err(FractionError::DivisionByZero));
        assert_eq!(parse_fraction(" -0/0 "), Err(FractionError::DivisionByZero));
    }

    #[test]
    fn test_invalid_format() {
        for input in [
            "", " ", "abc", "1/", "/2", "1/-2", "1/2/3", "1 /2", "1/ 2", "- 1", "--1", ".5", "5.",
            "1e", "1e+", "1.5/2", "3/4.0", "0x10", "1_000", "inf", "nan", "1 2",
        ] {
            assert_eq!(
                parse_fraction(input),
                Err(FractionError::InvalidFormat(input.to_owned())),
                "{input:?}"
            );
        }
    }

    #[test]
    fn test_literal_shapes() {
        assert_eq!(
            literal("-1.25e1"),
            Ok((
                "",
                (
                    true,
                    Literal::Decimal {
                        mantissa: BigInt::from(125),
                        exponent: -1
                    }
                )
            ))
        );
        assert_eq!(
            literal(" 2/0"),
            Ok(("", (false, Literal::Ratio(BigInt::from(2), BigInt::from(0)))))
        );
    }

    proptest! {
        #[test]
        fn test_display_roundtrip(n in any::<i64>(), d in 1i64..i64::MAX) {
            let f = Fraction::new(n, d).unwrap();
            prop_assert_eq!(parse(&f.to_string()), f);
        }

        #[test]
        fn test_decimal_matches_float_text(x in -1e6f64..1e6f64) {
            // Debug output is the shortest decimal that reads back as x, sometimes with an exponent.
            let text = format!("{x:?}");
            let parsed = parse(&text);
            prop_assert_eq!(parsed.to_f64(), x);
        }
    }
}
