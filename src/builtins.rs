//! Default constants and functions seeded into every [`Expressions`](crate::Expressions).
//!
//! Everything here is exact decimal arithmetic except `ln`, `log` and `√`,
//! which go through `f64` and carry only double precision.

use std::str::FromStr;

use bigdecimal::{
    BigDecimal,
    num_traits::{Signed, ToPrimitive, Zero},
};

use crate::{
    decimal_mode::{self, DecimalMode, MAX_PRECISION, RoundingMode},
    evaluator::EvalError,
    function::{Arity, Builtin},
};

/// π to 100 decimal places.
const PI: &str = "3.1415926535897932384626433832795028841971693993751058209749445923078164062862089986280348253421170679";

/// Euler's number to 100 decimal places.
const E: &str = "2.7182818284590452353602874713526624977572470936999595749669676277240766303535475945713821785251664274";

/// Named constants: `π`, its ASCII alias `pi`, and `e`.
pub fn constants() -> Vec<(&'static str, BigDecimal)> {
    let pi = BigDecimal::from_str(PI).expect("π digits are a valid decimal");
    let e = BigDecimal::from_str(E).expect("e digits are a valid decimal");
    vec![("π", pi.clone()), ("pi", pi), ("e", e)]
}

/// All default functions.
pub fn functions() -> Vec<Builtin> {
    vec![
        Builtin::new("abs", Arity::Exact(1), abs),
        Builtin::new("sum", Arity::AtLeast(1), sum),
        Builtin::new("avg", Arity::AtLeast(1), avg),
        Builtin::new("floor", Arity::Exact(1), floor),
        Builtin::new("ceil", Arity::Exact(1), ceil),
        Builtin::new("round", Arity::Between(1, 2), round),
        Builtin::new("min", Arity::AtLeast(1), min),
        Builtin::new("max", Arity::AtLeast(1), max),
        Builtin::new("if", Arity::Exact(3), if_),
        Builtin::new("ln", Arity::Exact(1), ln),
        Builtin::new("log", Arity::Exact(1), log),
        Builtin::new("√", Arity::Exact(1), sqrt),
        Builtin::new("sqrt", Arity::Exact(1), sqrt),
    ]
}

fn abs(args: &[BigDecimal], _mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
    Ok(args[0].abs())
}

fn sum(args: &[BigDecimal], _mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
    Ok(args.iter().fold(BigDecimal::zero(), |acc, x| acc + x))
}

fn avg(args: &[BigDecimal], mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
    let total = sum(args, mode)?;
    let count = BigDecimal::from(args.len() as u64);
    mode.divide(&total, &count)
        .ok_or(EvalError::DivisionByZero)
}

/// Largest integer not above `x`, then rounded toward −∞ if it has more
/// digits than the precision.
fn floor(args: &[BigDecimal], mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
    let integer = args[0].with_scale_round(0, RoundingMode::Floor.strategy());
    Ok(mode.with_rounding(RoundingMode::Floor).round(&integer))
}

/// Smallest integer not below `x`, then rounded toward +∞ if it has more
/// digits than the precision.
fn ceil(args: &[BigDecimal], mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
    let integer = args[0].with_scale_round(0, RoundingMode::Ceiling.strategy());
    Ok(mode.with_rounding(RoundingMode::Ceiling).round(&integer))
}

fn round(args: &[BigDecimal], mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
    let scale = match args.get(1) {
        None => 0,
        Some(scale) => {
            if !scale.is_integer() || scale.is_negative() {
                return Err(EvalError::InvalidArgument(format!(
                    "round scale must be a non-negative integer, got {}",
                    scale.to_plain_string()
                )));
            }
            match scale.to_u64() {
                Some(s) if s <= MAX_PRECISION => s as i64,
                _ => {
                    return Err(EvalError::InvalidArgument(format!(
                        "round scale must be at most {}, got {}",
                        MAX_PRECISION,
                        scale.to_plain_string()
                    )));
                }
            }
        }
    };
    Ok(mode.round_to_scale(&args[0], scale))
}

fn min(args: &[BigDecimal], _mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
    let smallest = args[1..]
        .iter()
        .fold(&args[0], |best, x| if x < best { x } else { best });
    Ok(smallest.clone())
}

fn max(args: &[BigDecimal], _mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
    let largest = args[1..]
        .iter()
        .fold(&args[0], |best, x| if x > best { x } else { best });
    Ok(largest.clone())
}

fn if_(args: &[BigDecimal], _mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
    if args[0].is_zero() {
        Ok(args[2].clone())
    } else {
        Ok(args[1].clone())
    }
}

/// Applies an `f64` function, converting in and out of [`BigDecimal`].
pub(crate) fn via_f64(
    name: &str,
    x: &BigDecimal,
    mode: &DecimalMode,
    f: impl Fn(f64) -> f64,
) -> Result<BigDecimal, EvalError> {
    let input = x
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            EvalError::InvalidArgument(format!(
                "{} cannot convert {} to a float",
                name,
                x.to_plain_string()
            ))
        })?;
    decimal_mode::from_float(f(input))
        .map(|result| mode.round(&result))
        .ok_or_else(|| {
            EvalError::InvalidArgument(format!(
                "{}({}) is not representable",
                name,
                x.to_plain_string()
            ))
        })
}

fn ln(args: &[BigDecimal], mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
    if !args[0].is_positive() {
        return Err(EvalError::InvalidArgument(format!(
            "ln is undefined for {}",
            args[0].to_plain_string()
        )));
    }
    via_f64("ln", &args[0], mode, f64::ln)
}

fn log(args: &[BigDecimal], mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
    if !args[0].is_positive() {
        return Err(EvalError::InvalidArgument(format!(
            "log is undefined for {}",
            args[0].to_plain_string()
        )));
    }
    via_f64("log", &args[0], mode, f64::log10)
}

fn sqrt(args: &[BigDecimal], mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
    if args[0].is_negative() {
        return Err(EvalError::InvalidArgument(format!(
            "square root is undefined for {}",
            args[0].to_plain_string()
        )));
    }
    via_f64("√", &args[0], mode, f64::sqrt)
}
