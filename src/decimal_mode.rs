//! Precision and rounding configuration for explicit rounding steps.

use std::{fmt, str::FromStr};

use bigdecimal::{
    BigDecimal,
    num_bigint::BigInt,
    num_traits::{Signed, Zero},
};

/// Most significant digits a [`DecimalMode`] may keep.
pub const MAX_PRECISION: u64 = 100_000;

/// How a value is rounded when digits must be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundingMode {
    /// Away from zero
    Up,
    /// Toward zero
    Down,
    /// Toward positive infinity
    Ceiling,
    /// Toward negative infinity
    Floor,
    /// Nearest neighbour, ties away from zero
    HalfUp,
    /// Nearest neighbour, ties toward zero
    HalfDown,
    /// Nearest neighbour, ties to the even neighbour
    #[default]
    HalfEven,
}

impl RoundingMode {
    pub const ALL: [RoundingMode; 7] = [
        RoundingMode::Up,
        RoundingMode::Down,
        RoundingMode::Ceiling,
        RoundingMode::Floor,
        RoundingMode::HalfUp,
        RoundingMode::HalfDown,
        RoundingMode::HalfEven,
    ];

    pub fn strategy(self) -> bigdecimal::RoundingMode {
        match self {
            RoundingMode::Up => bigdecimal::RoundingMode::Up,
            RoundingMode::Down => bigdecimal::RoundingMode::Down,
            RoundingMode::Ceiling => bigdecimal::RoundingMode::Ceiling,
            RoundingMode::Floor => bigdecimal::RoundingMode::Floor,
            RoundingMode::HalfUp => bigdecimal::RoundingMode::HalfUp,
            RoundingMode::HalfDown => bigdecimal::RoundingMode::HalfDown,
            RoundingMode::HalfEven => bigdecimal::RoundingMode::HalfEven,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RoundingMode::Up => "up",
            RoundingMode::Down => "down",
            RoundingMode::Ceiling => "ceiling",
            RoundingMode::Floor => "floor",
            RoundingMode::HalfUp => "half-up",
            RoundingMode::HalfDown => "half-down",
            RoundingMode::HalfEven => "half-even",
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoundingMode {
    type Err = String;

    /// Accepts the kebab-case names, case-insensitively, with `_` for `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        RoundingMode::ALL
            .into_iter()
            .find(|mode| mode.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = RoundingMode::ALL.iter().map(|m| m.name()).collect();
                format!("unknown rounding mode '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// Significant-digit precision plus rounding mode.
///
/// Literals are kept exactly as scanned; the mode only applies where a
/// result is explicitly rounded (division, negative and fractional powers,
/// `avg`, `floor`, `ceil`, `round`, the float-backed functions and final
/// formatting).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalMode {
    precision: u64,
    rounding: RoundingMode,
}

impl Default for DecimalMode {
    /// 16 significant digits, half-even.
    fn default() -> Self {
        DecimalMode {
            precision: 16,
            rounding: RoundingMode::HalfEven,
        }
    }
}

impl DecimalMode {
    /// Returns `None` unless `1 <= precision <= MAX_PRECISION`.
    pub fn new(precision: u64, rounding: RoundingMode) -> Option<Self> {
        (1..=MAX_PRECISION)
            .contains(&precision)
            .then_some(DecimalMode {
                precision,
                rounding,
            })
    }

    pub fn precision(&self) -> u64 {
        self.precision
    }

    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    pub fn with_precision(self, precision: u64) -> Option<Self> {
        DecimalMode::new(precision, self.rounding)
    }

    pub fn with_rounding(self, rounding: RoundingMode) -> Self {
        DecimalMode { rounding, ..self }
    }

    /// Rounds `value` to at most `precision` significant digits.
    ///
    /// Values that already fit are returned unchanged, trailing zeros
    /// included.
    pub fn round(&self, value: &BigDecimal) -> BigDecimal {
        let digits = value.digits();
        if digits <= self.precision {
            return value.clone();
        }

        let (_, scale) = value.as_bigint_and_exponent();
        let target = scale - (digits - self.precision) as i64;
        let strategy = self.rounding.strategy();
        let rounded = value.with_scale_round(target, strategy);

        // Carrying into a new leading digit (9.99 -> 10.0) leaves one digit
        // too many; the extra one is a zero and drops exactly.
        if rounded.digits() > self.precision {
            rounded.with_scale_round(target - 1, strategy)
        } else {
            rounded
        }
    }

    /// Rounds `value` to `scale` decimal places with the configured mode.
    pub fn round_to_scale(&self, value: &BigDecimal, scale: i64) -> BigDecimal {
        value.with_scale_round(scale, self.rounding.strategy())
    }

    /// `dividend / divisor`, correctly rounded to the configured precision.
    ///
    /// Exact quotients keep the natural scale (`1.20 / 2 = 0.60`,
    /// `1 / 4 = 0.25`). Returns `None` when `divisor` is zero.
    pub fn divide(&self, dividend: &BigDecimal, divisor: &BigDecimal) -> Option<BigDecimal> {
        if divisor.is_zero() {
            return None;
        }
        if dividend.is_zero() {
            return Some(BigDecimal::zero());
        }

        let (numerator, numerator_scale) = dividend.as_bigint_and_exponent();
        let (denominator, denominator_scale) = divisor.as_bigint_and_exponent();
        let natural_scale = numerator_scale - denominator_scale;

        // Widen the numerator so the quotient has two digits beyond the precision
        let shift = (self.precision + 2 + divisor.digits()).saturating_sub(dividend.digits());
        let ten = BigInt::from(10);
        let widened = numerator * ten.pow(shift as u32);
        let mut quotient = &widened / &denominator;
        let exact = (&widened % &denominator).is_zero();
        let mut scale = natural_scale + shift as i64;

        if exact {
            while scale > natural_scale && (&quotient % &ten).is_zero() {
                quotient /= &ten;
                scale -= 1;
            }
        } else {
            // A non-zero sticky digit keeps a discarded remainder from
            // looking like an exact midpoint.
            let sticky = if quotient.is_negative() {
                BigInt::from(-1)
            } else {
                BigInt::from(1)
            };
            quotient = quotient * &ten + sticky;
            scale += 1;
        }

        Some(self.round(&BigDecimal::new(quotient, scale)))
    }
}

/// Converts a float result back to a decimal through its shortest
/// round-trip text. `None` for NaN and infinities.
pub fn from_float(value: f64) -> Option<BigDecimal> {
    if !value.is_finite() {
        return None;
    }
    value.to_string().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn mode(precision: u64, rounding: RoundingMode) -> DecimalMode {
        DecimalMode::new(precision, rounding).unwrap()
    }

    #[test]
    fn test_precision_bounds() {
        assert!(DecimalMode::new(0, RoundingMode::HalfUp).is_none());
        assert!(DecimalMode::new(MAX_PRECISION + 1, RoundingMode::HalfUp).is_none());
        assert!(DecimalMode::new(40, RoundingMode::HalfUp).is_some());
    }

    #[test]
    fn test_round_significant_digits() {
        let half_up = mode(3, RoundingMode::HalfUp);
        assert_eq!(half_up.round(&d("1.2345")).to_plain_string(), "1.23");
        assert_eq!(half_up.round(&d("0.0012355")).to_plain_string(), "0.00124");
        assert_eq!(half_up.round(&d("123456")).to_plain_string(), "123000");

        let floor = half_up.with_rounding(RoundingMode::Floor);
        assert_eq!(floor.round(&d("-1.231")).to_plain_string(), "-1.24");
    }

    #[test]
    fn test_round_leaves_short_values_alone() {
        let default = DecimalMode::default();
        assert_eq!(default.round(&d("1")).to_plain_string(), "1");
        assert_eq!(default.round(&d("0.25")).to_plain_string(), "0.25");
        assert_eq!(default.round(&d("3.30")).to_plain_string(), "3.30");
        assert_eq!(default.round(&d("10000000")).to_plain_string(), "10000000");
    }

    #[test]
    fn test_round_carry() {
        let two = mode(2, RoundingMode::HalfUp);
        let rounded = two.round(&d("9.99"));
        assert_eq!(rounded, d("10"));
        assert!(rounded.digits() <= 2);
    }

    #[test]
    fn test_divide_exact_keeps_natural_scale() {
        let default = DecimalMode::default();
        assert_eq!(default.divide(&d("1"), &d("4")).unwrap().to_plain_string(), "0.25");
        assert_eq!(default.divide(&d("6"), &d("3")).unwrap().to_plain_string(), "2");
        assert_eq!(default.divide(&d("1.20"), &d("2")).unwrap().to_plain_string(), "0.60");
        assert_eq!(default.divide(&d("0"), &d("7")).unwrap().to_plain_string(), "0");
        assert!(default.divide(&d("1"), &d("0")).is_none());
    }

    #[test]
    fn test_divide_rounds_inexact_quotients() {
        let default = DecimalMode::default();
        assert_eq!(
            default.divide(&d("1"), &d("3")).unwrap().to_plain_string(),
            "0.3333333333333333"
        );
        assert_eq!(
            default.divide(&d("-2"), &d("3")).unwrap().to_plain_string(),
            "-0.6666666666666667"
        );
        assert_eq!(
            mode(3, RoundingMode::Down).divide(&d("2"), &d("3")).unwrap().to_plain_string(),
            "0.666"
        );
        assert_eq!(
            mode(3, RoundingMode::Floor).divide(&d("-2"), &d("3")).unwrap().to_plain_string(),
            "-0.667"
        );
    }

    #[test]
    fn test_divide_sticky_digit_breaks_false_ties() {
        // 0.45 / 3 = 0.15 is a true tie; 0.4501 / 3 = 0.150033... truncates
        // to 0.1500 but lies above the midpoint.
        let half_down = mode(1, RoundingMode::HalfDown);
        assert_eq!(
            half_down.divide(&d("0.45"), &d("3")).unwrap().to_plain_string(),
            "0.1"
        );
        assert_eq!(
            half_down.divide(&d("0.4501"), &d("3")).unwrap().to_plain_string(),
            "0.2"
        );
    }

    #[test]
    fn test_from_float() {
        assert_eq!(from_float(4.0).unwrap().to_plain_string(), "4");
        assert_eq!(from_float(0.1).unwrap().to_plain_string(), "0.1");
        assert!(from_float(f64::NAN).is_none());
        assert!(from_float(f64::INFINITY).is_none());
    }

    #[test]
    fn test_rounding_mode_names() {
        assert_eq!(RoundingMode::from_str("HALF_UP").unwrap(), RoundingMode::HalfUp);
        assert_eq!(RoundingMode::from_str("ceiling").unwrap(), RoundingMode::Ceiling);
        assert!(RoundingMode::from_str("sideways").is_err());
        for mode in RoundingMode::ALL {
            assert_eq!(RoundingMode::from_str(mode.name()).unwrap(), mode);
        }
    }
}
