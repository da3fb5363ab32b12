//! Exact fixed-point decimal types for DEX prices and quantities.
//!
//! Both types store a scaled `i64` and never touch floating point: every
//! operation is exact integer arithmetic, with half-up rounding applied only
//! where a rescale genuinely discards precision (shrinking the number of
//! decimal digits kept).

use crate::errors::FixedPointError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

const POW10: [i64; 19] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
];

const MAX_PRECISION: u32 = (POW10.len() - 1) as u32;

fn pow10(n: u32) -> i64 {
    POW10[n as usize]
}

/// Divide `value` by `divisor`, rounding half away from zero, via an `i128`
/// intermediate so neither the multiply-back nor the remainder check can
/// overflow `i64`.
fn round_div_half_up(value: i64, divisor: i64) -> i64 {
    let sign: i128 = if value < 0 { -1 } else { 1 };
    let abs = (value as i128).unsigned_abs() as i128;
    let divisor = divisor as i128;
    let quotient = abs / divisor;
    let remainder = abs % divisor;
    let rounded = if remainder * 2 >= divisor { quotient + 1 } else { quotient };
    (sign * rounded) as i64
}

/// Parse a decimal string and scale it to `precision` decimal digits,
/// rounding half up. Goes through `rust_decimal::Decimal` rather than a
/// hand-rolled digit scanner, the same crate the teacher's own
/// `UsdFixedPoint8`/`PercentageFixedPoint4` parse through.
fn parse_decimal_str(input: &str, precision: u32) -> Result<i64, FixedPointError> {
    let bad = || FixedPointError::InvalidDecimal { input: input.to_string() };
    let decimal = Decimal::from_str(input.trim()).map_err(|_| bad())?;
    let scaled = decimal * Decimal::from(pow10(precision));
    let rounded = scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_i64().ok_or_else(|| FixedPointError::Overflow { value: rounded.to_string() })
}

fn rescale(magnitude: i128, from_precision: u32, to_precision: u32) -> Result<i64, FixedPointError> {
    let spread = from_precision.max(to_precision) - from_precision.min(to_precision);
    if spread > MAX_PRECISION {
        return Err(FixedPointError::PrecisionTooLarge { precision: from_precision.max(to_precision) });
    }
    let rescaled = if from_precision == to_precision {
        magnitude
    } else if from_precision < to_precision {
        magnitude * pow10(to_precision - from_precision) as i128
    } else {
        round_div_half_up(
            magnitude.try_into().map_err(|_| FixedPointError::Overflow { value: magnitude.to_string() })?,
            pow10(from_precision - to_precision),
        ) as i128
    };
    rescaled
        .try_into()
        .map_err(|_| FixedPointError::Overflow { value: rescaled.to_string() })
}

/// `num_decimals` is clamped to `[0, precision]`: a caller asking for more
/// digits than the type actually stores gets the type's full precision back,
/// not fabricated trailing zeros.
fn render(raw: i64, precision: u32, num_decimals: i32, strip_if_negative: bool) -> String {
    let precision = precision as i32;
    let (strip_trailing, target) =
        if num_decimals < 0 { (strip_if_negative, precision) } else { (false, num_decimals.clamp(0, precision)) };
    let scaled = if target == precision { raw } else { round_div_half_up(raw, pow10((precision - target) as u32)) };
    let sign = if scaled < 0 { "-" } else { "" };
    let abs = scaled.unsigned_abs();
    if target <= 0 {
        return format!("{sign}{abs}");
    }
    let divisor = pow10(target as u32) as u64;
    let int_part = abs / divisor;
    let frac_part = abs % divisor;
    let mut s = format!("{sign}{int_part}.{frac_part:0width$}", width = target as usize);
    if strip_trailing {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

/// A DEX price: 7 decimal digits of exact precision, stored as `raw = price
/// * 10_000_000`. [`DexPrice::INVALID`] is a sentinel distinct from any real
/// price, used where the wire protocol has no value to report.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DexPrice {
    raw: i64,
}

impl DexPrice {
    pub const PRECISION: u32 = 7;
    pub const SCALE: i64 = 10_000_000;
    pub const INVALID: DexPrice = DexPrice { raw: i64::MIN };

    pub const fn from_raw(raw: i64) -> Self {
        Self { raw }
    }

    pub const fn raw_value(&self) -> i64 {
        self.raw
    }

    pub const fn is_invalid(&self) -> bool {
        self.raw == i64::MIN
    }

    /// Rescale an integer `value` expressed with `precision` decimal digits
    /// into this type's native 7-digit scale, rounding half up if `precision`
    /// exceeds 7.
    pub fn from_value_and_precision(value: i64, precision: u32) -> Result<Self, FixedPointError> {
        Ok(Self { raw: rescale(value as i128, precision, Self::PRECISION)? })
    }

    pub fn from_decimal_str(input: &str) -> Result<Self, FixedPointError> {
        Ok(Self { raw: parse_decimal_str(input, Self::PRECISION)? })
    }

    /// Render with `num_decimals` decimal digits, half-up rounded. A
    /// negative `num_decimals` renders full precision with trailing zeros
    /// (and a bare trailing point) stripped. [`DexPrice::INVALID`] renders
    /// as the literal string `"INVALID"`, matching the original client.
    pub fn to_str(&self, num_decimals: i32) -> String {
        if self.is_invalid() {
            return "INVALID".to_string();
        }
        render(self.raw, Self::PRECISION, num_decimals, true)
    }

    pub fn checked_add(&self, other: DexPrice) -> Option<DexPrice> {
        if self.is_invalid() || other.is_invalid() {
            return None;
        }
        self.raw.checked_add(other.raw).map(DexPrice::from_raw)
    }

    pub fn checked_sub(&self, other: DexPrice) -> Option<DexPrice> {
        if self.is_invalid() || other.is_invalid() {
            return None;
        }
        self.raw.checked_sub(other.raw).map(DexPrice::from_raw)
    }
}

impl fmt::Display for DexPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str(-1))
    }
}

impl fmt::Debug for DexPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DexPrice({self})")
    }
}

impl Default for DexPrice {
    fn default() -> Self {
        DexPrice::INVALID
    }
}

/// A DEX quantity: 8 decimal digits of exact precision, stored as `raw =
/// quantity * 100_000_000`. Unlike [`DexPrice`] there is no sentinel; an
/// absent quantity is simply zero.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DexQuantity {
    raw: i64,
}

impl DexQuantity {
    pub const PRECISION: u32 = 8;
    pub const SCALE: i64 = 100_000_000;

    pub const fn from_raw(raw: i64) -> Self {
        Self { raw }
    }

    pub const fn raw_value(&self) -> i64 {
        self.raw
    }

    pub const fn zero() -> Self {
        Self { raw: 0 }
    }

    pub fn from_value_and_precision(value: i64, precision: u32) -> Result<Self, FixedPointError> {
        Ok(Self { raw: rescale(value as i128, precision, Self::PRECISION)? })
    }

    pub fn from_decimal_str(input: &str) -> Result<Self, FixedPointError> {
        Ok(Self { raw: parse_decimal_str(input, Self::PRECISION)? })
    }

    /// Render with `num_decimals` decimal digits, half-up rounded. A
    /// negative `num_decimals` renders full precision with trailing zeros
    /// stripped (but never a bare integer loses its sign or digits).
    pub fn to_str(&self, num_decimals: i32) -> String {
        render(self.raw, Self::PRECISION, num_decimals, true)
    }

    pub fn checked_add(&self, other: DexQuantity) -> Option<DexQuantity> {
        self.raw.checked_add(other.raw).map(DexQuantity::from_raw)
    }

    pub fn checked_sub(&self, other: DexQuantity) -> Option<DexQuantity> {
        self.raw.checked_sub(other.raw).map(DexQuantity::from_raw)
    }
}

impl fmt::Display for DexQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str(-1))
    }
}

impl fmt::Debug for DexQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DexQuantity({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_round_trip() {
        let p = DexPrice::from_decimal_str("123.4500000").unwrap();
        assert_eq!(p.to_str(-1), "123.45");
        assert_eq!(p.to_str(2), "123.45");
        assert_eq!(p.to_str(0), "123");
    }

    #[test]
    fn price_half_up_rounding() {
        let p = DexPrice::from_decimal_str("1.00000005").unwrap();
        assert_eq!(p.to_str(7), "1.0000001");
    }

    #[test]
    fn price_negative() {
        let p = DexPrice::from_decimal_str("-0.5").unwrap();
        assert_eq!(p.to_str(-1), "-0.5");
    }

    #[test]
    fn price_invalid_renders_the_literal_string_invalid() {
        assert_eq!(DexPrice::INVALID.to_str(-1), "INVALID");
        assert_eq!(DexPrice::INVALID.to_string(), "INVALID");
    }

    #[test]
    fn to_str_clamps_num_decimals_to_the_type_s_precision() {
        let p = DexPrice::from_decimal_str("1.5").unwrap();
        assert_eq!(p.to_str(10), p.to_str(7));
    }

    #[test]
    fn price_invalid_poisons_arithmetic() {
        let valid = DexPrice::from_decimal_str("1.0").unwrap();
        assert_eq!(valid.checked_add(DexPrice::INVALID), None);
    }

    #[test]
    fn quantity_round_trip() {
        let q = DexQuantity::from_decimal_str("10.00000000").unwrap();
        assert_eq!(q.to_str(-1), "10");
        assert_eq!(q.to_str(3), "10.000");
    }

    #[test]
    fn quantity_default_is_zero() {
        assert_eq!(DexQuantity::default(), DexQuantity::zero());
    }

    #[test]
    fn from_value_and_precision_widens() {
        let p = DexPrice::from_value_and_precision(5, 2).unwrap();
        assert_eq!(p.to_str(-1), "0.05");
    }

    #[test]
    fn from_value_and_precision_narrows_with_rounding() {
        let p = DexPrice::from_value_and_precision(125, 9).unwrap();
        assert_eq!(p.raw_value(), round_div_half_up(125, 100));
    }

    #[test]
    fn precision_spread_beyond_the_pow10_table_errors_instead_of_panicking() {
        let err = DexPrice::from_value_and_precision(1, 100).unwrap_err();
        assert!(matches!(err, FixedPointError::PrecisionTooLarge { .. }));
    }
}
