//! Monetary amount type for values read from PHC and from bank exports.
//!
//! Bank sheets arrive in whatever shape the bank's export produced: plain
//! `1234.56`, Portuguese `1.234,56`, Anglo `1,234.56`, with or without a
//! euro sign. This module wraps `Decimal` and normalizes all of those forms
//! on parse.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// A monetary amount.
///
/// Wraps `Decimal`. Parsing accepts euro signs, thousands separators and
/// both comma- and dot-decimal conventions. Display renders a
/// human-friendly form with thousands separators; use [`Amount::to_cell`]
/// for the plain two-decimal form written to report cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Parses a cell value, coercing anything unparseable to zero.
    ///
    /// This is the aggregation path: one bad cell must never fail a whole
    /// column sum.
    pub fn parse_lenient(s: &str) -> Self {
        Amount::from_str(s).unwrap_or_default()
    }

    /// Rounds to two decimal places, half away from zero.
    pub fn round_2dp(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// The plain fixed two-decimal form written to report cells.
    pub fn to_cell(&self) -> String {
        format!("{:.2}", self.round_2dp().0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Strip the currency sign and any whitespace, including the
        // non-breaking spaces some exports use as thousands separators.
        let stripped: String = s
            .trim()
            .chars()
            .filter(|&c| c != '€' && !c.is_whitespace())
            .collect();

        if stripped.is_empty() {
            return Ok(Amount::default());
        }

        let normalized = normalize_separators(&stripped);
        let value = Decimal::from_str(&normalized).map_err(AmountError)?;
        Ok(Amount(value))
    }
}

/// Reduces a numeric string to dot-decimal form with no thousands
/// separators.
///
/// When both `.` and `,` are present the rightmost one is the decimal
/// separator. A lone `,` is a decimal separator; repeated occurrences of
/// either character are thousands separators.
fn normalize_separators(s: &str) -> String {
    let last_dot = s.rfind('.');
    let last_comma = s.rfind(',');
    match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => {
            if comma > dot {
                // Portuguese form: 1.234,56
                s.replace('.', "").replace(',', ".")
            } else {
                // Anglo form: 1,234.56
                s.replace(',', "")
            }
        }
        (None, Some(_)) => {
            if s.matches(',').count() == 1 {
                s.replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        _ => {
            if s.matches('.').count() > 1 {
                s.replace('.', "")
            } else {
                s.to_string()
            }
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.0.is_sign_negative() && !self.0.is_zero() {
            ("-", self.0.abs())
        } else {
            ("", self.0)
        };
        write!(
            f,
            "{sign}{}",
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        )
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(Amount::from_str("50.00").unwrap().value(), dec("50.00"));
        assert_eq!(Amount::from_str("-50.00").unwrap().value(), dec("-50.00"));
        assert_eq!(Amount::from_str("10.5").unwrap().value(), dec("10.5"));
    }

    #[test]
    fn test_parse_portuguese_form() {
        assert_eq!(Amount::from_str("1.234,56").unwrap().value(), dec("1234.56"));
        assert_eq!(
            Amount::from_str("-1.234.567,89").unwrap().value(),
            dec("-1234567.89")
        );
        assert_eq!(Amount::from_str("12,50").unwrap().value(), dec("12.50"));
    }

    #[test]
    fn test_parse_anglo_form() {
        assert_eq!(Amount::from_str("1,234.56").unwrap().value(), dec("1234.56"));
        assert_eq!(
            Amount::from_str("1,234,567.89").unwrap().value(),
            dec("1234567.89")
        );
    }

    #[test]
    fn test_parse_euro_sign_and_spaces() {
        assert_eq!(Amount::from_str("€ 50,00").unwrap().value(), dec("50.00"));
        assert_eq!(
            Amount::from_str("1\u{a0}234,56 €").unwrap().value(),
            dec("1234.56")
        );
    }

    #[test]
    fn test_parse_empty_is_zero() {
        assert_eq!(Amount::from_str("").unwrap(), Amount::ZERO);
        assert_eq!(Amount::from_str("  ").unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_parse_garbage_errors() {
        assert!(Amount::from_str("abc").is_err());
        assert!(Amount::from_str("12abc").is_err());
    }

    #[test]
    fn test_parse_lenient_coerces_to_zero() {
        assert_eq!(Amount::parse_lenient("abc"), Amount::ZERO);
        assert_eq!(Amount::parse_lenient("10.5").value(), dec("10.5"));
    }

    #[test]
    fn test_round_2dp_half_away_from_zero() {
        assert_eq!(
            Amount::from_str("950.005").unwrap().round_2dp().value(),
            dec("950.01")
        );
        assert_eq!(
            Amount::from_str("-950.005").unwrap().round_2dp().value(),
            dec("-950.01")
        );
    }

    #[test]
    fn test_to_cell() {
        assert_eq!(Amount::from_str("75").unwrap().to_cell(), "75.00");
        assert_eq!(Amount::from_str("950.005").unwrap().to_cell(), "950.01");
        assert_eq!(Amount::from_str("-0.1").unwrap().to_cell(), "-0.10");
    }

    #[test]
    fn test_display_pretty() {
        assert_eq!(Amount::from_str("1234.5").unwrap().to_string(), "1,234.50");
        assert_eq!(
            Amount::from_str("-60000").unwrap().to_string(),
            "-60,000.00"
        );
    }

    #[test]
    fn test_sum() {
        let total: Amount = ["10.5", "abc", "5"]
            .iter()
            .map(|s| Amount::parse_lenient(s))
            .sum();
        assert_eq!(total.value(), dec("15.5"));
    }

    #[test]
    fn test_serde_round_trip() {
        let amount = Amount::from_str("1234.56").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"1234.56\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
