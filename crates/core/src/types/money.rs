//! Rupiah amounts and kWh quantities.
//!
//! The backend sends both as plain JSON numbers, so they serialize through
//! `rust_decimal::serde::float` and keep decimal arithmetic on the client.
//! `Display` follows Indonesian grouping (`.` for thousands, `,` for the
//! decimal separator, at most three fraction digits).

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount in Indonesian rupiah.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rupiah(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Rupiah {
    /// Zero rupiah.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole-rupiah constructor.
    #[must_use]
    pub fn from_whole(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Rupiah paid per kWh, if `kwh` is non-zero.
    #[must_use]
    pub fn per_kwh(&self, kwh: Kwh) -> Option<Self> {
        self.0.checked_div(kwh.0).map(|rate| Self(rate.round_dp(2)))
    }
}

impl fmt::Display for Rupiah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rp {}", group_id(self.0))
    }
}

/// A quantity of electricity in kilowatt-hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kwh(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Kwh {
    /// Create a quantity.
    #[must_use]
    pub const fn new(kwh: Decimal) -> Self {
        Self(kwh)
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Kwh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kWh", group_id(self.0))
    }
}

/// Format a decimal with `id-ID` grouping.
fn group_id(value: Decimal) -> String {
    let rounded = value.round_dp(3).normalize();
    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((&digits, ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if !frac_part.is_empty() {
        grouped.push(',');
        grouped.push_str(frac_part);
    }
    grouped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_rupiah_display_groups_thousands() {
        assert_eq!(Rupiah::from_whole(1_234_567).to_string(), "Rp 1.234.567");
        assert_eq!(Rupiah::from_whole(999).to_string(), "Rp 999");
        assert_eq!(Rupiah::from_whole(1000).to_string(), "Rp 1.000");
        assert_eq!(Rupiah::ZERO.to_string(), "Rp 0");
    }

    #[test]
    fn test_fraction_uses_comma() {
        assert_eq!(Kwh::new(dec("1234.5")).to_string(), "1.234,5 kWh");
        assert_eq!(Kwh::new(dec("0.12345")).to_string(), "0,123 kWh");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(Rupiah::from_whole(-25_000).to_string(), "Rp -25.000");
    }

    #[test]
    fn test_deserializes_json_numbers() {
        let amount: Rupiah = serde_json::from_str("50000").unwrap();
        assert_eq!(amount, Rupiah::from_whole(50_000));

        let kwh: Kwh = serde_json::from_str("33.5").unwrap();
        assert_eq!(kwh.value(), dec("33.5"));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Rupiah::from_whole(20_000)).unwrap();
        assert_eq!(json, "20000.0");
    }

    #[test]
    fn test_per_kwh() {
        let rate = Rupiah::from_whole(100_000).per_kwh(Kwh::new(dec("66.7")));
        assert_eq!(rate.unwrap().amount(), dec("1499.25"));
        assert!(Rupiah::from_whole(1).per_kwh(Kwh::default()).is_none());
    }
}
