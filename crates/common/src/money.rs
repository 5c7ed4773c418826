//! Money amounts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Money amount represented in cents to avoid floating point issues.
///
/// The backend services exchange amounts as JSON decimal numbers (`19.99`), so the
/// wire form is a number of whole currency units, rounded to the nearest cent on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Converts a decimal amount of currency units, rounding to the nearest cent.
    pub fn from_decimal(amount: f64) -> Self {
        Self {
            cents: (amount * 100.0).round() as i64,
        }
    }

    /// Returns the amount in cents.
    pub const fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the amount as a decimal number of currency units.
    pub fn as_decimal(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Returns the dollar portion (whole number).
    pub const fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub const fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub const fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.cents == 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        if !amount.is_finite() {
            return Err(serde::de::Error::custom("money amount must be finite"));
        }
        Ok(Money::from_decimal(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(100).to_string(), "$1.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
    }

    #[test]
    fn test_decimal_wire_form_rounds_to_cents() {
        let money: Money = serde_json::from_str("19.99").unwrap();
        assert_eq!(money.cents(), 1999);

        let money: Money = serde_json::from_str("10").unwrap();
        assert_eq!(money.cents(), 1000);

        let money: Money = serde_json::from_str("0.105").unwrap();
        assert_eq!(money.cents(), 11);
    }

    #[test]
    fn test_serializes_as_decimal_number() {
        let json = serde_json::to_value(Money::from_cents(2550)).unwrap();
        assert_eq!(json, serde_json::json!(25.5));
    }

    #[test]
    fn test_predicates() {
        assert!(Money::from_cents(100).is_positive());
        assert!(Money::zero().is_zero());
        assert!(!Money::from_cents(-1).is_positive());
    }
}
