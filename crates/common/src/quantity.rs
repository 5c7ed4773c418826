use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected quantity input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("Quantity must be a number")]
    NotNumeric,

    #[error("Quantity must be at least 1")]
    TooSmall,

    #[error("Quantity is too large")]
    TooLarge,
}

/// A line-item quantity of at least one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// Parses raw user input such as a form field value.
    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        let value = input
            .trim()
            .parse::<i64>()
            .map_err(|_| QuantityError::NotNumeric)?;
        Self::try_from(value)
    }

    /// Returns the number of units.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 1 {
            return Err(QuantityError::TooSmall);
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
