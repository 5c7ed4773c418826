use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected identifier input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input was not an integer.
    #[error("{kind} must be a number, got '{input}'")]
    NotNumeric { kind: &'static str, input: String },

    /// The input was zero or negative.
    #[error("{kind} must be a positive number, got {value}")]
    NotPositive { kind: &'static str, value: i64 },
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a server-issued identifier without validation.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw integer value.
            pub const fn get(self) -> i64 {
                self.0
            }

            /// Parses user input, requiring a positive integer.
            pub fn parse(input: &str) -> Result<Self, IdError> {
                let trimmed = input.trim();
                let value = trimmed.parse::<i64>().map_err(|_| IdError::NotNumeric {
                    kind: $kind,
                    input: trimmed.to_string(),
                })?;
                Self::try_from(value)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = IdError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(IdError::NotPositive { kind: $kind, value })
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

numeric_id!(
    /// Identifier of an authenticated user, issued by the auth service.
    UserId,
    "user id"
);

numeric_id!(
    /// Identifier of a user's profile record in the profile service.
    ProfileId,
    "profile id"
);

numeric_id!(
    /// Identifier of a catalog product.
    ProductId,
    "product id"
);

numeric_id!(
    /// Identifier of an order, assigned by the order service.
    OrderId,
    "order id"
);
