//! Application error type with exit code mapping.

use checkout::CheckoutFailure;
use domain::{ErrorKind, StorefrontError};
use thiserror::Error;

/// Top-level error for the command-line client.
#[derive(Debug, Error)]
pub enum AppError {
    /// A storefront operation failed.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// Checkout stopped at a step.
    #[error("Checkout failed at {}: {}", .0.step, .0.error)]
    Checkout(Box<CheckoutFailure>),

    /// The client could not be set up.
    #[error("Startup failed: {0}")]
    Startup(String),
}

impl AppError {
    /// The error kind of the underlying storefront error, if any.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::Storefront(err) => Some(err.kind()),
            AppError::Checkout(failure) => Some(failure.error.kind()),
            AppError::Startup(_) => None,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            Some(ErrorKind::Validation) => 2,
            Some(ErrorKind::AuthRequired) => 3,
            Some(ErrorKind::Timeout) => 4,
            Some(ErrorKind::Remote) => 5,
            Some(ErrorKind::Storage) => 6,
            None => 1,
        }
    }
}

impl From<CheckoutFailure> for AppError {
    fn from(failure: CheckoutFailure) -> Self {
        AppError::Checkout(Box::new(failure))
    }
}

impl From<gateway::InvokeError> for AppError {
    fn from(err: gateway::InvokeError) -> Self {
        AppError::Startup(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_follow_error_kind() {
        let validation: AppError = StorefrontError::validation("Quantity must be at least 1").into();
        assert_eq!(validation.exit_code(), 2);
        assert_eq!(validation.to_string(), "Quantity must be at least 1");

        let auth: AppError = StorefrontError::auth_required("view your orders").into();
        assert_eq!(auth.exit_code(), 3);

        let timeout: AppError = StorefrontError::Timeout { after_ms: 10 }.into();
        assert_eq!(timeout.exit_code(), 4);

        let remote: AppError = StorefrontError::Remote {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(remote.exit_code(), 5);

        assert_eq!(AppError::Startup("bad url".to_string()).exit_code(), 1);
    }
}
