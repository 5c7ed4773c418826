//! Storefront error taxonomy.

use common::{IdError, QuantityError};
use gateway::InvokeError;
use thiserror::Error;

use crate::session::SessionStorageError;

/// Coarse classification of a [`StorefrontError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad local input, caught before any network call.
    Validation,
    /// A privileged action was attempted without a session.
    AuthRequired,
    /// A request exceeded its deadline.
    Timeout,
    /// A service answered with a non-success status, or the call never completed.
    Remote,
    /// Local persistence failed.
    Storage,
}

/// Errors surfaced by storefront operations.
///
/// `Display` is the short, human-readable message shown for the triggering action.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Bad local input. Never sent to a service.
    #[error("{0}")]
    Validation(String),

    /// The operation needs a signed-in session. Nothing was sent.
    #[error("Please sign in to {action}.")]
    AuthRequired { action: String },

    /// The request exceeded its deadline.
    #[error("The request timed out after {after_ms}ms. Please try again.")]
    Timeout { after_ms: u64 },

    /// The request was cancelled before it completed.
    #[error("The request was cancelled.")]
    Cancelled,

    /// The service rejected the request.
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// The payment service declined the charge.
    #[error("{reason}")]
    Declined { reason: String },

    /// The request never reached a service.
    #[error("Network error: {0}")]
    Transport(String),

    /// The service answered with an unexpected body.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The session record could not be read or written.
    #[error("Session storage error: {0}")]
    Storage(#[from] SessionStorageError),
}

impl StorefrontError {
    /// Creates a validation error with a user-facing message.
    pub fn validation(message: impl Into<String>) -> Self {
        StorefrontError::Validation(message.into())
    }

    /// Creates an auth-required error for `action` ("add items to your cart").
    pub fn auth_required(action: impl Into<String>) -> Self {
        StorefrontError::AuthRequired {
            action: action.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StorefrontError::Validation(_) => ErrorKind::Validation,
            StorefrontError::AuthRequired { .. } => ErrorKind::AuthRequired,
            StorefrontError::Timeout { .. } => ErrorKind::Timeout,
            StorefrontError::Cancelled
            | StorefrontError::Remote { .. }
            | StorefrontError::Declined { .. }
            | StorefrontError::Transport(_)
            | StorefrontError::Decode(_) => ErrorKind::Remote,
            StorefrontError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_auth_required(&self) -> bool {
        self.kind() == ErrorKind::AuthRequired
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}

impl From<InvokeError> for StorefrontError {
    fn from(err: InvokeError) -> Self {
        match err {
            InvokeError::Timeout { after, .. } => StorefrontError::Timeout {
                after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
            },
            InvokeError::Cancelled { .. } => StorefrontError::Cancelled,
            InvokeError::Remote { status, message } => StorefrontError::Remote { status, message },
            InvokeError::Transport(reason) => StorefrontError::Transport(reason),
            err @ (InvokeError::EmptyBody { .. } | InvokeError::Serialization(_)) => {
                StorefrontError::Decode(err.to_string())
            }
        }
    }
}

impl From<QuantityError> for StorefrontError {
    fn from(err: QuantityError) -> Self {
        StorefrontError::Validation(err.to_string())
    }
}

impl From<IdError> for StorefrontError {
    fn from(err: IdError) -> Self {
        StorefrontError::Validation(err.to_string())
    }
}

/// Convenience type alias for storefront results.
pub type Result<T> = std::result::Result<T, StorefrontError>;
