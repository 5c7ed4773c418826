use std::time::Duration;

use thiserror::Error;

use crate::request::Method;

/// Errors produced while invoking a backend endpoint.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// No response arrived before the request deadline; the call was abandoned.
    #[error("{method} {path} timed out after {}ms", .after.as_millis())]
    Timeout {
        method: Method,
        path: String,
        after: Duration,
    },

    /// The caller cancelled the request before a response arrived.
    #[error("{method} {path} was cancelled")]
    Cancelled { method: Method, path: String },

    /// The service answered with a non-success status.
    ///
    /// `message` is taken from the structured error body when one is present.
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Transport(String),

    /// A success response was expected to carry a JSON body but had none.
    #[error("{method} {path} returned no content")]
    EmptyBody { method: Method, path: String },

    /// Request or response JSON could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl InvokeError {
    /// Returns true if the request was abandoned because of its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, InvokeError::Timeout { .. })
    }

    /// Returns the HTTP status for remote failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            InvokeError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for invoker operations.
pub type Result<T> = std::result::Result<T, InvokeError>;
