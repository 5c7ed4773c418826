use async_trait::async_trait;

use crate::error::Result;
use crate::request::Method;

/// A fully prepared request, after credential and header injection.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl OutgoingRequest {
    /// Returns the first header value with this name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response as read off the wire.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if the response declares a JSON media type.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }
}

/// Moves a prepared request to a backend and returns its raw response.
///
/// Implementations must be cancel-safe: the invoker drops the returned future when a
/// deadline or cancellation fires, and dropping it must abandon the in-flight call.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse>;
}
