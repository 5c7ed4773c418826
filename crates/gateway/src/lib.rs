//! Resilient request invoker for the storefront backend services.
//!
//! Every backend call goes through [`ApiClient`], which:
//! - injects the bearer credential of the active session, if any
//! - defaults the content type to JSON
//! - enforces a per-request deadline and optional cancellation
//! - normalizes non-success responses into [`InvokeError::Remote`]
//!
//! The wire is abstracted behind [`Transport`]: [`HttpTransport`] talks to the real
//! gateway with `reqwest`, [`InMemoryTransport`] replays scripted replies in tests.

pub mod client;
pub mod error;
pub mod http;
pub mod memory;
pub mod request;
pub mod transport;

pub use client::{ApiClient, CredentialSource, DEFAULT_TIMEOUT, NoCredentials};
pub use error::{InvokeError, Result};
pub use http::HttpTransport;
pub use memory::{InMemoryTransport, RecordedRequest, Reply};
pub use request::{Method, Request};
pub use tokio_util::sync::CancellationToken;
pub use transport::{OutgoingRequest, Transport, TransportResponse};
