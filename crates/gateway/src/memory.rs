//! Scripted in-memory transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{InvokeError, Result};
use crate::request::Method;
use crate::transport::{OutgoingRequest, Transport, TransportResponse};

/// A canned reply for one route.
#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    content_type: Option<String>,
    body: String,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl Reply {
    /// A JSON reply with the given status.
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
            delay: None,
            failure: None,
        }
    }

    /// A `200 OK` JSON reply.
    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    /// A reply with no body, e.g. `204 No Content`.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: String::new(),
            delay: None,
            failure: None,
        }
    }

    /// A non-success reply carrying `{"message": ...}`.
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "message": message }))
    }

    /// A plain-text reply.
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain".to_string()),
            body: body.to_string(),
            delay: None,
            failure: None,
        }
    }

    /// The connection fails before any response is produced.
    pub fn network_failure(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::empty(0)
        }
    }

    /// Overrides the declared media type.
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Holds the reply back for `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request observed by [`InMemoryTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RecordedRequest {
    /// Returns the first header value with this name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parses the request body as JSON.
    pub fn json(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }
}

#[derive(Debug, Default)]
struct Route {
    queued: VecDeque<Reply>,
    fallback: Option<Reply>,
}

#[derive(Debug, Default)]
struct InMemoryTransportState {
    routes: HashMap<(Method, String), Route>,
    requests: Vec<RecordedRequest>,
}

/// In-memory transport for testing.
///
/// Routes are keyed by method and exact path. One-shot replies registered with
/// [`once`](Self::once) are consumed in order before the standing reply set with
/// [`on`](Self::on). Unrouted requests get `404 {"message": "no route"}`.
/// Every request is recorded, in arrival order, before it is answered.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<Mutex<InMemoryTransportState>>,
}

impl InMemoryTransport {
    /// Creates a new transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, InMemoryTransportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the standing reply for a route.
    pub fn on(&self, method: Method, path: &str, reply: Reply) {
        self.state()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .fallback = Some(reply);
    }

    /// Queues a reply that answers exactly one request on this route.
    pub fn once(&self, method: Method, path: &str, reply: Reply) {
        self.state()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .queued
            .push_back(reply);
    }

    /// Returns every recorded request in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Returns the total number of requests received.
    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    /// Returns the number of requests received on one route.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Returns the most recent request received on one route.
    pub fn last_request(&self, method: Method, path: &str) -> Option<RecordedRequest> {
        self.state()
            .requests
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }

    /// Forgets recorded requests; routes are kept.
    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse> {
        let reply = {
            let mut state = self.state();
            state.requests.push(RecordedRequest {
                method: request.method,
                path: request.path.clone(),
                headers: request.headers.clone(),
                body: request.body.clone(),
            });

            state
                .routes
                .get_mut(&(request.method, request.path.clone()))
                .and_then(|route| route.queued.pop_front().or_else(|| route.fallback.clone()))
                .unwrap_or_else(|| Reply::error(404, "no route"))
        };

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(reason) = reply.failure {
            return Err(InvokeError::Transport(reason));
        }

        Ok(TransportResponse {
            status: reply.status,
            content_type: reply.content_type,
            body: reply.body,
        })
    }
}
