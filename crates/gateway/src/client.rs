//! The resilient invoker.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{InvokeError, Result};
use crate::request::Request;
use crate::transport::{OutgoingRequest, Transport, TransportResponse};

/// Deadline applied when a request does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);

const JSON_CONTENT_TYPE: &str = "application/json";

/// Supplies the bearer credential of the active session.
///
/// Consulted once per request, so a sign-in or sign-out takes effect on the next call.
pub trait CredentialSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Credential source for anonymous-only clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// Structured error body returned by the backend services.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Issues backend requests with credential injection, deadlines and uniform errors.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
    default_timeout: Duration,
}

impl ApiClient {
    /// Creates a client over `transport` that reads tokens from `credentials`.
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            transport,
            credentials,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replaces the deadline used by requests that do not set one.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Performs one request and returns its parsed JSON body.
    ///
    /// Returns `Ok(None)` for success responses without JSON content (e.g. `204`).
    #[tracing::instrument(
        name = "invoke",
        skip(self, request),
        fields(method = %request.method, path = %request.path)
    )]
    pub async fn invoke(&self, request: Request) -> Result<Option<Value>> {
        let Request {
            method,
            path,
            mut headers,
            body,
            timeout,
            cancel,
        } = request;

        let has = |headers: &[(String, String)], name: &str| {
            headers.iter().any(|(key, _)| key.eq_ignore_ascii_case(name))
        };
        if !has(&headers, "content-type") {
            headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
        }
        if !has(&headers, "authorization") {
            if let Some(token) = self.credentials.bearer_token() {
                headers.push(("Authorization".to_string(), format!("Bearer {token}")));
            }
        }
        let request_id = Uuid::new_v4();
        headers.push(("X-Request-Id".to_string(), request_id.to_string()));

        let deadline = timeout.unwrap_or(self.default_timeout);
        let outgoing = OutgoingRequest {
            method,
            path: path.clone(),
            headers,
            body,
        };

        metrics::counter!("storefront_requests_total").increment(1);
        let started = Instant::now();

        // The deadline timer lives inside this future and is dropped with it on every
        // exit path: response, failure, timeout or cancellation.
        let attempt = async {
            match tokio::time::timeout(deadline, self.transport.send(outgoing)).await {
                Ok(result) => result,
                Err(_) => Err(InvokeError::Timeout {
                    method,
                    path: path.clone(),
                    after: deadline,
                }),
            }
        };

        let outcome = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(InvokeError::Cancelled {
                        method,
                        path: path.clone(),
                    }),
                    result = attempt => result,
                }
            }
            None => attempt.await,
        };

        let elapsed = started.elapsed();
        metrics::histogram!("storefront_request_duration_seconds").record(elapsed.as_secs_f64());

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                if err.is_timeout() {
                    metrics::counter!("storefront_request_timeouts_total").increment(1);
                }
                tracing::warn!(%request_id, error = %err, "request failed");
                return Err(err);
            }
        };

        tracing::debug!(
            %request_id,
            status = response.status,
            elapsed_ms = elapsed.as_millis() as u64,
            "request completed"
        );

        if !response.is_success() {
            return Err(remote_error(&response));
        }

        parse_body(&response)
    }

    /// Performs one request and decodes its JSON body into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let method = request.method;
        let path = request.path.clone();
        match self.invoke(request).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Err(InvokeError::EmptyBody { method, path }),
        }
    }

    /// Performs one request, discarding any response body.
    pub async fn execute(&self, request: Request) -> Result<()> {
        self.invoke(request).await.map(|_| ())
    }
}

fn remote_error(response: &TransportResponse) -> InvokeError {
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| format!("request failed (status {})", response.status));

    InvokeError::Remote {
        status: response.status,
        message,
    }
}

fn parse_body(response: &TransportResponse) -> Result<Option<Value>> {
    if !response.is_json() || response.body.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(&response.body)? {
        Value::Null => Ok(None),
        value => Ok(Some(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryTransport, Reply};
    use crate::request::Method;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    struct StaticToken(&'static str);

    impl CredentialSource for StaticToken {
        fn bearer_token(&self) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn client(transport: &InMemoryTransport) -> ApiClient {
        ApiClient::new(Arc::new(transport.clone()), Arc::new(NoCredentials))
    }

    #[tokio::test]
    async fn test_success_returns_parsed_body() {
        let transport = InMemoryTransport::new();
        transport.on(Method::Get, "/api/products", Reply::ok(json!([{ "id": 1 }])));

        let body = client(&transport)
            .invoke(Request::get("/api/products"))
            .await
            .unwrap();
        assert_eq!(body, Some(json!([{ "id": 1 }])));
    }

    #[tokio::test]
    async fn test_no_content_returns_none() {
        let transport = InMemoryTransport::new();
        transport.on(Method::Delete, "/api/cart/1", Reply::empty(204));

        let body = client(&transport)
            .invoke(Request::delete("/api/cart/1"))
            .await
            .unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_non_json_success_returns_none() {
        let transport = InMemoryTransport::new();
        transport.on(Method::Get, "/health", Reply::text(200, "ok"));

        let body = client(&transport).invoke(Request::get("/health")).await.unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_injects_json_content_type_and_request_id() {
        let transport = InMemoryTransport::new();
        transport.on(Method::Post, "/api/orders", Reply::ok(json!({})));

        client(&transport)
            .invoke(Request::post("/api/orders"))
            .await
            .unwrap();

        let recorded = transport.last_request(Method::Post, "/api/orders").unwrap();
        assert_eq!(recorded.header("Content-Type"), Some("application/json"));
        assert!(recorded.header("X-Request-Id").is_some());
        assert!(recorded.header("Authorization").is_none());
    }

    #[tokio::test]
    async fn test_caller_content_type_is_kept() {
        let transport = InMemoryTransport::new();
        transport.on(Method::Post, "/upload", Reply::empty(201));

        client(&transport)
            .invoke(
                Request::post("/upload")
                    .header("content-type", "text/plain")
                    .body("hi"),
            )
            .await
            .unwrap();

        let recorded = transport.last_request(Method::Post, "/upload").unwrap();
        let content_types: Vec<_> = recorded
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(recorded.header("content-type"), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_injects_bearer_token() {
        let transport = InMemoryTransport::new();
        transport.on(Method::Get, "/api/cart/7", Reply::ok(json!({})));
        let client = ApiClient::new(Arc::new(transport.clone()), Arc::new(StaticToken("tok")));

        client.invoke(Request::get("/api/cart/7")).await.unwrap();

        let recorded = transport.last_request(Method::Get, "/api/cart/7").unwrap();
        assert_eq!(recorded.header("authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_remote_error_uses_message_field() {
        let transport = InMemoryTransport::new();
        transport.on(Method::Post, "/api/cart/items", Reply::error(400, "Out of stock"));

        let err = client(&transport)
            .invoke(Request::post("/api/cart/items"))
            .await
            .unwrap_err();
        assert!(matches!(
            &err,
            InvokeError::Remote { status: 400, message } if message == "Out of stock"
        ));
        assert_eq!(err.to_string(), "Out of stock");
    }

    #[tokio::test]
    async fn test_remote_error_falls_back_to_error_field() {
        let transport = InMemoryTransport::new();
        transport.on(
            Method::Get,
            "/api/orders/9",
            Reply::json(403, json!({ "error": "Access denied" })),
        );

        let err = client(&transport)
            .invoke(Request::get("/api/orders/9"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Access denied");
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn test_remote_error_without_body_is_generic() {
        let transport = InMemoryTransport::new();
        transport.on(Method::Get, "/api/products", Reply::empty(502));

        let err = client(&transport)
            .invoke(Request::get("/api/products"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "request failed (status 502)");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_distinguished() {
        let transport = InMemoryTransport::new();
        transport.on(
            Method::Get,
            "/api/products",
            Reply::ok(json!([])).delayed(Duration::from_secs(30)),
        );

        let err = client(&transport)
            .invoke(Request::get("/api/products").timeout(Duration::from_millis(500)))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "GET /api/products timed out after 500ms");
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_timeout_applies() {
        let transport = InMemoryTransport::new();
        transport.on(
            Method::Get,
            "/slow",
            Reply::ok(json!({})).delayed(DEFAULT_TIMEOUT + Duration::from_millis(1)),
        );

        let err = client(&transport).invoke(Request::get("/slow")).await.unwrap_err();
        assert!(matches!(err, InvokeError::Timeout { after, .. } if after == DEFAULT_TIMEOUT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_within_deadline_succeeds() {
        let transport = InMemoryTransport::new();
        transport.on(
            Method::Get,
            "/slow",
            Reply::ok(json!({ "ok": true })).delayed(Duration::from_millis(100)),
        );

        let body = client(&transport)
            .invoke(Request::get("/slow").timeout(Duration::from_millis(500)))
            .await
            .unwrap();
        assert_eq!(body, Some(json!({ "ok": true })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation() {
        let transport = InMemoryTransport::new();
        transport.on(
            Method::Get,
            "/slow",
            Reply::ok(json!({})).delayed(Duration::from_secs(5)),
        );
        let token = CancellationToken::new();
        token.cancel();

        let err = client(&transport)
            .invoke(Request::get("/slow").cancel_on(token))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Cancelled { .. }));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_fetch_requires_body() {
        let transport = InMemoryTransport::new();
        transport.on(Method::Get, "/empty", Reply::empty(200));

        let err = client(&transport)
            .fetch::<Value>(Request::get("/empty"))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::EmptyBody { .. }));
    }

    #[tokio::test]
    async fn test_malformed_json_is_serialization_error() {
        let transport = InMemoryTransport::new();
        transport.on(
            Method::Get,
            "/broken",
            Reply::text(200, "{not json").with_content_type("application/json"),
        );

        let err = client(&transport).invoke(Request::get("/broken")).await.unwrap_err();
        assert!(matches!(err, InvokeError::Serialization(_)));
    }
}
