//! Tracing utilities for request spans.

use tracing::{span, Level, Span};

/// Header carrying the per-request correlation id
pub const CLIENT_REQUEST_ID_HEADER: &str = "client-request-id";

/// Create a request span with common attributes
pub fn create_request_span(method: &str, endpoint: &str, request_id: &str) -> Span {
    span!(
        Level::DEBUG,
        "teams_request",
        method = %method,
        endpoint = %endpoint,
        request_id = %request_id,
        otel.kind = "client",
        otel.status_code = tracing::field::Empty,
        http.status_code = tracing::field::Empty,
        error.message = tracing::field::Empty,
    )
}

/// Record success on a span
pub fn record_success(span: &Span, status: u16) {
    span.record("otel.status_code", "OK");
    span.record("http.status_code", status);
}

/// Record error on a span
pub fn record_error(span: &Span, error: &str) {
    span.record("otel.status_code", "ERROR");
    span.record("error.message", error);
}

/// Request-scoped trace info
#[derive(Debug, Clone)]
pub struct RequestTrace {
    /// Start time
    pub start_time: std::time::Instant,
    /// Request ID, sent as `client-request-id`
    pub request_id: String,
    /// HTTP method
    pub method: String,
    /// Endpoint path
    pub endpoint: String,
}

impl RequestTrace {
    /// Create a new request trace
    pub fn new(method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            start_time: std::time::Instant::now(),
            request_id: uuid::Uuid::new_v4().to_string(),
            method: method.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Get elapsed milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Create the span for this request
    pub fn span(&self) -> Span {
        create_request_span(&self.method, &self.endpoint, &self.request_id)
    }
}
