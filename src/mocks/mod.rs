//! Mock implementations for testing.
//!
//! [`MockHttpTransport`] answers requests from per-path routes or a shared
//! queue and records every request it sees.

use crate::errors::{NetworkError, TeamsError, TeamsResult};
use crate::transport::{parse_error_body, HttpTransport, TransportRequest};
use async_trait::async_trait;
use http::StatusCode;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum MockOutcome {
    Json(Value),
    Status { status: u16, body: String },
    Network(String),
}

/// Mock response configuration
#[derive(Debug, Clone)]
pub struct MockResponse {
    outcome: MockOutcome,
    delay: Option<Duration>,
}

impl MockResponse {
    /// Create a successful JSON response
    pub fn json<T: Serialize>(data: &T) -> Self {
        Self {
            outcome: MockOutcome::Json(serde_json::to_value(data).unwrap_or(Value::Null)),
            delay: None,
        }
    }

    /// Create a successful response from a JSON value
    pub fn value(value: Value) -> Self {
        Self {
            outcome: MockOutcome::Json(value),
            delay: None,
        }
    }

    /// Create a response with a raw status and body
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            outcome: MockOutcome::Status {
                status,
                body: body.into(),
            },
            delay: None,
        }
    }

    /// Create a Graph error envelope response
    pub fn graph_error(status: u16, code: &str, message: &str) -> Self {
        Self::status(
            status,
            json!({"error": {"code": code, "message": message}}).to_string(),
        )
    }

    /// `404 NotFound`
    pub fn not_found() -> Self {
        Self::graph_error(404, "NotFound", "The requested resource does not exist")
    }

    /// `403 AccessDenied`
    pub fn forbidden() -> Self {
        Self::graph_error(403, "AccessDenied", "Caller is not allowed to access this resource")
    }

    /// A failure below HTTP, with no structured payload
    pub fn network_error(message: impl Into<String>) -> Self {
        Self {
            outcome: MockOutcome::Network(message.into()),
            delay: None,
        }
    }

    /// Add delay to response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Recorded request for verification
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method
    pub method: String,
    /// Full request URL
    pub url: String,
    /// URL path
    pub path: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Request body
    pub body: Option<Value>,
    /// Request headers
    pub headers: Vec<(String, String)>,
}

#[derive(Debug)]
struct Route {
    path: String,
    responses: VecDeque<MockResponse>,
}

/// Mock HTTP transport for testing
#[derive(Default)]
pub struct MockHttpTransport {
    routes: Arc<Mutex<Vec<Route>>>,
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests whose path ends with `path`.
    ///
    /// Responses for one path are returned in order; the last one repeats.
    pub fn on(self, path: &str, response: MockResponse) -> Self {
        {
            let mut routes = self.routes.lock();
            match routes.iter_mut().find(|route| route.path == path) {
                Some(route) => route.responses.push_back(response),
                None => routes.push(Route {
                    path: path.to_string(),
                    responses: VecDeque::from([response]),
                }),
            }
        }
        self
    }

    /// Add a response to the shared queue, used when no route matches
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Get the last recorded request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    /// Number of requests whose path ends with `path`
    pub fn request_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.path.ends_with(path))
            .count()
    }

    /// Get remaining response count in the shared queue
    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().len()
    }

    fn record_request(&self, request: &TransportRequest) -> String {
        let path = request.path();
        let headers = request
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        self.requests.lock().push(RecordedRequest {
            method: request.method.to_string(),
            url: request.url.clone(),
            path: path.clone(),
            query: request.query.clone(),
            body: request.body.clone(),
            headers,
        });
        path
    }

    fn next_response(&self, path: &str) -> Option<MockResponse> {
        {
            let mut routes = self.routes.lock();
            let route = routes
                .iter_mut()
                .filter(|route| path.ends_with(route.path.as_str()))
                .max_by_key(|route| route.path.len());
            if let Some(route) = route {
                return if route.responses.len() > 1 {
                    route.responses.pop_front()
                } else {
                    route.responses.front().cloned()
                };
            }
        }

        self.responses.lock().pop_front()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: TransportRequest) -> TeamsResult<Value> {
        let path = self.record_request(&request);

        let response = self.next_response(&path).ok_or_else(|| {
            TeamsError::Network(NetworkError::ConnectionFailed {
                message: format!("No mock response for {} {}", request.method, path),
            })
        })?;

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }

        match response.outcome {
            MockOutcome::Json(value) => Ok(value),
            MockOutcome::Status { status, body } => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_success() {
                    Ok(serde_json::from_str(&body)?)
                } else {
                    Err(TeamsError::Api(parse_error_body(status, &body)))
                }
            }
            MockOutcome::Network(message) => Err(TeamsError::Network(NetworkError::Http(message))),
        }
    }
}

impl std::fmt::Debug for MockHttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpTransport")
            .field("routes", &self.routes.lock().len())
            .field("queued", &self.responses.lock().len())
            .field("recorded", &self.requests.lock().len())
            .finish()
    }
}
