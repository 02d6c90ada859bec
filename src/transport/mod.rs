//! HTTP transport layer for the Teams client.
//!
//! Provides low-level HTTP communication with the Graph API, including
//! request building, response parsing, and decoding of the error envelope.

use crate::errors::{ApiError, NetworkError, ResponseError, TeamsError, TeamsResult};
use crate::observability::{record_error, record_success, RequestTrace, CLIENT_REQUEST_ID_HEADER};
use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use reqwest::{Client, ClientBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn, Instrument};

/// HTTP transport trait for making API requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and receive the decoded JSON body.
    ///
    /// An empty success body decodes to [`Value::Null`]. Non-success
    /// responses surface as [`TeamsError::Api`] carrying the HTTP status.
    async fn send(&self, request: TransportRequest) -> TeamsResult<Value>;
}

/// Transport request with an optional JSON body
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<Value>,
}

impl TransportRequest {
    /// Create a new GET request
    pub fn get(url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            query: Vec::new(),
            headers,
            body: None,
        }
    }

    /// Create a new POST request
    pub fn post(url: impl Into<String>, headers: HeaderMap, body: Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            query: Vec::new(),
            headers,
            body: Some(body),
        }
    }

    /// Add a query parameter
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Path component of the URL, used for logging and mock routing
    pub fn path(&self) -> String {
        url::Url::parse(&self.url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| self.url.clone())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Decode a non-success body into a code/message pair.
///
/// Bodies without the `{"error": {...}}` envelope fall back to the numeric
/// status as the code, so status-based classification still works.
pub fn parse_error_body(status: StatusCode, body: &str) -> ApiError {
    let fallback_message = || {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        } else {
            body.trim().to_string()
        }
    };

    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ApiError::new(
            envelope
                .error
                .code
                .unwrap_or_else(|| status.as_u16().to_string()),
            envelope.error.message.unwrap_or_else(fallback_message),
        ),
        Err(_) => ApiError::new(status.as_u16().to_string(), fallback_message()),
    }
    .with_status(status.as_u16())
}

/// Default HTTP transport implementation using reqwest
pub struct ReqwestTransport {
    client: Client,
    default_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a new transport with the given timeout
    pub fn new(timeout: Duration) -> TeamsResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| TeamsError::Network(NetworkError::Http(e.to_string())))?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Create a new transport with a pre-built client
    pub fn with_client(client: Client, default_timeout: Duration) -> Self {
        Self {
            client,
            default_timeout,
        }
    }

    async fn parse_response(&self, response: Response) -> TeamsResult<Value> {
        let status = response.status();

        let body = response
            .text()
            .await
            .map_err(|e| TeamsError::Network(NetworkError::Http(e.to_string())))?;

        if !status.is_success() {
            let error = parse_error_body(status, &body);
            warn!(status = %status, code = %error.code, "Request failed with non-success status");
            return Err(TeamsError::Api(error));
        }

        debug!(status = %status, body_len = body.len(), "Received response");

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            TeamsError::Response(ResponseError::DeserializationError {
                message: e.to_string(),
            })
        })
    }

    async fn dispatch(&self, request: TransportRequest, trace: &RequestTrace) -> TeamsResult<Value> {
        let mut headers = request.headers;
        if let Ok(value) = HeaderValue::from_str(&trace.request_id) {
            headers.insert(CLIENT_REQUEST_ID_HEADER, value);
        }

        let mut req_builder = self
            .client
            .request(request.method, &request.url)
            .headers(headers)
            .timeout(self.default_timeout);

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| TeamsError::Network(NetworkError::from(e)))?;

        self.parse_response(response).await
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> TeamsResult<Value> {
        let trace = RequestTrace::new(request.method.as_str(), request.path());
        let span = trace.span();

        let result = self
            .dispatch(request, &trace)
            .instrument(span.clone())
            .await;

        match &result {
            Ok(_) => record_success(&span, 200),
            Err(e) => {
                if let Some(api) = e.api_error() {
                    span.record("http.status_code", api.status_code());
                }
                record_error(&span, &e.to_string());
            }
        }
        debug!(
            request_id = %trace.request_id,
            elapsed_ms = trace.elapsed_ms(),
            ok = result.is_ok(),
            "Request finished"
        );

        result
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}
