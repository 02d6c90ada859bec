//! Error types for the Teams client.
//!
//! Remote failures travel as a raw [`ApiError`] (the code/message pair from
//! the Graph error envelope) until a caller classifies them, together with
//! the resources it was working on, into one of the domain variants of
//! [`TeamsError`].

mod classify;

pub use classify::{classify, classify_api_error, ResourceKind, ResourceRefs};

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for Teams operations
pub type TeamsResult<T> = Result<T, TeamsError>;

/// Code used when a failure carries no structured code/message pair.
pub const PARSING_ERROR_CODE: &str = "ParsingError";

/// Structured code/message pair reported by the remote API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Error code (`ResourceNotFound`, `AccessDenied`, `404`, ...)
    pub code: String,
    /// Human readable message
    pub message: String,
    /// HTTP status of the response that carried the error, if any
    pub status: Option<u16>,
}

impl ApiError {
    /// Create a new API error without an HTTP status
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Attach the HTTP status of the failed response
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Synthesize a pair for a failure that had no structured payload
    pub fn parsing(message: impl Into<String>) -> Self {
        Self::new(PARSING_ERROR_CODE, message)
    }

    /// Numeric status: the HTTP status, else a numeric code, else 500
    pub fn status_code(&self) -> u16 {
        self.status
            .or_else(|| self.code.parse::<u16>().ok())
            .unwrap_or(500)
    }
}

/// A named entity offered back to the caller when a reference is ambiguous
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Display name shared by all candidates
    pub display_name: String,
    /// Canonical identifier
    pub id: String,
}

impl Candidate {
    /// Create a new candidate
    pub fn new(display_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}

fn format_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(Candidate::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Root error type for the Teams client
#[derive(Error, Debug)]
pub enum TeamsError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Response parsing error
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    /// A single attempt exceeded its deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Unclassified remote error, passed through verbatim
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The referenced resource does not exist
    #[error("Not found: {refs}")]
    NotFound {
        /// References the caller was working with
        refs: ResourceRefs,
        /// Original remote error
        #[source]
        source: ApiError,
    },

    /// The caller may not access the referenced resource
    #[error("Forbidden: {refs}")]
    Forbidden {
        /// References the caller was working with
        refs: ResourceRefs,
        /// Original remote error
        #[source]
        source: ApiError,
    },

    /// A name matched more than one entity
    #[error(
        "Ambiguous {kind} reference {reference:?}; use one of: {}",
        format_candidates(.candidates)
    )]
    Ambiguous {
        /// Kind of entity being resolved
        kind: ResourceKind,
        /// The reference as given by the caller
        reference: String,
        /// Every matching entity
        candidates: Vec<Candidate>,
    },

    /// Remote error with no dedicated variant
    #[error("{message}")]
    Unknown {
        /// Original code
        code: String,
        /// Original message followed by the code in parentheses
        message: String,
        /// Original remote error
        #[source]
        source: ApiError,
    },
}

/// Discriminant of [`TeamsError`], used for kind checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// [`TeamsError::Configuration`]
    Configuration,
    /// [`TeamsError::Authentication`]
    Authentication,
    /// [`TeamsError::Network`]
    Network,
    /// [`TeamsError::Response`]
    Response,
    /// [`TeamsError::Timeout`]
    Timeout,
    /// [`TeamsError::Cancelled`]
    Cancelled,
    /// [`TeamsError::Api`]
    Unclassified,
    /// [`TeamsError::NotFound`]
    NotFound,
    /// [`TeamsError::Forbidden`]
    Forbidden,
    /// [`TeamsError::Ambiguous`]
    Ambiguous,
    /// [`TeamsError::Unknown`]
    Unknown,
}

impl TeamsError {
    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Network(_) => ErrorKind::Network,
            Self::Response(_) => ErrorKind::Response,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Api(_) => ErrorKind::Unclassified,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Ambiguous { .. } => ErrorKind::Ambiguous,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &str {
        match self {
            Self::Configuration(_) => "TEAMS_CONFIG",
            Self::Authentication(_) => "TEAMS_AUTH",
            Self::Network(_) => "TEAMS_NETWORK",
            Self::Response(_) => "TEAMS_RESPONSE",
            Self::Timeout(_) => "TEAMS_TIMEOUT",
            Self::Cancelled => "TEAMS_CANCELLED",
            Self::Ambiguous { .. } => "TEAMS_AMBIGUOUS",
            Self::Api(source)
            | Self::NotFound { source, .. }
            | Self::Forbidden { source, .. }
            | Self::Unknown { source, .. } => &source.code,
        }
    }

    /// Numeric status code, available for every variant
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration(_) => 400,
            Self::Authentication(_) => 401,
            Self::Network(_) => 503,
            Self::Response(_) => 502,
            Self::Timeout(_) => 408,
            Self::Cancelled => 499,
            Self::NotFound { .. } => 404,
            Self::Forbidden { .. } => 403,
            Self::Ambiguous { .. } => 300,
            Self::Api(source) | Self::Unknown { source, .. } => source.status_code(),
        }
    }

    /// Kind-and-code comparison that ignores message text
    pub fn matches(&self, other: &TeamsError) -> bool {
        self.kind() == other.kind() && self.status_code() == other.status_code()
    }

    /// Check the kind of this error
    pub fn is_kind(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }

    /// Whether this error reports a missing resource
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Api(source) => classify::is_not_found(source),
            _ => false,
        }
    }

    /// Whether this error was caused by caller cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The structured remote error behind this error, if there is one
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(source)
            | Self::NotFound { source, .. }
            | Self::Forbidden { source, .. }
            | Self::Unknown { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Collapse into a code/message pair, synthesizing `ParsingError` when
    /// the error has no structured payload
    pub fn into_api_error(self) -> ApiError {
        match self {
            Self::Api(source)
            | Self::NotFound { source, .. }
            | Self::Forbidden { source, .. }
            | Self::Unknown { source, .. } => source,
            other => ApiError::parsing(other.to_string()),
        }
    }

    /// Classify an unclassified error against the given references
    pub fn classify(self, refs: ResourceRefs) -> Self {
        classify(self, refs)
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// Missing access token
    #[error("Access token is missing")]
    MissingToken,

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(String),
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthenticationError {
    /// The credential provider could not produce a token
    #[error("No token available{}", account_suffix(.account))]
    TokenUnavailable {
        /// Account hint that was requested
        account: Option<String>,
    },

    /// The token cannot be placed in a header
    #[error("Token contains characters not allowed in a header")]
    InvalidToken,
}

fn account_suffix(account: &Option<String>) -> String {
    match account {
        Some(account) => format!(" for {account}"),
        None => String::new(),
    }
}

/// Network errors
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Connection failed
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Error message
        message: String,
    },

    /// Transport-level timeout
    #[error("Request timed out")]
    Timeout,

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_connect() {
            NetworkError::ConnectionFailed {
                message: err.to_string(),
            }
        } else {
            NetworkError::Http(err.to_string())
        }
    }
}

/// Response parsing errors
#[derive(Error, Debug)]
pub enum ResponseError {
    /// JSON deserialization error
    #[error("Deserialization error: {message}")]
    DeserializationError {
        /// Error message
        message: String,
    },

    /// Unexpected response format
    #[error("Unexpected response: {message}")]
    UnexpectedResponse {
        /// Error message
        message: String,
    },
}

impl From<serde_json::Error> for ResponseError {
    fn from(err: serde_json::Error) -> Self {
        ResponseError::DeserializationError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TeamsError {
    fn from(err: serde_json::Error) -> Self {
        TeamsError::Response(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_status_codes_cover_every_variant() {
        assert_eq!(TeamsError::Cancelled.status_code(), 499);
        assert_eq!(TeamsError::Timeout(Duration::from_secs(1)).status_code(), 408);
        assert_eq!(
            TeamsError::Api(ApiError::new("Throttled", "slow down").with_status(429)).status_code(),
            429
        );
        assert_eq!(TeamsError::Api(ApiError::new("404", "gone")).status_code(), 404);
        assert_eq!(TeamsError::Api(ApiError::parsing("bad json")).status_code(), 500);
        let ambiguous = TeamsError::Ambiguous {
            kind: ResourceKind::Team,
            reference: "Eng".to_string(),
            candidates: vec![],
        };
        assert_eq!(ambiguous.status_code(), 300);
    }

    #[test]
    fn test_matches_ignores_message_text() {
        let a = TeamsError::NotFound {
            refs: ResourceRefs::new().with(ResourceKind::Team, ["alpha"]),
            source: ApiError::new("NotFound", "first message"),
        };
        let b = TeamsError::NotFound {
            refs: ResourceRefs::new(),
            source: ApiError::new("ResourceNotFound", "something else"),
        };
        let c = TeamsError::Forbidden {
            refs: ResourceRefs::new(),
            source: ApiError::new("AccessDenied", "first message"),
        };

        assert!(a.matches(&b));
        assert!(!a.matches(&c));
        assert!(a.is_kind(ErrorKind::NotFound));
    }

    #[test]
    fn test_is_not_found_agrees_with_classification() {
        for code in ["NotFound", "ResourceNotFound", "404"] {
            let raw = TeamsError::Api(ApiError::new(code, "gone"));
            assert!(raw.is_not_found(), "{code}");
            assert!(raw.classify(ResourceRefs::new()).is_not_found(), "{code}");
        }

        assert!(TeamsError::Api(ApiError::new("Gone", "x").with_status(404)).is_not_found());
        assert!(!TeamsError::Api(ApiError::new("AccessDenied", "no").with_status(403)).is_not_found());
        assert!(!TeamsError::Cancelled.is_not_found());
    }

    #[test]
    fn test_source_recovers_original_error() {
        let original = ApiError::new("AccessDenied", "no").with_status(403);
        let err = TeamsError::Forbidden {
            refs: ResourceRefs::new(),
            source: original.clone(),
        };

        let source = err.source().and_then(|s| s.downcast_ref::<ApiError>());
        assert_eq!(source, Some(&original));
        assert_eq!(err.api_error(), Some(&original));
    }

    #[test]
    fn test_into_api_error_synthesizes_parsing_error() {
        let err = TeamsError::Network(NetworkError::Http("connection reset".to_string()));
        let pair = err.into_api_error();

        assert_eq!(pair.code, PARSING_ERROR_CODE);
        assert!(pair.message.contains("connection reset"));

        let verbatim = TeamsError::Api(ApiError::new("BadRequest", "nope")).into_api_error();
        assert_eq!(verbatim, ApiError::new("BadRequest", "nope"));
    }

    #[test]
    fn test_ambiguous_message_lists_candidates() {
        let err = TeamsError::Ambiguous {
            kind: ResourceKind::Team,
            reference: "Engineering".to_string(),
            candidates: vec![
                Candidate::new("Engineering", "t1"),
                Candidate::new("Engineering", "t2"),
            ],
        };

        let text = err.to_string();
        assert!(text.contains("Engineering (t1)"));
        assert!(text.contains("Engineering (t2)"));
    }

    #[test]
    fn test_token_unavailable_message() {
        let err = AuthenticationError::TokenUnavailable {
            account: Some("ada@contoso.com".to_string()),
        };
        assert_eq!(err.to_string(), "No token available for ada@contoso.com");
        let err = AuthenticationError::TokenUnavailable { account: None };
        assert_eq!(err.to_string(), "No token available");
    }
}
