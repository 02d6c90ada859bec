//! Configuration management for the Teams client.
//!
//! Supports configuration via:
//! - Explicit values
//! - Environment variables
//! - Builder pattern

use crate::errors::{ConfigurationError, TeamsError, TeamsResult};
use crate::observability::redact_token;
use crate::resilience::AttemptConfig;
use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// Upper bound on concurrent enrichment fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// One in-flight fetch per task
    #[default]
    Unlimited,
    /// At most this many fetches in flight
    Limit(usize),
}

impl Concurrency {
    /// Parse `unlimited`, `0` or a positive count
    pub fn parse(value: &str) -> Result<Self, ConfigurationError> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("unlimited") {
            return Ok(Concurrency::Unlimited);
        }
        match value.parse::<usize>() {
            Ok(0) => Ok(Concurrency::Unlimited),
            Ok(n) => Ok(Concurrency::Limit(n)),
            Err(_) => Err(ConfigurationError::InvalidConfiguration {
                message: format!("Invalid concurrency limit: {value}"),
            }),
        }
    }

    /// Effective limit for a batch of `tasks` fetches
    pub fn limit_for(&self, tasks: usize) -> usize {
        match self {
            Concurrency::Unlimited => tasks.max(1),
            Concurrency::Limit(n) => (*n).max(1),
        }
    }
}

/// Search-related settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Hits requested per page
    pub page_size: u32,
    /// Enrichment fan-out limit
    pub concurrency: Concurrency,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: crate::DEFAULT_SEARCH_PAGE_SIZE,
            concurrency: Concurrency::Unlimited,
        }
    }
}

/// Configuration for the Teams client
#[derive(Clone)]
pub struct TeamsConfig {
    /// Static access token, if one was configured
    pub(crate) access_token: Option<SecretString>,
    /// Account hint forwarded to the credential provider
    pub account: Option<String>,
    /// Base URL for API requests
    pub base_url: Url,
    /// Maximum attempts per call
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Default headers
    pub default_headers: HeaderMap,
    /// Search configuration
    pub search: SearchConfig,
}

impl std::fmt::Debug for TeamsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamsConfig")
            .field(
                "access_token",
                &self
                    .access_token
                    .as_ref()
                    .map(|t| redact_token(t.expose_secret())),
            )
            .field("account", &self.account)
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("timeout", &self.timeout)
            .field("search", &self.search)
            .finish()
    }
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            account: None,
            base_url: Url::parse(crate::DEFAULT_BASE_URL).expect("default base URL is valid"),
            max_retries: crate::DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(crate::DEFAULT_RETRY_DELAY_SECS),
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
            default_headers: HeaderMap::new(),
            search: SearchConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigurationError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigurationError::EnvVar(format!("{name} has an invalid value: {value}")))
}

impl TeamsConfig {
    /// Create a new configuration builder
    pub fn builder() -> TeamsConfigBuilder {
        TeamsConfigBuilder::new()
    }

    /// Create configuration from environment variables
    pub fn from_env() -> TeamsResult<Self> {
        let mut builder = TeamsConfigBuilder::new();

        if let Ok(token) = std::env::var("TEAMS_ACCESS_TOKEN") {
            builder = builder.access_token(&token);
        }

        if let Ok(account) = std::env::var("TEAMS_ACCOUNT") {
            builder = builder.account(&account);
        }

        if let Ok(url) = std::env::var("TEAMS_BASE_URL") {
            builder = builder.base_url(&url)?;
        }

        if let Ok(retries) = std::env::var("TEAMS_MAX_RETRIES") {
            builder = builder.max_retries(parse_env("TEAMS_MAX_RETRIES", &retries)?);
        }

        if let Ok(delay) = std::env::var("TEAMS_RETRY_DELAY_SECONDS") {
            let secs: u64 = parse_env("TEAMS_RETRY_DELAY_SECONDS", &delay)?;
            builder = builder.retry_delay(Duration::from_secs(secs));
        }

        if let Ok(timeout) = std::env::var("TEAMS_TIMEOUT_SECONDS") {
            let secs: u64 = parse_env("TEAMS_TIMEOUT_SECONDS", &timeout)?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Ok(size) = std::env::var("TEAMS_SEARCH_PAGE_SIZE") {
            builder = builder.search_page_size(parse_env("TEAMS_SEARCH_PAGE_SIZE", &size)?);
        }

        if let Ok(limit) = std::env::var("TEAMS_SEARCH_CONCURRENCY") {
            builder = builder.search_concurrency(Concurrency::parse(&limit)?);
        }

        builder.build()
    }

    /// Get the static access token if one was configured
    pub fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }

    /// Attempt configuration derived from the retry settings
    pub fn attempt_config(&self) -> AttemptConfig {
        AttemptConfig::new()
            .max_retries(self.max_retries)
            .retry_delay(self.retry_delay)
            .per_attempt_timeout(self.timeout)
    }

    /// Build the full URL for an endpoint
    pub fn build_url(&self, endpoint: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = endpoint.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> TeamsResult<()> {
        if self.timeout.is_zero() {
            return Err(TeamsError::Configuration(
                ConfigurationError::InvalidConfiguration {
                    message: "Timeout must be greater than zero".to_string(),
                },
            ));
        }

        if self.search.page_size == 0 {
            return Err(TeamsError::Configuration(
                ConfigurationError::InvalidConfiguration {
                    message: "Search page size must be greater than zero".to_string(),
                },
            ));
        }

        Ok(())
    }
}

/// Builder for TeamsConfig
#[derive(Default)]
pub struct TeamsConfigBuilder {
    config: TeamsConfig,
}

impl TeamsConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: TeamsConfig::default(),
        }
    }

    /// Set a static access token
    pub fn access_token(mut self, token: &str) -> Self {
        self.config.access_token = Some(SecretString::new(token.to_string()));
        self
    }

    /// Set the account hint
    pub fn account(mut self, account: &str) -> Self {
        self.config.account = Some(account.to_string());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: &str) -> Result<Self, ConfigurationError> {
        self.config.base_url =
            Url::parse(url).map_err(|e| ConfigurationError::InvalidConfiguration {
                message: format!("Invalid URL: {}", e),
            })?;
        Ok(self)
    }

    /// Set the maximum attempts
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the delay between attempts
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the search page size
    pub fn search_page_size(mut self, size: u32) -> Self {
        self.config.search.page_size = size;
        self
    }

    /// Set the enrichment concurrency limit
    pub fn search_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.config.search.concurrency = concurrency;
        self
    }

    /// Add a default header
    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        if let Ok(header_name) = name.parse::<http::header::HeaderName>() {
            if let Ok(header_value) = value.parse::<http::header::HeaderValue>() {
                self.config.default_headers.insert(header_name, header_value);
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> TeamsResult<TeamsConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Build the configuration without validation (for testing)
    pub fn build_unchecked(self) -> TeamsConfig {
        self.config
    }
}
