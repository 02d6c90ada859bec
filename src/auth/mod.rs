//! Authentication management for the Teams client.
//!
//! Tokens come from a [`TokenProvider`]; acquiring and caching them is the
//! provider's business. [`AuthManager`] turns whatever it hands back into
//! request headers.

use crate::config::TeamsConfig;
use crate::errors::{AuthenticationError, ConfigurationError, TeamsError, TeamsResult};
use crate::observability::redact_token;
use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

/// Supplies bearer tokens on demand
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Get a token, optionally for a specific account
    async fn token(&self, account: Option<&str>) -> TeamsResult<SecretString>;
}

/// Provider that always returns the same token
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    /// Create a provider for a fixed token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self, _account: Option<&str>) -> TeamsResult<SecretString> {
        Ok(self.token.clone())
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &redact_token(self.token.expose_secret()))
            .finish()
    }
}

/// Authentication manager for Graph API requests
#[derive(Clone)]
pub struct AuthManager {
    provider: Arc<dyn TokenProvider>,
    account: Option<String>,
    default_headers: HeaderMap,
}

impl AuthManager {
    /// Create a new authentication manager
    pub fn new(provider: Arc<dyn TokenProvider>, config: &TeamsConfig) -> Self {
        Self {
            provider,
            account: config.account.clone(),
            default_headers: config.default_headers.clone(),
        }
    }

    /// Build a manager around the static token in the configuration
    pub fn from_config(config: &TeamsConfig) -> TeamsResult<Self> {
        let token = config
            .access_token()
            .ok_or(TeamsError::Configuration(ConfigurationError::MissingToken))?;
        let provider = StaticTokenProvider {
            token: token.clone(),
        };
        Ok(Self::new(Arc::new(provider), config))
    }

    /// Account hint forwarded to the provider
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Get headers for an API request
    pub async fn headers(&self) -> TeamsResult<HeaderMap> {
        let token = self.provider.token(self.account()).await?;
        self.build_headers(&token)
    }

    fn build_headers(&self, token: &SecretString) -> TeamsResult<HeaderMap> {
        if token.expose_secret().is_empty() {
            return Err(TeamsError::Authentication(
                AuthenticationError::TokenUnavailable {
                    account: self.account.clone(),
                },
            ));
        }

        let mut headers = self.default_headers.clone();

        let auth_value = format!("Bearer {}", token.expose_secret());
        let mut value = HeaderValue::from_str(&auth_value)
            .map_err(|_| TeamsError::Authentication(AuthenticationError::InvalidToken))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }

        Ok(headers)
    }
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("account", &self.account)
            .finish()
    }
}
