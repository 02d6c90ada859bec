//! Microsoft Teams client over the Graph API
//!
//! Client library for teams, channels, chats, messages and search with:
//! - Bounded fixed-delay retries with a per-attempt timeout
//! - Classification of remote failures into domain errors
//! - Concurrent enrichment of search hits into full messages
//! - Resolution of team, channel and member names to canonical IDs
//! - Observability (tracing, metrics, redacted logging)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use teams_client::{TeamsClient, SearchMessagesOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = teams_client::create_client_from_env()?;
//!     let cancel = CancellationToken::new();
//!
//!     let team_id = client.resolver().resolve_team("Engineering", &cancel).await?;
//!     let channel_id = client
//!         .resolver()
//!         .resolve_channel(&team_id, "General", &cancel)
//!         .await?;
//!     println!("{team_id} / {channel_id}");
//!
//!     let page = client
//!         .search()
//!         .search_messages(&SearchMessagesOptions::new("deploy"), &cancel)
//!         .await?;
//!     for message in page.found() {
//!         println!("{}: {}", message.message.id, message.message.content());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// Core modules
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod transport;
pub mod types;

// Services
pub mod resolver;
pub mod services;

// Resilience
pub mod resilience;

// Observability
pub mod observability;

// Testing utilities
pub mod fixtures;
pub mod mocks;

// Tests
#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use auth::{StaticTokenProvider, TokenProvider};
pub use client::{TeamsClient, TeamsClientImpl};
pub use config::{Concurrency, TeamsConfig, TeamsConfigBuilder};
pub use errors::{ApiError, ErrorKind, ResourceKind, ResourceRefs, TeamsError, TeamsResult};
pub use resilience::{AttemptConfig, RequestExecutor};
pub use resolver::ReferenceResolver;
pub use types::{EnrichedMessage, SearchEntity, SearchMessagesOptions, SearchPage};

/// Default base URL for the Graph API
pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Default per-attempt timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay between attempts in seconds
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 1;

/// Default number of search hits per page
pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 25;

/// Create a Teams client with the given configuration
pub fn create_client(config: TeamsConfig) -> TeamsResult<TeamsClientImpl> {
    TeamsClientImpl::new(config)
}

/// Create a Teams client from environment variables
///
/// Reads:
/// - `TEAMS_ACCESS_TOKEN` - Bearer token
/// - `TEAMS_ACCOUNT` - Account hint for the credential provider
/// - `TEAMS_BASE_URL` - API root
/// - `TEAMS_MAX_RETRIES`, `TEAMS_RETRY_DELAY_SECONDS`, `TEAMS_TIMEOUT_SECONDS`
/// - `TEAMS_SEARCH_PAGE_SIZE`, `TEAMS_SEARCH_CONCURRENCY`
pub fn create_client_from_env() -> TeamsResult<TeamsClientImpl> {
    let config = TeamsConfig::from_env()?;
    create_client(config)
}
