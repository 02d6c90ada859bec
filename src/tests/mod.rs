//! Cross-module tests for the Teams client.

mod executor_tests;

use crate::auth::StaticTokenProvider;
use crate::client::TeamsClientImpl;
use crate::config::TeamsConfigBuilder;
use crate::mocks::MockHttpTransport;
use std::sync::Arc;
use std::time::Duration;

/// Client wired to a mock transport with fast retries
pub(crate) fn client_with(mock: &Arc<MockHttpTransport>, max_retries: u32) -> TeamsClientImpl {
    let config = TeamsConfigBuilder::new()
        .max_retries(max_retries)
        .retry_delay(Duration::from_millis(1))
        .timeout(Duration::from_secs(5))
        .build_unchecked();

    TeamsClientImpl::with_transport(
        config,
        mock.clone(),
        Arc::new(StaticTokenProvider::new("test-token")),
    )
}
