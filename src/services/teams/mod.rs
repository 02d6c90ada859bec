//! Teams service for the Graph API.

use super::ServiceContext;
use crate::errors::{ResourceKind, ResourceRefs, TeamsResult};
use crate::types::Team;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Trait for teams service operations
#[async_trait]
pub trait TeamsServiceTrait: Send + Sync {
    /// List the teams the caller is a member of
    async fn list_joined(&self, cancel: &CancellationToken) -> TeamsResult<Vec<Team>>;

    /// Get a team by ID
    async fn get(&self, team_id: &str, cancel: &CancellationToken) -> TeamsResult<Team>;
}

/// Teams service implementation
#[derive(Debug, Clone)]
pub struct TeamsService {
    context: ServiceContext,
}

impl TeamsService {
    /// Create a new teams service
    pub fn new(context: ServiceContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl TeamsServiceTrait for TeamsService {
    #[instrument(skip(self, cancel))]
    async fn list_joined(&self, cancel: &CancellationToken) -> TeamsResult<Vec<Team>> {
        self.context
            .list_all("teams.list_joined", "me/joinedTeams", &[], cancel)
            .await
            .map_err(|e| e.classify(ResourceRefs::new()))
    }

    #[instrument(skip(self, cancel))]
    async fn get(&self, team_id: &str, cancel: &CancellationToken) -> TeamsResult<Team> {
        self.context
            .get("teams.get", &format!("teams/{team_id}"), &[], cancel)
            .await
            .map_err(|e| e.classify(ResourceRefs::new().with(ResourceKind::Team, [team_id])))
    }
}
