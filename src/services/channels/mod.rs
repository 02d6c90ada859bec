//! Channels service for the Graph API.

use super::ServiceContext;
use crate::errors::{ResourceKind, ResourceRefs, TeamsResult};
use crate::types::{Channel, ChannelMember};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Trait for channels service operations
#[async_trait]
pub trait ChannelsServiceTrait: Send + Sync {
    /// List the channels of a team
    async fn list(&self, team_id: &str, cancel: &CancellationToken) -> TeamsResult<Vec<Channel>>;

    /// Get a channel by ID
    async fn get(
        &self,
        team_id: &str,
        channel_id: &str,
        cancel: &CancellationToken,
    ) -> TeamsResult<Channel>;

    /// List the members of a channel
    async fn list_members(
        &self,
        team_id: &str,
        channel_id: &str,
        cancel: &CancellationToken,
    ) -> TeamsResult<Vec<ChannelMember>>;
}

/// Channels service implementation
#[derive(Debug, Clone)]
pub struct ChannelsService {
    context: ServiceContext,
}

impl ChannelsService {
    /// Create a new channels service
    pub fn new(context: ServiceContext) -> Self {
        Self { context }
    }
}

fn channel_refs(team_id: &str, channel_id: &str) -> ResourceRefs {
    ResourceRefs::new()
        .with(ResourceKind::Team, [team_id])
        .with(ResourceKind::Channel, [channel_id])
}

#[async_trait]
impl ChannelsServiceTrait for ChannelsService {
    #[instrument(skip(self, cancel))]
    async fn list(&self, team_id: &str, cancel: &CancellationToken) -> TeamsResult<Vec<Channel>> {
        self.context
            .list_all("channels.list", &format!("teams/{team_id}/channels"), &[], cancel)
            .await
            .map_err(|e| e.classify(ResourceRefs::new().with(ResourceKind::Team, [team_id])))
    }

    #[instrument(skip(self, cancel))]
    async fn get(
        &self,
        team_id: &str,
        channel_id: &str,
        cancel: &CancellationToken,
    ) -> TeamsResult<Channel> {
        self.context
            .get(
                "channels.get",
                &format!("teams/{team_id}/channels/{channel_id}"),
                &[],
                cancel,
            )
            .await
            .map_err(|e| e.classify(channel_refs(team_id, channel_id)))
    }

    #[instrument(skip(self, cancel))]
    async fn list_members(
        &self,
        team_id: &str,
        channel_id: &str,
        cancel: &CancellationToken,
    ) -> TeamsResult<Vec<ChannelMember>> {
        self.context
            .list_all(
                "channels.list_members",
                &format!("teams/{team_id}/channels/{channel_id}/members"),
                &[],
                cancel,
            )
            .await
            .map_err(|e| e.classify(channel_refs(team_id, channel_id)))
    }
}
