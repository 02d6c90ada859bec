//! Messages service for the Graph API.

use super::ServiceContext;
use crate::errors::{ApiError, ResourceKind, ResourceRefs, TeamsError, TeamsResult};
use crate::types::{ChatMessage, MessageLocation, SearchEntity};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Trait for messages service operations
#[async_trait]
pub trait MessagesServiceTrait: Send + Sync {
    /// Get a message posted in a channel
    async fn get_channel_message(
        &self,
        team_id: &str,
        channel_id: &str,
        message_id: &str,
        cancel: &CancellationToken,
    ) -> TeamsResult<ChatMessage>;

    /// Get a message posted in a chat
    async fn get_chat_message(
        &self,
        chat_id: &str,
        message_id: &str,
        cancel: &CancellationToken,
    ) -> TeamsResult<ChatMessage>;

    /// Fetch the full message a search entity points at.
    ///
    /// An entity without a message ID or without a channel/chat location
    /// cannot be fetched and reports `NotFound`.
    async fn fetch_for_entity(
        &self,
        entity: &SearchEntity,
        cancel: &CancellationToken,
    ) -> TeamsResult<ChatMessage>;
}

/// Messages service implementation
#[derive(Debug, Clone)]
pub struct MessagesService {
    context: ServiceContext,
}

impl MessagesService {
    /// Create a new messages service
    pub fn new(context: ServiceContext) -> Self {
        Self { context }
    }
}

fn unlocatable(entity: &SearchEntity) -> TeamsError {
    TeamsError::NotFound {
        refs: ResourceRefs::new().with(ResourceKind::Message, entity.message_id.iter().cloned()),
        source: ApiError::new("NotFound", "Search hit has no channel or chat location").with_status(404),
    }
}

#[async_trait]
impl MessagesServiceTrait for MessagesService {
    #[instrument(skip(self, cancel))]
    async fn get_channel_message(
        &self,
        team_id: &str,
        channel_id: &str,
        message_id: &str,
        cancel: &CancellationToken,
    ) -> TeamsResult<ChatMessage> {
        self.context
            .get(
                "messages.get_channel_message",
                &format!("teams/{team_id}/channels/{channel_id}/messages/{message_id}"),
                &[],
                cancel,
            )
            .await
            .map_err(|e| {
                e.classify(
                    ResourceRefs::new()
                        .with(ResourceKind::Team, [team_id])
                        .with(ResourceKind::Channel, [channel_id])
                        .with(ResourceKind::Message, [message_id]),
                )
            })
    }

    #[instrument(skip(self, cancel))]
    async fn get_chat_message(
        &self,
        chat_id: &str,
        message_id: &str,
        cancel: &CancellationToken,
    ) -> TeamsResult<ChatMessage> {
        self.context
            .get(
                "messages.get_chat_message",
                &format!("chats/{chat_id}/messages/{message_id}"),
                &[],
                cancel,
            )
            .await
            .map_err(|e| {
                e.classify(
                    ResourceRefs::new()
                        .with(ResourceKind::Chat, [chat_id])
                        .with(ResourceKind::Message, [message_id]),
                )
            })
    }

    #[instrument(skip(self, entity, cancel), fields(message_id = ?entity.message_id))]
    async fn fetch_for_entity(
        &self,
        entity: &SearchEntity,
        cancel: &CancellationToken,
    ) -> TeamsResult<ChatMessage> {
        let Some(message_id) = entity.message_id.as_deref() else {
            return Err(unlocatable(entity));
        };

        match entity.location() {
            Some(MessageLocation::Channel {
                team_id,
                channel_id,
            }) => {
                self.get_channel_message(team_id, channel_id, message_id, cancel)
                    .await
            }
            Some(MessageLocation::Chat { chat_id }) => {
                self.get_chat_message(chat_id, message_id, cancel).await
            }
            None => Err(unlocatable(entity)),
        }
    }
}
