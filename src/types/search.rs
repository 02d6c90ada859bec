//! Search-related types.

use super::ChatMessage;
use crate::config::Concurrency;
use serde::{Deserialize, Serialize};

/// Lightweight reference to a message, extracted from a search hit.
///
/// Identity is the message ID. Channel context (team + channel) and chat
/// context are filled independently from the hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntity {
    /// Message ID
    pub message_id: Option<String>,
    /// Team ID, set together with `channel_id`
    pub team_id: Option<String>,
    /// Channel ID, set together with `team_id`
    pub channel_id: Option<String>,
    /// Chat ID
    pub chat_id: Option<String>,
    /// Hit summary with highlighted terms
    pub summary: Option<String>,
}

/// Where a message lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLocation<'a> {
    /// Channel message
    Channel {
        /// Team ID
        team_id: &'a str,
        /// Channel ID
        channel_id: &'a str,
    },
    /// Chat message
    Chat {
        /// Chat ID
        chat_id: &'a str,
    },
}

impl SearchEntity {
    /// Create an entity for a message ID only
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            ..Default::default()
        }
    }

    /// Set the channel context
    pub fn in_channel(mut self, team_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Set the chat context
    pub fn in_chat(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Location of the message; channel context wins when both are present
    pub fn location(&self) -> Option<MessageLocation<'_>> {
        match (&self.team_id, &self.channel_id, &self.chat_id) {
            (Some(team_id), Some(channel_id), _) => Some(MessageLocation::Channel {
                team_id,
                channel_id,
            }),
            (_, _, Some(chat_id)) => Some(MessageLocation::Chat { chat_id }),
            _ => None,
        }
    }
}

/// A surviving entity bound to its position in the hit sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentTask {
    /// Position of the hit among all extracted entities
    pub original_index: usize,
    /// Entity to fetch
    pub entity: SearchEntity,
}

/// A fully fetched message with its origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMessage {
    /// The message
    pub message: ChatMessage,
    /// Team ID for channel messages
    pub team_id: Option<String>,
    /// Channel ID for channel messages
    pub channel_id: Option<String>,
    /// Chat ID for chat messages
    pub chat_id: Option<String>,
}

impl EnrichedMessage {
    /// Combine a fetched message with the entity it was fetched for
    pub fn new(message: ChatMessage, entity: &SearchEntity) -> Self {
        Self {
            message,
            team_id: entity.team_id.clone(),
            channel_id: entity.channel_id.clone(),
            chat_id: entity.chat_id.clone(),
        }
    }
}

/// Options for a message search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchMessagesOptions {
    /// KQL query string
    pub query: String,
    /// Page size; the configured default when unset
    pub top: Option<u32>,
    /// Token returned by the previous page
    pub page_token: Option<String>,
    /// Enrichment concurrency; the configured default when unset
    pub concurrency: Option<Concurrency>,
}

impl SearchMessagesOptions {
    /// Create options for a query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the page size
    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Continue from a previous page
    pub fn page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    /// Set the enrichment concurrency
    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = Some(concurrency);
        self
    }
}

/// One page of enriched search results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    /// One slot per enrichment task, in hit order; `None` for soft-skipped
    /// messages that no longer exist
    pub messages: Vec<Option<EnrichedMessage>>,
    /// Token for the next page, if the current page was full
    pub next_page_token: Option<String>,
}

impl SearchPage {
    /// Messages that were fetched, in hit order
    pub fn found(&self) -> impl Iterator<Item = &EnrichedMessage> {
        self.messages.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_prefers_channel() {
        let entity = SearchEntity::new("m1").in_channel("t1", "19:c1@thread.tacv2");
        assert_eq!(
            entity.location(),
            Some(MessageLocation::Channel {
                team_id: "t1",
                channel_id: "19:c1@thread.tacv2"
            })
        );

        let entity = SearchEntity::new("m2").in_chat("19:chat@unq.gbl.spaces");
        assert_eq!(
            entity.location(),
            Some(MessageLocation::Chat {
                chat_id: "19:chat@unq.gbl.spaces"
            })
        );

        assert_eq!(SearchEntity::new("m3").location(), None);
    }

    #[test]
    fn test_options_clone_is_independent() {
        let options = SearchMessagesOptions::new("deploy").top(10);
        let mut copy = options.clone();
        copy.page_token = Some("10".to_string());
        assert!(options.page_token.is_none());
    }
}
