//! Message-related types for the Graph API.

use super::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    /// `text` or `html`
    #[serde(default)]
    pub content_type: Option<String>,
    /// Body content
    #[serde(default)]
    pub content: String,
}

/// Sender of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSender {
    /// Sending user, absent for application messages
    #[serde(default)]
    pub user: Option<Identity>,
    /// Sending application
    #[serde(default)]
    pub application: Option<Identity>,
}

impl MessageSender {
    /// Display name of whichever identity sent the message
    pub fn display_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .or(self.application.as_ref())
            .and_then(|identity| identity.display_name.as_deref())
    }
}

/// Team/channel pair a channel message belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelIdentity {
    /// Team ID
    pub team_id: String,
    /// Channel ID
    pub channel_id: String,
}

/// A channel or chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message ID
    pub id: String,
    /// Parent message ID for replies
    #[serde(default)]
    pub reply_to_id: Option<String>,
    /// `message`, `systemEventMessage`, ...
    #[serde(default)]
    pub message_type: Option<String>,
    /// Creation time
    #[serde(default)]
    pub created_date_time: Option<DateTime<Utc>>,
    /// Last modification time
    #[serde(default)]
    pub last_modified_date_time: Option<DateTime<Utc>>,
    /// Subject line
    #[serde(default)]
    pub subject: Option<String>,
    /// Body
    #[serde(default)]
    pub body: Option<ItemBody>,
    /// Sender
    #[serde(default)]
    pub from: Option<MessageSender>,
    /// Importance (`normal`, `high`, `urgent`)
    #[serde(default)]
    pub importance: Option<String>,
    /// Team/channel for channel messages
    #[serde(default)]
    pub channel_identity: Option<ChannelIdentity>,
    /// Chat ID for chat messages
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Link to the message in the Teams client
    #[serde(default)]
    pub web_url: Option<String>,
}

impl ChatMessage {
    /// Body text, or an empty string
    pub fn content(&self) -> &str {
        self.body.as_ref().map(|b| b.content.as_str()).unwrap_or("")
    }

    /// Whether this is a reply in a thread
    pub fn is_reply(&self) -> bool {
        self.reply_to_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_message_deserialization() {
        let message: ChatMessage = serde_json::from_value(serde_json::json!({
            "id": "1700000000000",
            "messageType": "message",
            "createdDateTime": "2024-01-15T10:30:00.123Z",
            "body": {"contentType": "html", "content": "<p>Ship it</p>"},
            "from": {"user": {"id": "u-1", "displayName": "Ada Lovelace"}, "application": null},
            "channelIdentity": {"teamId": "t-1", "channelId": "19:abc@thread.tacv2"}
        }))
        .unwrap();

        assert_eq!(message.content(), "<p>Ship it</p>");
        assert_eq!(
            message.from.as_ref().and_then(MessageSender::display_name),
            Some("Ada Lovelace")
        );
        assert_eq!(
            message.created_date_time.map(|t| t.date_naive()),
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0)
                .single()
                .map(|t| t.date_naive())
        );
        assert!(!message.is_reply());
    }
}
