//! Test fixtures for Graph API responses.
//!
//! Provides realistic test data for unit tests.

use crate::types::*;
use serde_json::{json, Value};

/// A team ID in canonical GUID form
pub const TEAM_ID: &str = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";

/// A channel ID in canonical thread form
pub const CHANNEL_ID: &str = "19:a1b2c3d4e5f6@thread.tacv2";

/// A one-on-one chat ID
pub const CHAT_ID: &str = "19:8b081ef6-4792-4def-b2c9-c363a1bf41d5_5031bb31@unq.gbl.spaces";

/// Create a fixture team
pub fn team(id: &str, display_name: &str) -> Team {
    Team {
        id: id.to_string(),
        display_name: display_name.to_string(),
        description: Some(format!("{display_name} team")),
        visibility: Some("private".to_string()),
        is_archived: Some(false),
        web_url: None,
    }
}

/// Create a fixture channel
pub fn channel(id: &str, display_name: &str) -> Channel {
    Channel {
        id: id.to_string(),
        display_name: display_name.to_string(),
        description: None,
        membership_type: Some("standard".to_string()),
        email: None,
        web_url: None,
    }
}

/// Create a fixture channel member as it appears on the wire
pub fn member_json(id: &str, display_name: &str, user_id: &str, email: &str) -> Value {
    json!({
        "@odata.type": "#microsoft.graph.aadUserConversationMember",
        "id": id,
        "displayName": display_name,
        "userId": user_id,
        "email": email,
        "roles": [],
    })
}

/// Create a fixture channel message
pub fn channel_message(id: &str, content: &str) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        reply_to_id: None,
        message_type: Some("message".to_string()),
        created_date_time: None,
        last_modified_date_time: None,
        subject: None,
        body: Some(ItemBody {
            content_type: Some("text".to_string()),
            content: content.to_string(),
        }),
        from: Some(MessageSender {
            user: Some(Identity {
                id: Some("u-1".to_string()),
                display_name: Some("Ada Lovelace".to_string()),
            }),
            application: None,
        }),
        importance: Some("normal".to_string()),
        channel_identity: Some(ChannelIdentity {
            team_id: TEAM_ID.to_string(),
            channel_id: CHANNEL_ID.to_string(),
        }),
        chat_id: None,
        web_url: None,
    }
}

/// Wrap items in a collection response
pub fn list_response<T: serde::Serialize>(items: &[T]) -> Value {
    json!({ "value": items })
}

/// Create a search hit for a message.
///
/// `channel_identity` is inserted as-is so malformed payloads can be tested.
pub fn search_hit(message_id: &str, channel_identity: Value, chat_id: Option<&str>) -> Value {
    let mut resource = json!({
        "@odata.type": "#microsoft.graph.chatMessage",
        "id": message_id,
        "channelIdentity": channel_identity,
    });
    if let Some(chat_id) = chat_id {
        resource["chatId"] = json!(chat_id);
    }
    json!({
        "hitId": message_id,
        "rank": 1,
        "summary": format!("<c0>{message_id}</c0>"),
        "resource": resource,
    })
}

/// Create a search hit for a message in the fixture channel
pub fn channel_hit(message_id: &str) -> Value {
    search_hit(
        message_id,
        json!({"teamId": TEAM_ID, "channelId": CHANNEL_ID}),
        None,
    )
}

/// Wrap hits in a search response
pub fn search_response(hits: Vec<Value>) -> Value {
    let total = hits.len();
    json!({
        "value": [{
            "searchTerms": ["deploy"],
            "hitsContainers": [{
                "hits": hits,
                "total": total,
                "moreResultsAvailable": false,
            }]
        }]
    })
}
