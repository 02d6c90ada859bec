//! Channel-related types for the Graph API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A channel within a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    /// Channel ID (`19:...@thread.tacv2`)
    pub id: String,
    /// Display name
    #[serde(default)]
    pub display_name: String,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Membership type (`standard`, `private`, `shared`)
    #[serde(default)]
    pub membership_type: Option<String>,
    /// Email address for posting into the channel
    #[serde(default)]
    pub email: Option<String>,
    /// Link to the channel in the Teams client
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A member of a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMember {
    /// Membership ID
    pub id: String,
    /// Display name of the member
    #[serde(default)]
    pub display_name: Option<String>,
    /// Directory user ID
    #[serde(default)]
    pub user_id: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Roles held in the channel (`owner`, `guest`)
    #[serde(default)]
    pub roles: Vec<String>,
    /// Extension attributes not modelled above (`userPrincipalName`, `mail`, ...)
    #[serde(flatten)]
    pub additional_data: HashMap<String, Value>,
}

impl ChannelMember {
    /// String-valued extension attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.additional_data.get(name).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_keeps_extension_attributes() {
        let member: ChannelMember = serde_json::from_value(serde_json::json!({
            "@odata.type": "#microsoft.graph.aadUserConversationMember",
            "id": "mem-1",
            "displayName": "Ada Lovelace",
            "userId": "u-1",
            "email": "ada@contoso.com",
            "roles": ["owner"],
            "userPrincipalName": "ada@contoso.onmicrosoft.com"
        }))
        .unwrap();

        assert_eq!(member.user_id.as_deref(), Some("u-1"));
        assert_eq!(member.attribute("userPrincipalName"), Some("ada@contoso.onmicrosoft.com"));
        assert_eq!(member.attribute("mail"), None);
        assert_eq!(member.roles, vec!["owner".to_string()]);
    }
}
