//! Common types for the Graph API.
//!
//! Defines shared data structures used across services.

use serde::{Deserialize, Serialize};

pub mod channel;
pub mod message;
pub mod search;
pub mod team;

pub use channel::*;
pub use message::*;
pub use search::*;
pub use team::*;

/// Collection response wrapper (`{"value": [...], "@odata.nextLink": ...}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Items on this page
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    /// Absolute URL of the next page, if any
    #[serde(rename = "@odata.nextLink", default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

impl<T> ListResponse<T> {
    /// Check whether there are more pages
    pub fn has_more(&self) -> bool {
        self.next_link.as_deref().is_some_and(|link| !link.is_empty())
    }
}

/// Identity of a user (`{"id", "displayName"}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// User ID
    #[serde(default)]
    pub id: Option<String>,
    /// Display name
    #[serde(default)]
    pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_next_link() {
        let page: ListResponse<Team> = serde_json::from_value(serde_json::json!({
            "value": [{"id": "t1", "displayName": "Engineering"}],
            "@odata.nextLink": "https://graph.microsoft.com/v1.0/me/joinedTeams?$skiptoken=abc"
        }))
        .unwrap();

        assert_eq!(page.value.len(), 1);
        assert!(page.has_more());
    }

    #[test]
    fn test_list_response_without_value() {
        let page: ListResponse<Team> = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(page.value.is_empty());
        assert!(!page.has_more());
    }
}
