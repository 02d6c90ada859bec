//! Team-related types for the Graph API.

use serde::{Deserialize, Serialize};

/// A team the caller can see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Team ID (a GUID)
    pub id: String,
    /// Display name
    #[serde(default)]
    pub display_name: String,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Visibility (`public` / `private`)
    #[serde(default)]
    pub visibility: Option<String>,
    /// Whether the team is archived
    #[serde(default)]
    pub is_archived: Option<bool>,
    /// Link to the team in the Teams client
    #[serde(default)]
    pub web_url: Option<String>,
}
