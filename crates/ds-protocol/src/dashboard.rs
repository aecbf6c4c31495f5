use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One dashboard inventory entry, normalized from the remote payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRecord {
    /// Numeric identifier as reported by the inventory, stringified.
    #[serde(default)]
    pub id: String,
    /// Unique-within-organization key.
    #[serde(default)]
    pub uid: String,
    /// Display title ("Untitled" when the source omitted one).
    #[serde(default = "default_title")]
    pub title: String,
    /// Last-update timestamp, absent when the source supplied none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    /// Owning folder name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_title: Option<String>,
    /// Tag set, in source order (may be empty).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Organization id (default 1).
    #[serde(default = "default_org_id")]
    pub org_id: i64,
    /// Starred flag.
    #[serde(default)]
    pub starred: bool,
}

fn default_title() -> String {
    "Untitled".to_string()
}

fn default_org_id() -> i64 {
    1
}

impl DashboardRecord {
    /// Minimal constructor for fixtures; remaining fields take their defaults.
    pub fn new(uid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            uid: uid.into(),
            title: title.into(),
            updated: None,
            folder_title: None,
            tags: Vec::new(),
            org_id: default_org_id(),
            starred: false,
        }
    }

    /// Key used when merging search results: uid, falling back to id.
    ///
    /// Never empty for a normalized record (id and uid are not both blank).
    pub fn unique_key(&self) -> &str {
        if self.uid.is_empty() {
            &self.id
        } else {
            &self.uid
        }
    }
}
