use serde::{Deserialize, Serialize};

/// What the caller is asking for, as classified from the raw query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// List every dashboard.
    List,
    /// Search dashboards by term. A pipe in the term separates
    /// alternate keywords ("db|database").
    Filter { term: String },
    /// A question about a specific dashboard's details.
    GetInfo,
    /// The query is not about dashboards at all.
    OutOfScope,
    /// No keyword set matched; routing policy decides what happens.
    Unknown,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::List => "list",
            Intent::Filter { .. } => "filter",
            Intent::GetInfo => "get_info",
            Intent::OutOfScope => "out_of_scope",
            Intent::Unknown => "unknown",
        }
    }
}

/// Terminal status of a query outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    /// Retrieval and formatting completed (possibly with zero results).
    Success,
    /// The query was rejected before retrieval (empty, or not understood).
    Invalid,
    /// A pipeline stage failed; the response carries the fixed message.
    Error,
    /// The scope guard tripped on the model's scoping reply.
    OutOfScope,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Success => "success",
            QueryStatus::Invalid => "invalid",
            QueryStatus::Error => "error",
            QueryStatus::OutOfScope => "out_of_scope",
        }
    }
}
