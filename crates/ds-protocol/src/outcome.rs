use serde::{Deserialize, Serialize};

use crate::dashboard::DashboardRecord;
use crate::error::ErrorCode;
use crate::intent::{Intent, QueryStatus};

/// Terminal result of one query through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// User-facing response text.
    pub response: String,
    /// Terminal status.
    pub status: QueryStatus,
    /// Error taxonomy tag, present whenever status is not success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    /// Intent the classifier assigned, when classification ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    /// Records backing a successful dashboard answer. Never present on
    /// errors, so a failed query cannot leak partial data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<DashboardRecord>>,
}

impl QueryOutcome {
    pub fn success(
        response: impl Into<String>,
        intent: Intent,
        records: Vec<DashboardRecord>,
    ) -> Self {
        Self {
            response: response.into(),
            status: QueryStatus::Success,
            error_code: None,
            intent: Some(intent),
            records: Some(records),
        }
    }

    /// Rejection before retrieval: fixed guidance message for the code.
    pub fn invalid(code: ErrorCode) -> Self {
        Self {
            response: code.user_message().to_string(),
            status: QueryStatus::Invalid,
            error_code: Some(code),
            intent: None,
            records: None,
        }
    }

    /// Pipeline failure: fixed message for the code.
    pub fn error(code: ErrorCode) -> Self {
        Self {
            response: code.user_message().to_string(),
            status: QueryStatus::Error,
            error_code: Some(code),
            intent: None,
            records: None,
        }
    }

    /// Scope guard tripped; the model's own scoping reply is the response.
    pub fn out_of_scope(reply: impl Into<String>) -> Self {
        Self {
            response: reply.into(),
            status: QueryStatus::OutOfScope,
            error_code: Some(ErrorCode::OutOfScope),
            intent: Some(Intent::OutOfScope),
            records: None,
        }
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }
}
