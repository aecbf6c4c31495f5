use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome-level error taxonomy. Every failed query maps to exactly one
/// of these, and each kind carries exactly one fixed user message so
/// responses stay byte-stable across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    EmptyQuery,
    InvalidQuery,
    OutOfScope,
    Timeout,
    ConnectionError,
    DataError,
    NotFound,
    ParsingError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyQuery => "empty_query",
            ErrorCode::InvalidQuery => "invalid_query",
            ErrorCode::OutOfScope => "out_of_scope",
            ErrorCode::Timeout => "timeout",
            ErrorCode::ConnectionError => "connection_error",
            ErrorCode::DataError => "data_error",
            ErrorCode::NotFound => "not_found",
            ErrorCode::ParsingError => "parsing_error",
            ErrorCode::InternalError => "internal_error",
        }
    }

    /// The fixed user-facing message for this kind.
    ///
    /// Out-of-scope outcomes normally carry the model's own scoping reply
    /// instead; this literal is the fallback when no reply is available.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCode::EmptyQuery => {
                "Please provide a query about dashboards (e.g., 'Show me all dashboards')."
            }
            ErrorCode::InvalidQuery => {
                "I didn't understand your request. Please ask about dashboards, e.g., \
                 'Show me all dashboards' or 'List dashboards with prod in the name'."
            }
            ErrorCode::OutOfScope => {
                "That request is outside what I can help with. Please ask about dashboards."
            }
            ErrorCode::Timeout => "Query took too long to process. Please try again.",
            ErrorCode::ConnectionError => {
                "Unable to connect to Grafana. Please check your configuration and ensure \
                 the MCP server is running."
            }
            ErrorCode::DataError => {
                "Grafana returned incomplete data. Please try again or contact your \
                 administrator."
            }
            ErrorCode::NotFound => "The requested dashboard could not be found.",
            ErrorCode::ParsingError => {
                "Could not parse your question. Try phrasing as: 'Show [metric_name] for \
                 [time_period]'."
            }
            ErrorCode::InternalError => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Retrieval/parsing failure tag used by the metrics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryErrorKind {
    ParsingError,
    MetricNotFound,
    InvalidTimeRange,
    GrafanaUnavailable,
    UnsupportedOperation,
    InvalidQuery,
}

impl QueryErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryErrorKind::ParsingError => "parsing_error",
            QueryErrorKind::MetricNotFound => "metric_not_found",
            QueryErrorKind::InvalidTimeRange => "invalid_time_range",
            QueryErrorKind::GrafanaUnavailable => "grafana_unavailable",
            QueryErrorKind::UnsupportedOperation => "unsupported_operation",
            QueryErrorKind::InvalidQuery => "invalid_query",
        }
    }
}

/// A retrieval or parsing failure, carried as a value through the
/// pipeline rather than raised across stage boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct QueryError {
    pub kind: QueryErrorKind,
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Remediation hint shown under the error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Diagnostic detail (raw reply fragments etc.), never user-facing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl QueryError {
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestion: None,
            detail: None,
        }
    }

    /// Parsing failure with the standard rephrase hint attached by callers.
    pub fn parsing(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::ParsingError, message)
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_serialization() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::ConnectionError).unwrap(),
            r#""connection_error""#
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::EmptyQuery).unwrap(),
            r#""empty_query""#
        );
    }

    #[test]
    fn user_messages_are_stable() {
        assert_eq!(
            ErrorCode::Timeout.user_message(),
            "Query took too long to process. Please try again."
        );
        assert_eq!(
            ErrorCode::EmptyQuery.user_message(),
            "Please provide a query about dashboards (e.g., 'Show me all dashboards')."
        );
    }

    #[test]
    fn query_error_display_is_message() {
        let err = QueryError::new(QueryErrorKind::GrafanaUnavailable, "MCP call failed");
        assert_eq!(err.to_string(), "MCP call failed");
    }

    #[test]
    fn query_error_builders() {
        let err = QueryError::parsing("no JSON object found in reply")
            .with_suggestion("Try rephrasing the time range")
            .with_detail("reply was: sure thing!");
        assert_eq!(err.kind, QueryErrorKind::ParsingError);
        assert_eq!(
            err.suggestion.as_deref(),
            Some("Try rephrasing the time range")
        );
        assert_eq!(err.detail.as_deref(), Some("reply was: sure thing!"));
    }

    #[test]
    fn query_error_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&QueryErrorKind::InvalidTimeRange).unwrap(),
            r#""invalid_time_range""#
        );
    }

    #[test]
    fn query_error_skips_absent_optionals() {
        let err = QueryError::new(QueryErrorKind::InvalidQuery, "metric name cannot be empty");
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("suggestion"));
        assert!(!json.contains("detail"));
    }
}
