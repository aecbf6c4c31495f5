//! Relative-to-absolute time range resolution via the chat model.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use ds_protocol::{QueryError, TimeRange};

use crate::chat::{self, ChatModel};
use crate::prompts;

const REPHRASE_SUGGESTION: &str =
    "Try rephrasing the time range, e.g. 'last 1 hour' or 'yesterday'";

/// Raw model output before validation.
#[derive(Deserialize)]
struct TimeRangeReply {
    #[serde(default)]
    start_time: String,
    #[serde(default)]
    end_time: String,
}

/// Converts expressions like "last 1 hour" into absolute UTC ranges.
///
/// One model call per resolution, no retry. Every failure surfaces as a
/// `parsing_error` with a rephrase suggestion, never a panic.
pub struct TimeRangeResolver {
    model: Arc<dyn ChatModel>,
}

impl TimeRangeResolver {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn resolve(
        &self,
        expression: &str,
        now: DateTime<Utc>,
    ) -> Result<TimeRange, QueryError> {
        let reply = self
            .model
            .invoke(&prompts::time_range_messages(expression, now))
            .await
            .map_err(|e| {
                QueryError::parsing(format!("time conversion call failed: {e}"))
                    .with_suggestion(REPHRASE_SUGGESTION)
            })?;

        let Some(slice) = chat::json_slice(&reply) else {
            return Err(parsing_failure(
                "no JSON object in time conversion reply",
                &reply,
            ));
        };

        let parsed: TimeRangeReply = serde_json::from_str(slice).map_err(|e| {
            parsing_failure(
                format!("time conversion reply was not valid JSON: {e}"),
                &reply,
            )
        })?;

        let start_raw = parsed.start_time.trim();
        let end_raw = parsed.end_time.trim();
        if start_raw.is_empty() || end_raw.is_empty() {
            return Err(parsing_failure(
                "start_time or end_time missing from time conversion reply",
                &reply,
            ));
        }

        let start = chat::parse_iso_utc(start_raw).ok_or_else(|| {
            parsing_failure(format!("could not parse start_time '{start_raw}'"), &reply)
        })?;
        let end = chat::parse_iso_utc(end_raw).ok_or_else(|| {
            parsing_failure(format!("could not parse end_time '{end_raw}'"), &reply)
        })?;

        TimeRange::new(start, end)
    }
}

fn parsing_failure(message: impl Into<String>, reply: &str) -> QueryError {
    QueryError::parsing(message)
        .with_suggestion(REPHRASE_SUGGESTION)
        .with_detail(reply)
}
