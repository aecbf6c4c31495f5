//! Natural-language metrics questions: parse, execute, format.
//!
//! The pipeline runs three stages in order. A failure at any stage skips
//! the rest and renders as an error message with a suggestion, never as a
//! panic or an escaped error.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use ds_gateway::{DashboardGateway, GatewayError};
use ds_protocol::{ErrorCode, MetricsQuery, MetricsQueryResult, QueryError, QueryErrorKind};

use crate::chat::{self, ChatModel};
use crate::format;
use crate::prompts;
use crate::timerange::TimeRangeResolver;

const PHRASING_SUGGESTION: &str = "Try phrasing as: 'Show [metric_name] for [time_period]'";

/// Model confidence assigned to queries extracted from free text.
const EXTRACTED_CONFIDENCE: f64 = 0.8;

/// Raw model output before validation. Both fields may be absent or null.
#[derive(Deserialize)]
struct ParsedQuestion {
    #[serde(default)]
    metric_name: Option<String>,
    #[serde(default)]
    relative_time_range: Option<String>,
}

/// Extracts a [`MetricsQuery`] from a natural-language question.
///
/// Two model calls in sequence: metric and relative-range extraction,
/// then relative-to-absolute conversion via [`TimeRangeResolver`].
pub struct MetricsQueryParser {
    model: Arc<dyn ChatModel>,
    resolver: TimeRangeResolver,
}

impl MetricsQueryParser {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            resolver: TimeRangeResolver::new(model.clone()),
            model,
        }
    }

    pub async fn parse_question(
        &self,
        question: &str,
        now: DateTime<Utc>,
    ) -> Result<MetricsQuery, QueryError> {
        let reply = self
            .model
            .invoke(&prompts::metrics_parse_messages(question))
            .await
            .map_err(|e| {
                QueryError::parsing(format!("metric extraction call failed: {e}"))
                    .with_suggestion(PHRASING_SUGGESTION)
            })?;

        let Some(slice) = chat::json_slice(&reply) else {
            return Err(extraction_failure(
                "no JSON object in metric extraction reply",
                &reply,
            ));
        };

        let parsed: ParsedQuestion = serde_json::from_str(slice).map_err(|e| {
            extraction_failure(
                format!("metric extraction reply was not valid JSON: {e}"),
                &reply,
            )
        })?;

        let metric_name = parsed.metric_name.as_deref().unwrap_or("").trim();
        let time_expression = parsed.relative_time_range.as_deref().unwrap_or("").trim();
        if metric_name.is_empty() || time_expression.is_empty() {
            return Err(extraction_failure(
                "Could not identify the metric and time period in your question",
                &reply,
            ));
        }

        let time_range = self.resolver.resolve(time_expression, now).await?;

        Ok(MetricsQuery::new(metric_name, time_range)?.with_confidence(EXTRACTED_CONFIDENCE))
    }
}

/// End-to-end answering of metrics questions.
pub struct MetricsPipeline {
    parser: MetricsQueryParser,
    gateway: Arc<DashboardGateway>,
    timeout: Duration,
}

impl MetricsPipeline {
    pub fn new(
        model: Arc<dyn ChatModel>,
        gateway: Arc<DashboardGateway>,
        timeout: Duration,
    ) -> Self {
        Self {
            parser: MetricsQueryParser::new(model),
            gateway,
            timeout,
        }
    }

    /// Answer a metrics question. Always returns displayable text.
    pub async fn ask(&self, question: &str) -> String {
        match tokio::time::timeout(self.timeout, self.run(question)).await {
            Ok(Ok(result)) => result.summary(),
            Ok(Err(error)) => {
                tracing::warn!(kind = error.kind.as_str(), error = %error, "metrics query failed");
                format::query_error(&error)
            }
            Err(_) => {
                tracing::error!("metrics query timed out");
                format!("Error: {}", ErrorCode::Timeout.user_message())
            }
        }
    }

    async fn run(&self, question: &str) -> Result<MetricsQueryResult, QueryError> {
        let query = self.parser.parse_question(question, Utc::now()).await?;
        tracing::debug!(metric = %query.metric_name, "metrics query parsed");
        self.gateway
            .query_metrics(&query)
            .await
            .map_err(map_gateway_error)
    }
}

fn extraction_failure(message: impl Into<String>, reply: &str) -> QueryError {
    QueryError::parsing(message)
        .with_suggestion(PHRASING_SUGGESTION)
        .with_detail(reply)
}

/// Translate retrieval failures into the metrics error taxonomy.
fn map_gateway_error(error: GatewayError) -> QueryError {
    match error {
        GatewayError::Connection(detail) => QueryError::new(
            QueryErrorKind::GrafanaUnavailable,
            "Failed to execute metrics query against Grafana",
        )
        .with_suggestion("Check that Grafana and the MCP server are running")
        .with_detail(detail),
        GatewayError::Remote(detail) | GatewayError::Data(detail) => QueryError::new(
            QueryErrorKind::InvalidQuery,
            "Invalid response from MCP server",
        )
        .with_suggestion("Verify MCP server tool output format")
        .with_detail(detail),
        GatewayError::NotFound(detail) => {
            QueryError::new(QueryErrorKind::MetricNotFound, detail)
        }
    }
}
