//! High-level dashboard retrieval operations over the MCP transport.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use ds_protocol::{DashboardRecord, MetricsQuery, MetricsQueryResult};

use crate::error::{GatewayError, GatewayResult};
use crate::normalize;
use crate::transport::{McpTransport, ToolReply};

/// Remote tool names on the inventory MCP server.
const SEARCH_TOOL: &str = "search_dashboards";
const GET_TOOL: &str = "get_dashboard_by_uid";
const METRICS_TOOL: &str = "query_grafana_metrics";

/// Retrieval operations, normalizing whatever shape the server returns.
pub struct DashboardGateway {
    transport: Arc<dyn McpTransport>,
    max_results: usize,
}

impl DashboardGateway {
    pub fn new(transport: Arc<dyn McpTransport>, max_results: usize) -> Self {
        Self {
            transport,
            max_results,
        }
    }

    /// All dashboards (the search tool with no query).
    pub async fn list_dashboards(&self) -> GatewayResult<Vec<DashboardRecord>> {
        let reply = self.transport.call_tool(SEARCH_TOOL, json!({})).await?;
        let records = self.records_from(reply, SEARCH_TOOL)?;
        tracing::debug!(count = records.len(), "listed dashboards");
        Ok(records)
    }

    /// Dashboards matching one search term.
    ///
    /// An empty or whitespace-only term is rejected before any network
    /// call is made.
    pub async fn search_dashboards(&self, term: &str) -> GatewayResult<Vec<DashboardRecord>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(GatewayError::Data("search term cannot be empty".to_string()));
        }
        let reply = self
            .transport
            .call_tool(SEARCH_TOOL, json!({ "query": term }))
            .await?;
        let records = self.records_from(reply, SEARCH_TOOL)?;
        tracing::debug!(term, count = records.len(), "searched dashboards");
        Ok(records)
    }

    /// One search per pipe-delimited keyword, merged in first-seen order
    /// and deduplicated by unique key.
    pub async fn search_multi(&self, terms: &str) -> GatewayResult<Vec<DashboardRecord>> {
        let keywords: Vec<&str> = terms
            .split('|')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(GatewayError::Data("search term cannot be empty".to_string()));
        }

        let mut merged: Vec<DashboardRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for keyword in keywords {
            for record in self.search_dashboards(keyword).await? {
                if seen.insert(record.unique_key().to_string()) {
                    merged.push(record);
                }
            }
        }
        merged.truncate(self.max_results);
        Ok(merged)
    }

    /// One dashboard by uid. An empty/absent reply is not-found, never an
    /// empty success.
    pub async fn get_dashboard(&self, uid: &str) -> GatewayResult<DashboardRecord> {
        let uid = uid.trim();
        if uid.is_empty() {
            return Err(GatewayError::Data("dashboard uid cannot be empty".to_string()));
        }
        let reply = self
            .transport
            .call_tool(GET_TOOL, json!({ "uid": uid }))
            .await?;
        if reply.is_error {
            return Err(GatewayError::Remote(format!(
                "tool '{GET_TOOL}' reported an error: {}",
                reply.payload
            )));
        }
        if reply.payload.is_null() {
            return Err(GatewayError::NotFound(format!("Dashboard not found: {uid}")));
        }
        // A string payload may still decode to null or nothing; reuse the
        // batch normalizer and treat an empty batch as absent.
        normalize::record_batch(&reply.payload)
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound(format!("Dashboard not found: {uid}")))
    }

    /// Execute a metrics query. The result's time range is the query's,
    /// not whatever the reply claims.
    pub async fn query_metrics(&self, query: &MetricsQuery) -> GatewayResult<MetricsQueryResult> {
        let reply = self
            .transport
            .call_tool(METRICS_TOOL, query.to_tool_args())
            .await?;
        if reply.is_error {
            return Err(GatewayError::Remote(format!(
                "tool '{METRICS_TOOL}' reported an error: {}",
                reply.payload
            )));
        }

        let decoded;
        let payload = match &reply.payload {
            serde_json::Value::String(text) => {
                decoded = serde_json::from_str::<serde_json::Value>(text).map_err(|e| {
                    GatewayError::Data(format!("metrics payload was not JSON: {e}"))
                })?;
                &decoded
            }
            other => other,
        };

        let metric_name = payload
            .get("metric_name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(&query.metric_name);
        let unit = payload
            .get("unit")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("");
        let points = match payload.get("datapoints") {
            Some(raw) => normalize::datapoints(raw)?,
            None => Vec::new(),
        };

        tracing::debug!(
            metric = metric_name,
            count = points.len(),
            "metrics query returned"
        );

        Ok(MetricsQueryResult::new(
            metric_name,
            unit,
            query.time_range,
            points,
            Some(query.aggregation.as_str().to_string()),
            None,
        ))
    }

    fn records_from(&self, reply: ToolReply, tool: &str) -> GatewayResult<Vec<DashboardRecord>> {
        if reply.is_error {
            return Err(GatewayError::Remote(format!(
                "tool '{tool}' reported an error: {}",
                reply.payload
            )));
        }
        let mut records = normalize::record_batch(&reply.payload);
        if records.len() > self.max_results {
            tracing::warn!(
                count = records.len(),
                max = self.max_results,
                "truncating result list"
            );
            records.truncate(self.max_results);
        }
        Ok(records)
    }
}
