//! Mock MCP transport for testing.
//!
//! Supports scripted reply queues per tool and call recording. Unit tests
//! across the workspace use this instead of a live MCP server.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{GatewayError, GatewayResult};
use crate::transport::{McpTransport, ToolReply};

/// Mock transport with scripted replies and call recording.
pub struct MockTransport {
    /// Queued replies per tool name (FIFO order).
    replies: Mutex<HashMap<String, VecDeque<GatewayResult<ToolReply>>>>,
    /// All calls made, for test assertions.
    calls: Mutex<Vec<(String, serde_json::Value)>>,
    /// Tool names advertised by `list_tools`.
    tools: Vec<String>,
}

impl MockTransport {
    /// Create a new mock with no queued replies.
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            tools: vec![
                "search_dashboards".into(),
                "get_dashboard_by_uid".into(),
                "query_grafana_metrics".into(),
            ],
        }
    }

    /// Create a mock whose next search returns the three-record sample.
    pub fn with_dashboard_sample() -> Self {
        let mock = Self::new();
        mock.queue_payload("search_dashboards", Self::sample_dashboards());
        mock
    }

    /// Sample inventory payload in the wrapped wire shape, with the
    /// camelCase field spellings the live service emits.
    pub fn sample_dashboards() -> serde_json::Value {
        json!({
            "dashboards": [
                {
                    "id": 1,
                    "uid": "prod-api",
                    "title": "Prod API Dashboard",
                    "updated": "2024-01-15T10:30:00Z",
                    "folderTitle": "Production",
                    "tags": ["production", "api"],
                    "orgId": 1,
                    "isStarred": true
                },
                {
                    "id": 2,
                    "uid": "db-perf",
                    "title": "Database Performance",
                    "updated": "2024-01-14T08:00:00Z",
                    "folderTitle": "Infrastructure",
                    "tags": ["database", "performance"],
                    "orgId": 1,
                    "isStarred": false
                },
                {
                    "id": 3,
                    "uid": "service-health",
                    "title": "Service Health",
                    "updated": "2024-01-15T16:45:00Z",
                    "folderTitle": "Monitoring",
                    "tags": ["services", "health"],
                    "orgId": 1,
                    "isStarred": true
                }
            ]
        })
    }

    /// Queue a full reply (success or error) for a tool.
    pub fn queue_reply(&self, tool: &str, reply: GatewayResult<ToolReply>) {
        self.replies
            .lock()
            .unwrap()
            .entry(tool.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Queue a successful reply with the given payload.
    pub fn queue_payload(&self, tool: &str, payload: serde_json::Value) {
        self.queue_reply(tool, Ok(ToolReply::ok(payload)));
    }

    /// Get copies of all recorded calls (tool name, arguments).
    pub fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl McpTransport for MockTransport {
    async fn call_tool(&self, name: &str, args: serde_json::Value) -> GatewayResult<ToolReply> {
        self.calls.lock().unwrap().push((name.to_string(), args));
        self.replies
            .lock()
            .unwrap()
            .get_mut(name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(GatewayError::Data(format!(
                    "no scripted reply for tool '{name}'"
                )))
            })
    }

    async fn list_tools(&self) -> GatewayResult<Vec<String>> {
        Ok(self.tools.clone())
    }
}
