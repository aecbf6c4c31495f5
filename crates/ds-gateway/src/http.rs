//! HTTP implementation of the MCP transport.
//!
//! Tools are invoked as `POST {base_url}/tools/{name}` with JSON
//! arguments. Some server builds wrap tool output in an MCP content
//! envelope (`{"content": [{"type": "text", "text": ...}], "isError": ...}`);
//! those are flattened here by joining the text blocks, and the joined
//! string re-enters the normal payload decoding downstream.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{GatewayError, GatewayResult};
use crate::transport::{McpTransport, ToolReply};

/// MCP server connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct McpConfig {
    /// MCP server base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_timeout_secs() -> u64 {
    5
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// MCP content envelope (only the fields we need).
#[derive(Deserialize)]
struct ContentEnvelope {
    content: Vec<ContentBlock>,
    #[serde(default, rename = "isError")]
    is_error: bool,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Client for an MCP tool server speaking plain HTTP.
pub struct HttpMcpTransport {
    client: reqwest::Client,
    config: McpConfig,
}

impl HttpMcpTransport {
    pub fn new(config: McpConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build reqwest client");
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl McpTransport for HttpMcpTransport {
    async fn call_tool(&self, name: &str, args: serde_json::Value) -> GatewayResult<ToolReply> {
        let url = self.url(&format!("tools/{name}"));

        let response = self
            .client
            .post(&url)
            .json(&args)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(format!("tool '{name}' call failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            GatewayError::Connection(format!("tool '{name}' body read failed: {e}"))
        })?;

        if status.is_client_error() || status.is_server_error() {
            return Err(GatewayError::Connection(format!(
                "MCP server returned {status} for tool '{name}': {body}"
            )));
        }

        Ok(decode_reply(&body))
    }

    async fn list_tools(&self) -> GatewayResult<Vec<String>> {
        let url = self.url("tools");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(format!("tool listing failed: {e}")))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(GatewayError::Connection(format!(
                "MCP server returned {status} for tool listing"
            )));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Data(format!("tool listing was not JSON: {e}")))?;

        Ok(tool_names(value))
    }
}

/// Decode a raw response body into a `ToolReply`.
fn decode_reply(body: &str) -> ToolReply {
    if body.is_empty() {
        return ToolReply::ok(serde_json::Value::Null);
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        // Non-JSON body: hand the raw text downstream as-is.
        return ToolReply::ok(serde_json::Value::String(body.to_string()));
    };
    if let Ok(envelope) = serde_json::from_value::<ContentEnvelope>(value.clone()) {
        if envelope.content.is_empty() {
            return ToolReply {
                payload: serde_json::Value::Null,
                is_error: envelope.is_error,
            };
        }
        let text = envelope
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n");
        return ToolReply {
            payload: serde_json::Value::String(text),
            is_error: envelope.is_error,
        };
    }
    ToolReply::ok(value)
}

/// The listing endpoint has returned both a bare name array and a
/// `{"tools": [...]}` wrapper with string or `{"name": ...}` items.
fn tool_names(value: serde_json::Value) -> Vec<String> {
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("tools") {
            Some(serde_json::Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(name) => Some(name),
            serde_json::Value::Object(map) => map
                .get("name")
                .and_then(serde_json::Value::as_str)
                .map(String::from),
            _ => None,
        })
        .collect()
}
