//! MCP transport abstraction: invoke remote tools over HTTP, or serve
//! scripted replies in tests.

use async_trait::async_trait;

use crate::error::GatewayResult;

/// Result of one remote tool invocation, before any normalization.
#[derive(Debug, Clone)]
pub struct ToolReply {
    /// Raw payload: decoded JSON, a string still needing a decode pass,
    /// or null when the server returned no content.
    pub payload: serde_json::Value,
    /// Remote-reported failure flag, distinct from a transport failure.
    pub is_error: bool,
}

impl ToolReply {
    pub fn ok(payload: serde_json::Value) -> Self {
        Self {
            payload,
            is_error: false,
        }
    }

    pub fn tool_error(payload: serde_json::Value) -> Self {
        Self {
            payload,
            is_error: true,
        }
    }
}

/// Abstraction over the dashboard inventory's MCP tool server.
///
/// Transport failure (Err), a remote-reported failure (`is_error`), and
/// an empty-but-successful reply (null payload) are three distinct
/// outcomes; callers must not collapse them.
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Invoke a named tool with JSON arguments.
    async fn call_tool(&self, name: &str, args: serde_json::Value) -> GatewayResult<ToolReply>;

    /// List the tool names the server advertises.
    async fn list_tools(&self) -> GatewayResult<Vec<String>>;
}
