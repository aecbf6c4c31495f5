//! Dashboard retrieval over an MCP-style HTTP tool server.
//!
//! The gateway hides the remote server's loose payload conventions from the
//! rest of the system: whatever shape a tool reply takes, callers get
//! normalized [`ds_protocol::DashboardRecord`] values or a typed error.

pub mod error;
pub mod gateway;
pub mod http;
pub mod mock;
pub mod normalize;
pub mod transport;

// Re-export key types for convenience
pub use error::{GatewayError, GatewayResult};
pub use gateway::DashboardGateway;
pub use http::{HttpMcpTransport, McpConfig};
pub use mock::MockTransport;
pub use transport::{McpTransport, ToolReply};
