//! API server configuration, loadable from TOML.

use serde::Deserialize;

use ds_agent::config::QueryConfig;
use ds_agent::LlmConfig;
use ds_gateway::McpConfig;

/// Listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Top-level API server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// MCP tool server connection settings.
    #[serde(default)]
    pub mcp: McpConfig,
    /// Chat model provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Query pipeline settings.
    #[serde(default)]
    pub query: QueryConfig,
}

impl ApiConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
