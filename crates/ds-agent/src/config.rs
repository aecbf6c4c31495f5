//! Agent configuration, loadable from TOML.

use serde::Deserialize;

use ds_gateway::McpConfig;

use crate::chat::LlmConfig;
use crate::orchestrator::UnknownIntentPolicy;

/// Which intent classifier the orchestrator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    /// Keyword matching, no model call.
    Heuristic,
    /// Delegate classification to the chat model.
    Llm,
}

/// Query pipeline settings.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Per-query deadline in seconds, model calls included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Cap on dashboards returned by any retrieval.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_classifier")]
    pub classifier: ClassifierStrategy,
    #[serde(default = "default_unknown_intent")]
    pub unknown_intent: UnknownIntentPolicy,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_results() -> usize {
    100
}

fn default_classifier() -> ClassifierStrategy {
    ClassifierStrategy::Heuristic
}

fn default_unknown_intent() -> UnknownIntentPolicy {
    UnknownIntentPolicy::List
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
            classifier: default_classifier(),
            unknown_intent: default_unknown_intent(),
        }
    }
}

/// Top-level configuration for the query agent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentConfig {
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

impl AgentConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
