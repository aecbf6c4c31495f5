//! DashScout query agent, interactive front end for the dashboard inventory.
//!
//! Wires the chat model, the MCP gateway, and the query pipelines into a
//! single binary with a line-oriented prompt loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use ds_agent::chat;
use ds_agent::classify::{HeuristicClassifier, IntentClassifier, LlmClassifier};
use ds_agent::config::{AgentConfig, ClassifierStrategy};
use ds_agent::metrics::MetricsPipeline;
use ds_agent::orchestrator::QueryOrchestrator;
use ds_gateway::{DashboardGateway, HttpMcpTransport, McpTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ds-agent starting");

    // ── Load config ─────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/dashscout/agent.toml".to_string());

    let config = match AgentConfig::from_file(&config_path) {
        Ok(config) => {
            tracing::info!(path = %config_path, "config loaded");
            config
        }
        Err(e) => {
            tracing::warn!(path = %config_path, error = %e, "config not loaded, using defaults");
            AgentConfig::default()
        }
    };

    // ── Chat model + classifier ─────────────────────────────────
    let model = chat::build_chat_model(&config.llm)?;
    tracing::info!(model = model.model_name(), "chat model ready");

    let classifier: Arc<dyn IntentClassifier> = match config.query.classifier {
        ClassifierStrategy::Heuristic => Arc::new(HeuristicClassifier),
        ClassifierStrategy::Llm => Arc::new(LlmClassifier::new(model.clone())),
    };

    // ── MCP gateway ─────────────────────────────────────────────
    let transport = Arc::new(HttpMcpTransport::new(config.mcp.clone()));
    match transport.list_tools().await {
        Ok(tools) => tracing::info!(?tools, "MCP server reachable"),
        Err(e) => tracing::warn!(error = %e, "MCP server not reachable at startup"),
    }
    let gateway = Arc::new(DashboardGateway::new(transport, config.query.max_results));

    // ── Pipelines ───────────────────────────────────────────────
    let timeout = Duration::from_secs(config.query.timeout_secs);
    let orchestrator = QueryOrchestrator::new(
        model.clone(),
        classifier,
        gateway.clone(),
        config.query.unknown_intent,
        timeout,
    );
    let metrics = MetricsPipeline::new(model, gateway, timeout);

    tracing::info!("ds-agent ready");
    println!("Ask about dashboards (prefix metrics questions with 'metrics:', 'exit' to quit).");

    // ── Prompt loop ─────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        let response = match input.strip_prefix("metrics:") {
            Some(question) => metrics.ask(question.trim()).await,
            None => orchestrator.ask(input).await.response,
        };
        println!("{response}\n");
    }

    tracing::info!("ds-agent stopped");
    Ok(())
}
