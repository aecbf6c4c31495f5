//! Shared application state for the Axum server.

use std::sync::Arc;
use std::time::Duration;

use ds_agent::classify::{HeuristicClassifier, IntentClassifier, LlmClassifier};
use ds_agent::config::ClassifierStrategy;
use ds_agent::{build_chat_model, MetricsPipeline, QueryOrchestrator};
use ds_gateway::{DashboardGateway, HttpMcpTransport};

use crate::config::ApiConfig;

/// Shared application state, cloned into each Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// Dashboard query pipeline.
    pub orchestrator: Arc<QueryOrchestrator>,
    /// Metrics question pipeline.
    pub metrics: Arc<MetricsPipeline>,
    /// Direct dashboard retrieval, for the REST resource endpoints.
    pub gateway: Arc<DashboardGateway>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<QueryOrchestrator>,
        metrics: Arc<MetricsPipeline>,
        gateway: Arc<DashboardGateway>,
    ) -> Self {
        Self {
            orchestrator,
            metrics,
            gateway,
        }
    }

    /// Wire the full pipeline stack from configuration.
    pub fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let model = build_chat_model(&config.llm)?;

        let classifier: Arc<dyn IntentClassifier> = match config.query.classifier {
            ClassifierStrategy::Heuristic => Arc::new(HeuristicClassifier),
            ClassifierStrategy::Llm => Arc::new(LlmClassifier::new(model.clone())),
        };

        let transport = Arc::new(HttpMcpTransport::new(config.mcp.clone()));
        let gateway = Arc::new(DashboardGateway::new(transport, config.query.max_results));

        let timeout = Duration::from_secs(config.query.timeout_secs);
        let orchestrator = Arc::new(QueryOrchestrator::new(
            model.clone(),
            classifier,
            gateway.clone(),
            config.query.unknown_intent,
            timeout,
        ));
        let metrics = Arc::new(MetricsPipeline::new(model, gateway.clone(), timeout));

        Ok(Self::new(orchestrator, metrics, gateway))
    }
}
