//! Shared test harness for E2E integration tests.
//!
//! Runs the REST API against a wiremock MCP tool server, so each request
//! exercises the real HTTP transport, gateway, pipelines, and router
//! wiring end to end. Only the chat model is scripted.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ds_agent::classify::{HeuristicClassifier, IntentClassifier, LlmClassifier};
use ds_agent::config::ClassifierStrategy;
use ds_agent::{MetricsPipeline, MockChatModel, QueryOrchestrator, UnknownIntentPolicy};
use ds_chat_api::routes::build_router;
use ds_chat_api::state::AppState;
use ds_gateway::{DashboardGateway, HttpMcpTransport, McpConfig};

/// Scope-guard approval reply queued before most scripted queries.
pub const SCOPE_OK: &str = "Yes, this is a dashboard question I can help with.";

/// End-to-end test harness: REST router + scripted chat model + wiremock
/// MCP server.
pub struct TestHarness {
    /// Axum router for HTTP requests via `tower::oneshot`.
    pub router: Router,
    /// Scripted chat model shared by orchestrator and metrics pipeline.
    pub model: Arc<MockChatModel>,
    /// Wiremock server standing in for the MCP tool server.
    pub mcp: MockServer,
}

impl TestHarness {
    /// Heuristic classifier, 3 second query budget.
    pub async fn start() -> Self {
        Self::build(ClassifierStrategy::Heuristic, Duration::from_secs(3)).await
    }

    /// Pick the classifier strategy under test.
    pub async fn with_classifier(strategy: ClassifierStrategy) -> Self {
        Self::build(strategy, Duration::from_secs(3)).await
    }

    /// Shrink the query budget below the transport timeout, for
    /// deadline tests.
    pub async fn with_query_timeout(timeout: Duration) -> Self {
        Self::build(ClassifierStrategy::Heuristic, timeout).await
    }

    async fn build(strategy: ClassifierStrategy, timeout: Duration) -> Self {
        let mcp = MockServer::start().await;
        let model = Arc::new(MockChatModel::new());

        let transport = Arc::new(HttpMcpTransport::new(McpConfig {
            base_url: mcp.uri(),
            timeout_secs: 2,
        }));
        let gateway = Arc::new(DashboardGateway::new(transport, 100));

        let classifier: Arc<dyn IntentClassifier> = match strategy {
            ClassifierStrategy::Heuristic => Arc::new(HeuristicClassifier),
            ClassifierStrategy::Llm => Arc::new(LlmClassifier::new(model.clone())),
        };

        let orchestrator = Arc::new(QueryOrchestrator::new(
            model.clone(),
            classifier,
            gateway.clone(),
            UnknownIntentPolicy::List,
            timeout,
        ));
        let metrics = Arc::new(MetricsPipeline::new(model.clone(), gateway.clone(), timeout));
        let router = build_router(AppState::new(orchestrator, metrics, gateway));

        Self { router, model, mcp }
    }

    /// Mount a tool endpoint answering every call with `body`.
    pub async fn mount_tool(&self, tool: &str, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(format!("/tools/{tool}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&self.mcp)
            .await;
    }

    /// Mount a tool endpoint answering with a bare HTTP status.
    pub async fn mount_tool_status(&self, tool: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(format!("/tools/{tool}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mcp)
            .await;
    }

    /// POST /api/v1/query. Returns (HTTP status code, response JSON body).
    pub async fn post_query(&self, query: &str) -> (StatusCode, serde_json::Value) {
        self.post_json("/api/v1/query", json!({ "query": query }))
            .await
    }

    /// POST /api/v1/metrics. Returns (HTTP status code, response JSON body).
    pub async fn post_metrics(&self, question: &str) -> (StatusCode, serde_json::Value) {
        self.post_json("/api/v1/metrics", json!({ "question": question }))
            .await
    }

    /// GET any API path. Returns (HTTP status code, response JSON body).
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }
}

/// Three dashboards in the shape the inventory tools actually return.
pub fn sample_dashboards() -> serde_json::Value {
    json!([
        {
            "uid": "prod-api",
            "title": "Prod API Dashboard",
            "folderTitle": "Production",
            "tags": ["production", "api"],
            "updated": "2024-01-15T10:30:00Z",
            "isStarred": true
        },
        {
            "uid": "db-perf",
            "title": "Database Performance",
            "tags": ["database"],
            "updated": "2024-01-10T08:00:00Z"
        },
        {
            "uid": "service-health",
            "title": "Service Health",
            "folderTitle": "Operations",
            "updated": "2024-01-12T16:45:00Z"
        }
    ])
}
