//! API route definitions and router builder.

pub mod dashboards;
pub mod health;
pub mod metrics;
pub mod query;

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Natural-language endpoints
        .route("/query", post(query::run_query))
        .route("/metrics", post(metrics::run_metrics))
        // Dashboard inventory endpoints
        .route("/dashboards", get(dashboards::list_dashboards))
        .route("/dashboards/{uid}", get(dashboards::get_dashboard));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    use ds_agent::chat::ChatError;
    use ds_agent::classify::HeuristicClassifier;
    use ds_agent::{MetricsPipeline, MockChatModel, QueryOrchestrator, UnknownIntentPolicy};
    use ds_gateway::{DashboardGateway, GatewayError, MockTransport};

    const SCOPE_OK: &str = "Yes, this is a dashboard question I can help with.";

    fn app_with(model: Arc<MockChatModel>, transport: Arc<MockTransport>) -> Router {
        let gateway = Arc::new(DashboardGateway::new(transport, 100));
        let orchestrator = Arc::new(QueryOrchestrator::new(
            model.clone(),
            Arc::new(HeuristicClassifier),
            gateway.clone(),
            UnknownIntentPolicy::List,
            Duration::from_secs(5),
        ));
        let metrics = Arc::new(MetricsPipeline::new(
            model,
            gateway.clone(),
            Duration::from_secs(5),
        ));
        build_router(AppState::new(orchestrator, metrics, gateway))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = app_with(
            Arc::new(MockChatModel::new()),
            Arc::new(MockTransport::new()),
        );
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn query_returns_full_outcome() {
        let model = Arc::new(MockChatModel::new());
        model.queue_reply(SCOPE_OK);
        let app = app_with(model, Arc::new(MockTransport::with_dashboard_sample()));

        let response = app
            .oneshot(post_json(
                "/api/v1/query",
                json!({"query": "Show me all dashboards"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["intent"], "list");
        assert!(json["response"]
            .as_str()
            .unwrap()
            .starts_with("Found 3 dashboard(s):"));
        assert_eq!(json["records"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn failed_query_is_still_http_200() {
        let model = Arc::new(MockChatModel::new());
        model.queue_error(ChatError::Transport("connection refused".to_string()));
        let app = app_with(model, Arc::new(MockTransport::new()));

        let response = app
            .oneshot(post_json(
                "/api/v1/query",
                json!({"query": "Show me all dashboards"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["error_code"], "internal_error");
    }

    #[tokio::test]
    async fn empty_query_reports_invalid() {
        let app = app_with(
            Arc::new(MockChatModel::new()),
            Arc::new(MockTransport::new()),
        );

        let response = app
            .oneshot(post_json("/api/v1/query", json!({"query": "   "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "invalid");
        assert_eq!(json["error_code"], "empty_query");
    }

    #[tokio::test]
    async fn metrics_answer_wrapped_in_json() {
        let model = Arc::new(MockChatModel::new());
        model.queue_reply(r#"{"metric_name": "cpu_usage", "relative_time_range": "last 1 hour"}"#);
        model.queue_reply(
            r#"{"start_time": "2024-01-01T00:00:00Z", "end_time": "2024-01-01T01:00:00Z"}"#,
        );

        let transport = Arc::new(MockTransport::new());
        transport.queue_payload(
            "query_grafana_metrics",
            json!({
                "metric_name": "cpu_usage",
                "unit": "percent",
                "datapoints": [
                    {"timestamp": "2024-01-01T00:15:00Z", "value": 40.0},
                    {"timestamp": "2024-01-01T00:45:00Z", "value": 60.0}
                ]
            }),
        );

        let app = app_with(model, transport);
        let response = app
            .oneshot(post_json(
                "/api/v1/metrics",
                json!({"question": "Show CPU usage for the last hour"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["answer"]
            .as_str()
            .unwrap()
            .starts_with("cpu_usage - 2 data points"));
    }

    #[tokio::test]
    async fn dashboards_list_returns_records() {
        let app = app_with(
            Arc::new(MockChatModel::new()),
            Arc::new(MockTransport::with_dashboard_sample()),
        );

        let response = app
            .oneshot(
                Request::get("/api/v1/dashboards")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn dashboard_detail_found() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_payload(
            "get_dashboard_by_uid",
            json!({"uid": "prod-api", "title": "Prod API Dashboard"}),
        );

        let app = app_with(Arc::new(MockChatModel::new()), transport);
        let response = app
            .oneshot(
                Request::get("/api/v1/dashboards/prod-api")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["uid"], "prod-api");
        assert_eq!(json["title"], "Prod API Dashboard");
    }

    #[tokio::test]
    async fn dashboard_detail_missing_is_404() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_payload("get_dashboard_by_uid", serde_json::Value::Null);

        let app = app_with(Arc::new(MockChatModel::new()), transport);
        let response = app
            .oneshot(
                Request::get("/api/v1/dashboards/ghost-999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["status"], 404);
        assert!(json["error"].as_str().unwrap().contains("ghost-999"));
    }

    #[tokio::test]
    async fn unreachable_inventory_is_bad_gateway() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_reply(
            "search_dashboards",
            Err(GatewayError::Connection("connection refused".to_string())),
        );

        let app = app_with(Arc::new(MockChatModel::new()), transport);
        let response = app
            .oneshot(
                Request::get("/api/v1/dashboards")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
