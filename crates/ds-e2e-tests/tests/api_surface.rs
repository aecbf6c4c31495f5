//! E2E tests for the plain REST inventory surface.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{sample_dashboards, TestHarness};

#[tokio::test]
async fn e2e_health_reports_ok() {
    let h = TestHarness::start().await;

    let (status, json) = h.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

/// GET /api/v1/dashboards lists the normalized records.
#[tokio::test]
async fn e2e_rest_dashboard_listing() {
    let h = TestHarness::start().await;
    h.mount_tool("search_dashboards", sample_dashboards()).await;

    let (status, json) = h.get("/api/v1/dashboards").await;

    assert_eq!(status, StatusCode::OK);
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["uid"], "prod-api");
    assert_eq!(records[0]["folder_title"], "Production");
}

/// GET /api/v1/dashboards/{uid} returns one record.
#[tokio::test]
async fn e2e_rest_dashboard_detail() {
    let h = TestHarness::start().await;
    h.mount_tool(
        "get_dashboard_by_uid",
        json!({"uid": "prod-api", "title": "Prod API Dashboard"}),
    )
    .await;

    let (status, json) = h.get("/api/v1/dashboards/prod-api").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["uid"], "prod-api");
    assert_eq!(json["title"], "Prod API Dashboard");
}

/// A null tool reply for an unknown uid becomes a REST 404.
#[tokio::test]
async fn e2e_rest_dashboard_detail_missing() {
    let h = TestHarness::start().await;
    h.mount_tool("get_dashboard_by_uid", serde_json::Value::Null)
        .await;

    let (status, json) = h.get("/api/v1/dashboards/ghost-999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
    assert!(json["error"].as_str().unwrap().contains("ghost-999"));
}

/// An unreachable MCP server becomes a REST 502.
#[tokio::test]
async fn e2e_rest_unreachable_inventory_is_bad_gateway() {
    let h = TestHarness::start().await;
    h.mount_tool_status("search_dashboards", 500).await;

    let (status, json) = h.get("/api/v1/dashboards").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["status"], 502);
}
