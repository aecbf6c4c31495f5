//! Natural-language metrics question endpoint.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MetricsRequest {
    pub question: String,
}

/// Handles POST /api/v1/metrics. The answer is always displayable text,
/// including the error renderings.
pub async fn run_metrics(
    State(state): State<AppState>,
    Json(request): Json<MetricsRequest>,
) -> Json<Value> {
    let answer = state.metrics.ask(&request.question).await;
    Json(json!({ "answer": answer }))
}
