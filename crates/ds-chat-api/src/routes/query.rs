//! Natural-language dashboard query endpoint.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use ds_protocol::QueryOutcome;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Handles POST /api/v1/query.
///
/// The outcome encodes its own success or failure, so this always
/// answers 200 with a full outcome body.
pub async fn run_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryOutcome> {
    Json(state.orchestrator.ask(&request.query).await)
}
