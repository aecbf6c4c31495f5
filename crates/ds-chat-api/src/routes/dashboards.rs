//! Dashboard inventory endpoints.

use axum::extract::{Path, State};
use axum::Json;

use ds_protocol::DashboardRecord;

use crate::error::ApiResult;
use crate::state::AppState;

/// Handles GET /api/v1/dashboards.
pub async fn list_dashboards(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DashboardRecord>>> {
    let records = state.gateway.list_dashboards().await?;
    Ok(Json(records))
}

/// Handles GET /api/v1/dashboards/{uid}.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> ApiResult<Json<DashboardRecord>> {
    let record = state.gateway.get_dashboard(&uid).await?;
    Ok(Json(record))
}
