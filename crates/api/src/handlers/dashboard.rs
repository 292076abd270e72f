//! Handlers for the `/dashboard` resource.

use axum::extract::State;
use axum::Json;
use helios_core::metrics::DashboardStats;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/stats
pub async fn stats(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let data = state.metrics.calculate_dashboard_stats().await?;
    Ok(Json(DataResponse { data }))
}
