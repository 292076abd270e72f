//! Handlers for the `/analytics` resource: velocity, per-type metrics and
//! completion predictions.

use axum::extract::State;
use axum::Json;
use helios_core::metrics::{ProjectTypeMetrics, VelocityPoint};
use helios_core::prediction::CompletionPrediction;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/analytics/velocity
pub async fn velocity(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<VelocityPoint>>>> {
    let data = state.metrics.calculate_team_velocity().await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/analytics/project-types
pub async fn project_types(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProjectTypeMetrics>>>> {
    let data = state.metrics.calculate_project_type_metrics().await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/analytics/predictions
///
/// Active projects only, most delayed first.
pub async fn predictions(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CompletionPrediction>>>> {
    let data = state.predictor.predict_project_completion().await?;
    Ok(Json(DataResponse { data }))
}
