//! Handlers for project progress and milestone listing.

use axum::extract::{Path, State};
use axum::Json;
use helios_core::error::CoreError;
use helios_core::milestone::Milestone;
use helios_core::progress::{BatchRecalculation, ProgressChange};
use helios_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_project_exists(state: &AppState, id: DbId) -> AppResult<()> {
    state
        .stores
        .projects
        .get_project_by_id(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(())
}

/// POST /api/v1/projects/progress/recalculate
///
/// Per-project failures are reported in the body; the request itself only
/// fails when the project list cannot be read.
pub async fn recalculate_all(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BatchRecalculation>>> {
    let data = state.tracker.recalculate_all_projects_progress().await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/projects/{id}/progress/recalculate
pub async fn recalculate_one(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProgressChange>>> {
    ensure_project_exists(&state, id).await?;
    let data = state.tracker.recalculate_project_progress(id).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/projects/{id}/milestones
pub async fn list_milestones(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Milestone>>>> {
    ensure_project_exists(&state, id).await?;
    let data = state.stores.milestones.get_milestones_by_project(id).await?;
    Ok(Json(DataResponse { data }))
}
