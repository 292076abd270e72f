//! Handlers for the `/milestones` resource.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use helios_core::milestone::MilestoneStatus;
use helios_core::progress::MilestoneStatusChange;
use helios_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /milestones/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateMilestoneStatus {
    pub status: String,
}

/// Response body for `POST /milestones/overdue/flag`.
#[derive(Debug, Serialize)]
pub struct OverdueFlagResult {
    pub flagged: usize,
}

/// PUT /api/v1/milestones/{id}/status
///
/// Unknown status strings are rejected with 400 before anything is written.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMilestoneStatus>,
) -> AppResult<Json<DataResponse<MilestoneStatusChange>>> {
    let status: MilestoneStatus = input.status.parse()?;
    let data = state.tracker.set_milestone_status(id, status).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/milestones/overdue/flag
pub async fn flag_overdue(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<OverdueFlagResult>>> {
    let flagged = state.tracker.flag_overdue_milestones(Utc::now()).await?;
    Ok(Json(DataResponse {
        data: OverdueFlagResult { flagged },
    }))
}
