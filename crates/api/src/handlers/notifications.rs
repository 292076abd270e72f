//! Handlers for the `/notifications` resource.

use axum::extract::{Query, State};
use axum::Json;
use helios_db::models::notification::Notification;

use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/notifications?limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let data = state
        .notifications
        .list(params.limit(), params.offset())
        .await?;
    Ok(Json(DataResponse { data }))
}
