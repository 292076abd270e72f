use axum::routing::{post, put};
use axum::Router;

use crate::handlers::milestones;
use crate::state::AppState;

/// Routes mounted at `/milestones`.
///
/// ```text
/// PUT  /{id}/status      -> update_status
/// POST /overdue/flag     -> flag_overdue
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/status", put(milestones::update_status))
        .route("/overdue/flag", post(milestones::flag_overdue))
}
