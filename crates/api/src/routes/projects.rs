use axum::routing::{get, post};
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// POST /progress/recalculate          -> recalculate_all
/// POST /{id}/progress/recalculate     -> recalculate_one
/// GET  /{id}/milestones               -> list_milestones
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/progress/recalculate", post(projects::recalculate_all))
        .route("/{id}/progress/recalculate", post(projects::recalculate_one))
        .route("/{id}/milestones", get(projects::list_milestones))
}
