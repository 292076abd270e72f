use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Routes mounted at `/analytics`.
///
/// ```text
/// GET  /velocity        -> velocity
/// GET  /project-types   -> project_types
/// GET  /predictions     -> predictions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/velocity", get(analytics::velocity))
        .route("/project-types", get(analytics::project_types))
        .route("/predictions", get(analytics::predictions))
}
