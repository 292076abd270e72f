pub mod analytics;
pub mod dashboard;
pub mod health;
pub mod milestones;
pub mod notifications;
pub mod projects;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /dashboard/stats                           portfolio summary (GET)
///
/// /analytics/velocity                        trailing six-month velocity (GET)
/// /analytics/project-types                   per-type metrics (GET)
/// /analytics/predictions                     completion predictions (GET)
///
/// /projects/progress/recalculate             recompute all active (POST)
/// /projects/{id}/progress/recalculate        recompute one (POST)
/// /projects/{id}/milestones                  list milestones (GET)
///
/// /milestones/{id}/status                    change status (PUT)
/// /milestones/overdue/flag                   flag overdue milestones (POST)
///
/// /notifications                             list, newest first (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/dashboard", dashboard::router())
        .nest("/analytics", analytics::router())
        .nest("/projects", projects::router())
        .nest("/milestones", milestones::router())
        .nest("/notifications", notifications::router())
}
