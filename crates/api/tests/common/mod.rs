#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use helios_api::config::ServerConfig;
use helios_api::router::build_app_router;
use helios_api::state::AppState;
use helios_core::memory::InMemoryStore;
use helios_core::milestone::{Milestone, MilestoneStatus};
use helios_core::progress::ProgressWeighting;
use helios_core::project::{Project, ProjectStatus, ProjectType};
use helios_core::store::Stores;
use helios_core::types::DbId;
use helios_events::{EventBus, EventNotifier, InMemoryNotificationLog, NotificationPersistence};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        progress_sweep_interval_secs: 0,
        progress_weighting: ProgressWeighting::Count,
    }
}

/// The router plus handles to the in-memory backing stores.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<InMemoryStore>,
    pub notifications: Arc<InMemoryNotificationLog>,
}

/// Build the full application router over in-memory stores.
///
/// Completion events flow through a real [`EventNotifier`] and
/// [`NotificationPersistence`] into the in-memory notification log.
pub fn build_test_app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let notifications = Arc::new(InMemoryNotificationLog::new());
    let event_bus = Arc::new(EventBus::default());

    tokio::spawn(NotificationPersistence::run(
        notifications.clone(),
        event_bus.subscribe(),
    ));

    let state = AppState::new(
        test_config(),
        Stores::from_shared(store.clone()),
        Arc::new(EventNotifier::new(event_bus)),
        notifications.clone(),
    );

    TestApp {
        app: build_app_router(state),
        store,
        notifications,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn residential() -> ProjectType {
    ProjectType {
        id: 1,
        name: "Residential".to_string(),
        estimated_duration_days: 60,
    }
}

/// An in-progress project that started `elapsed` days ago and is due
/// `planned` days after its start.
///
/// The start is nudged an hour later so that partial-day rounding yields
/// exactly `elapsed` days while the test runs.
pub fn project(id: DbId, progress: i32, elapsed: i64, planned: i64) -> Project {
    let start = Utc::now() - Duration::days(elapsed) + Duration::hours(1);
    Project {
        id,
        name: format!("Project {id}"),
        project_type_id: 1,
        status: ProjectStatus::InProgress,
        location: Some("Tucson, AZ".to_string()),
        client_name: Some("Rivera Household".to_string()),
        start_date: start,
        estimated_end_date: start + Duration::days(planned),
        actual_end_date: None,
        progress_percentage: progress,
    }
}

/// A milestone of `project_id` due `due_in_days` from now.
pub fn milestone(
    id: DbId,
    project_id: DbId,
    status: MilestoneStatus,
    due_in_days: i64,
) -> Milestone {
    let now = Utc::now();
    Milestone {
        id,
        project_id,
        name: format!("Milestone {id}"),
        status,
        start_date: Some(now - Duration::days(10)),
        due_date: Some(now + Duration::days(due_in_days)),
        completed_date: status.is_completed().then_some(now),
        weight: 1,
        order_index: id as i32,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
