//! Integration tests for progress recalculation, milestone status changes
//! and the notifications they produce.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, milestone, post, project, put_json, TestApp};
use helios_core::milestone::MilestoneStatus;
use helios_core::store::{MilestoneStore, ProjectStore};
use serde_json::json;

/// Project 1 with one completed and one pending milestone.
async fn half_done(t: &TestApp) {
    t.store.put_project(project(1, 0, 10, 30)).await;
    t.store
        .put_milestone(milestone(1, 1, MilestoneStatus::Completed, -2))
        .await;
    t.store
        .put_milestone(milestone(2, 1, MilestoneStatus::Pending, 5))
        .await;
}

/// Poll the notifications endpoint until it returns something.
async fn wait_for_notifications(t: &TestApp) -> serde_json::Value {
    for _ in 0..100 {
        let json = body_json(get(&t.app, "/api/v1/notifications").await).await;
        if !json["data"].as_array().unwrap().is_empty() {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no notification was persisted");
}

// ---------------------------------------------------------------------------
// Recalculation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn recalculate_one_reports_previous_and_current() {
    let t = build_test_app();
    half_done(&t).await;

    let response = post(&t.app, "/api/v1/projects/1/progress/recalculate").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["project_id"], 1);
    assert_eq!(json["data"]["previous"], 0);
    assert_eq!(json["data"]["current"], 50);

    let stored = t.store.get_project_by_id(1).await.unwrap().unwrap();
    assert_eq!(stored.progress_percentage, 50);
}

#[tokio::test]
async fn recalculate_missing_project_returns_404() {
    let t = build_test_app();
    let response = post(&t.app, "/api/v1/projects/99/progress/recalculate").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn recalculate_all_isolates_failing_projects() {
    let t = build_test_app();
    half_done(&t).await;
    t.store.put_project(project(2, 10, 10, 30)).await;
    t.store.break_project(2).await;

    let response = post(&t.app, "/api/v1/projects/progress/recalculate").await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = &body_json(response).await["data"];
    assert_eq!(data["processed"], 1);
    assert_eq!(data["failures"][0]["project_id"], 2);

    let healthy = t.store.get_project_by_id(1).await.unwrap().unwrap();
    assert_eq!(healthy.progress_percentage, 50);
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_milestones_in_display_order() {
    let t = build_test_app();
    half_done(&t).await;
    let mut first = milestone(3, 1, MilestoneStatus::Pending, 1);
    first.order_index = -1;
    t.store.put_milestone(first).await;

    let json = body_json(get(&t.app, "/api/v1/projects/1/milestones").await).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 1, 2]);

    let missing = get(&t.app, "/api/v1/projects/42/milestones").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completing_last_milestone_completes_project_and_notifies() {
    let t = build_test_app();
    half_done(&t).await;

    let response = put_json(
        &t.app,
        "/api/v1/milestones/2/status",
        json!({"status": "completed"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = &body_json(response).await["data"];
    assert_eq!(data["milestone"]["status"], "completed");
    assert!(data["milestone"]["completed_date"].is_string());
    assert_eq!(data["progress"]["previous"], 0);
    assert_eq!(data["progress"]["current"], 100);

    let stored = t.store.get_project_by_id(1).await.unwrap().unwrap();
    assert_eq!(stored.progress_percentage, 100);
    assert!(stored.actual_end_date.is_some());

    let json = wait_for_notifications(&t).await;
    let notifications = json["data"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["event_type"], "project.completed");
    assert_eq!(notifications[0]["title"], "Project completed: Project 1");
    assert_eq!(notifications[0]["source_entity_type"], "project");
    assert_eq!(notifications[0]["source_entity_id"], 1);
    assert_eq!(notifications[0]["is_read"], false);
}

#[tokio::test]
async fn reopening_a_milestone_clears_its_completed_date() {
    let t = build_test_app();
    half_done(&t).await;

    let response = put_json(
        &t.app,
        "/api/v1/milestones/1/status",
        json!({"status": "in_progress"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = t.store.get_milestone_by_id(1).await.unwrap().unwrap();
    assert_eq!(stored.status, MilestoneStatus::InProgress);
    assert!(stored.completed_date.is_none());
}

#[tokio::test]
async fn unknown_status_is_rejected_without_writing() {
    let t = build_test_app();
    half_done(&t).await;

    let response = put_json(
        &t.app,
        "/api/v1/milestones/2/status",
        json!({"status": "skipped"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let stored = t.store.get_milestone_by_id(2).await.unwrap().unwrap();
    assert_eq!(stored.status, MilestoneStatus::Pending);
}

#[tokio::test]
async fn status_change_on_missing_milestone_returns_404() {
    let t = build_test_app();
    let response = put_json(
        &t.app,
        "/api/v1/milestones/77/status",
        json!({"status": "completed"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "Milestone with id 77 not found"
    );
}

#[tokio::test]
async fn overdue_flagging_counts_only_late_open_milestones() {
    let t = build_test_app();
    half_done(&t).await;
    t.store
        .put_milestone(milestone(3, 1, MilestoneStatus::InProgress, -1))
        .await;

    let response = post(&t.app, "/api/v1/milestones/overdue/flag").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["flagged"], 1);

    let flagged = t.store.get_milestone_by_id(3).await.unwrap().unwrap();
    assert_eq!(flagged.status, MilestoneStatus::Overdue);

    // Already flagged: nothing left to do.
    let again = body_json(post(&t.app, "/api/v1/milestones/overdue/flag").await).await;
    assert_eq!(again["data"]["flagged"], 0);
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notifications_are_paginated() {
    let t = build_test_app();
    for id in 1..=3 {
        t.store.put_project(project(id, 0, 10, 30)).await;
        t.store
            .put_milestone(milestone(id, id, MilestoneStatus::Completed, 1))
            .await;
    }
    let response = post(&t.app, "/api/v1/projects/progress/recalculate").await;
    assert_eq!(body_json(response).await["data"]["completed_now"], json!([1, 2, 3]));

    for _ in 0..100 {
        let json = body_json(get(&t.app, "/api/v1/notifications?limit=10").await).await;
        if json["data"].as_array().unwrap().len() == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let json = body_json(get(&t.app, "/api/v1/notifications?limit=2&offset=1").await).await;
    let titles: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec!["Project completed: Project 2", "Project completed: Project 1"]
    );
}
