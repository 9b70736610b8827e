use axum::http::{Method, StatusCode};
use chrono::{Duration, SecondsFormat, Utc};
use insta::assert_yaml_snapshot;
use serde_json::json;
use study_tracker_server::storage::{ResourceFile, Storage};

mod common;

use common::{HttpResponseSnapshot, send, setup};

#[tokio::test]
async fn can_denormalize_title_of_referenced_task() {
    let context = setup();
    let task = send(
        &context.app,
        Method::POST,
        "/api/tasks",
        Some(json!({"subject": "Biology", "title": "Photosynthesis"})),
    )
    .await;

    let response = send(
        &context.app,
        Method::POST,
        "/api/sessions",
        Some(json!({"taskId": task.body["id"], "minutes": 25})),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["taskId"], task.body["id"]);
    assert_eq!(response.body["taskTitle"], "Photosynthesis");
    assert_eq!(response.body["minutes"], 25);
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn can_log_session_for_unknown_task() {
    let context = setup();

    let response = send(
        &context.app,
        Method::POST,
        "/api/sessions",
        Some(json!({"taskId": "gone", "minutes": "50"})),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["taskTitle"], "Unknown Task");
    assert_eq!(response.body["minutes"], 50);
}

#[tokio::test]
async fn can_reject_session_without_minutes() {
    let context = setup();

    let response = send(
        &context.app,
        Method::POST,
        "/api/sessions",
        Some(json!({"taskId": "any"})),
    )
    .await;

    assert!(context.storage.snapshot(ResourceFile::Sessions).is_empty());
    assert_yaml_snapshot!(HttpResponseSnapshot::new(&response, "create_session_without_minutes"), @r"
    test_context: create_session_without_minutes
    status: 400
    content_type: application/json
    json_body:
      error: Missing fields
    ");
}

#[tokio::test]
async fn can_reject_session_without_task_id() {
    let context = setup();

    let response = send(
        &context.app,
        Method::POST,
        "/api/sessions",
        Some(json!({"minutes": 25})),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({"error": "Missing fields"}));
}

#[tokio::test]
async fn can_reject_non_numeric_minutes() {
    let context = setup();

    let response = send(
        &context.app,
        Method::POST,
        "/api/sessions",
        Some(json!({"taskId": "any", "minutes": "lots"})),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({"error": "Minutes must be a positive integer"})
    );
}

#[tokio::test]
async fn can_list_only_sessions_logged_today() {
    let context = setup();
    let yesterday = (Utc::now() - Duration::days(1)).to_rfc3339_opts(SecondsFormat::Millis, true);
    context
        .storage
        .save(
            ResourceFile::Sessions,
            &[json!({
                "id": "old-session",
                "taskId": "t",
                "taskTitle": "Old",
                "minutes": 15,
                "timestamp": yesterday,
            })],
        )
        .unwrap();
    let today = send(
        &context.app,
        Method::POST,
        "/api/sessions",
        Some(json!({"taskId": "t", "minutes": 30})),
    )
    .await;

    let filtered = send(&context.app, Method::GET, "/api/sessions?date=today", None).await;
    let unfiltered = send(&context.app, Method::GET, "/api/sessions", None).await;
    let unrecognized = send(
        &context.app,
        Method::GET,
        "/api/sessions?date=yesterday",
        None,
    )
    .await;

    assert_eq!(filtered.status, StatusCode::OK);
    assert_eq!(filtered.body, json!([today.body]));
    let today_prefix = Utc::now().format("%Y-%m-%d").to_string();
    assert!(
        filtered.body[0]["timestamp"]
            .as_str()
            .unwrap()
            .starts_with(&today_prefix)
    );
    assert_eq!(unfiltered.body.as_array().unwrap().len(), 2);
    assert_eq!(unrecognized.body, unfiltered.body);
}

#[tokio::test]
async fn can_reject_malformed_query_string_as_json_error() {
    let context = setup();

    let response = send(
        &context.app,
        Method::GET,
        "/api/sessions?date=today&date=today",
        None,
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn can_keep_off_schema_sessions_when_logging() {
    let context = setup();
    let legacy = json!({
        "id": "legacy",
        "taskId": "t",
        "taskTitle": "Old",
        "minutes": null,
        "timestamp": "2026-01-01T00:00:00.000Z",
    });
    context
        .storage
        .save(ResourceFile::Sessions, &[legacy.clone()])
        .unwrap();

    let created = send(
        &context.app,
        Method::POST,
        "/api/sessions",
        Some(json!({"taskId": "t", "minutes": 5})),
    )
    .await;
    let listed = send(&context.app, Method::GET, "/api/sessions", None).await;

    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(listed.body, json!([created.body]));
    assert_eq!(
        context.storage.snapshot(ResourceFile::Sessions),
        vec![legacy, created.body]
    );
}
