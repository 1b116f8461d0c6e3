use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::create_router;
use crate::{
    services::SettingsStore,
    state::AppState,
    testing::{ManualClock, ScriptedBackend},
};

struct TestApp {
    router: Router,
    _dir: tempfile::TempDir,
}

fn test_app(backend: ScriptedBackend) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(AppState::new(
        Arc::new(backend),
        SettingsStore::new(dir.path()),
        Arc::new(ManualClock::new()),
    ));
    TestApp {
        router: create_router(state),
        _dir: dir,
    }
}

async fn call(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn timer_starts_paused_in_work() {
    let app = test_app(ScriptedBackend::new());

    let (status, body) = call(&app, Method::GET, "/timer", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paused");
    assert_eq!(body["timer"]["mode"], "WORK");
    assert_eq!(body["timer"]["time_left"], 1500);
    assert_eq!(body["timer"]["study_type"], "deep");
}

#[tokio::test]
async fn toggle_flips_running_state() {
    let app = test_app(ScriptedBackend::new());

    let (_, body) = call(&app, Method::POST, "/timer/toggle", None).await;
    assert_eq!(body["status"], "running");
    let (_, body) = call(&app, Method::POST, "/timer/toggle", None).await;
    assert_eq!(body["timer"]["is_active"], false);
}

#[tokio::test]
async fn study_type_change_conflicts_while_running() {
    let app = test_app(ScriptedBackend::new());
    call(&app, Method::POST, "/timer/toggle", None).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/timer/study-type",
        Some(json!({"study_type": "practice"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STUDY_TYPE_LOCKED");
}

#[tokio::test]
async fn practice_type_scales_work_phase() {
    let app = test_app(ScriptedBackend::new());

    let (status, body) = call(
        &app,
        Method::POST,
        "/timer/study-type",
        Some(json!({"study_type": "practice"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["time_left"], 900);
}

#[tokio::test]
async fn durations_are_clamped() {
    let app = test_app(ScriptedBackend::new());

    let (status, body) = call(
        &app,
        Method::PUT,
        "/timer/durations",
        Some(json!({"focus_duration": 5, "break_duration": 99})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["focus_duration"], 10);
    assert_eq!(body["timer"]["break_duration"], 30);
    assert_eq!(body["timer"]["preset_key"], "custom");
}

#[tokio::test]
async fn unknown_preset_is_bad_request() {
    let app = test_app(ScriptedBackend::new());

    let (status, body) = call(&app, Method::POST, "/timer/preset", Some(json!({"preset": "marathon"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PRESET");

    let (status, body) = call(&app, Method::POST, "/timer/preset", Some(json!({"preset": "extended"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["focus_duration"], 50);
}

#[tokio::test]
async fn session_lifecycle_round_trip() {
    let app = test_app(ScriptedBackend::new());

    let (status, body) = call(
        &app,
        Method::POST,
        "/session/start",
        Some(json!({"goal": "Goal A", "goal_id": "g-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["timer"]["active_session_id"], "100");

    let (status, body) = call(
        &app,
        Method::POST,
        "/session/end",
        Some(json!({"reflection": "good", "rating": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["active_session_id"], Value::Null);

    let (_, body) = call(&app, Method::GET, "/sessions", None).await;
    assert_eq!(body["sessions"][0]["key"], "100");
    assert_eq!(body["sessions"][0]["status"], "confirmed");
}

#[tokio::test]
async fn backend_failure_on_start_is_bad_gateway() {
    let app = test_app(ScriptedBackend::new().failing_start_study());

    let (status, body) = call(&app, Method::POST, "/session/start", Some(json!({"goal": "Goal A"}))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "BACKEND_ERROR");

    let (_, body) = call(&app, Method::GET, "/timer", None).await;
    assert_eq!(body["timer"]["active_session_id"], Value::Null);
    assert_eq!(body["timer"]["is_active"], false);
}

#[tokio::test]
async fn ending_without_session_reports_no_session() {
    let app = test_app(ScriptedBackend::new());

    let (status, body) = call(&app, Method::POST, "/session/end", Some(json!({"rating": 3}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No active study session");
}

#[tokio::test]
async fn health_reports_last_action() {
    let app = test_app(ScriptedBackend::new());
    call(&app, Method::POST, "/timer/reset", None).await;

    let (status, body) = call(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["last_action"], "reset");
}

#[tokio::test]
async fn malformed_body_gets_json_error() {
    let app = test_app(ScriptedBackend::new());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/session/end")
        .header("content-type", "application/json")
        .body(Body::from("{\"rating\": "))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn unknown_study_type_gets_json_error() {
    let app = test_app(ScriptedBackend::new());

    let (status, body) = call(
        &app,
        Method::POST,
        "/timer/study-type",
        Some(json!({"study_type": "nap"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("unknown variant"));

    let (_, body) = call(&app, Method::GET, "/timer", None).await;
    assert_eq!(body["timer"]["study_type"], "deep");
}
