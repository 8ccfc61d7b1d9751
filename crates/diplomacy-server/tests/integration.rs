//! End-to-end smoke test driving the HTTP surface directly through the axum
//! router (no socket bound), the way `backbay-server`'s own
//! `tests/integration.rs` exercised its protocol without a live transport.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use diplomacy_server::{config::ServerConfig, routes, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServerConfig::default();
    config.data_dir = dir.path().to_string_lossy().to_string();
    config.talk_num_rounds = 1;
    let state = AppState::new(config);
    (routes::router(state), dir)
}

async fn post(app: &axum::Router, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut builder = Request::post(path).header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get(app: &axum::Router, path: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::get(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder.body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn lobby_join_by_code_matches_scenario_three() {
    let (app, _dir) = test_app();

    let (status, host_identity) = post(&app, "/api/auth/identity", None, json!({"display_name": "Alice"})).await;
    assert_eq!(status, StatusCode::OK);
    let host_token = host_identity["token"].as_str().unwrap().to_string();

    let (status, created) = post(
        &app,
        "/api/lobby/create",
        Some(&host_token),
        json!({"display_name": "Alice", "map_name": "standard"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["lobby"]["status"], "waiting");
    let code = created["code"].as_str().unwrap().to_string();

    for name in ["Bob", "Carol"] {
        let (status, identity) = post(&app, "/api/auth/identity", None, json!({"display_name": name})).await;
        assert_eq!(status, StatusCode::OK);
        let token = identity["token"].as_str().unwrap().to_string();
        let (status, _) = post(&app, "/api/lobby/join", Some(&token), json!({"code": code, "display_name": name})).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, lobby) = get(&app, &format!("/api/lobby/{code}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lobby["lobby"]["status"], "waiting");
    assert_eq!(lobby["lobby"]["players"].as_array().unwrap().len(), 3);
    assert_eq!(lobby["lobby"]["player_count"], 3);

    let (status, started) = post(&app, &format!("/api/lobby/{code}/start"), Some(&host_token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["lobby"]["status"], "started");
    for player in started["lobby"]["players"].as_array().unwrap() {
        assert!(player["power"].is_string());
    }
}

#[tokio::test]
async fn missing_token_is_rejected_as_unauthenticated() {
    let (app, _dir) = test_app();
    let (status, body) = post(&app, "/api/lobby/create", None, json!({"display_name": "Alice"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn login_creates_account_on_first_use() {
    let (app, _dir) = test_app();
    let (status, body) = post(&app, "/api/auth/login", None, json!({"username": "dave", "password": "hunter2"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());

    let (status, _) = post(&app, "/api/auth/login", None, json!({"username": "dave", "password": "wrong"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
