//! The WebSocket endpoint: handshake refusal and a live session

use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use timeplanner::backend::routes::create_router;
use timeplanner::shared::{Domain, Role};

use crate::common::TestApp;

#[tokio::test]
async fn test_socket_without_token_is_unauthorized() {
    let app = TestApp::new();
    let server = app.server();

    let response = server.get("/socket").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server.get("/socket?token=garbage").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_socket_with_token_still_needs_upgrade() {
    let app = TestApp::new();
    let (_, token) = app.seed_user("ann@example.com", Role::User).await;
    let server = app.server();

    let response = server.get(&format!("/socket?token={}", token)).await;
    assert_ne!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(response.status_code().is_client_error());
    assert_eq!(app.state.hub.connection_count(), 0);
}

#[tokio::test]
async fn test_live_session_round_trip() {
    let app = TestApp::new();
    let (user, token) = app.seed_user("ann@example.com", Role::User).await;
    let server = TestServer::builder()
        .http_transport()
        .build(create_router(app.state.clone()))
        .unwrap();

    let mut socket = server
        .get_websocket("/socket")
        .add_query_param("token", &token)
        .await
        .into_websocket()
        .await;

    let connected: Value = socket.receive_json().await;
    assert_eq!(connected["event"], "connected");
    assert_eq!(connected["data"]["userId"], json!(user.id));
    let online: Value = socket.receive_json().await;
    assert_eq!(online["event"], "user:statusChanged");
    assert_eq!(online["data"]["online"], true);
    assert!(app.state.hub.is_online(user.id));

    socket.send_text("not json").await;
    let error: Value = socket.receive_json().await;
    assert_eq!(error["event"], "error");
    assert!(error["data"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Malformed frame"));

    socket
        .send_json(&json!({ "event": "task:create", "data": { "title": "Write report" } }))
        .await;
    let created: Value = socket.receive_json().await;
    assert_eq!(created["event"], "task:created");
    assert_eq!(created["data"]["title"], "Write report");
    assert_eq!(created["data"]["userId"], json!(user.id));
    let notification: Value = socket.receive_json().await;
    assert_eq!(notification["event"], "notification:new");
    assert_eq!(notification["data"]["message"], "Task created: Write report");
    assert_eq!(app.domain.rows_of(Domain::Task).len(), 1);

    socket.close().await;
    for _ in 0..50 {
        if !app.state.hub.is_online(user.id) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!app.state.hub.is_online(user.id));
    assert_eq!(app.state.hub.connection_count(), 0);
}
