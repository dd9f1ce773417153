//! Notification API integration tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use timeplanner::shared::{Domain, Role};

use crate::common::TestApp;

async fn notifications_of(server: &axum_test::TestServer, token: &str) -> Vec<Value> {
    server.get("/api/notifications").authorization_bearer(token).await.json()
}

#[tokio::test]
async fn test_create_and_delete_notification() {
    let app = TestApp::new();
    let (ann, ann_token) = app.seed_user("ann@example.com", Role::User).await;
    let (_, admin) = app.seed_user("root@example.com", Role::Admin).await;
    let server = app.server();

    let response = server
        .post("/api/notifications")
        .authorization_bearer(&admin)
        .json(&json!({ "userId": ann.id, "message": "Standup moved", "type": "REMINDER" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();

    let own = notifications_of(&server, &ann_token).await;
    assert_eq!(own.len(), 1);
    assert_eq!(own[0]["message"], "Standup moved");
    assert_eq!(own[0]["read"], false);

    let deleted = server
        .delete(&format!("/api/notifications/{}", created["id"]))
        .authorization_bearer(&ann_token)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert_eq!(deleted.json::<Value>()["userId"], json!(ann.id));
    assert!(notifications_of(&server, &ann_token).await.is_empty());

    let names: Vec<String> = app
        .state
        .hub
        .events_since(0)
        .iter()
        .map(|e| e.name())
        .collect();
    assert_eq!(names, vec!["notification:created", "notification:deleted"]);
}

#[tokio::test]
async fn test_batch_notifies_every_recipient() {
    let app = TestApp::new();
    let (ann, ann_token) = app.seed_user("ann@example.com", Role::User).await;
    let (bob, bob_token) = app.seed_user("bob@example.com", Role::User).await;
    let (_, admin) = app.seed_user("root@example.com", Role::Admin).await;
    let server = app.server();

    let response = server
        .post("/api/notifications/batch")
        .authorization_bearer(&admin)
        .json(&json!({ "users": [ann.id, bob.id], "message": "Office closed Friday" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["notifications"].as_array().unwrap().len(), 2);

    assert_eq!(notifications_of(&server, &ann_token).await.len(), 1);
    assert_eq!(notifications_of(&server, &bob_token).await.len(), 1);

    let empty = server
        .post("/api/notifications/batch")
        .authorization_bearer(&admin)
        .json(&json!({ "users": [], "message": "Nobody" }))
        .await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.domain.rows_of(Domain::Notification).len(), 2);
}

#[tokio::test]
async fn test_read_all_and_delete_all_touch_only_own() {
    let app = TestApp::new();
    let (ann, ann_token) = app.seed_user("ann@example.com", Role::User).await;
    let (bob, bob_token) = app.seed_user("bob@example.com", Role::User).await;
    let (_, admin) = app.seed_user("root@example.com", Role::Admin).await;
    let server = app.server();

    server
        .post("/api/notifications/batch")
        .authorization_bearer(&admin)
        .json(&json!({ "users": [ann.id, ann.id, bob.id], "message": "Hello" }))
        .await;

    let read = server
        .patch("/api/notifications/read-all")
        .authorization_bearer(&ann_token)
        .await;
    assert_eq!(read.status_code(), StatusCode::OK);
    assert_eq!(read.json::<Value>()["count"], 2);
    assert!(notifications_of(&server, &ann_token)
        .await
        .iter()
        .all(|n| n["read"] == true));
    assert_eq!(notifications_of(&server, &bob_token).await[0]["read"], false);

    let cleared = server
        .delete("/api/notifications")
        .authorization_bearer(&ann_token)
        .await;
    assert_eq!(cleared.status_code(), StatusCode::OK);
    assert_eq!(cleared.json::<Value>()["count"], 2);
    assert!(notifications_of(&server, &ann_token).await.is_empty());
    assert_eq!(notifications_of(&server, &bob_token).await.len(), 1);

    let last = app.state.hub.events_since(0).pop().unwrap();
    assert_eq!(last.name(), "notification:deleted");
    assert_eq!(last.payload["userId"], json!(ann.id));
    assert_eq!(last.payload["count"], 2);
}

#[tokio::test]
async fn test_foreign_notification_cannot_be_deleted() {
    let app = TestApp::new();
    let (_, ann) = app.seed_user("ann@example.com", Role::User).await;
    let (_, bob) = app.seed_user("bob@example.com", Role::User).await;
    let server = app.server();

    server
        .post("/api/tasks")
        .authorization_bearer(&ann)
        .json(&json!({ "title": "X" }))
        .await;
    let own = notifications_of(&server, &ann).await;

    let response = server
        .delete(&format!("/api/notifications/{}", own[0]["id"]))
        .authorization_bearer(&bob)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(notifications_of(&server, &ann).await.len(), 1);
}
