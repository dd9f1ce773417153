//! Admin-only user endpoints

use axum::http::StatusCode;
use serde_json::{json, Value};
use timeplanner::shared::Role;

use crate::common::TestApp;

#[tokio::test]
async fn test_users_require_admin() {
    let app = TestApp::new();
    let (_, user) = app.seed_user("ann@example.com", Role::User).await;
    let server = app.server();

    assert_eq!(server.get("/api/users").await.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        server.get("/api/users").authorization_bearer(&user).await.status_code(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_admin_lists_and_deletes_users() {
    let app = TestApp::new();
    let (ann, _) = app.seed_user("ann@example.com", Role::User).await;
    let (root, admin) = app.seed_user("root@example.com", Role::Admin).await;
    let server = app.server();

    let users: Vec<Value> = server.get("/api/users").authorization_bearer(&admin).await.json();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));

    let own = server
        .delete(&format!("/api/users/{}", root.id))
        .authorization_bearer(&admin)
        .await;
    assert_eq!(own.status_code(), StatusCode::BAD_REQUEST);

    let deleted = server
        .delete(&format!("/api/users/{}", ann.id))
        .authorization_bearer(&admin)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert_eq!(app.store.user_count(), 1);

    let events = app.state.hub.events_since(0);
    assert_eq!(events.last().map(|e| e.name()), Some("user:deleted".to_string()));

    let again = server
        .delete(&format!("/api/users/{}", ann.id))
        .authorization_bearer(&admin)
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_creates_and_updates_users() {
    let app = TestApp::new();
    let (root, admin) = app.seed_user("root@example.com", Role::Admin).await;
    let server = app.server();

    let response = server
        .post("/api/users")
        .authorization_bearer(&admin)
        .json(&json!({
            "email": "Eve@Example.com",
            "name": "Eve",
            "password": "password123",
            "role": "ADMIN"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let eve: Value = response.json();
    assert_eq!(eve["email"], "eve@example.com");
    assert_eq!(eve["role"], "ADMIN");
    assert!(eve.get("passwordHash").is_none());
    let path = format!("/api/users/{}", eve["id"]);

    let fetched: Value = server.get(&path).authorization_bearer(&admin).await.json();
    assert_eq!(fetched["name"], "Eve");

    let updated = server
        .put(&path)
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Eve Adams", "role": "USER" }))
        .await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    let updated: Value = updated.json();
    assert_eq!(updated["name"], "Eve Adams");
    assert_eq!(updated["role"], "USER");

    let demote_self = server
        .put(&format!("/api/users/{}", root.id))
        .authorization_bearer(&admin)
        .json(&json!({ "role": "USER" }))
        .await;
    assert_eq!(demote_self.status_code(), StatusCode::BAD_REQUEST);

    let names: Vec<String> = app
        .state
        .hub
        .events_since(0)
        .iter()
        .map(|e| e.name())
        .collect();
    assert_eq!(names, vec!["user:created", "user:updated"]);
}

#[tokio::test]
async fn test_admin_user_errors() {
    let app = TestApp::new();
    let (_, admin) = app.seed_user("root@example.com", Role::Admin).await;
    let server = app.server();

    assert_eq!(
        server.get("/api/users/4242").authorization_bearer(&admin).await.status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        server
            .put("/api/users/4242")
            .authorization_bearer(&admin)
            .json(&json!({ "name": "Ghost" }))
            .await
            .status_code(),
        StatusCode::NOT_FOUND
    );

    let duplicate = server
        .post("/api/users")
        .authorization_bearer(&admin)
        .json(&json!({ "email": "root@example.com", "name": "Root", "password": "password123" }))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

    let short = server
        .post("/api/users")
        .authorization_bearer(&admin)
        .json(&json!({ "email": "kim@example.com", "name": "Kim", "password": "short" }))
        .await;
    assert_eq!(short.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.user_count(), 1);
}
