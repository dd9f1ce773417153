//! Category API integration tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use timeplanner::shared::{Domain, Role};

use crate::common::TestApp;

#[tokio::test]
async fn test_category_crud_is_published() {
    let app = TestApp::new();
    let (user, token) = app.seed_user("ann@example.com", Role::User).await;
    let server = app.server();

    let response = server
        .post("/api/categories")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Work", "color": "#3366ff" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let category: Value = response.json();
    assert_eq!(category["userId"], json!(user.id));
    let path = format!("/api/categories/{}", category["id"]);

    let fetched: Value = server.get(&path).authorization_bearer(&token).await.json();
    assert_eq!(fetched["name"], "Work");

    let renamed = server
        .put(&path)
        .authorization_bearer(&token)
        .json(&json!({ "name": "Office" }))
        .await;
    assert_eq!(renamed.status_code(), StatusCode::OK);
    assert_eq!(renamed.json::<Value>()["name"], "Office");

    let deleted = server.delete(&path).authorization_bearer(&token).await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert_eq!(deleted.json::<Value>()["userId"], json!(user.id));
    assert!(app.domain.rows_of(Domain::Category).is_empty());

    let names: Vec<String> = app
        .state
        .hub
        .events_since(0)
        .iter()
        .map(|e| e.name())
        .collect();
    assert_eq!(
        names,
        vec!["category:created", "category:updated", "category:deleted"]
    );

    let notifications: Vec<Value> = server
        .get("/api/notifications")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(notifications.last().unwrap()["message"], "Category created: Work");
}

#[tokio::test]
async fn test_categories_are_scoped_to_owner() {
    let app = TestApp::new();
    let (_, ann) = app.seed_user("ann@example.com", Role::User).await;
    let (_, bob) = app.seed_user("bob@example.com", Role::User).await;
    let (_, admin) = app.seed_user("root@example.com", Role::Admin).await;
    let server = app.server();

    let category: Value = server
        .post("/api/categories")
        .authorization_bearer(&ann)
        .json(&json!({ "name": "Home" }))
        .await
        .json();
    let path = format!("/api/categories/{}", category["id"]);

    let listed: Vec<Value> = server.get("/api/categories").authorization_bearer(&bob).await.json();
    assert!(listed.is_empty());
    let listed: Vec<Value> = server
        .get("/api/categories")
        .authorization_bearer(&admin)
        .await
        .json();
    assert_eq!(listed.len(), 1);

    assert_eq!(
        server.get(&path).authorization_bearer(&bob).await.status_code(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        server.delete(&path).authorization_bearer(&bob).await.status_code(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let app = TestApp::new();
    let (_, token) = app.seed_user("ann@example.com", Role::User).await;
    let server = app.server();

    let category: Value = server
        .post("/api/categories")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Work" }))
        .await
        .json();
    server
        .post("/api/tasks")
        .authorization_bearer(&token)
        .json(&json!({ "title": "Report", "categoryId": category["id"] }))
        .await;

    let response = server
        .delete(&format!("/api/categories/{}", category["id"]))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.domain.rows_of(Domain::Category).len(), 1);
}

#[tokio::test]
async fn test_blank_category_name_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.seed_user("ann@example.com", Role::User).await;
    let server = app.server();

    let response = server
        .post("/api/categories")
        .authorization_bearer(&token)
        .json(&json!({ "name": " " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.state.hub.history_len(), 0);
}
