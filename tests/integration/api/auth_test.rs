//! Authentication API integration tests
//!
//! Registration, login, refresh, current user and password change.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use timeplanner::shared::Role;

use crate::common::{TestApp, TEST_PASSWORD};

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::new();
    let server = app.server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "Ann@Example.com",
            "password": "password123",
            "name": "Ann"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["user"]["email"], "ann@example.com");
    assert_eq!(body["user"]["role"], "USER");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["tokens"]["accessToken"].is_string());
    assert!(body["tokens"]["refreshToken"].is_string());
    assert_eq!(app.store.user_count(), 1);
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();
    let server = app.server();

    let short = server
        .post("/api/auth/register")
        .json(&json!({ "email": "a@b.c", "password": "short", "name": "A" }))
        .await;
    assert_eq!(short.status_code(), StatusCode::BAD_REQUEST);
    assert!(short.json::<Value>()["error"].is_string());

    let missing = server
        .post("/api/auth/register")
        .json(&json!({ "email": "a@b.c", "password": "password123" }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.user_count(), 0);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::new();
    app.seed_user("ann@example.com", Role::User).await;
    let server = app.server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": "ann@example.com", "password": "password123", "name": "Ann" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_cannot_grant_admin() {
    let app = TestApp::new();
    let server = app.server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "mallory@example.com",
            "password": "password123",
            "name": "Mallory",
            "role": "ADMIN"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["user"]["role"], "USER");

    let token = body["tokens"]["accessToken"].as_str().unwrap().to_string();
    let users = server.get("/api/users").authorization_bearer(&token).await;
    assert_eq!(users.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_success_and_failures() {
    let app = TestApp::new();
    app.seed_user("ann@example.com", Role::User).await;
    let server = app.server();

    let ok = server
        .post("/api/auth/login")
        .json(&json!({ "email": "ann@example.com", "password": TEST_PASSWORD }))
        .await;
    assert_eq!(ok.status_code(), StatusCode::OK);
    assert!(ok.json::<Value>()["tokens"]["accessToken"].is_string());

    let wrong_password = server
        .post("/api/auth/login")
        .json(&json!({ "email": "ann@example.com", "password": "wrong-password" }))
        .await;
    assert_eq!(wrong_password.status_code(), StatusCode::UNAUTHORIZED);

    let unknown = server
        .post("/api/auth/login")
        .json(&json!({ "email": "bob@example.com", "password": TEST_PASSWORD }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.json::<Value>()["error"],
        unknown.json::<Value>()["error"]
    );
}

#[tokio::test]
async fn test_refresh_flow() {
    let app = TestApp::new();
    let (user, access) = app.seed_user("ann@example.com", Role::User).await;
    let server = app.server();
    let refresh_token = app.state.tokens.issue_refresh(user.id).unwrap();

    let ok = server
        .post("/api/auth/refresh")
        .json(&json!({ "refreshToken": refresh_token }))
        .await;
    assert_eq!(ok.status_code(), StatusCode::OK);
    let body: Value = ok.json();
    let identity = app
        .state
        .tokens
        .verify_access(body["tokens"]["accessToken"].as_str().unwrap())
        .unwrap();
    assert_eq!(identity.user_id, user.id);

    // An access token never passes as a refresh token
    let swapped = server
        .post("/api/auth/refresh")
        .json(&json!({ "refreshToken": access }))
        .await;
    assert_eq!(swapped.status_code(), StatusCode::UNAUTHORIZED);

    let missing = server.post("/api/auth/refresh").json(&json!({})).await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_for_deleted_user() {
    let app = TestApp::new();
    let refresh_token = app.state.tokens.issue_refresh(999).unwrap();
    let server = app.server();

    let response = server
        .post("/api/auth/refresh")
        .json(&json!({ "refreshToken": refresh_token }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new();
    let (user, token) = app.seed_user("ann@example.com", Role::User).await;
    let server = app.server();

    let anonymous = server.get("/api/auth/me").await;
    assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);

    let garbage = server
        .get("/api/auth/me")
        .authorization_bearer("not-a-token")
        .await;
    assert_eq!(garbage.status_code(), StatusCode::UNAUTHORIZED);

    let me = server.get("/api/auth/me").authorization_bearer(&token).await;
    assert_eq!(me.status_code(), StatusCode::OK);
    assert_eq!(me.json::<Value>()["id"], json!(user.id));
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let (_, token) = app.seed_user("ann@example.com", Role::User).await;
    let server = app.server();

    let wrong = server
        .put("/api/auth/change-password")
        .authorization_bearer(&token)
        .json(&json!({ "oldPassword": "not-it-at-all", "newPassword": "new-password-1" }))
        .await;
    assert_eq!(wrong.status_code(), StatusCode::BAD_REQUEST);

    let ok = server
        .put("/api/auth/change-password")
        .authorization_bearer(&token)
        .json(&json!({ "oldPassword": TEST_PASSWORD, "newPassword": "new-password-1" }))
        .await;
    assert_eq!(ok.status_code(), StatusCode::OK);

    let login = server
        .post("/api/auth/login")
        .json(&json!({ "email": "ann@example.com", "password": "new-password-1" }))
        .await;
    assert_eq!(login.status_code(), StatusCode::OK);
}
