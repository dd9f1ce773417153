/**
 * User Administration Endpoints
 *
 * Mounted behind `require_roles` with `ADMIN` only; handlers can assume the
 * caller is an administrator.
 *
 * Changes are published as `user:*` events carrying the public profile.
 */

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::backend::auth::handlers::types::{normalize_email, required, MessageResponse};
use crate::backend::auth::password::{hash_password, validate_new_password};
use crate::backend::auth::users::{CredentialStore, NewUser, UserResponse, UserUpdate};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::RealtimeHub;
use crate::shared::{Domain, EventType, Role, UserId};

/// Body of `POST /api/users`; `role` defaults to `USER`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

fn profile_json(user: &UserResponse) -> BackendResult<serde_json::Value> {
    serde_json::to_value(user).map_err(|e| BackendError::internal(e.to_string()))
}

/// GET /api/users
pub async fn list_users(
    State(store): State<Arc<dyn CredentialStore>>,
) -> BackendResult<Json<Vec<UserResponse>>> {
    let users = store.list_users().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(store): State<Arc<dyn CredentialStore>>,
    Path(id): Path<UserId>,
) -> BackendResult<Json<UserResponse>> {
    let user = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;
    Ok(Json(user.public()))
}

/// POST /api/users
///
/// # Errors
///
/// * `400 Bad Request` - missing field, malformed e-mail or short password
/// * `409 Conflict` - e-mail already registered
pub async fn create_user(
    State(store): State<Arc<dyn CredentialStore>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Json(request): Json<CreateUserRequest>,
) -> BackendResult<(StatusCode, Json<UserResponse>)> {
    let email = normalize_email(&required(request.email, "Email")?);
    let name = required(request.name, "Name")?;
    let password = required(request.password, "Password")?;

    if !email.contains('@') {
        return Err(BackendError::validation("Email is invalid"));
    }
    validate_new_password(&password)?;

    let user = store
        .create_user(NewUser {
            email,
            name,
            password_hash: hash_password(&password)?,
            role: request.role.unwrap_or_default(),
        })
        .await?
        .public();
    tracing::info!(
        "[Auth] User {} ({}) created by admin {}",
        user.id,
        user.role,
        identity.user_id
    );

    hub.commit(EventType::created(Domain::User), profile_json(&user)?, &identity)
        .await;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/{id} `{email?, name?, role?}`
///
/// # Errors
///
/// * `400 Bad Request` - malformed e-mail, blank name, or an admin demoting themselves
/// * `404 Not Found` - no such user
pub async fn update_user(
    State(store): State<Arc<dyn CredentialStore>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Path(id): Path<UserId>,
    Json(mut update): Json<UserUpdate>,
) -> BackendResult<Json<UserResponse>> {
    if let Some(email) = update.email.take() {
        let email = normalize_email(&email);
        if !email.contains('@') {
            return Err(BackendError::validation("Email is invalid"));
        }
        update.email = Some(email);
    }
    if let Some(name) = update.name.take() {
        update.name = Some(required(Some(name), "Name")?);
    }
    if id == identity.user_id && matches!(update.role, Some(role) if role != Role::Admin) {
        return Err(BackendError::validation("Cannot remove your own admin role"));
    }

    let user = store.update_user(id, update).await?.public();
    tracing::info!("[Auth] User {} updated by admin {}", id, identity.user_id);

    hub.commit(EventType::updated(Domain::User), profile_json(&user)?, &identity)
        .await;
    Ok(Json(user))
}

/// DELETE /api/users/{id}
///
/// # Errors
///
/// * `400 Bad Request` - an administrator tried to delete their own account
/// * `404 Not Found` - no such user
pub async fn delete_user(
    State(store): State<Arc<dyn CredentialStore>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Path(id): Path<UserId>,
) -> BackendResult<Json<MessageResponse>> {
    if id == identity.user_id {
        return Err(BackendError::validation("Cannot delete your own account"));
    }

    store.delete_user(id).await?;
    tracing::info!("[Auth] User {} deleted by admin {}", id, identity.user_id);

    hub.commit(EventType::deleted(Domain::User), json!({ "id": id }), &identity)
        .await;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
