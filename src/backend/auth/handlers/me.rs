/**
 * Current User Handlers
 *
 * - GET /api/auth/me returns the authenticated user
 * - PUT /api/auth/change-password replaces the password after checking the
 *   old one
 *
 * Both sit behind `auth_middleware`; the identity comes from `AuthUser`.
 */

use std::sync::Arc;

use axum::{extract::State, Json};

use super::types::{required, ChangePasswordRequest, MessageResponse};
use crate::backend::auth::password::{hash_password, validate_new_password, verify_password};
use crate::backend::auth::users::{CredentialStore, UserResponse};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;

/// Get current user handler
///
/// # Errors
///
/// * `401 Unauthorized` - no valid token (raised by the middleware)
/// * `404 Not Found` - the user was deleted after the token was issued
pub async fn get_me(
    State(store): State<Arc<dyn CredentialStore>>,
    AuthUser(identity): AuthUser,
) -> BackendResult<Json<UserResponse>> {
    let user = store
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;
    Ok(Json(user.public()))
}

pub async fn change_password(
    State(store): State<Arc<dyn CredentialStore>>,
    AuthUser(identity): AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> BackendResult<Json<MessageResponse>> {
    let old_password = required(request.old_password, "Old password")?;
    let new_password = required(request.new_password, "New password")?;
    validate_new_password(&new_password)?;

    let user = store
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    if !verify_password(&old_password, &user.password_hash) {
        return Err(BackendError::validation("Old password is incorrect"));
    }

    store
        .update_password(user.id, hash_password(&new_password)?)
        .await?;

    tracing::info!("[Auth] User {} changed their password", user.id);
    Ok(Json(MessageResponse::new("Password changed successfully")))
}
