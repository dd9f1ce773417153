/**
 * Register Handler
 *
 * POST /api/auth/register creates a `USER` account and returns a fresh token
 * pair. Admin accounts are created by an admin (`POST /api/users`).
 */

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::types::{normalize_email, required, AuthResponse, RegisterRequest};
use crate::backend::auth::password::{hash_password, validate_new_password};
use crate::backend::auth::tokens::TokenService;
use crate::backend::auth::users::{CredentialStore, NewUser};
use crate::backend::error::{BackendError, BackendResult};
use crate::shared::Role;

/// Register handler
///
/// # Errors
///
/// * `400 Bad Request` - missing field, malformed e-mail or password shorter than 8
/// * `409 Conflict` - e-mail already registered
/// * `503 Service Unavailable` - database not configured
pub async fn register(
    State(store): State<Arc<dyn CredentialStore>>,
    State(tokens): State<Arc<TokenService>>,
    Json(request): Json<RegisterRequest>,
) -> BackendResult<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(&required(request.email, "Email")?);
    let password = required(request.password, "Password")?;
    let name = required(request.name, "Name")?;

    if !email.contains('@') {
        return Err(BackendError::validation("Email is invalid"));
    }
    validate_new_password(&password)?;

    tracing::info!("[Auth] Registration request for {}", email);

    let user = store
        .create_user(NewUser {
            email,
            name,
            password_hash: hash_password(&password)?,
            role: Role::User,
        })
        .await?;

    let tokens = tokens.issue_pair(&user.identity())?;

    tracing::info!("[Auth] User {} registered ({})", user.id, user.role);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".into(),
            user: user.public(),
            tokens,
        }),
    ))
}
