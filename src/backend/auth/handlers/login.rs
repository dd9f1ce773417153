/**
 * Login Handler
 *
 * POST /api/auth/login verifies e-mail and password and returns a token pair.
 *
 * An unknown e-mail and a wrong password get the same 401 so the endpoint
 * does not reveal which accounts exist.
 */

use std::sync::Arc;

use axum::{extract::State, Json};

use super::types::{normalize_email, required, AuthResponse, LoginRequest};
use crate::backend::auth::password::verify_password;
use crate::backend::auth::tokens::TokenService;
use crate::backend::auth::users::CredentialStore;
use crate::backend::error::{BackendError, BackendResult};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - e-mail or password missing
/// * `401 Unauthorized` - unknown user or wrong password
/// * `503 Service Unavailable` - database not configured
pub async fn login(
    State(store): State<Arc<dyn CredentialStore>>,
    State(tokens): State<Arc<TokenService>>,
    Json(request): Json<LoginRequest>,
) -> BackendResult<Json<AuthResponse>> {
    let email = normalize_email(&required(request.email, "Email")?);
    let password = required(request.password, "Password")?;

    let user = store.find_by_email(&email).await?.ok_or_else(|| {
        tracing::warn!("[Auth] Login for unknown user {}", email);
        BackendError::unauthenticated(INVALID_CREDENTIALS)
    })?;

    if !verify_password(&password, &user.password_hash) {
        tracing::warn!("[Auth] Invalid password for user {}", user.id);
        return Err(BackendError::unauthenticated(INVALID_CREDENTIALS));
    }

    let tokens = tokens.issue_pair(&user.identity())?;

    tracing::info!("[Auth] User {} logged in", user.id);

    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        user: user.public(),
        tokens,
    }))
}
