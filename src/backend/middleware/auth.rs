/**
 * Authentication Middleware
 *
 * Extracts the bearer token, verifies it with the token service and attaches
 * the resulting `Identity` to the request extensions. The realtime handshake
 * goes through `authenticate_handshake`, which applies the same check to the
 * token supplied at connection time.
 *
 * Verification is signature + expiry only: no store I/O happens here.
 */

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::tokens::TokenService;
use crate::backend::error::BackendError;
use crate::shared::Identity;

/// Read the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, BackendError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!("[Auth] Missing Authorization header");
            BackendError::unauthenticated("Authentication token is missing")
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            tracing::debug!("[Auth] Invalid Authorization header format");
            BackendError::unauthenticated("Authentication token is missing")
        })?;

    Ok(token)
}

/// Verify an access token, collapsing every failure into `Unauthenticated`
pub fn verify_access_token(tokens: &TokenService, token: &str) -> Result<Identity, BackendError> {
    tokens.verify_access(token).map_err(|e| {
        tracing::debug!("[Auth] Rejected access token: {}", e);
        BackendError::unauthenticated("Invalid or expired token")
    })
}

/// Connection-flavoured check used by the realtime handshake
pub fn authenticate_handshake(
    tokens: &TokenService,
    token: Option<&str>,
) -> Result<Identity, BackendError> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| BackendError::unauthenticated("Authentication error"))?;
    verify_access_token(tokens, token)
}

/// Authentication middleware
///
/// Returns 401 with `{error}` when the token is missing or invalid.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = extract_bearer(request.headers())?;
    let identity = verify_access_token(&tokens, token)?;

    tracing::trace!("[Auth] Authenticated user {} ({})", identity.user_id, identity.role);
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Axum extractor for the identity attached by `auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("[Auth] Identity not found in request extensions");
                BackendError::unauthenticated("Authentication required")
            })
    }
}
