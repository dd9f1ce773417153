//! POST /api/auth/refresh: trade a refresh token for a new pair.
//!
//! The role is re-read from the store so a changed role takes effect on the
//! next refresh.

use std::sync::Arc;

use axum::{extract::State, Json};

use super::types::{required, RefreshRequest, RefreshResponse};
use crate::backend::auth::tokens::TokenService;
use crate::backend::auth::users::CredentialStore;
use crate::backend::error::{BackendError, BackendResult};

pub async fn refresh(
    State(store): State<Arc<dyn CredentialStore>>,
    State(tokens): State<Arc<TokenService>>,
    Json(request): Json<RefreshRequest>,
) -> BackendResult<Json<RefreshResponse>> {
    let refresh_token = required(request.refresh_token, "Refresh token")?;

    let user_id = tokens.verify_refresh(&refresh_token).map_err(|e| {
        tracing::debug!("[Auth] Rejected refresh token: {}", e);
        BackendError::unauthenticated("Invalid refresh token")
    })?;

    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    Ok(Json(RefreshResponse {
        tokens: tokens.issue_pair(&user.identity())?,
    }))
}
