/**
 * Authentication Request and Response Types
 *
 * Request fields are optional at the serde level so a missing field is
 * answered with a 400 `{error}` body instead of an extractor rejection.
 */

use serde::{Deserialize, Serialize};

use crate::backend::auth::tokens::TokenPair;
use crate::backend::auth::users::UserResponse;
use crate::backend::error::BackendError;

/// Body of POST /api/auth/register
///
/// There is no role field: self-registered accounts are always `USER`, and a
/// `role` key in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Body of POST /api/auth/login
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of POST /api/auth/refresh
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Body of PUT /api/auth/change-password
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// Register/login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Trimmed, non-empty value of a required field
pub(crate) fn required(value: Option<String>, what: &str) -> Result<String, BackendError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BackendError::validation(format!("{} is required", what)))
}

/// E-mails are compared case-insensitively
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
