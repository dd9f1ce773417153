/**
 * Backend Error Types
 *
 * Every failure a handler, the auth layer or a collaborator can raise,
 * mapped onto one HTTP status and, for realtime, onto a scoped error event.
 *
 * # Error Categories
 *
 * - `Unauthenticated` - missing, invalid or expired token (401)
 * - `Forbidden` - role not permitted (403)
 * - `NotFound` - entity absent (404)
 * - `Conflict` - uniqueness violation from the store (409)
 * - `Validation` - malformed input (400)
 * - `Unavailable` - database not configured (503)
 * - `Internal` - anything unexpected (500)
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// ```rust
/// use timeplanner::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::not_found("Task 3 not found");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Unauthenticated: {message}")]
    Unauthenticated {
        message: String,
    },

    #[error("Forbidden: {message}")]
    Forbidden {
        message: String,
    },

    #[error("Not found: {message}")]
    NotFound {
        message: String,
    },

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// The store behind this route is not configured
    #[error("Service unavailable: {message}")]
    Unavailable {
        message: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },

    #[error(transparent)]
    SharedError(#[from] SharedError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::ProtocolError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message
    ///
    /// Internal errors hide their detail; it is logged and only exposed in
    /// development mode through the `details` field.
    pub fn message(&self) -> String {
        match self {
            Self::Unauthenticated { message }
            | Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::Validation { message }
            | Self::Unavailable { message } => message.clone(),
            Self::Internal { .. } => "Internal server error".to_string(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => format!("Invalid payload: {}", err),
        }
    }
}

impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::not_found("Record not found"),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => Self::conflict("A record with this data already exists"),
                // foreign_key_violation, check_violation, not_null_violation
                Some("23503") | Some("23514") | Some("23502") => {
                    Self::validation(db_err.message().to_string())
                }
                _ => Self::internal(err.to_string()),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::unavailable("Database is not reachable")
            }
            _ => Self::internal(err.to_string()),
        }
    }
}
