/**
 * Error Conversion
 *
 * Turns a `BackendError` into an HTTP response.
 *
 * # Response Format
 *
 * ```json
 * { "error": "Task 3 not found" }
 * ```
 *
 * In development mode the debug rendering of the error is added under
 * `details`.
 */

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use crate::backend::error::types::BackendError;

static DEVELOPMENT_MODE: AtomicBool = AtomicBool::new(false);

/// Toggle inclusion of error details in responses (set once at startup)
pub fn set_development_mode(enabled: bool) {
    DEVELOPMENT_MODE.store(enabled, Ordering::Relaxed);
}

pub fn development_mode() -> bool {
    DEVELOPMENT_MODE.load(Ordering::Relaxed)
}

impl BackendError {
    /// JSON body for this error
    pub fn body(&self) -> serde_json::Value {
        let mut body = serde_json::json!({ "error": self.message() });
        if development_mode() {
            body["details"] = serde_json::Value::String(format!("{:?}", self));
        }
        body
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[Http] {} -> {}", status, self);
        } else {
            tracing::debug!("[Http] {} -> {}", status, self);
        }

        (status, Json(self.body())).into_response()
    }
}
