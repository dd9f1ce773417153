/**
 * Router Configuration
 *
 * Combines every route group into one Axum router:
 *
 * 1. `/health` and the `/socket` WebSocket endpoint
 * 2. Auth routes (`/api/auth/…`)
 * 3. Domain routes (`/api/tasks`, `/api/notifications`, `/api/users`)
 * 4. Fallback: `404 {error}`
 *
 * Outer layers: CORS (restricted to `FRONTEND_URL` when set) and request
 * tracing.
 */

use axum::{
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::error::BackendError;
use crate::backend::realtime::socket_handler;
use crate::backend::routes::api_routes::{configure_api_routes, configure_auth_routes};
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/socket", get(socket_handler));

    let router = configure_auth_routes(router, app_state.tokens.clone());
    let router = configure_api_routes(router, app_state.tokens.clone());

    let router = router.fallback(|| async { BackendError::not_found("Route not found") });

    router
        .layer(cors_layer(app_state.config.frontend_url.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs(),
        "environment": state.config.environment,
        "online": state.hub.online_users().len(),
    }))
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let origin = frontend_url.and_then(|url| match HeaderValue::from_str(url) {
        Ok(origin) => Some(origin),
        Err(_) => {
            tracing::warn!("[Http] Ignoring malformed FRONTEND_URL {:?}", url);
            None
        }
    });

    match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
            .allow_credentials(true),
        None => CorsLayer::permissive(),
    }
}
