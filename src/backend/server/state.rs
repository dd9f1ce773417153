/**
 * Application State Management
 *
 * `AppState` holds every long-lived service and implements `FromRef` for
 * each, so handlers extract only what they use:
 *
 * ```rust,ignore
 * async fn handler(State(store): State<Arc<dyn CredentialStore>>) { /* ... */ }
 * ```
 *
 * # Thread Safety
 *
 * - Collaborators are `Arc<dyn Trait + Send + Sync>`
 * - `RealtimeHub` is a cheap clone around `Arc<Mutex<HubState>>`
 */

use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;

use crate::backend::auth::tokens::TokenService;
use crate::backend::auth::users::CredentialStore;
use crate::backend::domain::{DomainHandlers, DomainQueries};
use crate::backend::realtime::RealtimeHub;
use crate::backend::server::config::ServerConfig;

/// Application state shared by every route
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,

    /// Access/refresh token issuing and verification
    pub tokens: Arc<TokenService>,

    /// User accounts for the auth endpoints and `/api/users`
    pub credentials: Arc<dyn CredentialStore>,

    /// Mutations shared by REST and the realtime channel
    pub handlers: Arc<dyn DomainHandlers>,

    /// Read-only listing for the REST routes
    pub queries: Arc<dyn DomainQueries>,

    pub hub: RealtimeHub,

    /// Process start, reported as `uptime` by `/health`
    pub started_at: Instant,
}

impl AppState {
    /// Assemble the state; the hub is built here so it shares the token
    /// service and domain handlers with the REST routes
    pub fn new(
        config: ServerConfig,
        tokens: Arc<TokenService>,
        credentials: Arc<dyn CredentialStore>,
        handlers: Arc<dyn DomainHandlers>,
        queries: Arc<dyn DomainQueries>,
    ) -> Self {
        let hub = RealtimeHub::new(
            tokens.clone(),
            handlers.clone(),
            config.event_history_capacity,
        );
        Self {
            config: Arc::new(config),
            tokens,
            credentials,
            handlers,
            queries,
            hub,
            started_at: Instant::now(),
        }
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for Arc<dyn CredentialStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.credentials.clone()
    }
}

impl FromRef<AppState> for Arc<dyn DomainHandlers> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.handlers.clone()
    }
}

impl FromRef<AppState> for Arc<dyn DomainQueries> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.queries.clone()
    }
}

impl FromRef<AppState> for RealtimeHub {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.hub.clone()
    }
}
