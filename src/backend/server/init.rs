/**
 * Server Initialization
 *
 * 1. Build the token service from the configuration
 * 2. Open the optional database pool and run migrations
 * 3. Create the PostgreSQL-backed collaborators and the realtime hub
 * 4. Create and configure the router
 *
 * A missing database does not stop startup; store-backed routes answer 503
 * until one is configured.
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::auth::tokens::{TokenError, TokenService};
use crate::backend::auth::users::PgCredentialStore;
use crate::backend::domain::PgDomainHandlers;
use crate::backend::error::set_development_mode;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails only when the token secrets are unusable (empty or equal).
pub async fn create_app(config: ServerConfig) -> Result<Router<()>, TokenError> {
    tracing::info!("Initializing TimePlanner backend ({})", config.environment);

    set_development_mode(config.is_development());

    let tokens = Arc::new(TokenService::from_config(&config)?);

    let db_pool = load_database(&config).await;

    let domain = Arc::new(PgDomainHandlers::new(db_pool.clone()));
    let state = AppState::new(
        config,
        tokens,
        Arc::new(PgCredentialStore::new(db_pool)),
        domain.clone(),
        domain,
    );

    tracing::info!(
        "Realtime hub ready (history capacity {})",
        state.config.event_history_capacity
    );

    Ok(create_router(state))
}
