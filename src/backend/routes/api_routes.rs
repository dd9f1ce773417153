/**
 * API Route Configuration
 *
 * Groups the `/api` handlers by the checks they need. Layers are attached
 * with `route_layer`, so unknown paths still fall through to the 404
 * fallback instead of answering 401.
 *
 * # Layer Order
 *
 * `auth_middleware` wraps the admin group from the outside: the token is
 * verified (401) before the role is checked (403).
 */

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::backend::api::{
    create_category, create_notification, create_notifications_batch, create_task,
    create_timelog, create_user, delete_all_notifications, delete_category, delete_notification,
    delete_task, delete_timelog, delete_user, get_category, get_task, get_timelog, get_user,
    list_categories, list_notifications, list_tasks, list_timelogs, list_users,
    mark_all_notifications_read, mark_notification_read, update_category, update_task,
    update_timelog, update_user,
};
use crate::backend::auth::tokens::TokenService;
use crate::backend::auth::{change_password, get_me, login, refresh, register};
use crate::backend::middleware::{auth_middleware, require_roles, AllowedRoles};
use crate::backend::server::state::AppState;
use crate::shared::Role;

/// Authentication endpoints
///
/// - `POST /api/auth/register`, `POST /api/auth/login`, `POST /api/auth/refresh` - public
/// - `GET /api/auth/me`, `PUT /api/auth/change-password` - bearer token
pub fn configure_auth_routes(
    router: Router<AppState>,
    tokens: Arc<TokenService>,
) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/auth/me", get(get_me))
        .route("/api/auth/change-password", put(change_password))
        .route_layer(from_fn_with_state(tokens, auth_middleware));

    router
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .merge(protected)
}

/// Domain endpoints, all behind a bearer token
pub fn configure_api_routes(
    router: Router<AppState>,
    tokens: Arc<TokenService>,
) -> Router<AppState> {
    let admin = Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(from_fn_with_state(
            AllowedRoles::only(Role::Admin),
            require_roles,
        ));

    let protected = Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/timelogs", get(list_timelogs).post(create_timelog))
        .route(
            "/api/timelogs/{id}",
            get(get_timelog).put(update_timelog).delete(delete_timelog),
        )
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route(
            "/api/notifications",
            get(list_notifications)
                .post(create_notification)
                .delete(delete_all_notifications),
        )
        .route("/api/notifications/batch", post(create_notifications_batch))
        .route(
            "/api/notifications/read-all",
            patch(mark_all_notifications_read),
        )
        .route("/api/notifications/{id}", delete(delete_notification))
        .route(
            "/api/notifications/{id}/read",
            patch(mark_notification_read),
        )
        .merge(admin)
        .route_layer(from_fn_with_state(tokens, auth_middleware));

    router.merge(protected)
}
