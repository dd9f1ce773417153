//! Category endpoints (`/api/categories`).
//!
//! Categories belong to the user who created them; admins see and manage
//! all of them. Changes are published as `category:*` events.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::{create_and_publish, delete_and_publish, update_and_publish};
use crate::backend::domain::{DomainHandlers, DomainQueries, EntityId};
use crate::backend::error::BackendResult;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::RealtimeHub;
use crate::shared::Domain;

/// GET /api/categories, ordered by name, each with its `taskCount`
pub async fn list_categories(
    State(queries): State<Arc<dyn DomainQueries>>,
    AuthUser(identity): AuthUser,
) -> BackendResult<Json<Vec<Value>>> {
    Ok(Json(queries.list_categories(&identity).await?))
}

pub async fn get_category(
    State(queries): State<Arc<dyn DomainQueries>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<EntityId>,
) -> BackendResult<Json<Value>> {
    Ok(Json(queries.get_category(id, &identity).await?))
}

/// POST /api/categories
///
/// # Errors
///
/// * `400 Bad Request` - blank name
/// * `409 Conflict` - the caller already has a category with this name
pub async fn create_category(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<Value>,
) -> BackendResult<(StatusCode, Json<Value>)> {
    let category =
        create_and_publish(handlers.as_ref(), &hub, Domain::Category, payload, &identity).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Path(id): Path<EntityId>,
    Json(payload): Json<Value>,
) -> BackendResult<Json<Value>> {
    let category =
        update_and_publish(handlers.as_ref(), &hub, Domain::Category, id, payload, &identity)
            .await?;
    Ok(Json(category))
}

/// DELETE /api/categories/{id}
///
/// # Errors
///
/// * `400 Bad Request` - tasks still use the category
pub async fn delete_category(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Path(id): Path<EntityId>,
) -> BackendResult<Json<Value>> {
    let deleted =
        delete_and_publish(handlers.as_ref(), &hub, Domain::Category, id, &identity).await?;
    Ok(Json(deleted))
}
