/**
 * Task Endpoints
 *
 * - `GET /api/tasks` - paginated, filtered listing
 * - `GET /api/tasks/{id}`
 * - `POST /api/tasks`, `PUT /api/tasks/{id}`, `DELETE /api/tasks/{id}`
 *
 * Non-admin users only see and modify their own tasks.
 */

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::{create_and_publish, delete_and_publish, update_and_publish};
use crate::backend::domain::{DomainHandlers, DomainQueries, EntityId, TaskList, TaskQuery};
use crate::backend::error::BackendResult;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::RealtimeHub;
use crate::shared::Domain;

/// List tasks
///
/// ```text
/// GET /api/tasks?page=2&limit=20&search=report&priority=HIGH&sortBy=dueDate&order=asc
/// Authorization: Bearer <access token>
/// ```
pub async fn list_tasks(
    State(queries): State<Arc<dyn DomainQueries>>,
    AuthUser(identity): AuthUser,
    Query(query): Query<TaskQuery>,
) -> BackendResult<Json<TaskList>> {
    Ok(Json(queries.list_tasks(query, &identity).await?))
}

/// # Errors
///
/// * `403 Forbidden` - task belongs to another user
/// * `404 Not Found` - no such task
pub async fn get_task(
    State(queries): State<Arc<dyn DomainQueries>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<EntityId>,
) -> BackendResult<Json<Value>> {
    Ok(Json(queries.get_task(id, &identity).await?))
}

pub async fn create_task(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<Value>,
) -> BackendResult<(StatusCode, Json<Value>)> {
    let task = create_and_publish(handlers.as_ref(), &hub, Domain::Task, payload, &identity).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Path(id): Path<EntityId>,
    Json(payload): Json<Value>,
) -> BackendResult<Json<Value>> {
    let task = update_and_publish(handlers.as_ref(), &hub, Domain::Task, id, payload, &identity).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Path(id): Path<EntityId>,
) -> BackendResult<Json<Value>> {
    let deleted = delete_and_publish(handlers.as_ref(), &hub, Domain::Task, id, &identity).await?;
    Ok(Json(deleted))
}
