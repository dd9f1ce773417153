/**
 * Timelog Endpoints
 *
 * - `GET /api/timelogs?page&limit&taskId&userId&startDate&endDate`
 * - `GET /api/timelogs/{id}`
 * - `POST /api/timelogs` starts a timer (or records a finished one when
 *   `endTime` is given), `PUT /api/timelogs/{id}` stops or adjusts it
 * - `DELETE /api/timelogs/{id}`
 *
 * Same rules as the `timelog:*` realtime events: owners and admins only.
 * `userId` in the listing is honoured for admins.
 */

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::{create_and_publish, delete_and_publish, update_and_publish};
use crate::backend::domain::{DomainHandlers, DomainQueries, EntityId, TimelogList, TimelogQuery};
use crate::backend::error::BackendResult;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::RealtimeHub;
use crate::shared::Domain;

pub async fn list_timelogs(
    State(queries): State<Arc<dyn DomainQueries>>,
    AuthUser(identity): AuthUser,
    Query(query): Query<TimelogQuery>,
) -> BackendResult<Json<TimelogList>> {
    Ok(Json(queries.list_timelogs(query, &identity).await?))
}

pub async fn get_timelog(
    State(queries): State<Arc<dyn DomainQueries>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<EntityId>,
) -> BackendResult<Json<Value>> {
    Ok(Json(queries.get_timelog(id, &identity).await?))
}

pub async fn create_timelog(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<Value>,
) -> BackendResult<(StatusCode, Json<Value>)> {
    let timelog =
        create_and_publish(handlers.as_ref(), &hub, Domain::Timelog, payload, &identity).await?;
    Ok((StatusCode::CREATED, Json(timelog)))
}

/// PUT /api/timelogs/{id}
///
/// An empty body stops a running timer at the current time.
pub async fn update_timelog(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Path(id): Path<EntityId>,
    Json(payload): Json<Value>,
) -> BackendResult<Json<Value>> {
    let timelog =
        update_and_publish(handlers.as_ref(), &hub, Domain::Timelog, id, payload, &identity).await?;
    Ok(Json(timelog))
}

pub async fn delete_timelog(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Path(id): Path<EntityId>,
) -> BackendResult<Json<Value>> {
    let deleted = delete_and_publish(handlers.as_ref(), &hub, Domain::Timelog, id, &identity).await?;
    Ok(Json(deleted))
}
