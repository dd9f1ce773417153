//! Notification endpoints. Users only ever see their own notifications.
//!
//! Every change is published as a `notification:*` event to the rooms of the
//! caller and of the notification's owner, so the owner's other devices
//! stay in sync.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{create_and_publish, delete_and_publish, update_and_publish};
use crate::backend::domain::notifications::NotificationBatch;
use crate::backend::domain::{parse_input, DomainError, DomainHandlers, DomainQueries, EntityId};
use crate::backend::error::BackendResult;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::RealtimeHub;
use crate::shared::{Domain, EventType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationBatchResponse {
    pub message: String,
    pub notifications: Vec<Value>,
}

/// Result of a bulk change to the caller's notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCountResponse {
    pub message: String,
    pub count: u64,
}

/// GET /api/notifications, newest first
pub async fn list_notifications(
    State(queries): State<Arc<dyn DomainQueries>>,
    AuthUser(identity): AuthUser,
) -> BackendResult<Json<Vec<Value>>> {
    Ok(Json(queries.list_notifications(identity.user_id).await?))
}

/// POST /api/notifications `{userId, message, title?, type?, meta?}`
pub async fn create_notification(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<Value>,
) -> BackendResult<(StatusCode, Json<Value>)> {
    let notification =
        create_and_publish(handlers.as_ref(), &hub, Domain::Notification, payload, &identity)
            .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

/// POST /api/notifications/batch `{users: [id], message, title?, type?, meta?}`
///
/// Recipients are stored one by one; a failure stops the batch and earlier
/// recipients keep their notification.
pub async fn create_notifications_batch(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<Value>,
) -> BackendResult<(StatusCode, Json<NotificationBatchResponse>)> {
    let batch: NotificationBatch = parse_input(payload)?;

    let mut notifications = Vec::new();
    for input in batch.into_inputs()? {
        let payload = serde_json::to_value(input).map_err(DomainError::from)?;
        notifications.push(
            create_and_publish(handlers.as_ref(), &hub, Domain::Notification, payload, &identity)
                .await?,
        );
    }

    tracing::info!(
        "[Notifications] User {} sent a batch of {}",
        identity.user_id,
        notifications.len()
    );
    Ok((
        StatusCode::CREATED,
        Json(NotificationBatchResponse {
            message: "Notifications sent".into(),
            notifications,
        }),
    ))
}

/// PATCH /api/notifications/{id}/read
pub async fn mark_notification_read(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Path(id): Path<EntityId>,
) -> BackendResult<Json<Value>> {
    let notification = update_and_publish(
        handlers.as_ref(),
        &hub,
        Domain::Notification,
        id,
        json!({ "read": true }),
        &identity,
    )
    .await?;
    Ok(Json(notification))
}

/// PATCH /api/notifications/read-all
///
/// Published as one `notification:updated {userId, read: true, count}`.
pub async fn mark_all_notifications_read(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
) -> BackendResult<Json<NotificationCountResponse>> {
    let count = handlers
        .mark_all_notifications_read(identity.user_id)
        .await?;
    hub.commit(
        EventType::updated(Domain::Notification),
        json!({ "userId": identity.user_id, "read": true, "count": count }),
        &identity,
    )
    .await;
    Ok(Json(NotificationCountResponse {
        message: "All notifications marked as read".into(),
        count,
    }))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
    Path(id): Path<EntityId>,
) -> BackendResult<Json<Value>> {
    let deleted =
        delete_and_publish(handlers.as_ref(), &hub, Domain::Notification, id, &identity).await?;
    Ok(Json(deleted))
}

/// DELETE /api/notifications
///
/// Published as one `notification:deleted {userId, count}`.
pub async fn delete_all_notifications(
    State(handlers): State<Arc<dyn DomainHandlers>>,
    State(hub): State<RealtimeHub>,
    AuthUser(identity): AuthUser,
) -> BackendResult<Json<NotificationCountResponse>> {
    let count = handlers.delete_all_notifications(identity.user_id).await?;
    hub.commit(
        EventType::deleted(Domain::Notification),
        json!({ "userId": identity.user_id, "count": count }),
        &identity,
    )
    .await;
    Ok(Json(NotificationCountResponse {
        message: "All notifications deleted".into(),
        count,
    }))
}
