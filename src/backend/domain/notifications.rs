//! Notifications: stored per user, pushed to the owner's private room.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{DomainError, DomainResult, EntityId, NewNotification};
use crate::shared::UserId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRow {
    pub id: EntityId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub meta: serde_json::Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

const NOTIFICATION_COLUMNS: &str = "id, user_id, type, title, message, meta, read, created_at";

pub const DEFAULT_TITLE: &str = "Time Planner";
pub const DEFAULT_KIND: &str = "INFO";

/// Body of `notification:create` / `POST /api/notifications`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInput {
    pub user_id: UserId,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub message: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl NotificationInput {
    pub fn into_new(self) -> DomainResult<NewNotification> {
        if self.message.trim().is_empty() {
            return Err(DomainError::InvalidPayload("message is required".into()));
        }
        Ok(NewNotification {
            user_id: self.user_id,
            kind: self.kind.unwrap_or_else(|| DEFAULT_KIND.into()),
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.into()),
            message: self.message,
            meta: match self.meta {
                serde_json::Value::Null => serde_json::json!({}),
                meta => meta,
            },
        })
    }
}

/// Body of `POST /api/notifications/batch`: one message for several users
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBatch {
    pub users: Vec<UserId>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub message: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl NotificationBatch {
    /// One input per recipient, in request order
    pub fn into_inputs(self) -> DomainResult<Vec<NotificationInput>> {
        if self.users.is_empty() {
            return Err(DomainError::InvalidPayload("users must not be empty".into()));
        }
        Ok(self
            .users
            .into_iter()
            .map(|user_id| NotificationInput {
                user_id,
                kind: self.kind.clone(),
                title: self.title.clone(),
                message: self.message.clone(),
                meta: self.meta.clone(),
            })
            .collect())
    }
}

/// Body of `notification:update` / `notification:read`; `read` defaults to true
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationPatch {
    #[serde(default = "default_read")]
    pub read: bool,
}

fn default_read() -> bool {
    true
}

pub(super) async fn owner_of(pool: &PgPool, id: EntityId) -> DomainResult<Option<UserId>> {
    let owner = sqlx::query_scalar::<_, UserId>("SELECT user_id FROM notifications WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(owner)
}

pub(super) async fn insert(pool: &PgPool, new: NewNotification) -> DomainResult<NotificationRow> {
    let row = sqlx::query_as::<_, NotificationRow>(&format!(
        r#"
        INSERT INTO notifications (user_id, type, title, message, meta)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        NOTIFICATION_COLUMNS
    ))
    .bind(new.user_id)
    .bind(new.kind)
    .bind(new.title)
    .bind(new.message)
    .bind(new.meta)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub(super) async fn set_read(pool: &PgPool, id: EntityId, read: bool) -> DomainResult<NotificationRow> {
    let row = sqlx::query_as::<_, NotificationRow>(&format!(
        "UPDATE notifications SET read = $2 WHERE id = $1 RETURNING {}",
        NOTIFICATION_COLUMNS
    ))
    .bind(id)
    .bind(read)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub(super) async fn delete(pool: &PgPool, id: EntityId) -> DomainResult<()> {
    sqlx::query("DELETE FROM notifications WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Mark every unread notification of a user as read; returns how many changed
pub(super) async fn mark_all_read(pool: &PgPool, user_id: UserId) -> DomainResult<u64> {
    let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub(super) async fn delete_all(pool: &PgPool, user_id: UserId) -> DomainResult<u64> {
    let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub(super) async fn list_for(pool: &PgPool, user_id: UserId) -> DomainResult<Vec<NotificationRow>> {
    let rows = sqlx::query_as::<_, NotificationRow>(&format!(
        "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        NOTIFICATION_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
