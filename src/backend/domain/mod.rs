//! Domain Module
//!
//! Persistence and business rules for the entities mutated over REST and the
//! realtime channel: tasks, files, timelogs, users and notifications, plus
//! the REST-only categories.
//!
//! The realtime hub and the REST routes only see the `DomainHandlers` and
//! `DomainQueries` traits. `PgDomainHandlers` is the PostgreSQL
//! implementation; tests plug in in-memory fakes.
//!
//! # Module Structure
//!
//! ```text
//! domain/
//! ├── mod.rs            - Traits, errors, notification input
//! ├── postgres.rs       - PgDomainHandlers (dispatch per domain)
//! ├── tasks.rs          - Task rows, inputs, listing query
//! ├── categories.rs     - Per-user task categories
//! ├── files.rs          - File metadata rows and inputs
//! ├── timelogs.rs       - Timelog start/stop and listing
//! ├── users.rs          - User administration over the realtime channel
//! └── notifications.rs  - Notification rows and inputs
//! ```

pub mod categories;
pub mod files;
pub mod notifications;
pub mod postgres;
pub mod tasks;
pub mod timelogs;
pub mod users;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::backend::error::BackendError;
use crate::shared::{Domain, Identity, UserId};

pub use postgres::PgDomainHandlers;
pub use tasks::{TaskList, TaskQuery};
pub use timelogs::{TimelogList, TimelogQuery};

/// Primary key of every persisted entity
pub type EntityId = i32;

/// Failures raised by the domain collaborators
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("not allowed to modify this {0}")]
    Forbidden(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl DomainError {
    pub fn not_found(domain: Domain, id: EntityId) -> Self {
        Self::NotFound(format!("{} {}", domain, id))
    }

    /// Message safe to send back to a client
    pub fn public_message(&self) -> String {
        match self {
            DomainError::Backend(e) => e.message(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match BackendError::from(err) {
            BackendError::NotFound { .. } => DomainError::NotFound("record".into()),
            BackendError::Validation { message } => DomainError::InvalidPayload(message),
            other => DomainError::Backend(other),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::InvalidPayload(err.to_string())
    }
}

impl From<DomainError> for BackendError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(what) => BackendError::not_found(format!("{} not found", what)),
            DomainError::Forbidden(_) => BackendError::forbidden(err.to_string()),
            DomainError::InvalidPayload(_) => BackendError::validation(err.to_string()),
            DomainError::Backend(e) => e,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Notification about to be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub meta: Value,
}

/// Mutations shared by REST and the realtime channel
///
/// Every call returns the JSON payload of the resulting domain event: the
/// stored entity for create/update, `{"id", "userId"}` for delete (just
/// `{"id"}` when deleting a user). `userId` is the owner of the removed row.
#[async_trait]
pub trait DomainHandlers: Send + Sync {
    async fn create(&self, domain: Domain, payload: Value, actor: &Identity) -> DomainResult<Value>;

    async fn update(
        &self,
        domain: Domain,
        id: EntityId,
        payload: Value,
        actor: &Identity,
    ) -> DomainResult<Value>;

    async fn delete(&self, domain: Domain, id: EntityId, actor: &Identity) -> DomainResult<Value>;

    /// Store a notification; returns the stored row
    async fn create_notification(&self, new: NewNotification) -> DomainResult<Value>;

    /// Mark all of a user's notifications read; returns how many changed
    async fn mark_all_notifications_read(&self, user_id: UserId) -> DomainResult<u64>;

    /// Delete all of a user's notifications; returns how many were removed
    async fn delete_all_notifications(&self, user_id: UserId) -> DomainResult<u64>;
}

/// Read side used by the REST routes
#[async_trait]
pub trait DomainQueries: Send + Sync {
    async fn list_tasks(&self, query: TaskQuery, actor: &Identity) -> DomainResult<TaskList>;

    async fn get_task(&self, id: EntityId, actor: &Identity) -> DomainResult<Value>;

    /// Notifications of `user_id`, newest first
    async fn list_notifications(&self, user_id: UserId) -> DomainResult<Vec<Value>>;

    async fn list_timelogs(&self, query: TimelogQuery, actor: &Identity) -> DomainResult<TimelogList>;

    async fn get_timelog(&self, id: EntityId, actor: &Identity) -> DomainResult<Value>;

    /// Own categories, everyone's for an admin
    async fn list_categories(&self, actor: &Identity) -> DomainResult<Vec<Value>>;

    async fn get_category(&self, id: EntityId, actor: &Identity) -> DomainResult<Value>;
}

/// Reject a mutation on an entity the actor neither owns nor administers
pub(crate) fn ensure_owner(
    domain: Domain,
    owner: UserId,
    actor: &Identity,
) -> DomainResult<()> {
    if owner == actor.user_id || actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden(domain.to_string()))
    }
}

/// Deserialize a realtime/REST payload into a typed input
pub(crate) fn parse_input<T: serde::de::DeserializeOwned>(payload: Value) -> DomainResult<T> {
    serde_json::from_value(payload).map_err(DomainError::from)
}
