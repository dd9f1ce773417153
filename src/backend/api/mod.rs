//! REST API Module
//!
//! Domain endpoints under `/api`. Every route sits behind `auth_middleware`;
//! `/api/users` additionally requires the `ADMIN` role.
//!
//! Mutations go through the same `DomainHandlers` as the realtime channel
//! and are published with `RealtimeHub::commit`, so REST and socket clients
//! share one event history.
//!
//! # Module Structure
//!
//! ```text
//! api/
//! ├── mod.rs            - Module exports, mutate-then-publish helpers
//! ├── tasks.rs          - /api/tasks
//! ├── timelogs.rs       - /api/timelogs
//! ├── categories.rs     - /api/categories
//! ├── notifications.rs  - /api/notifications
//! └── users.rs          - /api/users (admin)
//! ```

pub mod categories;
pub mod notifications;
pub mod tasks;
pub mod timelogs;
pub mod users;

use serde_json::Value;

use crate::backend::domain::{DomainHandlers, EntityId};
use crate::backend::error::BackendResult;
use crate::backend::realtime::RealtimeHub;
use crate::shared::{Domain, EventType, Identity};

pub use categories::{create_category, delete_category, get_category, list_categories, update_category};
pub use notifications::{
    create_notification, create_notifications_batch, delete_all_notifications, delete_notification,
    list_notifications, mark_all_notifications_read, mark_notification_read,
};
pub use tasks::{create_task, delete_task, get_task, list_tasks, update_task};
pub use timelogs::{create_timelog, delete_timelog, get_timelog, list_timelogs, update_timelog};
pub use users::{create_user, delete_user, get_user, list_users, update_user};

/// Create through the domain handlers, then publish `<domain>:created`
pub(crate) async fn create_and_publish(
    handlers: &dyn DomainHandlers,
    hub: &RealtimeHub,
    domain: Domain,
    payload: Value,
    identity: &Identity,
) -> BackendResult<Value> {
    let created = handlers.create(domain, payload, identity).await?;
    hub.commit(EventType::created(domain), created.clone(), identity)
        .await;
    Ok(created)
}

pub(crate) async fn update_and_publish(
    handlers: &dyn DomainHandlers,
    hub: &RealtimeHub,
    domain: Domain,
    id: EntityId,
    payload: Value,
    identity: &Identity,
) -> BackendResult<Value> {
    let updated = handlers.update(domain, id, payload, identity).await?;
    hub.commit(EventType::updated(domain), updated.clone(), identity)
        .await;
    Ok(updated)
}

pub(crate) async fn delete_and_publish(
    handlers: &dyn DomainHandlers,
    hub: &RealtimeHub,
    domain: Domain,
    id: EntityId,
    identity: &Identity,
) -> BackendResult<Value> {
    let deleted = handlers.delete(domain, id, identity).await?;
    hub.commit(EventType::deleted(domain), deleted.clone(), identity)
        .await;
    Ok(deleted)
}
