/**
 * PostgreSQL Domain Handlers
 *
 * Routes each `(domain, mutation)` pair to its entity module, applying the
 * ownership rules before touching the row. Like the credential store, the
 * pool is optional: without a database every call fails with `Unavailable`.
 */

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::PgPool;

use super::{
    categories, ensure_owner, files, notifications, parse_input, tasks, timelogs, users,
    DomainError, DomainHandlers, DomainQueries, DomainResult, EntityId, NewNotification, TaskList,
    TaskQuery, TimelogList, TimelogQuery,
};
use crate::backend::error::BackendError;
use crate::shared::{Domain, Identity, UserId};

#[derive(Clone)]
pub struct PgDomainHandlers {
    pool: Option<PgPool>,
}

impl PgDomainHandlers {
    pub fn new(pool: Option<PgPool>) -> Self {
        Self { pool }
    }

    fn pool(&self) -> DomainResult<&PgPool> {
        self.pool.as_ref().ok_or_else(|| {
            tracing::error!("[Domain] Database not configured");
            DomainError::Backend(BackendError::unavailable("Database not configured"))
        })
    }

    /// Owner of a row, `NotFound` when the row is absent
    async fn owner(&self, domain: Domain, id: EntityId) -> DomainResult<UserId> {
        let pool = self.pool()?;
        let owner = match domain {
            Domain::Task => tasks::find(pool, id).await?.map(|t| t.user_id),
            Domain::File => files::owner_of(pool, id).await?,
            Domain::Timelog => timelogs::find(pool, id).await?.map(|t| t.user_id),
            Domain::Notification => notifications::owner_of(pool, id).await?,
            Domain::Category => categories::find(pool, id).await?.map(|c| c.user_id),
            Domain::User => Some(id),
        };
        owner.ok_or_else(|| DomainError::not_found(domain, id))
    }
}

fn to_json<T: serde::Serialize>(value: T) -> DomainResult<Value> {
    Ok(serde_json::to_value(value)?)
}

#[async_trait]
impl DomainHandlers for PgDomainHandlers {
    async fn create(&self, domain: Domain, payload: Value, actor: &Identity) -> DomainResult<Value> {
        let pool = self.pool()?;
        match domain {
            Domain::Task => to_json(tasks::insert(pool, parse_input(payload)?, actor.user_id).await?),
            Domain::File => to_json(files::insert(pool, parse_input(payload)?, actor.user_id).await?),
            Domain::Timelog => {
                to_json(timelogs::insert(pool, parse_input(payload)?, actor.user_id).await?)
            }
            Domain::User => {
                users::ensure_admin(actor)?;
                to_json(users::insert(pool, parse_input(payload)?).await?)
            }
            Domain::Notification => {
                let input: notifications::NotificationInput = parse_input(payload)?;
                to_json(notifications::insert(pool, input.into_new()?).await?)
            }
            Domain::Category => {
                to_json(categories::insert(pool, parse_input(payload)?, actor.user_id).await?)
            }
        }
    }

    async fn update(
        &self,
        domain: Domain,
        id: EntityId,
        payload: Value,
        actor: &Identity,
    ) -> DomainResult<Value> {
        let pool = self.pool()?;
        match domain {
            Domain::Task => {
                ensure_owner(domain, self.owner(domain, id).await?, actor)?;
                to_json(tasks::update(pool, id, parse_input(payload)?).await?)
            }
            Domain::File => {
                ensure_owner(domain, self.owner(domain, id).await?, actor)?;
                to_json(files::update(pool, id, parse_input(payload)?).await?)
            }
            Domain::Timelog => {
                let existing = timelogs::find(pool, id)
                    .await?
                    .ok_or_else(|| DomainError::not_found(domain, id))?;
                ensure_owner(domain, existing.user_id, actor)?;
                to_json(timelogs::update(pool, existing, parse_input(payload)?).await?)
            }
            Domain::User => {
                let patch: users::UserPatch = parse_input(payload)?;
                users::check_patch(id, &patch, actor)?;
                to_json(users::update(pool, id, patch).await?)
            }
            Domain::Notification => {
                ensure_owner(domain, self.owner(domain, id).await?, actor)?;
                let patch: notifications::NotificationPatch = parse_input(payload)?;
                to_json(notifications::set_read(pool, id, patch.read).await?)
            }
            Domain::Category => {
                ensure_owner(domain, self.owner(domain, id).await?, actor)?;
                to_json(categories::update(pool, id, parse_input(payload)?).await?)
            }
        }
    }

    async fn delete(&self, domain: Domain, id: EntityId, actor: &Identity) -> DomainResult<Value> {
        let pool = self.pool()?;
        // Resolved before the row is gone so the event can reach the owner.
        let owner = match domain {
            Domain::User => {
                users::ensure_admin(actor)?;
                None
            }
            _ => {
                let owner = self.owner(domain, id).await?;
                ensure_owner(domain, owner, actor)?;
                Some(owner)
            }
        };

        match domain {
            Domain::Task => tasks::delete(pool, id).await?,
            Domain::File => files::delete(pool, id).await?,
            Domain::Timelog => timelogs::delete(pool, id).await?,
            Domain::Notification => notifications::delete(pool, id).await?,
            Domain::Category => categories::delete(pool, id).await?,
            Domain::User => users::delete(pool, id).await?,
        }
        Ok(deleted_payload(id, owner))
    }

    async fn create_notification(&self, new: NewNotification) -> DomainResult<Value> {
        let pool = self.pool()?;
        to_json(notifications::insert(pool, new).await?)
    }

    async fn mark_all_notifications_read(&self, user_id: UserId) -> DomainResult<u64> {
        notifications::mark_all_read(self.pool()?, user_id).await
    }

    async fn delete_all_notifications(&self, user_id: UserId) -> DomainResult<u64> {
        notifications::delete_all(self.pool()?, user_id).await
    }
}

fn deleted_payload(id: EntityId, owner: Option<UserId>) -> Value {
    match owner {
        Some(owner) => json!({ "id": id, "userId": owner }),
        None => json!({ "id": id }),
    }
}

#[async_trait]
impl DomainQueries for PgDomainHandlers {
    async fn list_tasks(&self, query: TaskQuery, actor: &Identity) -> DomainResult<TaskList> {
        tasks::list(self.pool()?, &query, actor).await
    }

    async fn get_task(&self, id: EntityId, actor: &Identity) -> DomainResult<Value> {
        let task = tasks::find(self.pool()?, id)
            .await?
            .ok_or_else(|| DomainError::not_found(Domain::Task, id))?;
        ensure_owner(Domain::Task, task.user_id, actor)?;
        to_json(task)
    }

    async fn list_notifications(&self, user_id: UserId) -> DomainResult<Vec<Value>> {
        notifications::list_for(self.pool()?, user_id)
            .await?
            .into_iter()
            .map(to_json)
            .collect()
    }

    async fn list_timelogs(&self, query: TimelogQuery, actor: &Identity) -> DomainResult<TimelogList> {
        timelogs::list(self.pool()?, &query, actor).await
    }

    async fn get_timelog(&self, id: EntityId, actor: &Identity) -> DomainResult<Value> {
        let timelog = timelogs::find(self.pool()?, id)
            .await?
            .ok_or_else(|| DomainError::not_found(Domain::Timelog, id))?;
        ensure_owner(Domain::Timelog, timelog.user_id, actor)?;
        to_json(timelog)
    }

    async fn list_categories(&self, actor: &Identity) -> DomainResult<Vec<Value>> {
        categories::list(self.pool()?, actor)
            .await?
            .into_iter()
            .map(to_json)
            .collect()
    }

    async fn get_category(&self, id: EntityId, actor: &Identity) -> DomainResult<Value> {
        let category = categories::find(self.pool()?, id)
            .await?
            .ok_or_else(|| DomainError::not_found(Domain::Category, id))?;
        ensure_owner(Domain::Category, category.user_id, actor)?;
        to_json(category)
    }
}
