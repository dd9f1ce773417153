//! In-memory collaborators
//!
//! Enough behaviour to drive the routes and the hub without PostgreSQL:
//! unique e-mails, ownership checks, stored notifications and categories
//! that refuse deletion while tasks use them.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use timeplanner::backend::auth::users::{CredentialStore, NewUser, User, UserUpdate};
use timeplanner::backend::domain::tasks::Pagination;
use timeplanner::backend::domain::{
    DomainError, DomainHandlers, DomainQueries, DomainResult, EntityId, NewNotification, TaskList,
    TaskQuery, TimelogList, TimelogQuery,
};
use timeplanner::backend::error::{BackendError, BackendResult};
use timeplanner::shared::{Domain, Identity, UserId};

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<Vec<User>>,
}

impl MemoryCredentialStore {
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> BackendResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> BackendResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> BackendResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(BackendError::conflict("A record with this data already exists"));
        }
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let created = User {
            id,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update_password(&self, id: UserId, password_hash: String) -> BackendResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| BackendError::not_found("User not found"))?;
        user.password_hash = password_hash;
        Ok(())
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> BackendResult<User> {
        let mut users = self.users.lock().unwrap();
        if let Some(email) = &update.email {
            if users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(BackendError::conflict("A user with this email already exists"));
            }
        }
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| BackendError::not_found("User not found"))?;
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        Ok(user.clone())
    }

    async fn list_users(&self) -> BackendResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn delete_user(&self, id: UserId) -> BackendResult<()> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(BackendError::not_found("User not found"));
        }
        Ok(())
    }
}

/// Rows of every domain as JSON, keyed by (domain name, id)
#[derive(Default)]
pub struct MemoryDomain {
    rows: Mutex<BTreeMap<(&'static str, EntityId), Value>>,
    next_id: Mutex<EntityId>,
}

impl MemoryDomain {
    fn next_id(&self) -> EntityId {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }

    fn insert(&self, domain: Domain, mut row: Value) -> Value {
        let id = self.next_id();
        row["id"] = json!(id);
        self.rows.lock().unwrap().insert((domain.as_str(), id), row.clone());
        row
    }

    fn owned(&self, domain: Domain, id: EntityId, actor: &Identity) -> DomainResult<Value> {
        let rows = self.rows.lock().unwrap();
        let row = rows
            .get(&(domain.as_str(), id))
            .cloned()
            .ok_or_else(|| DomainError::not_found(domain, id))?;
        if row["userId"] != json!(actor.user_id) && !actor.is_admin() {
            return Err(DomainError::Forbidden(domain.to_string()));
        }
        Ok(row)
    }

    pub fn rows_of(&self, domain: Domain) -> Vec<Value> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|((d, _), _)| *d == domain.as_str())
            .map(|(_, row)| row.clone())
            .collect()
    }
}

#[async_trait]
impl DomainHandlers for MemoryDomain {
    async fn create(&self, domain: Domain, payload: Value, actor: &Identity) -> DomainResult<Value> {
        let Value::Object(mut row) = payload else {
            return Err(DomainError::InvalidPayload("expected an object".into()));
        };
        if domain == Domain::Task {
            let title = row.get("title").and_then(Value::as_str).unwrap_or("");
            if title.trim().is_empty() {
                return Err(DomainError::InvalidPayload("title is required".into()));
            }
            row.entry("completed").or_insert(json!(false));
            row.entry("priority").or_insert(json!("MEDIUM"));
        }
        if domain == Domain::Category {
            let name = row.get("name").and_then(Value::as_str).unwrap_or("");
            if name.trim().is_empty() {
                return Err(DomainError::InvalidPayload("name is required".into()));
            }
        }
        if domain == Domain::Notification {
            let message = row.get("message").and_then(Value::as_str).unwrap_or("");
            if message.trim().is_empty() {
                return Err(DomainError::InvalidPayload("message is required".into()));
            }
            row.entry("read").or_insert(json!(false));
        }
        if domain == Domain::Timelog && row.get("taskId").is_none() {
            return Err(DomainError::InvalidPayload("taskId is required".into()));
        }
        if domain != Domain::Notification || !row.contains_key("userId") {
            row.insert("userId".into(), json!(actor.user_id));
        }
        Ok(self.insert(domain, Value::Object(row)))
    }

    async fn update(
        &self,
        domain: Domain,
        id: EntityId,
        payload: Value,
        actor: &Identity,
    ) -> DomainResult<Value> {
        let mut row = self.owned(domain, id, actor)?;
        if let (Value::Object(target), Value::Object(patch)) = (&mut row, payload) {
            target.extend(patch);
        }
        self.rows.lock().unwrap().insert((domain.as_str(), id), row.clone());
        Ok(row)
    }

    async fn delete(&self, domain: Domain, id: EntityId, actor: &Identity) -> DomainResult<Value> {
        let row = self.owned(domain, id, actor)?;
        if domain == Domain::Category
            && self.rows_of(Domain::Task).iter().any(|t| t["categoryId"] == json!(id))
        {
            return Err(DomainError::InvalidPayload("category still has tasks".into()));
        }
        self.rows.lock().unwrap().remove(&(domain.as_str(), id));
        Ok(json!({ "id": id, "userId": row["userId"] }))
    }

    async fn create_notification(&self, new: NewNotification) -> DomainResult<Value> {
        let mut row = serde_json::to_value(new)?;
        row["read"] = json!(false);
        Ok(self.insert(Domain::Notification, row))
    }

    async fn mark_all_notifications_read(&self, user_id: UserId) -> DomainResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let mut changed = 0;
        for ((domain, _), row) in rows.iter_mut() {
            if *domain == Domain::Notification.as_str()
                && row["userId"] == json!(user_id)
                && row["read"] != json!(true)
            {
                row["read"] = json!(true);
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete_all_notifications(&self, user_id: UserId) -> DomainResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(domain, _), row| {
            *domain != Domain::Notification.as_str() || row["userId"] != json!(user_id)
        });
        Ok((before - rows.len()) as u64)
    }
}

#[async_trait]
impl DomainQueries for MemoryDomain {
    async fn list_tasks(&self, query: TaskQuery, actor: &Identity) -> DomainResult<TaskList> {
        let visible: Vec<Value> = self
            .rows_of(Domain::Task)
            .into_iter()
            .filter(|t| actor.is_admin() || t["userId"] == json!(actor.user_id))
            .collect();
        let total = visible.len() as i64;
        let tasks = visible
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();
        Ok(TaskList {
            tasks,
            pagination: Pagination::new(query.page(), query.limit(), total),
        })
    }

    async fn get_task(&self, id: EntityId, actor: &Identity) -> DomainResult<Value> {
        self.owned(Domain::Task, id, actor)
    }

    async fn list_notifications(&self, user_id: UserId) -> DomainResult<Vec<Value>> {
        let mut own: Vec<Value> = self
            .rows_of(Domain::Notification)
            .into_iter()
            .filter(|n| n["userId"] == json!(user_id))
            .collect();
        own.reverse();
        Ok(own)
    }

    async fn list_timelogs(&self, query: TimelogQuery, actor: &Identity) -> DomainResult<TimelogList> {
        let user = query.scoped_user(actor);
        let visible: Vec<Value> = self
            .rows_of(Domain::Timelog)
            .into_iter()
            .filter(|t| user.map_or(true, |u| t["userId"] == json!(u)))
            .filter(|t| query.task_id.map_or(true, |id| t["taskId"] == json!(id)))
            .collect();
        let total = visible.len() as i64;
        let timelogs = visible
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();
        Ok(TimelogList {
            timelogs,
            pagination: Pagination::new(query.page(), query.limit(), total),
        })
    }

    async fn get_timelog(&self, id: EntityId, actor: &Identity) -> DomainResult<Value> {
        self.owned(Domain::Timelog, id, actor)
    }

    async fn list_categories(&self, actor: &Identity) -> DomainResult<Vec<Value>> {
        Ok(self
            .rows_of(Domain::Category)
            .into_iter()
            .filter(|c| actor.is_admin() || c["userId"] == json!(actor.user_id))
            .collect())
    }

    async fn get_category(&self, id: EntityId, actor: &Identity) -> DomainResult<Value> {
        self.owned(Domain::Category, id, actor)
    }
}
