/**
 * Tasks
 *
 * Task rows, the typed create/update inputs accepted from clients and the
 * paginated listing used by `GET /api/tasks`. `Pagination` is shared with
 * the timelog listing.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{DomainError, DomainResult, EntityId};
use crate::shared::{Identity, UserId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub time_spent: i32,
    pub category_id: Option<EntityId>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const TASK_COLUMNS: &str = "id, title, description, priority, completed, due_date, time_spent, \
                            category_id, user_id, created_at, updated_at";

/// Body of `task:create` / `POST /api/tasks`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category_id: Option<EntityId>,
}

impl NewTask {
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::InvalidPayload("title is required".into()));
        }
        Ok(())
    }
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
    pub time_spent: Option<i32>,
    pub category_id: Option<EntityId>,
}

impl TaskPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            return Err(DomainError::InvalidPayload("title cannot be empty".into()));
        }
        if matches!(self.time_spent, Some(t) if t < 0) {
            return Err(DomainError::InvalidPayload("timeSpent cannot be negative".into()));
        }
        Ok(())
    }
}

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query string of `GET /api/tasks`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub category_id: Option<EntityId>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl TaskQuery {
    pub fn page(&self) -> i64 {
        Pagination::page_of(self.page)
    }

    pub fn limit(&self) -> i64 {
        Pagination::limit_of(self.limit)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Whitelisted sort column; unknown names fall back to `created_at`
    pub fn sort_column(&self) -> &'static str {
        match self.sort_by.as_deref() {
            Some("title") => "title",
            Some("priority") => "priority",
            Some("dueDate") => "due_date",
            Some("updatedAt") => "updated_at",
            Some("completed") => "completed",
            _ => "created_at",
        }
    }

    pub fn sort_order(&self) -> &'static str {
        match self.order.as_deref() {
            Some(o) if o.eq_ignore_ascii_case("asc") => "ASC",
            _ => "DESC",
        }
    }

    fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    /// Requested page, 1-based
    pub fn page_of(page: Option<i64>) -> i64 {
        page.unwrap_or(1).max(1)
    }

    pub fn limit_of(limit: Option<i64>) -> i64 {
        limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskList {
    pub tasks: Vec<serde_json::Value>,
    pub pagination: Pagination,
}

// Non-admins only ever see their own tasks.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &TaskQuery, actor: &Identity) {
    builder.push(" WHERE TRUE");
    if !actor.is_admin() {
        builder.push(" AND user_id = ").push_bind(actor.user_id);
    }
    if let Some(pattern) = query.search_pattern() {
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category_id) = query.category_id {
        builder.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(priority) = query.priority {
        builder.push(" AND priority = ").push_bind(priority.as_str());
    }
    if let Some(completed) = query.completed {
        builder.push(" AND completed = ").push_bind(completed);
    }
}

pub(super) async fn list(
    pool: &PgPool,
    query: &TaskQuery,
    actor: &Identity,
) -> DomainResult<TaskList> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
    push_filters(&mut count, query, actor);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM tasks", TASK_COLUMNS));
    push_filters(&mut select, query, actor);
    select
        .push(format!(
            " ORDER BY {} {}, id {}",
            query.sort_column(),
            query.sort_order(),
            query.sort_order()
        ))
        .push(" LIMIT ")
        .push_bind(query.limit())
        .push(" OFFSET ")
        .push_bind(query.offset());

    let rows: Vec<TaskRow> = select.build_query_as().fetch_all(pool).await?;
    let tasks = rows
        .into_iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TaskList {
        tasks,
        pagination: Pagination::new(query.page(), query.limit(), total),
    })
}

pub(super) async fn find(pool: &PgPool, id: EntityId) -> DomainResult<Option<TaskRow>> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {} FROM tasks WHERE id = $1",
        TASK_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub(super) async fn insert(pool: &PgPool, input: NewTask, owner: UserId) -> DomainResult<TaskRow> {
    input.validate()?;
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        r#"
        INSERT INTO tasks (title, description, priority, due_date, category_id, user_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}
        "#,
        TASK_COLUMNS
    ))
    .bind(input.title.trim())
    .bind(input.description)
    .bind(input.priority.as_str())
    .bind(input.due_date)
    .bind(input.category_id)
    .bind(owner)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub(super) async fn update(pool: &PgPool, id: EntityId, patch: TaskPatch) -> DomainResult<TaskRow> {
    patch.validate()?;
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        r#"
        UPDATE tasks SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            priority = COALESCE($4, priority),
            due_date = COALESCE($5, due_date),
            completed = COALESCE($6, completed),
            time_spent = COALESCE($7, time_spent),
            category_id = COALESCE($8, category_id),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        TASK_COLUMNS
    ))
    .bind(id)
    .bind(patch.title.map(|t| t.trim().to_string()))
    .bind(patch.description)
    .bind(patch.priority.map(|p| p.as_str()))
    .bind(patch.due_date)
    .bind(patch.completed)
    .bind(patch.time_spent)
    .bind(patch.category_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub(super) async fn delete(pool: &PgPool, id: EntityId) -> DomainResult<()> {
    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
