/**
 * Categories
 *
 * Per-user labels that tasks can point at. Names are unique per owner. A
 * category that still has tasks cannot be deleted.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{DomainError, DomainResult, EntityId};
use crate::shared::{Identity, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub id: EntityId,
    pub name: String,
    pub color: Option<String>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub task_count: i64,
}

// `task_count` is computed, so every read goes through this projection.
const CATEGORY_SELECT: &str = r#"
    SELECT c.id, c.name, c.color, c.user_id, c.created_at,
           (SELECT COUNT(*) FROM tasks t WHERE t.category_id = c.id) AS task_count
    FROM categories c
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

fn check_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidPayload("name is required".into()));
    }
    Ok(())
}

pub(super) async fn find(pool: &PgPool, id: EntityId) -> DomainResult<Option<CategoryRow>> {
    let row = sqlx::query_as::<_, CategoryRow>(&format!("{} WHERE c.id = $1", CATEGORY_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Own categories by name; admins see everyone's
pub(super) async fn list(pool: &PgPool, actor: &Identity) -> DomainResult<Vec<CategoryRow>> {
    let rows = if actor.is_admin() {
        sqlx::query_as::<_, CategoryRow>(&format!("{} ORDER BY c.name, c.id", CATEGORY_SELECT))
            .fetch_all(pool)
            .await?
    } else {
        sqlx::query_as::<_, CategoryRow>(&format!(
            "{} WHERE c.user_id = $1 ORDER BY c.name, c.id",
            CATEGORY_SELECT
        ))
        .bind(actor.user_id)
        .fetch_all(pool)
        .await?
    };
    Ok(rows)
}

pub(super) async fn insert(pool: &PgPool, input: NewCategory, owner: UserId) -> DomainResult<CategoryRow> {
    check_name(&input.name)?;
    let id = sqlx::query_scalar::<_, EntityId>(
        "INSERT INTO categories (name, color, user_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(input.name.trim())
    .bind(input.color)
    .bind(owner)
    .fetch_one(pool)
    .await?;
    reload(pool, id).await
}

pub(super) async fn update(pool: &PgPool, id: EntityId, patch: CategoryPatch) -> DomainResult<CategoryRow> {
    if let Some(name) = &patch.name {
        check_name(name)?;
    }
    sqlx::query(
        "UPDATE categories SET name = COALESCE($2, name), color = COALESCE($3, color) WHERE id = $1",
    )
    .bind(id)
    .bind(patch.name.map(|n| n.trim().to_string()))
    .bind(patch.color)
    .execute(pool)
    .await?;
    reload(pool, id).await
}

async fn reload(pool: &PgPool, id: EntityId) -> DomainResult<CategoryRow> {
    find(pool, id)
        .await?
        .ok_or_else(|| DomainError::not_found(crate::shared::Domain::Category, id))
}

pub(super) async fn delete(pool: &PgPool, id: EntityId) -> DomainResult<()> {
    let tasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE category_id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if tasks > 0 {
        return Err(DomainError::InvalidPayload(format!(
            "category still has {} tasks",
            tasks
        )));
    }
    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
