//! File metadata. The bytes live elsewhere; only the record is stored here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{DomainError, DomainResult, EntityId};
use crate::shared::UserId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileRow {
    pub id: EntityId,
    pub filename: String,
    pub original_name: String,
    pub mimetype: String,
    pub size: i64,
    pub path: String,
    pub uploaded_by: UserId,
    pub task_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
}

const FILE_COLUMNS: &str =
    "id, filename, original_name, mimetype, size, path, uploaded_by, task_id, created_at";

/// Body of `file:create` (alias `file:upload`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile {
    pub filename: String,
    pub original_name: String,
    pub mimetype: String,
    pub size: i64,
    pub path: String,
    #[serde(default)]
    pub task_id: Option<EntityId>,
}

impl NewFile {
    pub fn validate(&self) -> DomainResult<()> {
        if self.filename.trim().is_empty() || self.path.trim().is_empty() {
            return Err(DomainError::InvalidPayload("filename and path are required".into()));
        }
        if self.size < 0 {
            return Err(DomainError::InvalidPayload("size cannot be negative".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePatch {
    pub original_name: Option<String>,
    pub task_id: Option<EntityId>,
}

pub(super) async fn owner_of(pool: &PgPool, id: EntityId) -> DomainResult<Option<UserId>> {
    let owner = sqlx::query_scalar::<_, UserId>("SELECT uploaded_by FROM files WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(owner)
}

pub(super) async fn insert(pool: &PgPool, input: NewFile, owner: UserId) -> DomainResult<FileRow> {
    input.validate()?;
    let row = sqlx::query_as::<_, FileRow>(&format!(
        r#"
        INSERT INTO files (filename, original_name, mimetype, size, path, uploaded_by, task_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}
        "#,
        FILE_COLUMNS
    ))
    .bind(input.filename)
    .bind(input.original_name)
    .bind(input.mimetype)
    .bind(input.size)
    .bind(input.path)
    .bind(owner)
    .bind(input.task_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub(super) async fn update(pool: &PgPool, id: EntityId, patch: FilePatch) -> DomainResult<FileRow> {
    let row = sqlx::query_as::<_, FileRow>(&format!(
        r#"
        UPDATE files SET
            original_name = COALESCE($2, original_name),
            task_id = COALESCE($3, task_id)
        WHERE id = $1
        RETURNING {}
        "#,
        FILE_COLUMNS
    ))
    .bind(id)
    .bind(patch.original_name)
    .bind(patch.task_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub(super) async fn delete(pool: &PgPool, id: EntityId) -> DomainResult<()> {
    sqlx::query("DELETE FROM files WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
