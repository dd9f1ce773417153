//! User administration over the realtime channel (`user:create|update|delete`).
//!
//! Creating and deleting users is reserved to admins. A user may edit their
//! own profile; only an admin may change a role.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use super::{DomainError, DomainResult, EntityId};
use crate::backend::auth::password::{hash_password, validate_new_password};
use crate::backend::auth::users::UserResponse;
use crate::shared::{Domain, Identity, Role, UserId};

#[derive(Debug, sqlx::FromRow)]
struct PublicUserRow {
    id: UserId,
    email: String,
    name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PublicUserRow> for UserResponse {
    type Error = DomainError;

    fn try_from(row: PublicUserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e: crate::shared::SharedError| DomainError::InvalidPayload(e.to_string()))?;
        Ok(UserResponse {
            id: row.id,
            email: row.email,
            name: row.name,
            role,
            created_at: row.created_at,
        })
    }
}

const PUBLIC_COLUMNS: &str = "id, email, name, role, created_at";

#[derive(Debug, Clone, Deserialize)]
pub struct NewUserInput {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
}

pub(super) fn ensure_admin(actor: &Identity) -> DomainResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden(Domain::User.to_string()))
    }
}

/// Self-service edits are allowed; role changes need an admin
pub(super) fn check_patch(id: EntityId, patch: &UserPatch, actor: &Identity) -> DomainResult<()> {
    if patch.role.is_some() || id != actor.user_id {
        ensure_admin(actor)?;
    }
    if matches!(&patch.email, Some(e) if !e.contains('@')) {
        return Err(DomainError::InvalidPayload("email is invalid".into()));
    }
    Ok(())
}

pub(super) async fn insert(pool: &PgPool, input: NewUserInput) -> DomainResult<UserResponse> {
    if !input.email.contains('@') || input.name.trim().is_empty() {
        return Err(DomainError::InvalidPayload("email and name are required".into()));
    }
    validate_new_password(&input.password)?;
    let password_hash = hash_password(&input.password)?;

    let row = sqlx::query_as::<_, PublicUserRow>(&format!(
        r#"
        INSERT INTO users (email, name, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        PUBLIC_COLUMNS
    ))
    .bind(input.email.trim().to_lowercase())
    .bind(input.name.trim())
    .bind(password_hash)
    .bind(input.role.as_str())
    .fetch_one(pool)
    .await?;
    row.try_into()
}

pub(super) async fn update(pool: &PgPool, id: EntityId, patch: UserPatch) -> DomainResult<UserResponse> {
    let row = sqlx::query_as::<_, PublicUserRow>(&format!(
        r#"
        UPDATE users SET
            email = COALESCE($2, email),
            name = COALESCE($3, name),
            role = COALESCE($4, role)
        WHERE id = $1
        RETURNING {}
        "#,
        PUBLIC_COLUMNS
    ))
    .bind(id)
    .bind(patch.email.map(|e| e.trim().to_lowercase()))
    .bind(patch.name)
    .bind(patch.role.map(|r| r.as_str()))
    .fetch_one(pool)
    .await?;
    row.try_into()
}

pub(super) async fn delete(pool: &PgPool, id: EntityId) -> DomainResult<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DomainError::not_found(Domain::User, id));
    }
    Ok(())
}
