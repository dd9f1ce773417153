/**
 * User Model and Credential Store
 *
 * The credential store is the user repository consulted by the login,
 * registration and refresh flows. Request authentication never touches it.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::backend::error::{BackendError, BackendResult};
use crate::shared::{Identity, Role, UserId};

/// User as stored, including the password hash
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.role)
    }

    pub fn public(&self) -> UserResponse {
        UserResponse::from(self)
    }
}

/// User without sensitive data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Data for a user about to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

/// Admin edit of a user's profile; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = BackendError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role: row.role.parse()?,
            created_at: row.created_at,
        })
    }
}

/// User repository used by the auth flows
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> BackendResult<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> BackendResult<Option<User>>;

    /// Insert a user; `Conflict` when the e-mail is taken
    async fn create_user(&self, user: NewUser) -> BackendResult<User>;

    async fn update_password(&self, id: UserId, password_hash: String) -> BackendResult<()>;

    /// Apply a profile edit; `NotFound` when absent, `Conflict` when the e-mail is taken
    async fn update_user(&self, id: UserId, update: UserUpdate) -> BackendResult<User>;

    async fn list_users(&self) -> BackendResult<Vec<User>>;

    /// Remove a user; `NotFound` when absent
    async fn delete_user(&self, id: UserId) -> BackendResult<()>;
}

const USER_COLUMNS: &str = "id, email, name, password_hash, role, created_at";

/// PostgreSQL-backed credential store
///
/// Holds an optional pool: without a database every call fails with
/// `Unavailable` and the server keeps running.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: Option<PgPool>,
}

impl PgCredentialStore {
    pub fn new(pool: Option<PgPool>) -> Self {
        Self { pool }
    }

    fn pool(&self) -> BackendResult<&PgPool> {
        self.pool.as_ref().ok_or_else(|| {
            tracing::error!("[Auth] Database not configured");
            BackendError::unavailable("Database not configured")
        })
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> BackendResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.pool()?)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> BackendResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool()?)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn create_user(&self, user: NewUser) -> BackendResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, name, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(Utc::now())
        .fetch_one(self.pool()?)
        .await
        .map_err(|e| match BackendError::from(e) {
            BackendError::Conflict { .. } => {
                BackendError::conflict("A user with this email already exists")
            }
            other => other,
        })?;

        User::try_from(row)
    }

    async fn update_password(&self, id: UserId, password_hash: String) -> BackendResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool()?)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BackendError::not_found("User not found"));
        }
        Ok(())
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> BackendResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                name = COALESCE($3, name),
                role = COALESCE($4, role)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(update.email)
        .bind(update.name)
        .bind(update.role.map(|r| r.as_str()))
        .fetch_optional(self.pool()?)
        .await
        .map_err(|e| match BackendError::from(e) {
            BackendError::Conflict { .. } => {
                BackendError::conflict("A user with this email already exists")
            }
            other => other,
        })?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

        User::try_from(row)
    }

    async fn list_users(&self) -> BackendResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(self.pool()?)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn delete_user(&self, id: UserId) -> BackendResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool()?)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BackendError::not_found("User not found"));
        }
        Ok(())
    }
}
