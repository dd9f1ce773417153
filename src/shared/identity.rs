/**
 * Identity Types
 *
 * The authenticated principal carried inside access tokens and attached to
 * REST requests and realtime connections.
 */
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::SharedError;

/// Primary key of a user row
pub type UserId = i32;

/// Role granted to a user. Serialized as `USER` / `ADMIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(SharedError::validation(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// Authenticated principal
///
/// The role is fixed for the lifetime of the token it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
    /// Unix seconds at which the token carrying this identity was issued
    pub issued_at: i64,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            issued_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Name of the private realtime room of this user
    pub fn private_room(&self) -> String {
        user_room(self.user_id)
    }
}

/// Private room name for a user id (`user:<id>`)
pub fn user_room(user_id: UserId) -> String {
    format!("user:{}", user_id)
}
