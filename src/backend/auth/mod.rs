//! Authentication Module
//!
//! Token issuing and verification, password hashing, the user repository and
//! the `/api/auth` handlers.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── tokens.rs       - Access/refresh JWTs (TokenService)
//! ├── password.rs     - bcrypt hashing and password rules
//! ├── users.rs        - User model, CredentialStore, PgCredentialStore
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Register / Login**: credentials checked → access + refresh token pair
//! 2. **Requests**: access token verified by `auth_middleware` (no store I/O)
//! 3. **Refresh**: refresh token verified → user re-read → new pair
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt (cost 10)
//! - Access and refresh tokens are signed with different secrets and carry
//!   a `typ` claim, so one class never passes as the other
//! - Invalid credentials return 401 without saying which part was wrong

pub mod tokens;

pub mod password;

pub mod users;

pub mod handlers;

pub use handlers::{change_password, get_me, login, refresh, register};
pub use tokens::{TokenError, TokenPair, TokenService};
pub use users::{CredentialStore, PgCredentialStore, User, UserResponse};
