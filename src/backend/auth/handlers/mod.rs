//! Authentication Handlers Module
//!
//! HTTP handlers for the `/api/auth` endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request and response types
//! ├── register.rs - User registration
//! ├── login.rs    - Credential check, token pair
//! ├── refresh.rs  - Refresh token rotation
//! └── me.rs       - Current user, password change
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /api/auth/register
//! - **`login`** - POST /api/auth/login
//! - **`refresh`** - POST /api/auth/refresh
//! - **`get_me`** - GET /api/auth/me (bearer)
//! - **`change_password`** - PUT /api/auth/change-password (bearer)

pub mod types;

pub mod register;

pub mod login;

pub mod refresh;

pub mod me;

pub use types::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest};

pub use login::login;
pub use me::{change_password, get_me};
pub use refresh::refresh;
pub use register::register;
