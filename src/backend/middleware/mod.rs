//! Middleware Module
//!
//! Request gates shared by every protected route:
//!
//! - **`auth`** - bearer token extraction and verification, `AuthUser`
//!   extractor, handshake check for realtime connections
//! - **`authorize`** - role-based guard layered after `auth`
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//!
//! let admin_routes = Router::new()
//!     .route("/api/users", get(list_users))
//!     .route_layer(from_fn_with_state(AllowedRoles::only(Role::Admin), require_roles))
//!     .route_layer(from_fn_with_state(state.clone(), auth_middleware));
//! ```

pub mod auth;

pub mod authorize;

pub use auth::{auth_middleware, authenticate_handshake, extract_bearer, AuthUser};
pub use authorize::{authorize, require_roles, AllowedRoles};
