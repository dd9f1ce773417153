//! Route Configuration Module
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, /health, /socket, layers
//! └── api_routes.rs   - /api endpoints and their auth layers
//! ```
//!
//! # Route Types
//!
//! ## Public
//!
//! - `GET /health` - Liveness and online user count
//! - `POST /api/auth/register`, `POST /api/auth/login`, `POST /api/auth/refresh`
//! - `GET /socket?token=...` - WebSocket (token checked in the handshake)
//!
//! ## Bearer token
//!
//! - `GET /api/auth/me`, `PUT /api/auth/change-password`
//! - `/api/tasks`, `/api/tasks/{id}`
//! - `GET /api/notifications`, `PATCH /api/notifications/{id}/read`
//!
//! ## Bearer token + ADMIN
//!
//! - `GET /api/users`, `DELETE /api/users/{id}`

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
