//! Backend Module
//!
//! Server-side code of TimePlanner: an Axum HTTP server with token
//! authentication, the task/timelog/file/notification domain on PostgreSQL,
//! and a WebSocket realtime layer mirroring every mutation to connected
//! clients.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, startup
//! - **`routes`** - Router assembly and auth layers
//! - **`auth`** - Tokens, passwords, user store, `/api/auth` handlers
//! - **`middleware`** - Bearer authentication and role guard
//! - **`domain`** - Entity persistence behind `DomainHandlers`/`DomainQueries`
//! - **`api`** - REST handlers for the domain
//! - **`realtime`** - WebSocket hub, rooms, presence, event history
//! - **`error`** - Backend error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! ├── domain/         - Persistence and business rules
//! ├── api/            - REST handlers
//! ├── realtime/       - WebSocket hub
//! └── error/          - Error types
//! ```
//!
//! # Thread Safety
//!
//! - Collaborators are `Arc<dyn Trait>` with `Send + Sync` bounds
//! - The hub keeps its state behind one `std::sync::Mutex`, never held
//!   across an `.await`
//! - Each socket has its own unbounded outbound channel and writer task
//!
//! # Error Handling
//!
//! - `BackendError` renders as `{error}` with the mapped status code
//! - Domain failures over the socket become `<domain>:error` frames sent to
//!   the requester only

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Entity persistence and business rules
pub mod domain;

/// REST handlers for the domain
pub mod api;

/// Real-time update system
pub mod realtime;

pub use error::BackendError;
pub use realtime::RealtimeHub;
pub use server::create_app;
