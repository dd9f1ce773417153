//! TimePlanner - Main Library
//!
//! Backend of a personal time-planning application: tasks with priorities
//! and due dates, time logs, file attachments and notifications, exposed
//! over a REST API and mirrored in real time over WebSockets.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared with clients
//!   - Identity and roles, domain event names, wire frames
//!   - Error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server, auth, PostgreSQL persistence
//!   - Realtime hub with presence, rooms and event replay
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the backend modules and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use timeplanner::backend::server::{config::ServerConfig, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for protocol and validation failures
//! - `backend::error::BackendError` for everything rendered over HTTP

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
