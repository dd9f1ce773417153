//! Backend Error Module
//!
//! Error taxonomy of the server and its HTTP rendering.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions and status mapping
//! └── conversion.rs - IntoResponse and development-mode details
//! ```
//!
//! Realtime handlers never turn these into responses; the hub renders the
//! message into a scoped `<domain>:error` event instead.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use conversion::{development_mode, set_development_mode};
pub use types::BackendError;

/// Result alias used across the backend
pub type BackendResult<T> = Result<T, BackendError>;
