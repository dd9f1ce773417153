//! Shared Module
//!
//! Types shared by the REST layer, the realtime layer and clients written
//! against this crate. Everything here is plain data with serde support and
//! does not depend on the server stack.

/// Authenticated identity and roles
pub mod identity;

/// Domain events recorded and broadcast after mutations
pub mod event;

/// Realtime frame envelope
pub mod frame;

/// Shared error types
pub mod error;

pub use error::SharedError;
pub use event::{Action, Domain, DomainEvent, EventType, Mutation};
pub use frame::{ClientFrame, ServerFrame};
pub use identity::{Identity, Role, UserId};
