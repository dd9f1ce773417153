//! Common test utilities and helpers
//!
//! - In-memory fakes of the store collaborators
//! - App and token fixtures

#[cfg(feature = "ssr")]
pub mod fakes;

#[cfg(feature = "ssr")]
pub use fakes::*;
#[cfg(feature = "ssr")]
pub use fixtures::*;
