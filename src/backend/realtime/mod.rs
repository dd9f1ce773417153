//! Real-time Module
//!
//! WebSocket realtime layer: authenticated connections, per-user rooms,
//! presence and a bounded replay buffer for clients that reconnect.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── history.rs      - Event History Buffer (bounded, replayable)
//! ├── presence.rs     - user → connections registry
//! ├── connection.rs   - Connection record and outbound channel
//! ├── broadcast.rs    - Fan-out to all / a room / one connection
//! ├── dispatch.rs     - Inbound event table and notification hook
//! ├── hub.rs          - RealtimeHub (lifecycle, rooms, publish)
//! └── socket.rs       - axum WebSocket endpoint
//! ```
//!
//! # Events
//!
//! Client → server: `joinRoom`, `leaveRoom`, `sync:events`,
//! `<domain>:create|update|delete` and their aliases.
//!
//! Server → client: `connected`, `<domain>:created|updated|deleted`,
//! `<domain>:error`, `notification:new`, `user:statusChanged`,
//! `sync:events`, `error`.

pub mod broadcast;
pub mod connection;
pub mod dispatch;
pub mod history;
pub mod hub;
pub mod presence;
pub mod socket;

pub use broadcast::{broadcast_frame, Target};
pub use connection::{ConnectionId, ConnectionState};
pub use history::EventHistory;
pub use hub::RealtimeHub;
pub use presence::PresenceRegistry;
pub use socket::socket_handler;
