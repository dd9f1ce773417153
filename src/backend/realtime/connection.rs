/**
 * Realtime Connections
 *
 * A connection is owned by the hub from handshake to disconnect. Outbound
 * frames go through an unbounded channel drained by the socket's writer
 * task; anything else in the process can clone the sender to push to that
 * client.
 */

use std::collections::HashSet;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::{Identity, ServerFrame};

pub use super::presence::ConnectionId;

/// Sender half of a connection's outbound channel
pub type ConnectionSender = mpsc::UnboundedSender<ServerFrame>;

/// Receiver half, drained by the socket writer
pub type ConnectionReceiver = mpsc::UnboundedReceiver<ServerFrame>;

/// Whether the hub still holds a connection
///
/// The handshake happens before the hub sees a connection, so a registered
/// connection is always `Joined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Joined,
    Disconnected,
}

#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: Identity,
    pub rooms: HashSet<String>,
    sender: ConnectionSender,
}

impl Connection {
    /// New connection joined to its private room
    pub fn new(identity: Identity, sender: ConnectionSender) -> Self {
        let mut rooms = HashSet::new();
        rooms.insert(identity.private_room());
        Self {
            id: Uuid::new_v4(),
            identity,
            rooms,
            sender,
        }
    }

    pub fn in_room(&self, room: &str) -> bool {
        self.rooms.contains(room)
    }

    /// Queue a frame; `false` when the client side is gone
    pub fn send(&self, frame: ServerFrame) -> bool {
        self.sender.send(frame).is_ok()
    }

    /// Rooms in a stable order, for the `connected` greeting
    pub fn sorted_rooms(&self) -> Vec<String> {
        let mut rooms: Vec<String> = self.rooms.iter().cloned().collect();
        rooms.sort();
        rooms
    }
}

/// Create the outbound channel for one connection
pub fn channel() -> (ConnectionSender, ConnectionReceiver) {
    mpsc::unbounded_channel()
}
