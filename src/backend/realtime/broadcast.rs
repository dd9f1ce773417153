/**
 * Realtime Fan-out
 *
 * Delivers one frame to every connection matching a target. Delivery is
 * best effort: a connection whose writer is gone is skipped and cleaned up
 * by its own disconnect path.
 */

use std::collections::HashMap;

use crate::shared::{identity::user_room, ServerFrame, UserId};

use super::connection::{Connection, ConnectionId};

/// Who receives a broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every registered connection
    All,
    /// Connections currently in a room
    Room(String),
    /// Connections in any of these rooms, each reached once
    Rooms(Vec<String>),
    /// One connection only
    Connection(ConnectionId),
}

impl Target {
    /// A user's private room (`user:<id>`)
    pub fn user(user_id: UserId) -> Self {
        Target::Room(user_room(user_id))
    }

    /// Private rooms of several users; duplicates collapse
    pub fn users(user_ids: &[UserId]) -> Self {
        let mut rooms: Vec<String> = user_ids.iter().map(|id| user_room(*id)).collect();
        rooms.sort();
        rooms.dedup();
        match rooms.len() {
            1 => Target::Room(rooms.remove(0)),
            _ => Target::Rooms(rooms),
        }
    }

    fn matches(&self, connection: &Connection) -> bool {
        match self {
            Target::All => true,
            Target::Room(room) => connection.in_room(room),
            Target::Rooms(rooms) => rooms.iter().any(|room| connection.in_room(room)),
            Target::Connection(id) => connection.id == *id,
        }
    }
}

/// Send a frame to every connection matching `target`
///
/// # Returns
///
/// Number of connections the frame was queued for
pub fn broadcast_frame(
    connections: &HashMap<ConnectionId, Connection>,
    target: &Target,
    frame: &ServerFrame,
) -> usize {
    let delivered = connections
        .values()
        .filter(|c| target.matches(c))
        .filter(|c| c.send(frame.clone()))
        .count();

    if delivered > 0 {
        tracing::info!(
            "[Realtime] Event {} broadcast to {} subscribers",
            frame.event,
            delivered
        );
    } else {
        tracing::debug!("[Realtime] No subscribers to receive event {}", frame.event);
    }
    delivered
}
