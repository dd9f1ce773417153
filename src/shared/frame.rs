/**
 * Realtime Frames
 *
 * Envelope for every message exchanged over the realtime socket, in both
 * directions:
 *
 * ```json
 * {"event": "task:create", "data": {"title": "X"}}
 * ```
 */
use serde::{Deserialize, Serialize};

use crate::shared::event::DomainEvent;
use crate::shared::identity::UserId;

/// Presence broadcast sent on online/offline transitions
pub const STATUS_CHANGED: &str = "user:statusChanged";
/// Replay request and its answer
pub const SYNC_EVENTS: &str = "sync:events";
/// Notification pushed to the owner's private room
pub const NOTIFICATION_NEW: &str = "notification:new";
/// Sent once after the connection joined its private room
pub const CONNECTED: &str = "connected";
/// Generic error for non-domain requests
pub const ERROR: &str = "error";

/// Frame received from a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ClientFrame {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Frame sent to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerFrame {
    pub event: String,
    pub data: serde_json::Value,
}

impl ServerFrame {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Broadcast form of a recorded domain event
    pub fn domain(event: &DomainEvent) -> Self {
        Self::new(event.name(), event.payload.clone())
    }

    /// Scoped error sent to the originating connection only
    pub fn error(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(event, serde_json::json!({ "message": message.into() }))
    }

    pub fn status_changed(user_id: UserId, online: bool) -> Self {
        Self::new(
            STATUS_CHANGED,
            serde_json::json!({ "userId": user_id, "online": online }),
        )
    }

    pub fn sync(events: &[DomainEvent]) -> Self {
        Self::new(
            SYNC_EVENTS,
            serde_json::to_value(events).unwrap_or_else(|_| serde_json::json!([])),
        )
    }
}
