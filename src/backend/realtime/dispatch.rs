/**
 * Realtime Dispatch Table
 *
 * Maps an inbound frame to a `Command`. Parsing is pure: the hub performs
 * every side effect after the command is known.
 *
 * # Events
 *
 * - `joinRoom` / `leaveRoom` with a room name (or `{roomId}`)
 * - `sync:events` with the last seen timestamp in ms (or `{since}`)
 * - `<domain>:create|update|delete` for task, file, timelog, user and
 *   notification (categories are REST-only)
 * - aliases: `file:upload`, `timelog:start`, `timelog:stop`,
 *   `notification:read`
 *
 * Also home of the post-event notification hook, `notification_for`.
 */

use serde_json::{json, Value};

use crate::backend::domain::{EntityId, NewNotification};
use crate::shared::{frame, Domain, DomainEvent, Identity, Mutation, ServerFrame};

pub const JOIN_ROOM: &str = "joinRoom";
pub const LEAVE_ROOM: &str = "leaveRoom";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    JoinRoom(String),
    LeaveRoom(String),
    /// Replay everything strictly after this timestamp
    Sync(i64),
    Create {
        domain: Domain,
        payload: Value,
    },
    Update {
        domain: Domain,
        id: EntityId,
        payload: Value,
    },
    Delete {
        domain: Domain,
        id: EntityId,
    },
}

/// Rejected frame, answered to the requester only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchError {
    /// Event name of the reply (`task:error` or `error`)
    pub event: String,
    pub message: String,
}

impl DispatchError {
    fn general(message: impl Into<String>) -> Self {
        Self {
            event: frame::ERROR.to_string(),
            message: message.into(),
        }
    }

    fn scoped(domain: Domain, message: impl Into<String>) -> Self {
        Self {
            event: domain.error_event(),
            message: message.into(),
        }
    }

    pub fn into_frame(self) -> ServerFrame {
        ServerFrame::error(self.event, self.message)
    }
}

/// Resolve client aliases to their canonical mutation
fn resolve(domain: Domain, verb: &str) -> Option<Mutation> {
    match (domain, verb) {
        (_, "create") => Some(Mutation::Create),
        (_, "update") => Some(Mutation::Update),
        (_, "delete") => Some(Mutation::Delete),
        (Domain::File, "upload") => Some(Mutation::Create),
        (Domain::Timelog, "start") => Some(Mutation::Create),
        (Domain::Timelog, "stop") => Some(Mutation::Update),
        (Domain::Notification, "read") => Some(Mutation::Update),
        _ => None,
    }
}

/// Parse one inbound frame
pub fn parse(event: &str, data: Value) -> Result<Command, DispatchError> {
    match event {
        JOIN_ROOM => room_name(&data)
            .map(Command::JoinRoom)
            .ok_or_else(|| DispatchError::general("joinRoom expects a room name")),
        LEAVE_ROOM => room_name(&data)
            .map(Command::LeaveRoom)
            .ok_or_else(|| DispatchError::general("leaveRoom expects a room name")),
        frame::SYNC_EVENTS => since(&data)
            .map(Command::Sync)
            .ok_or_else(|| DispatchError::general("sync:events expects a timestamp")),
        _ => parse_domain(event, data),
    }
}

fn parse_domain(event: &str, data: Value) -> Result<Command, DispatchError> {
    let (prefix, verb) = event
        .split_once(':')
        .ok_or_else(|| DispatchError::general(format!("Unknown event '{}'", event)))?;
    let domain: Domain = prefix
        .parse()
        .map_err(|_| DispatchError::general(format!("Unknown event '{}'", event)))?;
    if !domain.accepts_commands() {
        return Err(DispatchError::general(format!("Unknown event '{}'", event)));
    }
    let mutation = resolve(domain, verb)
        .ok_or_else(|| DispatchError::scoped(domain, format!("Unknown event '{}'", event)))?;

    match mutation {
        Mutation::Create => {
            if !data.is_object() {
                return Err(DispatchError::scoped(domain, "Payload must be an object"));
            }
            Ok(Command::Create {
                domain,
                payload: data,
            })
        }
        Mutation::Update => {
            let id = entity_id(domain, &data)
                .ok_or_else(|| DispatchError::scoped(domain, "Payload is missing an id"))?;
            Ok(Command::Update {
                domain,
                id,
                payload: strip_ids(domain, data),
            })
        }
        Mutation::Delete => {
            let id = entity_id(domain, &data)
                .ok_or_else(|| DispatchError::scoped(domain, "Payload is missing an id"))?;
            Ok(Command::Delete { domain, id })
        }
    }
}

fn room_name(data: &Value) -> Option<String> {
    let name = match data {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("roomId")?.as_str()?,
        _ => return None,
    };
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// `null` means "from the beginning"
fn since(data: &Value) -> Option<i64> {
    match data {
        Value::Null => Some(0),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::Object(map) => match map.get("since").or_else(|| map.get("lastTimestamp")) {
            None | Some(Value::Null) => Some(0),
            Some(v) => since(v),
        },
        _ => None,
    }
}

/// Bare id, `{id}`, or the domain-specific key (`{notificationId}`)
fn entity_id(domain: Domain, data: &Value) -> Option<EntityId> {
    let raw = match data {
        Value::Number(_) | Value::String(_) => data,
        Value::Object(map) => map
            .get("id")
            .or_else(|| map.get(&format!("{}Id", domain.as_str())))?,
        _ => return None,
    };
    match raw {
        Value::Number(n) => n.as_i64().and_then(|n| EntityId::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Drop the addressing keys; foreign keys such as `taskId` on a timelog stay
fn strip_ids(domain: Domain, data: Value) -> Value {
    match data {
        Value::Object(mut map) => {
            map.remove("id");
            map.remove(&format!("{}Id", domain.as_str()));
            Value::Object(map)
        }
        _ => json!({}),
    }
}

/// Post-event hook: the notification created for the acting user
///
/// Not fired for notification events themselves.
pub fn notification_for(event: &DomainEvent, actor: &Identity) -> Option<NewNotification> {
    let domain = event.event_type.domain;
    if domain == Domain::Notification {
        return None;
    }

    let action = event.event_type.action.as_str();
    let noun = capitalize(domain.as_str());
    let label = match domain {
        Domain::Task => event.payload.get("title"),
        Domain::File => event.payload.get("originalName"),
        Domain::User | Domain::Category => event.payload.get("name"),
        _ => None,
    }
    .and_then(Value::as_str);

    let message = match (label, event.payload.get("id")) {
        (Some(label), _) => format!("{} {}: {}", noun, action, label),
        (None, Some(id)) => format!("{} {} (ID: {})", noun, action, id),
        (None, None) => format!("{} {}", noun, action),
    };

    Some(NewNotification {
        user_id: actor.user_id,
        kind: format!(
            "{}_{}",
            domain.as_str().to_uppercase(),
            action.to_uppercase()
        ),
        title: format!("{} {}", noun, action),
        message,
        meta: event.payload.clone(),
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
