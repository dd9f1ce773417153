/**
 * Domain Event Types
 *
 * A domain event is the typed record of a completed mutation. It is used for
 * realtime broadcast and for replay to clients catching up after a
 * disconnect.
 *
 * Event names follow `<domain>:<action>`, e.g. `task:created` or
 * `file:deleted`. Inbound realtime requests use the imperative form
 * (`task:create`); the event produced on success uses the past tense.
 */
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::SharedError;

/// Entity family a domain event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Task,
    File,
    Timelog,
    User,
    Notification,
    Category,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Task,
        Domain::File,
        Domain::Timelog,
        Domain::User,
        Domain::Notification,
        Domain::Category,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Task => "task",
            Domain::File => "file",
            Domain::Timelog => "timelog",
            Domain::User => "user",
            Domain::Notification => "notification",
            Domain::Category => "category",
        }
    }

    /// Whether clients may mutate this domain over the realtime channel
    ///
    /// Categories are managed over REST only; their events are still
    /// broadcast and recorded.
    pub fn accepts_commands(&self) -> bool {
        !matches!(self, Domain::Category)
    }

    /// Name of the scoped error event for this domain (`task:error`)
    pub fn error_event(&self) -> String {
        format!("{}:error", self.as_str())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| SharedError::protocol(format!("unknown domain '{}'", s)))
    }
}

/// Requested mutation (imperative, inbound)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    Create,
    Update,
    Delete,
}

impl Mutation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mutation::Create => "create",
            Mutation::Update => "update",
            Mutation::Delete => "delete",
        }
    }

    /// Past-tense action recorded once the mutation succeeded
    pub fn completed(&self) -> Action {
        match self {
            Mutation::Create => Action::Created,
            Mutation::Update => Action::Updated,
            Mutation::Delete => Action::Deleted,
        }
    }
}

/// Completed mutation (past tense, outbound)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Created,
    Updated,
    Deleted,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
        }
    }
}

/// Tag of a domain event, rendered as `<domain>:<action>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EventType {
    pub domain: Domain,
    pub action: Action,
}

impl EventType {
    pub fn new(domain: Domain, action: Action) -> Self {
        Self { domain, action }
    }

    pub fn created(domain: Domain) -> Self {
        Self::new(domain, Action::Created)
    }

    pub fn updated(domain: Domain) -> Self {
        Self::new(domain, Action::Updated)
    }

    pub fn deleted(domain: Domain) -> Self {
        Self::new(domain, Action::Deleted)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain.as_str(), self.action.as_str())
    }
}

impl FromStr for EventType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (domain, action) = s
            .split_once(':')
            .ok_or_else(|| SharedError::protocol(format!("malformed event type '{}'", s)))?;
        let action = match action {
            "created" => Action::Created,
            "updated" => Action::Updated,
            "deleted" => Action::Deleted,
            other => {
                return Err(SharedError::protocol(format!("unknown action '{}'", other)));
            }
        };
        Ok(Self::new(domain.parse()?, action))
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for EventType {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Record of a completed mutation
///
/// Immutable once created; `timestamp` is wall-clock milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub payload: serde_json::Value,
    pub timestamp: i64,
}

impl DomainEvent {
    pub fn new(event_type: EventType, payload: serde_json::Value, timestamp: i64) -> Self {
        Self {
            event_type,
            payload,
            timestamp,
        }
    }

    /// Event name used on the realtime channel (`task:created`)
    pub fn name(&self) -> String {
        self.event_type.to_string()
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
