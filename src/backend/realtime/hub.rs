/**
 * Realtime Hub
 *
 * Owns every realtime connection from handshake to disconnect, together with
 * rooms, presence and the event history. REST mutations publish through the
 * same hub so both paths share one history.
 *
 * # Connection Lifecycle
 *
 * - `authenticate` runs the handshake token check; on failure the upgrade
 *   is refused and the connection never gets further
 * - `connect` registers it, joins `user:<id>` and announces the user as
 *   online on the offline→online edge
 * - `handle_frame` runs the dispatch table for a joined connection
 * - `disconnect` removes it and announces the user as offline once the
 *   last connection is gone
 *
 * # Locking
 *
 * All mutable state sits behind one `std::sync::Mutex`. It is only held for
 * short read-modify-write sections and never across an `.await`; domain
 * calls run unlocked.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{json, Value};

use super::broadcast::{broadcast_frame, Target};
use super::connection::{Connection, ConnectionId, ConnectionSender, ConnectionState};
use super::dispatch::{self, Command};
use super::history::EventHistory;
use super::presence::PresenceRegistry;
use crate::backend::auth::tokens::TokenService;
use crate::backend::domain::{DomainHandlers, DomainResult};
use crate::backend::error::BackendError;
use crate::backend::middleware::authenticate_handshake;
use crate::shared::{
    frame, ClientFrame, Domain, DomainEvent, EventType, Identity, Mutation, ServerFrame, UserId,
};

struct HubState {
    connections: HashMap<ConnectionId, Connection>,
    presence: PresenceRegistry,
    history: EventHistory,
}

/// Shared realtime hub; cheap to clone
#[derive(Clone)]
pub struct RealtimeHub {
    tokens: Arc<TokenService>,
    handlers: Arc<dyn DomainHandlers>,
    state: Arc<Mutex<HubState>>,
}

impl RealtimeHub {
    pub fn new(
        tokens: Arc<TokenService>,
        handlers: Arc<dyn DomainHandlers>,
        history_capacity: usize,
    ) -> Self {
        Self {
            tokens,
            handlers,
            state: Arc::new(Mutex::new(HubState {
                connections: HashMap::new(),
                presence: PresenceRegistry::new(),
                history: EventHistory::new(history_capacity),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, HubState> {
        // Every critical section leaves the state consistent, so a panic
        // elsewhere does not invalidate it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handshake-time token check
    pub fn authenticate(&self, token: Option<&str>) -> Result<Identity, BackendError> {
        authenticate_handshake(&self.tokens, token)
    }

    /// Register an authenticated connection and join its private room
    pub fn connect(&self, identity: Identity, sender: ConnectionSender) -> ConnectionId {
        let mut state = self.state();
        let connection = Connection::new(identity, sender);
        let id = connection.id;
        let user_id = connection.identity.user_id;

        let greeting = ServerFrame::new(
            frame::CONNECTED,
            json!({
                "connectionId": id,
                "userId": user_id,
                "rooms": connection.sorted_rooms(),
            }),
        );
        connection.send(greeting);
        state.connections.insert(id, connection);

        tracing::info!("[Realtime] Connection {} joined as user {}", id, user_id);

        if state.presence.add(user_id, id) {
            broadcast_frame(
                &state.connections,
                &Target::All,
                &ServerFrame::status_changed(user_id, true),
            );
        }
        id
    }

    /// Remove a connection; a no-op when it is already gone
    pub fn disconnect(&self, connection_id: ConnectionId) {
        let mut state = self.state();
        let Some(connection) = state.connections.remove(&connection_id) else {
            return;
        };
        let user_id = connection.identity.user_id;
        tracing::info!("[Realtime] Connection {} of user {} closed", connection_id, user_id);

        if state.presence.remove(user_id, connection_id) {
            broadcast_frame(
                &state.connections,
                &Target::All,
                &ServerFrame::status_changed(user_id, false),
            );
        }
    }

    pub fn connection_state(&self, connection_id: ConnectionId) -> ConnectionState {
        if self.state().connections.contains_key(&connection_id) {
            ConnectionState::Joined
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn online_users(&self) -> Vec<UserId> {
        self.state().presence.online_users()
    }

    pub fn is_online(&self, user_id: UserId) -> bool {
        self.state().presence.is_online(user_id)
    }

    pub fn connection_count(&self) -> usize {
        self.state().connections.len()
    }

    pub fn rooms_of(&self, connection_id: ConnectionId) -> Vec<String> {
        self.state()
            .connections
            .get(&connection_id)
            .map(Connection::sorted_rooms)
            .unwrap_or_default()
    }

    /// Retained events with `timestamp > since`
    pub fn events_since(&self, since: i64) -> Vec<DomainEvent> {
        self.state().history.since(since).cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.state().history.len()
    }

    /// Send one frame to one connection
    pub fn send_to(&self, connection_id: ConnectionId, outgoing: ServerFrame) -> bool {
        broadcast_frame(
            &self.state().connections,
            &Target::Connection(connection_id),
            &outgoing,
        ) > 0
    }

    /// Record an event and deliver it to `target`
    ///
    /// Append and fan-out happen under one lock, so history order matches
    /// delivery order.
    pub fn publish(&self, event_type: EventType, payload: Value, target: Target) -> DomainEvent {
        let mut state = self.state();
        let event = state.history.append(event_type, payload);
        broadcast_frame(&state.connections, &target, &ServerFrame::domain(&event));
        event
    }

    /// Publish a completed mutation and run the post-event hook
    ///
    /// Shared by the realtime dispatch and the REST routes.
    pub async fn commit(
        &self,
        event_type: EventType,
        payload: Value,
        actor: &Identity,
    ) -> DomainEvent {
        let target = target_for(event_type.domain, &payload, actor);
        let event = self.publish(event_type, payload, target);
        self.notify(&event, actor).await;
        event
    }

    async fn notify(&self, event: &DomainEvent, actor: &Identity) {
        let Some(new) = dispatch::notification_for(event, actor) else {
            return;
        };
        match self.handlers.create_notification(new).await {
            Ok(notification) => {
                broadcast_frame(
                    &self.state().connections,
                    &Target::user(actor.user_id),
                    &ServerFrame::new(frame::NOTIFICATION_NEW, notification),
                );
            }
            Err(e) => {
                tracing::warn!(
                    "[Realtime] Failed to create notification for {}: {}",
                    event.name(),
                    e
                );
            }
        }
    }

    /// Process one inbound frame from a joined connection
    pub async fn handle_frame(&self, connection_id: ConnectionId, incoming: ClientFrame) {
        let identity = match self.state().connections.get(&connection_id) {
            Some(connection) => connection.identity.clone(),
            None => return,
        };

        let command = match dispatch::parse(&incoming.event, incoming.data) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!("[Realtime] Rejected frame '{}': {}", incoming.event, e.message);
                self.send_to(connection_id, e.into_frame());
                return;
            }
        };

        match command {
            Command::JoinRoom(room) => self.join_room(connection_id, room),
            Command::LeaveRoom(room) => self.leave_room(connection_id, &identity, room),
            Command::Sync(since) => {
                let events = self.events_since(since);
                tracing::debug!(
                    "[Realtime] Replaying {} events since {} to {}",
                    events.len(),
                    since,
                    connection_id
                );
                self.send_to(connection_id, ServerFrame::sync(&events));
            }
            Command::Create { domain, payload } => {
                let result = self.handlers.create(domain, payload, &identity).await;
                self.complete(connection_id, &identity, domain, Mutation::Create, result)
                    .await;
            }
            Command::Update {
                domain,
                id,
                payload,
            } => {
                let result = self.handlers.update(domain, id, payload, &identity).await;
                self.complete(connection_id, &identity, domain, Mutation::Update, result)
                    .await;
            }
            Command::Delete { domain, id } => {
                let result = self.handlers.delete(domain, id, &identity).await;
                self.complete(connection_id, &identity, domain, Mutation::Delete, result)
                    .await;
            }
        }
    }

    async fn complete(
        &self,
        connection_id: ConnectionId,
        identity: &Identity,
        domain: Domain,
        mutation: Mutation,
        result: DomainResult<Value>,
    ) {
        match result {
            Ok(payload) => {
                self.commit(EventType::new(domain, mutation.completed()), payload, identity)
                    .await;
            }
            Err(e) => {
                tracing::warn!(
                    "[Realtime] {}:{} failed for user {}: {}",
                    domain,
                    mutation.as_str(),
                    identity.user_id,
                    e
                );
                self.send_to(
                    connection_id,
                    ServerFrame::error(domain.error_event(), e.public_message()),
                );
            }
        }
    }

    fn join_room(&self, connection_id: ConnectionId, room: String) {
        if let Some(connection) = self.state().connections.get_mut(&connection_id) {
            tracing::debug!("[Realtime] {} joined room {}", connection_id, room);
            connection.rooms.insert(room);
        }
    }

    fn leave_room(&self, connection_id: ConnectionId, identity: &Identity, room: String) {
        if room == identity.private_room() {
            self.send_to(
                connection_id,
                ServerFrame::error(frame::ERROR, "Cannot leave the private room"),
            );
            return;
        }
        if let Some(connection) = self.state().connections.get_mut(&connection_id) {
            connection.rooms.remove(&room);
        }
    }
}

/// Notification events reach the acting user and the notification's owner;
/// everything else goes to all connections
///
/// The owner is the payload's `userId`; a payload without one is treated as
/// the actor's own notification.
fn target_for(domain: Domain, payload: &Value, actor: &Identity) -> Target {
    if domain != Domain::Notification {
        return Target::All;
    }
    let owner = payload
        .get("userId")
        .and_then(Value::as_i64)
        .and_then(|id| UserId::try_from(id).ok())
        .unwrap_or(actor.user_id);
    Target::users(&[actor.user_id, owner])
}
