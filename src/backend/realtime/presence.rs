//! Presence registry: which users are online and through which connections.
//!
//! A user is online while at least one of their connections is registered.
//! Only transitions are reported to the caller, so status broadcasts fire
//! once per offline/online edge no matter how many devices a user has.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::shared::UserId;

pub type ConnectionId = Uuid;

#[derive(Debug, Default, Clone)]
pub struct PresenceRegistry {
    users: HashMap<UserId, HashSet<ConnectionId>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection; `true` when the user just came online
    pub fn add(&mut self, user_id: UserId, connection_id: ConnectionId) -> bool {
        let connections = self.users.entry(user_id).or_default();
        let was_offline = connections.is_empty();
        connections.insert(connection_id);
        was_offline
    }

    /// Drop a connection; `true` when it was the user's last one
    pub fn remove(&mut self, user_id: UserId, connection_id: ConnectionId) -> bool {
        let Some(connections) = self.users.get_mut(&user_id) else {
            return false;
        };
        if !connections.remove(&connection_id) {
            return false;
        }
        if connections.is_empty() {
            self.users.remove(&user_id);
            return true;
        }
        false
    }

    pub fn is_online(&self, user_id: UserId) -> bool {
        self.users.contains_key(&user_id)
    }

    /// Online user ids, ascending
    pub fn online_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.users.keys().copied().collect();
        users.sort_unstable();
        users
    }

    pub fn connections_of(&self, user_id: UserId) -> usize {
        self.users.get(&user_id).map_or(0, HashSet::len)
    }
}
