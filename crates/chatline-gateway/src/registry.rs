use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use chatline_types::events::ServerEvent;
use chatline_types::models::{ChannelId, UserId};

/// Handle of one live gateway connection.
pub type ConnId = Uuid;

struct Connection {
    user_id: Option<UserId>,
    tx: mpsc::UnboundedSender<ServerEvent>,
    /// Transport rooms this connection has joined.
    rooms: HashSet<ChannelId>,
}

/// Open connections, their user bindings and their room memberships.
///
/// At most one connection is current for a user id. A later bind for the
/// same user silently takes over; the older connection stays open, unbound.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnId, Connection>,
    bindings: HashMap<UserId, ConnId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, unidentified connection.
    pub fn register(&mut self, tx: mpsc::UnboundedSender<ServerEvent>) -> ConnId {
        let conn_id = Uuid::new_v4();
        self.connections.insert(
            conn_id,
            Connection {
                user_id: None,
                tx,
                rooms: HashSet::new(),
            },
        );
        conn_id
    }

    /// Drop a connection. Returns the user id only if this connection was
    /// still that user's current binding.
    pub fn unregister(&mut self, conn_id: ConnId) -> Option<UserId> {
        let conn = self.connections.remove(&conn_id)?;
        let user_id = conn.user_id?;
        if self.bindings.get(&user_id) == Some(&conn_id) {
            self.bindings.remove(&user_id);
            Some(user_id)
        } else {
            None
        }
    }

    /// Bind `conn_id` to `user_id`. Returns the connection that was
    /// superseded, if another one was bound to the same user.
    pub fn bind(&mut self, conn_id: ConnId, user_id: UserId) -> Option<ConnId> {
        let conn = self.connections.get_mut(&conn_id)?;

        // Re-identifying as someone else releases the old binding
        if let Some(previous) = conn.user_id.replace(user_id) {
            if previous != user_id && self.bindings.get(&previous) == Some(&conn_id) {
                self.bindings.remove(&previous);
            }
        }

        let superseded = self
            .bindings
            .insert(user_id, conn_id)
            .filter(|old| *old != conn_id);
        if let Some(old) = superseded {
            if let Some(old_conn) = self.connections.get_mut(&old) {
                old_conn.user_id = None;
            }
            debug!("User {} rebound from {} to {}", user_id, old, conn_id);
        }
        superseded
    }

    pub fn user_of(&self, conn_id: ConnId) -> Option<UserId> {
        self.connections.get(&conn_id).and_then(|c| c.user_id)
    }

    pub fn connection_of(&self, user_id: UserId) -> Option<ConnId> {
        self.bindings.get(&user_id).copied()
    }

    pub fn is_open(&self, conn_id: ConnId) -> bool {
        self.connections.contains_key(&conn_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn connection_ids(&self) -> impl Iterator<Item = ConnId> + '_ {
        self.connections.keys().copied()
    }

    /// Queue an event on one connection. Returns false if the connection is
    /// gone or its writer has shut down.
    pub fn send(&self, conn_id: ConnId, event: ServerEvent) -> bool {
        self.connections
            .get(&conn_id)
            .is_some_and(|c| c.tx.send(event).is_ok())
    }

    // -- Rooms --

    pub fn join_room(&mut self, conn_id: ConnId, channel_id: &str) {
        if let Some(conn) = self.connections.get_mut(&conn_id) {
            conn.rooms.insert(channel_id.to_string());
        }
    }

    pub fn leave_room(&mut self, conn_id: ConnId, channel_id: &str) {
        if let Some(conn) = self.connections.get_mut(&conn_id) {
            conn.rooms.remove(channel_id);
        }
    }

    /// Remove every connection from a room. Returns how many were in it.
    pub fn clear_room(&mut self, channel_id: &str) -> usize {
        self.connections
            .values_mut()
            .map(|c| c.rooms.remove(channel_id))
            .filter(|&removed| removed)
            .count()
    }

    pub fn rooms_of(&self, conn_id: ConnId) -> Vec<ChannelId> {
        let mut rooms: Vec<_> = self
            .connections
            .get(&conn_id)
            .map(|c| c.rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }
}
