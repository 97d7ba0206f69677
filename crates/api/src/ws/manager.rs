use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use setlist_core::types::DbId;
use setlist_events::ScopedEvent;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// State kept for a single WebSocket connection.
pub struct WsConnection {
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Setlists whose events this connection receives.
    pub joined: HashSet<DbId>,
}

/// Manages all active WebSocket connections.
///
/// Thread-safe via interior `RwLock`; wrap in `Arc` to share.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection with no joined setlists.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            sender: tx,
            joined: HashSet::new(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Add a setlist to a connection's membership.
    ///
    /// Returns `false` if the connection is unknown.
    pub async fn join(&self, conn_id: &str, setlist_id: DbId) -> bool {
        match self.connections.write().await.get_mut(conn_id) {
            Some(conn) => {
                conn.joined.insert(setlist_id);
                true
            }
            None => false,
        }
    }

    /// Drop a setlist from a connection's membership.
    ///
    /// Returns `false` if the connection is unknown or had not joined.
    pub async fn leave(&self, conn_id: &str, setlist_id: DbId) -> bool {
        self.connections
            .write()
            .await
            .get_mut(conn_id)
            .is_some_and(|conn| conn.joined.remove(&setlist_id))
    }

    /// Send an event to every connection whose membership covers its scope.
    ///
    /// The event is encoded once. Returns the number of connections it was
    /// queued for.
    pub async fn dispatch(&self, scoped: &ScopedEvent) -> usize {
        let text = match serde_json::to_string(&scoped.event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, event = scoped.event.name(), "Failed to encode event");
                return 0;
            }
        };

        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if scoped.scope.is_visible_to(&conn.joined) {
                let _ = conn.sender.send(Message::Text(text.clone().into()));
                count += 1;
            }
        }
        count
    }

    /// Number of connections that joined a setlist.
    pub async fn member_count(&self, setlist_id: DbId) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.joined.contains(&setlist_id))
            .count()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Called during graceful shutdown.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
