//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ServerEvent`]s. It is
//! shared via `Arc<EventBus>` across the application.

use std::collections::HashSet;

use setlist_core::types::DbId;
use tokio::sync::broadcast;

use crate::event::ServerEvent;

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// A partition of the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Delivered to every subscriber.
    Global,
    /// Delivered to subscribers that joined this setlist.
    Setlist(DbId),
}

impl Scope {
    /// Whether a subscriber that joined `joined` receives this scope.
    pub fn is_visible_to(&self, joined: &HashSet<DbId>) -> bool {
        match self {
            Scope::Global => true,
            Scope::Setlist(id) => joined.contains(id),
        }
    }
}

/// An event tagged with the scope it was published to.
#[derive(Debug, Clone)]
pub struct ScopedEvent {
    pub scope: Scope,
    pub event: ServerEvent,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use setlist_events::{EventBus, Scope, ServerEvent};
/// # use setlist_core::types::DbId;
///
/// let bus = EventBus::default();
/// let setlist_id = DbId::new_v4();
/// let _sub = bus.subscribe(Scope::Setlist(setlist_id));
///
/// bus.emit(ServerEvent::SongDeleted { setlist_id, song_id: DbId::new_v4() });
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ScopedEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to a scope.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, scope: Scope, event: ServerEvent) {
        tracing::debug!(event = event.name(), ?scope, "Publishing event");
        // Ignore the SendError, it only means there are zero receivers.
        let _ = self.sender.send(ScopedEvent { scope, event });
    }

    /// Publish an event to its natural scope (see [`ServerEvent::scope`]).
    pub fn emit(&self, event: ServerEvent) {
        self.publish(event.scope(), event);
    }

    /// Subscribe to a scope.
    ///
    /// `Scope::Setlist(id)` pre-joins that setlist; further setlists can be
    /// joined on the returned [`Subscription`]. Global events are always
    /// delivered.
    pub fn subscribe(&self, scope: Scope) -> Subscription {
        let mut joined = HashSet::new();
        if let Scope::Setlist(id) = scope {
            joined.insert(id);
        }
        Subscription {
            receiver: self.sender.subscribe(),
            joined,
        }
    }

    /// Subscribe to every event regardless of scope.
    ///
    /// Used by relays that do their own per-connection filtering.
    pub fn subscribe_all(&self) -> broadcast::Receiver<ScopedEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers (relays and subscriptions).
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A receiver that only yields events visible to its joined setlists.
pub struct Subscription {
    receiver: broadcast::Receiver<ScopedEvent>,
    joined: HashSet<DbId>,
}

impl Subscription {
    /// Start receiving a setlist's events.
    pub fn join(&mut self, setlist_id: DbId) {
        self.joined.insert(setlist_id);
    }

    /// Stop receiving a setlist's events. Returns `false` if not joined.
    pub fn leave(&mut self, setlist_id: DbId) -> bool {
        self.joined.remove(&setlist_id)
    }

    /// Wait for the next visible event.
    ///
    /// Returns `None` once the bus is dropped. Lagged receivers skip the
    /// lost events and keep going.
    pub async fn recv(&mut self) -> Option<ServerEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(scoped) if scoped.scope.is_visible_to(&self.joined) => {
                    return Some(scoped.event)
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Return the next visible event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<ServerEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(scoped) if scoped.scope.is_visible_to(&self.joined) => {
                    return Some(scoped.event)
                }
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event subscription lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
