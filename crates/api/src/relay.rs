//! Bus-to-WebSocket forwarding.
//!
//! [`EventRelay`] drains the event bus and hands each event to the
//! [`WsManager`], which delivers it to the connections that joined the
//! event's scope.

use std::sync::Arc;

use setlist_events::ScopedEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

pub struct EventRelay {
    ws_manager: Arc<WsManager>,
}

impl EventRelay {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the forwarding loop.
    ///
    /// Exits when the channel closes, i.e. when the
    /// [`EventBus`](setlist_events::EventBus) is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<ScopedEvent>) {
        loop {
            match receiver.recv().await {
                Ok(scoped) => {
                    let delivered = self.ws_manager.dispatch(&scoped).await;
                    tracing::debug!(event = scoped.event.name(), delivered, "Relayed event");
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, relay shutting down");
                    break;
                }
            }
        }
    }
}
