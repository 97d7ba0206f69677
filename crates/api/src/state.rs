use std::sync::Arc;

use setlist_events::EventBus;

use crate::service::SetlistService;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Setlist operations over the configured store.
    pub service: Arc<SetlistService>,
    /// WebSocket connection manager.
    pub ws_manager: Arc<WsManager>,
    /// Event bus the service publishes to and the relay drains.
    pub event_bus: Arc<EventBus>,
}
