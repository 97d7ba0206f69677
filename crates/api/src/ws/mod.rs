//! WebSocket infrastructure for real-time setlist updates.
//!
//! Provides connection management with per-connection setlist membership,
//! heartbeat monitoring, and the HTTP upgrade handler.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
