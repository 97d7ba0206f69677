//! Real-time change notification for setlists.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, partitioned into [`Scope`]s.
//! - [`ServerEvent`]: the seven change events and their wire encoding.
//! - [`ClientMessage`]: the messages a client sends to manage its scopes.

pub mod bus;
pub mod event;

pub use bus::{EventBus, Scope, ScopedEvent, Subscription};
pub use event::{ClientMessage, ServerEvent};
