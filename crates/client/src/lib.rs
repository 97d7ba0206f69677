//! Client side of the setlist service.
//!
//! [`sync::Synchronizer`] mirrors the server's setlists locally, applies
//! edits optimistically through a [`api::SetlistApi`] and folds in the
//! events delivered by [`feed::EventFeed`].

pub mod api;
pub mod config;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod selection;
pub mod state;
pub mod sync;
