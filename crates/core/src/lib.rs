//! Shared domain types for the setlist service.
//!
//! Everything in this crate is used by both the server side (store, API,
//! event bus) and the client synchronizer, so it stays free of I/O.

pub mod error;
pub mod models;
pub mod ordering;
pub mod setlist;
pub mod types;
