//! Request handlers.
//!
//! Each submodule holds the async handlers for one resource. Handlers
//! delegate to [`SetlistService`](crate::service::SetlistService) and map
//! errors via [`AppError`](crate::error::AppError).

pub mod setlist;
pub mod song;
