pub mod health;
pub mod setlist;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// All routes mounted under `/api`.
///
/// ```text
/// /setlists/...   setlist and song CRUD
/// /ws             WebSocket event stream
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/setlists", setlist::router())
        .route("/ws", get(ws::ws_handler))
}
