//! Route definitions for the `/setlists` resource and its songs.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{setlist, song};
use crate::state::AppState;

/// Routes mounted at `/setlists`.
///
/// ```text
/// GET    /                              -> list
/// POST   /                              -> create
/// GET    /{id}                          -> get_by_id
/// PUT    /{id}                          -> update
/// DELETE /{id}                          -> remove
/// POST   /{id}/copy                     -> copy
/// DELETE /{id}/logo                     -> clear_logo
///
/// POST   /{id}/songs                    -> song::create
/// DELETE /{id}/songs                    -> song::clear
/// PUT    /{id}/songs/reorder            -> song::reorder
/// PUT    /{id}/songs/{song_id}          -> song::update
/// DELETE /{id}/songs/{song_id}          -> song::delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(setlist::list).post(setlist::create))
        .route(
            "/{id}",
            get(setlist::get_by_id)
                .put(setlist::update)
                .delete(setlist::remove),
        )
        .route("/{id}/copy", post(setlist::copy))
        .route("/{id}/logo", delete(setlist::clear_logo))
        .route("/{id}/songs", post(song::create).delete(song::clear))
        .route("/{id}/songs/reorder", put(song::reorder))
        .route(
            "/{id}/songs/{song_id}",
            put(song::update).delete(song::delete),
        )
}
