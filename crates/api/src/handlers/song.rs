//! Handlers for songs, nested under `/setlists/{id}/songs`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use setlist_core::models::{
    ClearedSongs, CreateSong, MessageResponse, ReorderSongs, Song, UpdateSong,
};
use setlist_core::types::DbId;

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/setlists/{id}/songs
pub async fn create(
    State(state): State<AppState>,
    Path(setlist_id): Path<DbId>,
    Json(input): Json<CreateSong>,
) -> AppResult<(StatusCode, Json<Song>)> {
    let song = state.service.add_song(setlist_id, input).await?;
    Ok((StatusCode::CREATED, Json(song)))
}

/// PUT /api/setlists/{id}/songs/{song_id}
pub async fn update(
    State(state): State<AppState>,
    Path((setlist_id, song_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateSong>,
) -> AppResult<Json<Song>> {
    let song = state.service.update_song(setlist_id, song_id, input).await?;
    Ok(Json(song))
}

/// DELETE /api/setlists/{id}/songs/{song_id}
pub async fn delete(
    State(state): State<AppState>,
    Path((setlist_id, song_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<MessageResponse>> {
    state.service.delete_song(setlist_id, song_id).await?;
    Ok(Json(MessageResponse {
        message: "Song deleted successfully".into(),
    }))
}

/// PUT /api/setlists/{id}/songs/reorder
///
/// Returns the full song list in its new order.
pub async fn reorder(
    State(state): State<AppState>,
    Path(setlist_id): Path<DbId>,
    Json(input): Json<ReorderSongs>,
) -> AppResult<Json<Vec<Song>>> {
    let songs = state.service.reorder_songs(setlist_id, &input.songs).await?;
    Ok(Json(songs))
}

/// DELETE /api/setlists/{id}/songs
pub async fn clear(
    State(state): State<AppState>,
    Path(setlist_id): Path<DbId>,
) -> AppResult<Json<ClearedSongs>> {
    let deleted = state.service.clear_songs(setlist_id).await?;
    Ok(Json(ClearedSongs { deleted }))
}
