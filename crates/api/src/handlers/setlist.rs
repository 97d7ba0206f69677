//! Handlers for the `/setlists` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use setlist_core::models::{
    CopySetlist, CreateSetlist, MessageResponse, Setlist, SetlistWithSongs, UpdateSetlist,
};
use setlist_core::types::DbId;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/setlists
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Setlist>>> {
    let setlists = state.service.list_setlists().await?;
    Ok(Json(setlists))
}

/// GET /api/setlists/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SetlistWithSongs>> {
    let setlist = state.service.get_setlist(id).await?;
    Ok(Json(setlist))
}

/// POST /api/setlists
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSetlist>,
) -> AppResult<(StatusCode, Json<Setlist>)> {
    let setlist = state.service.create_setlist(input).await?;
    Ok((StatusCode::CREATED, Json(setlist)))
}

/// POST /api/setlists/{id}/copy
pub async fn copy(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CopySetlist>,
) -> AppResult<(StatusCode, Json<SetlistWithSongs>)> {
    let copy = state.service.copy_setlist(id, input).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// PUT /api/setlists/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSetlist>,
) -> AppResult<Json<Setlist>> {
    let setlist = state.service.update_setlist(id, input).await?;
    Ok(Json(setlist))
}

/// DELETE /api/setlists/{id}/logo
pub async fn clear_logo(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Setlist>> {
    let setlist = state.service.clear_logo(id).await?;
    Ok(Json(setlist))
}

/// DELETE /api/setlists/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    state.service.remove_setlist(id).await?;
    Ok(Json(MessageResponse {
        message: "Setlist removed successfully".into(),
    }))
}
