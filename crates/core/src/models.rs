//! Setlist and song models plus the request DTOs shared by server and client.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ordering::Positioned;
use crate::types::{DbId, Timestamp};

/// Longest accepted title for setlists and songs.
pub const MAX_TITLE_LEN: u64 = 500;

/// Longest accepted logo value. Logos are usually inline data URLs.
pub const MAX_LOGO_LEN: u64 = 10 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `setlists` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Setlist {
    pub id: DbId,
    pub title: String,
    pub date: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `songs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Song {
    pub id: DbId,
    pub setlist_id: DbId,
    pub title: String,
    pub position: i32,
    pub created_at: Timestamp,
}

impl Positioned for Song {
    fn position(&self) -> i32 {
        self.position
    }

    fn tie_break(&self) -> (Timestamp, DbId) {
        (self.created_at, self.id)
    }
}

/// A setlist together with its songs in position order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetlistWithSongs {
    #[serde(flatten)]
    pub setlist: Setlist,
    pub songs: Vec<Song>,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a blank setlist. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateSetlist {
    /// Defaults to "New Setlist" if omitted or empty.
    #[validate(length(max = MAX_TITLE_LEN))]
    pub title: Option<String>,
    pub date: Option<String>,
    #[validate(length(max = MAX_LOGO_LEN))]
    pub logo_url: Option<String>,
}

/// DTO for copying an existing setlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CopySetlist {
    /// Defaults to "<source title> (Copy)" if omitted or empty.
    #[validate(length(max = MAX_TITLE_LEN))]
    pub title: Option<String>,
}

/// DTO for updating a setlist. Omitted or null fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSetlist {
    #[validate(length(max = MAX_TITLE_LEN))]
    pub title: Option<String>,
    pub date: Option<String>,
    #[validate(length(max = MAX_LOGO_LEN))]
    pub logo_url: Option<String>,
}

/// DTO for adding a song to a setlist.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSong {
    #[validate(length(max = MAX_TITLE_LEN))]
    pub title: String,
    /// Appended after the current maximum position if omitted.
    pub position: Option<i32>,
}

/// DTO for updating a song. Omitted or null fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSong {
    #[validate(length(max = MAX_TITLE_LEN))]
    pub title: Option<String>,
    pub position: Option<i32>,
}

/// One entry of a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPosition {
    pub id: DbId,
    pub position: i32,
}

/// Body of `PUT /setlists/{id}/songs/reorder`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderSongs {
    pub songs: Vec<SongPosition>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Confirmation body returned by delete-style endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body returned by the clear-all-songs endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearedSongs {
    pub deleted: u64,
}
