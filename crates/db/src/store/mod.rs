//! The persistence contract used by the API layer.
//!
//! [`SetlistStore`] is implemented by [`PgStore`] (PostgreSQL through the
//! repositories) and by [`MemoryStore`] (process-local, for tests and for
//! running without a database). Both give the same guarantees: reorder and
//! remove are all-or-nothing, and lookups only see active setlists.

use async_trait::async_trait;
use setlist_core::models::{
    CreateSetlist, CreateSong, Setlist, SetlistWithSongs, Song, SongPosition, UpdateSetlist,
    UpdateSong,
};
use setlist_core::types::DbId;

use crate::error::StoreResult;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result of a soft-delete attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The setlist is absent or already inactive.
    NotFound,
    /// The setlist is the only active one and was left untouched.
    LastActive,
}

/// Result of a bulk reorder.
#[derive(Debug, Clone, PartialEq)]
pub enum ReorderOutcome {
    /// Every position was applied; the canonical list after commit.
    Reordered(Vec<Song>),
    /// The batch named a song outside the setlist; nothing was applied.
    UnknownSong(DbId),
}

/// Storage operations for setlists and their songs.
///
/// Setlist lookups ignore inactive rows. Song operations are scoped by
/// `setlist_id` but do not re-check that the setlist is active; that is the
/// caller's job.
#[async_trait]
pub trait SetlistStore: Send + Sync {
    /// Confirm the backing store is reachable.
    async fn health_check(&self) -> StoreResult<()>;

    async fn list_setlists(&self) -> StoreResult<Vec<Setlist>>;

    async fn find_setlist(&self, id: DbId) -> StoreResult<Option<Setlist>>;

    /// Insert a setlist whose title has already been resolved.
    async fn create_setlist(&self, title: &str, input: &CreateSetlist) -> StoreResult<Setlist>;

    /// Deep-copy `source` (metadata and songs) under `title`.
    async fn copy_setlist(&self, source: &Setlist, title: &str) -> StoreResult<SetlistWithSongs>;

    async fn update_setlist(&self, id: DbId, input: &UpdateSetlist) -> StoreResult<Option<Setlist>>;

    async fn clear_logo(&self, id: DbId) -> StoreResult<Option<Setlist>>;

    async fn remove_setlist(&self, id: DbId) -> StoreResult<RemoveOutcome>;

    /// Create a setlist titled `title` if no active setlist exists.
    async fn ensure_active_setlist(&self, title: &str) -> StoreResult<Option<Setlist>>;

    async fn list_songs(&self, setlist_id: DbId) -> StoreResult<Vec<Song>>;

    async fn add_song(&self, setlist_id: DbId, input: &CreateSong) -> StoreResult<Song>;

    async fn update_song(
        &self,
        setlist_id: DbId,
        song_id: DbId,
        input: &UpdateSong,
    ) -> StoreResult<Option<Song>>;

    async fn delete_song(&self, setlist_id: DbId, song_id: DbId) -> StoreResult<bool>;

    async fn reorder_songs(
        &self,
        setlist_id: DbId,
        positions: &[SongPosition],
    ) -> StoreResult<ReorderOutcome>;

    /// Delete every song of a setlist at once.
    async fn clear_songs(&self, setlist_id: DbId) -> StoreResult<u64>;
}
