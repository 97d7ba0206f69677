use async_trait::async_trait;
use setlist_core::models::{
    CreateSetlist, CreateSong, Setlist, SetlistWithSongs, Song, SongPosition, UpdateSetlist,
    UpdateSong,
};
use setlist_core::types::DbId;

use crate::error::StoreResult;
use crate::repositories::{SetlistRepo, SongRepo};
use crate::store::{RemoveOutcome, ReorderOutcome, SetlistStore};
use crate::DbPool;

/// [`SetlistStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SetlistStore for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn list_setlists(&self) -> StoreResult<Vec<Setlist>> {
        Ok(SetlistRepo::list_active(&self.pool).await?)
    }

    async fn find_setlist(&self, id: DbId) -> StoreResult<Option<Setlist>> {
        Ok(SetlistRepo::find_active(&self.pool, id).await?)
    }

    async fn create_setlist(&self, title: &str, input: &CreateSetlist) -> StoreResult<Setlist> {
        Ok(SetlistRepo::create(&self.pool, title, input).await?)
    }

    async fn copy_setlist(&self, source: &Setlist, title: &str) -> StoreResult<SetlistWithSongs> {
        Ok(SetlistRepo::copy(&self.pool, source, title).await?)
    }

    async fn update_setlist(&self, id: DbId, input: &UpdateSetlist) -> StoreResult<Option<Setlist>> {
        Ok(SetlistRepo::update(&self.pool, id, input).await?)
    }

    async fn clear_logo(&self, id: DbId) -> StoreResult<Option<Setlist>> {
        Ok(SetlistRepo::clear_logo(&self.pool, id).await?)
    }

    async fn remove_setlist(&self, id: DbId) -> StoreResult<RemoveOutcome> {
        Ok(SetlistRepo::deactivate(&self.pool, id).await?)
    }

    async fn ensure_active_setlist(&self, title: &str) -> StoreResult<Option<Setlist>> {
        Ok(SetlistRepo::ensure_active(&self.pool, title).await?)
    }

    async fn list_songs(&self, setlist_id: DbId) -> StoreResult<Vec<Song>> {
        Ok(SongRepo::list_by_setlist(&self.pool, setlist_id).await?)
    }

    async fn add_song(&self, setlist_id: DbId, input: &CreateSong) -> StoreResult<Song> {
        Ok(SongRepo::insert(&self.pool, setlist_id, &input.title, input.position).await?)
    }

    async fn update_song(
        &self,
        setlist_id: DbId,
        song_id: DbId,
        input: &UpdateSong,
    ) -> StoreResult<Option<Song>> {
        Ok(SongRepo::update(&self.pool, setlist_id, song_id, input).await?)
    }

    async fn delete_song(&self, setlist_id: DbId, song_id: DbId) -> StoreResult<bool> {
        Ok(SongRepo::delete(&self.pool, setlist_id, song_id).await?)
    }

    async fn reorder_songs(
        &self,
        setlist_id: DbId,
        positions: &[SongPosition],
    ) -> StoreResult<ReorderOutcome> {
        Ok(SongRepo::reorder(&self.pool, setlist_id, positions).await?)
    }

    async fn clear_songs(&self, setlist_id: DbId) -> StoreResult<u64> {
        Ok(SongRepo::delete_all(&self.pool, setlist_id).await?)
    }
}
