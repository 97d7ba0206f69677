//! Setlist and song operations.
//!
//! [`SetlistService`] validates input, calls the [`SetlistStore`] and
//! publishes the resulting [`ServerEvent`] once the store has committed.
//! Handlers are thin adapters over it.

use std::sync::Arc;

use setlist_core::error::CoreError;
use setlist_core::models::{
    CopySetlist, CreateSetlist, CreateSong, Setlist, SetlistWithSongs, Song, SongPosition,
    UpdateSetlist, UpdateSong,
};
use setlist_core::setlist::{copy_title, resolve_title, LAST_SETLIST_MESSAGE};
use setlist_core::types::DbId;
use setlist_db::{RemoveOutcome, ReorderOutcome, SetlistStore};
use setlist_events::{EventBus, ServerEvent};
use validator::Validate;

use crate::error::AppResult;

pub struct SetlistService {
    store: Arc<dyn SetlistStore>,
    bus: Arc<EventBus>,
}

impl SetlistService {
    pub fn new(store: Arc<dyn SetlistStore>, bus: Arc<EventBus>) -> Self {
        Self { store, bus }
    }

    pub fn store(&self) -> &Arc<dyn SetlistStore> {
        &self.store
    }

    /// Active setlists, newest first.
    pub async fn list_setlists(&self) -> AppResult<Vec<Setlist>> {
        Ok(self.store.list_setlists().await?)
    }

    pub async fn get_setlist(&self, id: DbId) -> AppResult<SetlistWithSongs> {
        let setlist = self.require_setlist(id).await?;
        let songs = self.store.list_songs(id).await?;
        Ok(SetlistWithSongs { setlist, songs })
    }

    pub async fn create_setlist(&self, input: CreateSetlist) -> AppResult<Setlist> {
        input.validate()?;
        let title = resolve_title(input.title.as_deref());
        let setlist = self.store.create_setlist(&title, &input).await?;
        tracing::info!(setlist_id = %setlist.id, title = %setlist.title, "Setlist created");
        self.bus.emit(ServerEvent::SetlistCreated(setlist.clone()));
        Ok(setlist)
    }

    /// Deep-copy a setlist. The copy is announced like a fresh creation.
    pub async fn copy_setlist(&self, id: DbId, input: CopySetlist) -> AppResult<SetlistWithSongs> {
        input.validate()?;
        let source = self.require_setlist(id).await?;
        let title = copy_title(&source.title, input.title.as_deref());
        let copy = self.store.copy_setlist(&source, &title).await?;
        tracing::info!(
            source_id = %id,
            setlist_id = %copy.setlist.id,
            songs = copy.songs.len(),
            "Setlist copied"
        );
        self.bus.emit(ServerEvent::SetlistCreated(copy.setlist.clone()));
        Ok(copy)
    }

    pub async fn update_setlist(&self, id: DbId, input: UpdateSetlist) -> AppResult<Setlist> {
        input.validate()?;
        let setlist = self
            .store
            .update_setlist(id, &input)
            .await?
            .ok_or(CoreError::setlist_not_found(id))?;
        self.bus.emit(ServerEvent::SetlistUpdated(setlist.clone()));
        Ok(setlist)
    }

    pub async fn clear_logo(&self, id: DbId) -> AppResult<Setlist> {
        let setlist = self
            .store
            .clear_logo(id)
            .await?
            .ok_or(CoreError::setlist_not_found(id))?;
        self.bus.emit(ServerEvent::SetlistUpdated(setlist.clone()));
        Ok(setlist)
    }

    /// Soft-delete a setlist. The last active setlist cannot be removed.
    pub async fn remove_setlist(&self, id: DbId) -> AppResult<()> {
        match self.store.remove_setlist(id).await? {
            RemoveOutcome::Removed => {
                tracing::info!(setlist_id = %id, "Setlist removed");
                self.bus.emit(ServerEvent::SetlistRemoved { id });
                Ok(())
            }
            RemoveOutcome::NotFound => Err(CoreError::setlist_not_found(id).into()),
            RemoveOutcome::LastActive => {
                Err(CoreError::InvariantViolation(LAST_SETLIST_MESSAGE.into()).into())
            }
        }
    }

    /// Create the default setlist when none is active. Used at startup.
    pub async fn ensure_default_setlist(&self) -> AppResult<Option<Setlist>> {
        let created = self
            .store
            .ensure_active_setlist(&resolve_title(None))
            .await?;
        if let Some(setlist) = &created {
            tracing::info!(setlist_id = %setlist.id, "Seeded default setlist");
            self.bus.emit(ServerEvent::SetlistCreated(setlist.clone()));
        }
        Ok(created)
    }

    pub async fn add_song(&self, setlist_id: DbId, input: CreateSong) -> AppResult<Song> {
        input.validate()?;
        self.require_setlist(setlist_id).await?;
        let song = self.store.add_song(setlist_id, &input).await?;
        self.bus.emit(ServerEvent::SongAdded {
            setlist_id,
            song: song.clone(),
        });
        Ok(song)
    }

    pub async fn update_song(
        &self,
        setlist_id: DbId,
        song_id: DbId,
        input: UpdateSong,
    ) -> AppResult<Song> {
        input.validate()?;
        self.require_setlist(setlist_id).await?;
        let song = self
            .store
            .update_song(setlist_id, song_id, &input)
            .await?
            .ok_or(CoreError::song_not_found(song_id))?;
        self.bus.emit(ServerEvent::SongUpdated {
            setlist_id,
            song: song.clone(),
        });
        Ok(song)
    }

    pub async fn delete_song(&self, setlist_id: DbId, song_id: DbId) -> AppResult<()> {
        self.require_setlist(setlist_id).await?;
        if !self.store.delete_song(setlist_id, song_id).await? {
            return Err(CoreError::song_not_found(song_id).into());
        }
        self.bus.emit(ServerEvent::SongDeleted {
            setlist_id,
            song_id,
        });
        Ok(())
    }

    /// Apply a batch of positions atomically and return the re-read order.
    pub async fn reorder_songs(
        &self,
        setlist_id: DbId,
        positions: &[SongPosition],
    ) -> AppResult<Vec<Song>> {
        self.require_setlist(setlist_id).await?;
        match self.store.reorder_songs(setlist_id, positions).await? {
            ReorderOutcome::Reordered(songs) => {
                tracing::debug!(%setlist_id, count = positions.len(), "Songs reordered");
                self.bus.emit(ServerEvent::SongsReordered {
                    setlist_id,
                    songs: songs.clone(),
                });
                Ok(songs)
            }
            ReorderOutcome::UnknownSong(song_id) => {
                tracing::warn!(%setlist_id, %song_id, "Reorder named a foreign song");
                Err(CoreError::song_not_found(song_id).into())
            }
        }
    }

    /// Delete every song at once. Viewers get an empty `songs:reordered`.
    pub async fn clear_songs(&self, setlist_id: DbId) -> AppResult<u64> {
        self.require_setlist(setlist_id).await?;
        let deleted = self.store.clear_songs(setlist_id).await?;
        tracing::info!(%setlist_id, deleted, "Songs cleared");
        self.bus.emit(ServerEvent::SongsReordered {
            setlist_id,
            songs: Vec::new(),
        });
        Ok(deleted)
    }

    async fn require_setlist(&self, id: DbId) -> AppResult<Setlist> {
        Ok(self
            .store
            .find_setlist(id)
            .await?
            .ok_or(CoreError::setlist_not_found(id))?)
    }
}
