use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use setlist_core::models::{
    CreateSetlist, CreateSong, Setlist, SetlistWithSongs, Song, SongPosition, UpdateSetlist,
    UpdateSong,
};
use setlist_core::ordering::{next_position, sort_by_position};
use setlist_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{RemoveOutcome, ReorderOutcome, SetlistStore};

#[derive(Default)]
struct Tables {
    setlists: HashMap<DbId, Setlist>,
    songs: HashMap<DbId, Song>,
    last_timestamp: Option<Timestamp>,
}

impl Tables {
    /// Strictly increasing timestamps, so creation order stays observable
    /// even when several rows are written within one clock tick.
    fn now(&mut self) -> Timestamp {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn active(&self, id: DbId) -> Option<&Setlist> {
        self.setlists.get(&id).filter(|s| s.is_active)
    }

    fn active_mut(&mut self, id: DbId) -> Option<&mut Setlist> {
        self.setlists.get_mut(&id).filter(|s| s.is_active)
    }

    fn songs_of(&self, setlist_id: DbId) -> Vec<Song> {
        let mut songs: Vec<Song> = self
            .songs
            .values()
            .filter(|s| s.setlist_id == setlist_id)
            .cloned()
            .collect();
        sort_by_position(&mut songs);
        songs
    }

    fn insert_setlist(
        &mut self,
        title: &str,
        date: Option<String>,
        logo_url: Option<String>,
    ) -> Setlist {
        let now = self.now();
        let setlist = Setlist {
            id: DbId::new_v4(),
            title: title.to_string(),
            date,
            logo_url,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.setlists.insert(setlist.id, setlist.clone());
        setlist
    }

    fn insert_song(&mut self, setlist_id: DbId, title: &str, position: Option<i32>) -> Song {
        let position = position.unwrap_or_else(|| {
            let max = self
                .songs
                .values()
                .filter(|s| s.setlist_id == setlist_id)
                .map(|s| s.position)
                .max();
            next_position(max)
        });
        let song = Song {
            id: DbId::new_v4(),
            setlist_id,
            title: title.to_string(),
            position,
            created_at: self.now(),
        };
        self.songs.insert(song.id, song.clone());
        song
    }
}

/// Process-local [`SetlistStore`].
///
/// Each operation holds the write lock for its whole duration, which makes
/// multi-row operations (copy, reorder, remove) atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    /// (or succeed again with `false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SetlistStore for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        self.check_available()
    }

    async fn list_setlists(&self) -> StoreResult<Vec<Setlist>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut setlists: Vec<Setlist> = tables
            .setlists
            .values()
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        setlists.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(setlists)
    }

    async fn find_setlist(&self, id: DbId) -> StoreResult<Option<Setlist>> {
        self.check_available()?;
        Ok(self.tables.read().await.active(id).cloned())
    }

    async fn create_setlist(&self, title: &str, input: &CreateSetlist) -> StoreResult<Setlist> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        Ok(tables.insert_setlist(title, input.date.clone(), input.logo_url.clone()))
    }

    async fn copy_setlist(&self, source: &Setlist, title: &str) -> StoreResult<SetlistWithSongs> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let setlist = tables.insert_setlist(title, source.date.clone(), source.logo_url.clone());
        let songs = tables
            .songs_of(source.id)
            .into_iter()
            .map(|original| tables.insert_song(setlist.id, &original.title, Some(original.position)))
            .collect();
        Ok(SetlistWithSongs { setlist, songs })
    }

    async fn update_setlist(&self, id: DbId, input: &UpdateSetlist) -> StoreResult<Option<Setlist>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let now = tables.now();
        let Some(setlist) = tables.active_mut(id) else {
            return Ok(None);
        };
        if let Some(title) = &input.title {
            setlist.title = title.clone();
        }
        if let Some(date) = &input.date {
            setlist.date = Some(date.clone());
        }
        if let Some(logo_url) = &input.logo_url {
            setlist.logo_url = Some(logo_url.clone());
        }
        setlist.updated_at = now;
        Ok(Some(setlist.clone()))
    }

    async fn clear_logo(&self, id: DbId) -> StoreResult<Option<Setlist>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let now = tables.now();
        let Some(setlist) = tables.active_mut(id) else {
            return Ok(None);
        };
        setlist.logo_url = None;
        setlist.updated_at = now;
        Ok(Some(setlist.clone()))
    }

    async fn remove_setlist(&self, id: DbId) -> StoreResult<RemoveOutcome> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.active(id).is_none() {
            return Ok(RemoveOutcome::NotFound);
        }
        let active_count = tables.setlists.values().filter(|s| s.is_active).count();
        if active_count <= 1 {
            return Ok(RemoveOutcome::LastActive);
        }
        let now = tables.now();
        if let Some(setlist) = tables.active_mut(id) {
            setlist.is_active = false;
            setlist.updated_at = now;
        }
        Ok(RemoveOutcome::Removed)
    }

    async fn ensure_active_setlist(&self, title: &str) -> StoreResult<Option<Setlist>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.setlists.values().any(|s| s.is_active) {
            return Ok(None);
        }
        Ok(Some(tables.insert_setlist(title, None, None)))
    }

    async fn list_songs(&self, setlist_id: DbId) -> StoreResult<Vec<Song>> {
        self.check_available()?;
        Ok(self.tables.read().await.songs_of(setlist_id))
    }

    async fn add_song(&self, setlist_id: DbId, input: &CreateSong) -> StoreResult<Song> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        Ok(tables.insert_song(setlist_id, &input.title, input.position))
    }

    async fn update_song(
        &self,
        setlist_id: DbId,
        song_id: DbId,
        input: &UpdateSong,
    ) -> StoreResult<Option<Song>> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let Some(song) = tables
            .songs
            .get_mut(&song_id)
            .filter(|s| s.setlist_id == setlist_id)
        else {
            return Ok(None);
        };
        if let Some(title) = &input.title {
            song.title = title.clone();
        }
        if let Some(position) = input.position {
            song.position = position;
        }
        Ok(Some(song.clone()))
    }

    async fn delete_song(&self, setlist_id: DbId, song_id: DbId) -> StoreResult<bool> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let owned = tables
            .songs
            .get(&song_id)
            .is_some_and(|s| s.setlist_id == setlist_id);
        if owned {
            tables.songs.remove(&song_id);
        }
        Ok(owned)
    }

    async fn reorder_songs(
        &self,
        setlist_id: DbId,
        positions: &[SongPosition],
    ) -> StoreResult<ReorderOutcome> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        // Validate the whole batch before touching any row.
        for entry in positions {
            let owned = tables
                .songs
                .get(&entry.id)
                .is_some_and(|s| s.setlist_id == setlist_id);
            if !owned {
                return Ok(ReorderOutcome::UnknownSong(entry.id));
            }
        }
        for entry in positions {
            if let Some(song) = tables.songs.get_mut(&entry.id) {
                song.position = entry.position;
            }
        }
        Ok(ReorderOutcome::Reordered(tables.songs_of(setlist_id)))
    }

    async fn clear_songs(&self, setlist_id: DbId) -> StoreResult<u64> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let before = tables.songs.len();
        tables.songs.retain(|_, s| s.setlist_id != setlist_id);
        Ok((before - tables.songs.len()) as u64)
    }
}
