//! Client-side state synchronizer.
//!
//! [`Synchronizer`] owns the local [`ClientState`] mirror and is the only
//! thing that mutates it. Edits are applied in one of three ways:
//!
//! - **optimistic**: the mirror changes first, the API call follows, and a
//!   failure restores the pre-edit snapshot and raises a [`Notice`];
//! - **confirmed**: create, copy and add-song wait for the server's record
//!   and merge it idempotently;
//! - **debounced**: title edits update the mirror on every keystroke and are
//!   submitted once the entity has been quiet for the configured delay.
//!
//! Events from the feed are folded in with [`Synchronizer::apply_event`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use setlist_core::models::{
    CopySetlist, CreateSetlist, CreateSong, Setlist, SetlistWithSongs, Song, UpdateSetlist,
    UpdateSong,
};
use setlist_core::ordering::{move_item, sequential_positions};
use setlist_core::setlist::{DEFAULT_SONG_TITLE, LAST_SETLIST_MESSAGE};
use setlist_core::types::DbId;
use setlist_events::ServerEvent;
use tokio::sync::mpsc;

use crate::api::SetlistApi;
use crate::debounce::Debouncer;
use crate::error::{ClientError, ClientResult};
use crate::feed::FeedHandle;
use crate::selection::SelectionStore;
use crate::state::{Applied, ClientState};

/// A message for the person using the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    /// Server or transport detail, when there is one.
    pub detail: Option<String>,
}

impl Notice {
    /// `"Failed to {action}. Please try again."`
    pub fn failed(action: &str, err: &ClientError) -> Self {
        Self {
            message: format!("Failed to {action}. Please try again."),
            detail: Some(err.user_message()),
        }
    }

    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }
}

/// Titles as they were before the current burst of keystrokes.
#[derive(Default)]
struct TitleOrigins {
    titles: Mutex<HashMap<DbId, String>>,
}

impl TitleOrigins {
    /// Record `title` unless a burst for `id` is already under way.
    fn remember(&self, id: DbId, title: &str) {
        self.titles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert_with(|| title.to_string());
    }

    fn take(&self, id: DbId) -> Option<String> {
        self.titles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    /// Make `origin` the revert point of a newer burst for `id`. Returns
    /// `false` if no newer burst has started.
    fn defer_to_newer(&self, id: DbId, origin: &str) -> bool {
        match self
            .titles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&id)
        {
            Some(pending) => {
                *pending = origin.to_string();
                true
            }
            None => false,
        }
    }
}

type SharedState = Arc<tokio::sync::Mutex<ClientState>>;

pub struct Synchronizer {
    api: Arc<dyn SetlistApi>,
    selection: Arc<dyn SelectionStore>,
    state: SharedState,
    feed: Option<FeedHandle>,
    notices: mpsc::UnboundedSender<Notice>,
    setlist_titles: Debouncer<DbId>,
    song_titles: Debouncer<DbId>,
    origins: Arc<TitleOrigins>,
}

impl Synchronizer {
    /// Create a synchronizer and the channel its notices are delivered on.
    ///
    /// * `debounce` - Quiet period before a title edit is submitted.
    pub fn new(
        api: Arc<dyn SetlistApi>,
        selection: Arc<dyn SelectionStore>,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notices, notice_rx) = mpsc::unbounded_channel();
        let sync = Self {
            api,
            selection,
            state: Arc::new(tokio::sync::Mutex::new(ClientState::default())),
            feed: None,
            notices,
            setlist_titles: Debouncer::new(debounce),
            song_titles: Debouncer::new(debounce),
            origins: Arc::new(TitleOrigins::default()),
        };
        (sync, notice_rx)
    }

    /// Keep the feed's membership in step with the selected setlist.
    pub fn with_feed(mut self, feed: FeedHandle) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Snapshot of the local mirror.
    pub async fn state(&self) -> ClientState {
        self.state.lock().await.clone()
    }

    // ---- loading and selection ----

    /// Fetch the setlist list and reselect the remembered setlist, falling
    /// back to the first active one.
    pub async fn load(&self) -> ClientResult<()> {
        let setlists = self.api.list_setlists().await?;
        let remembered = self.selection.load();
        let target = remembered
            .filter(|id| setlists.iter().any(|s| s.id == *id))
            .or_else(|| setlists.first().map(|s| s.id));

        tracing::debug!(
            count = setlists.len(),
            ?remembered,
            ?target,
            "Loaded setlists"
        );
        self.state.lock().await.set_setlists(setlists);

        match target {
            Some(id) => self.select(id).await,
            None => {
                self.state.lock().await.deselect();
                self.remember(None);
                Ok(())
            }
        }
    }

    /// Show setlist `id` with its songs.
    pub async fn select(&self, id: DbId) -> ClientResult<()> {
        // Join before fetching so nothing published in between is missed.
        self.join(id);
        match self.api.get_setlist(id).await {
            Ok(detail) => {
                self.show(detail).await;
                Ok(())
            }
            Err(e) => {
                if self.state.lock().await.current_id() != Some(id) {
                    self.leave(id);
                }
                Err(e)
            }
        }
    }

    async fn show(&self, detail: SetlistWithSongs) {
        let id = detail.setlist.id;
        let previous = {
            let mut state = self.state.lock().await;
            let previous = state.current_id();
            state.select(detail);
            previous
        };
        self.remember(Some(id));
        if let Some(previous) = previous.filter(|p| *p != id) {
            self.leave(previous);
        }
        tracing::info!(setlist_id = %id, "Selected setlist");
    }

    /// Move on after `lost` was removed: select `next`, or nothing.
    async fn follow(&self, lost: DbId, next: Option<DbId>) -> ClientResult<()> {
        self.leave(lost);
        match next {
            Some(next) => self.select(next).await,
            None => {
                self.remember(None);
                Ok(())
            }
        }
    }

    // ---- confirmed mutations ----

    /// Create a setlist and select it.
    pub async fn create_setlist(&self, title: Option<String>) -> ClientResult<Setlist> {
        let input = CreateSetlist {
            title,
            ..Default::default()
        };
        let created = self
            .api
            .create_setlist(&input)
            .await
            .map_err(|e| self.report("create the setlist", e))?;

        self.state.lock().await.upsert_setlist(created.clone());
        self.select(created.id).await?;
        Ok(created)
    }

    /// Copy the selected setlist and select the copy.
    pub async fn copy_setlist(&self, title: Option<String>) -> ClientResult<SetlistWithSongs> {
        let source = self.current_id().await?;
        let copy = self
            .api
            .copy_setlist(source, &CopySetlist { title })
            .await
            .map_err(|e| self.report("copy the setlist", e))?;

        self.join(copy.setlist.id);
        self.show(copy.clone()).await;
        Ok(copy)
    }

    /// Append a song titled [`DEFAULT_SONG_TITLE`] to the selected setlist.
    pub async fn add_song(&self) -> ClientResult<Song> {
        let setlist_id = self.current_id().await?;
        let input = CreateSong {
            title: DEFAULT_SONG_TITLE.to_string(),
            position: None,
        };
        let song = self
            .api
            .add_song(setlist_id, &input)
            .await
            .map_err(|e| self.report("add a song", e))?;

        self.state.lock().await.upsert_song(song.clone());
        Ok(song)
    }

    // ---- optimistic mutations ----

    /// Remove a setlist. The last remaining setlist is refused locally.
    pub async fn remove_setlist(&self, id: DbId) -> ClientResult<()> {
        let (snapshot, applied) = {
            let mut state = self.state.lock().await;
            if state.setlists.len() <= 1 {
                self.notify(Notice::refused(LAST_SETLIST_MESSAGE));
                return Err(ClientError::Refused(LAST_SETLIST_MESSAGE.to_string()));
            }
            let snapshot = state.clone();
            let applied = state.remove_setlist(id);
            (snapshot, applied)
        };

        if let Err(e) = self.api.remove_setlist(id).await {
            *self.state.lock().await = snapshot;
            return Err(self.report("delete the setlist", e));
        }

        if let Applied::SelectionLost { next } = applied {
            self.follow(id, next).await?;
        }
        Ok(())
    }

    pub async fn set_logo(&self, logo_url: impl Into<String>) -> ClientResult<()> {
        self.change_logo(Some(logo_url.into())).await
    }

    pub async fn remove_logo(&self) -> ClientResult<()> {
        self.change_logo(None).await
    }

    async fn change_logo(&self, logo_url: Option<String>) -> ClientResult<()> {
        let (id, previous) = {
            let mut state = self.state.lock().await;
            let current = state.current.as_ref().ok_or(ClientError::NoSelection)?;
            let (id, previous) = (current.id, current.logo_url.clone());
            state.edit_setlist(id, |s| s.logo_url = logo_url.clone());
            (id, previous)
        };

        let result = match &logo_url {
            Some(url) => {
                let input = UpdateSetlist {
                    logo_url: Some(url.clone()),
                    ..Default::default()
                };
                self.api.update_setlist(id, &input).await
            }
            None => self.api.clear_logo(id).await,
        };

        match result {
            Ok(setlist) => {
                self.state.lock().await.upsert_setlist(setlist);
                Ok(())
            }
            Err(e) => {
                self.state
                    .lock()
                    .await
                    .edit_setlist(id, |s| s.logo_url = previous.clone());
                Err(self.report("update the logo", e))
            }
        }
    }

    pub async fn delete_song(&self, song_id: DbId) -> ClientResult<()> {
        let (setlist_id, snapshot) = {
            let mut state = self.state.lock().await;
            let setlist_id = state.current_id().ok_or(ClientError::NoSelection)?;
            let snapshot = state.songs.clone();
            state.remove_song(song_id);
            (setlist_id, snapshot)
        };

        if let Err(e) = self.api.delete_song(setlist_id, song_id).await {
            self.state.lock().await.replace_songs(setlist_id, snapshot);
            return Err(self.report("delete the song", e));
        }
        Ok(())
    }

    /// Drag the song at index `from` to index `to` and submit the whole
    /// order, renumbered from 1. Out-of-range indices are ignored.
    pub async fn move_song(&self, from: usize, to: usize) -> ClientResult<()> {
        let (setlist_id, snapshot, positions) = {
            let mut state = self.state.lock().await;
            let setlist_id = state.current_id().ok_or(ClientError::NoSelection)?;
            if from == to {
                return Ok(());
            }
            let snapshot = state.songs.clone();
            if !move_item(&mut state.songs, from, to) {
                tracing::debug!(from, to, "Ignoring out-of-range move");
                return Ok(());
            }
            let positions = sequential_positions(state.songs.iter().map(|s| s.id));
            for (song, assigned) in state.songs.iter_mut().zip(&positions) {
                song.position = assigned.position;
            }
            (setlist_id, snapshot, positions)
        };

        match self.api.reorder_songs(setlist_id, &positions).await {
            Ok(songs) => {
                self.state.lock().await.replace_songs(setlist_id, songs);
                Ok(())
            }
            Err(e) => {
                self.state.lock().await.replace_songs(setlist_id, snapshot);
                Err(self.report("save the new song order", e))
            }
        }
    }

    /// Empty the selected setlist in one call.
    pub async fn clear_songs(&self) -> ClientResult<()> {
        let (setlist_id, snapshot) = {
            let mut state = self.state.lock().await;
            let setlist_id = state.current_id().ok_or(ClientError::NoSelection)?;
            (setlist_id, std::mem::take(&mut state.songs))
        };

        match self.api.clear_songs(setlist_id).await {
            Ok(deleted) => {
                tracing::debug!(%setlist_id, deleted, "Cleared setlist");
                Ok(())
            }
            Err(e) => {
                self.state.lock().await.replace_songs(setlist_id, snapshot);
                Err(self.report("clear the setlist", e))
            }
        }
    }

    // ---- debounced edits ----

    /// Retitle the selected setlist. Submitted after the debounce delay.
    pub async fn rename_setlist(&self, title: impl Into<String>) -> ClientResult<()> {
        let title = title.into();
        let id = {
            let mut state = self.state.lock().await;
            let current = state.current.as_ref().ok_or(ClientError::NoSelection)?;
            let id = current.id;
            self.origins.remember(id, &current.title);
            state.edit_setlist(id, |s| s.title = title.clone());
            id
        };

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let origins = Arc::clone(&self.origins);
        let notices = self.notices.clone();
        self.setlist_titles.schedule(id, async move {
            let origin = origins.take(id);
            let input = UpdateSetlist {
                title: Some(title),
                ..Default::default()
            };
            if let Err(e) = api.update_setlist(id, &input).await {
                if let Some(origin) = origin {
                    let mut state = state.lock().await;
                    if !origins.defer_to_newer(id, &origin) {
                        state.edit_setlist(id, |s| s.title = origin.clone());
                    }
                }
                send_notice(&notices, Notice::failed("save the setlist title", &e));
            }
        });
        Ok(())
    }

    /// Retitle a song of the selected setlist. Submitted after the debounce
    /// delay.
    pub async fn rename_song(&self, song_id: DbId, title: impl Into<String>) -> ClientResult<()> {
        let title = title.into();
        let setlist_id = {
            let mut state = self.state.lock().await;
            let setlist_id = state.current_id().ok_or(ClientError::NoSelection)?;
            let song = state
                .song(song_id)
                .ok_or_else(|| ClientError::Refused("Song is not in the selected setlist".into()))?;
            self.origins.remember(song_id, &song.title);
            state.rename_song(song_id, &title);
            setlist_id
        };

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let origins = Arc::clone(&self.origins);
        let notices = self.notices.clone();
        self.song_titles.schedule(song_id, async move {
            let origin = origins.take(song_id);
            let input = UpdateSong {
                title: Some(title),
                ..Default::default()
            };
            if let Err(e) = api.update_song(setlist_id, song_id, &input).await {
                if let Some(origin) = origin {
                    let mut state = state.lock().await;
                    if !origins.defer_to_newer(song_id, &origin) {
                        state.rename_song(song_id, &origin);
                    }
                }
                send_notice(&notices, Notice::failed("save the song title", &e));
            }
        });
        Ok(())
    }

    /// Title edits still waiting out their debounce delay.
    pub fn pending_edits(&self) -> usize {
        self.setlist_titles.pending_count() + self.song_titles.pending_count()
    }

    // ---- inbound events ----

    /// Fold a server event into the mirror. Follows the selection to the
    /// next setlist if the selected one was removed.
    pub async fn apply_event(&self, event: &ServerEvent) -> ClientResult<Applied> {
        let applied = self.state.lock().await.apply_event(event);
        if let (Applied::SelectionLost { next }, ServerEvent::SetlistRemoved { id }) =
            (applied, event)
        {
            tracing::info!(setlist_id = %id, "Selected setlist was removed");
            self.follow(*id, next).await?;
        }
        Ok(applied)
    }

    // ---- private helpers ----

    async fn current_id(&self) -> ClientResult<DbId> {
        self.state
            .lock()
            .await
            .current_id()
            .ok_or(ClientError::NoSelection)
    }

    fn join(&self, id: DbId) {
        if let Some(feed) = &self.feed {
            feed.join(id);
        }
    }

    fn leave(&self, id: DbId) {
        if let Some(feed) = &self.feed {
            feed.leave(id);
        }
    }

    fn remember(&self, id: Option<DbId>) {
        if let Err(e) = self.selection.save(id) {
            tracing::warn!(error = %e, "Failed to remember selected setlist");
        }
    }

    fn notify(&self, notice: Notice) {
        send_notice(&self.notices, notice);
    }

    /// Raise a failure notice for `action` and hand the error back.
    fn report(&self, action: &str, err: ClientError) -> ClientError {
        self.notify(Notice::failed(action, &err));
        err
    }
}

fn send_notice(notices: &mpsc::UnboundedSender<Notice>, notice: Notice) {
    tracing::warn!(notice = %notice.message, detail = ?notice.detail, "User notice raised");
    let _ = notices.send(notice);
}
