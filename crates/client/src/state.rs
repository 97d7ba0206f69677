//! The client's local mirror of server state.
//!
//! [`ClientState`] is plain data: the setlist picker, the selected setlist
//! and its songs. Every mutation, local or from the event feed, goes
//! through the methods here so the mirror stays consistent.

use setlist_core::models::{Setlist, SetlistWithSongs, Song};
use setlist_core::ordering::sort_by_position;
use setlist_core::setlist::render_text;
use setlist_core::types::DbId;
use setlist_events::ServerEvent;

/// What applying a change did to the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Nothing visible changed.
    Ignored,
    Updated,
    /// The selected setlist disappeared; `next` should be selected instead.
    SelectionLost { next: Option<DbId> },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    /// Active setlists, newest first.
    pub setlists: Vec<Setlist>,
    pub current: Option<Setlist>,
    /// Songs of `current` in display order.
    pub songs: Vec<Song>,
}

impl ClientState {
    pub fn current_id(&self) -> Option<DbId> {
        self.current.as_ref().map(|s| s.id)
    }

    pub fn is_current(&self, setlist_id: DbId) -> bool {
        self.current_id() == Some(setlist_id)
    }

    pub fn set_setlists(&mut self, setlists: Vec<Setlist>) {
        self.setlists = setlists;
    }

    /// Make `detail` the selected setlist.
    pub fn select(&mut self, detail: SetlistWithSongs) {
        let SetlistWithSongs { setlist, mut songs } = detail;
        sort_by_position(&mut songs);
        self.upsert_setlist(setlist.clone());
        self.current = Some(setlist);
        self.songs = songs;
    }

    /// Forget the selection.
    pub fn deselect(&mut self) {
        self.current = None;
        self.songs.clear();
    }

    /// Insert a setlist at the top of the picker, or replace the entry with
    /// the same id. Applying the same record twice is harmless.
    pub fn upsert_setlist(&mut self, setlist: Setlist) {
        if self.is_current(setlist.id) {
            self.current = Some(setlist.clone());
        }
        match self.setlists.iter_mut().find(|s| s.id == setlist.id) {
            Some(existing) => *existing = setlist,
            None => self.setlists.insert(0, setlist),
        }
    }

    /// Drop a setlist from the picker.
    pub fn remove_setlist(&mut self, id: DbId) -> Applied {
        let before = self.setlists.len();
        self.setlists.retain(|s| s.id != id);
        if self.is_current(id) {
            self.deselect();
            return Applied::SelectionLost {
                next: self.setlists.first().map(|s| s.id),
            };
        }
        if self.setlists.len() == before {
            Applied::Ignored
        } else {
            Applied::Updated
        }
    }

    /// Apply `edit` to a setlist in the picker and, if selected, to
    /// `current`. Returns `false` if the setlist is unknown.
    pub fn edit_setlist(&mut self, id: DbId, edit: impl Fn(&mut Setlist)) -> bool {
        let mut found = false;
        if let Some(current) = self.current.as_mut().filter(|s| s.id == id) {
            edit(current);
            found = true;
        }
        if let Some(entry) = self.setlists.iter_mut().find(|s| s.id == id) {
            edit(entry);
            found = true;
        }
        found
    }

    pub fn song(&self, song_id: DbId) -> Option<&Song> {
        self.songs.iter().find(|s| s.id == song_id)
    }

    /// Insert or replace a song of the selected setlist, keeping display
    /// order. Songs of other setlists are ignored.
    pub fn upsert_song(&mut self, song: Song) -> Applied {
        if !self.is_current(song.setlist_id) {
            return Applied::Ignored;
        }
        match self.songs.iter_mut().find(|s| s.id == song.id) {
            Some(existing) if *existing == song => return Applied::Ignored,
            Some(existing) => *existing = song,
            None => self.songs.push(song),
        }
        sort_by_position(&mut self.songs);
        Applied::Updated
    }

    pub fn rename_song(&mut self, song_id: DbId, title: &str) -> bool {
        match self.songs.iter_mut().find(|s| s.id == song_id) {
            Some(song) => {
                song.title = title.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove_song(&mut self, song_id: DbId) -> Applied {
        let before = self.songs.len();
        self.songs.retain(|s| s.id != song_id);
        if self.songs.len() == before {
            Applied::Ignored
        } else {
            Applied::Updated
        }
    }

    /// Replace the selected setlist's songs if `setlist_id` is selected.
    pub fn replace_songs(&mut self, setlist_id: DbId, mut songs: Vec<Song>) -> Applied {
        if !self.is_current(setlist_id) {
            return Applied::Ignored;
        }
        sort_by_position(&mut songs);
        self.songs = songs;
        Applied::Updated
    }

    /// Fold in an event from the server. Events always win over local
    /// state; song events only touch the selected setlist.
    pub fn apply_event(&mut self, event: &ServerEvent) -> Applied {
        match event {
            ServerEvent::SetlistCreated(setlist) | ServerEvent::SetlistUpdated(setlist) => {
                self.upsert_setlist(setlist.clone());
                Applied::Updated
            }
            ServerEvent::SetlistRemoved { id } => self.remove_setlist(*id),
            ServerEvent::SongAdded { song, .. } | ServerEvent::SongUpdated { song, .. } => {
                self.upsert_song(song.clone())
            }
            ServerEvent::SongDeleted {
                setlist_id,
                song_id,
            } => {
                if self.is_current(*setlist_id) {
                    self.remove_song(*song_id)
                } else {
                    Applied::Ignored
                }
            }
            ServerEvent::SongsReordered { setlist_id, songs } => {
                self.replace_songs(*setlist_id, songs.clone())
            }
        }
    }

    /// Print-ready text of the selected setlist.
    pub fn rendered(&self) -> Option<String> {
        self.current
            .as_ref()
            .map(|setlist| render_text(setlist, &self.songs))
    }
}
