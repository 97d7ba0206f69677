//! Persistence of the last-viewed setlist.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use setlist_core::types::DbId;

use crate::error::ClientResult;

/// Remembers which setlist the user was looking at.
pub trait SelectionStore: Send + Sync {
    /// The remembered id, if any. Unreadable state counts as none.
    fn load(&self) -> Option<DbId>;

    /// Remember `id`, or forget the selection with `None`.
    fn save(&self, id: Option<DbId>) -> ClientResult<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SelectionFile {
    current_setlist_id: Option<DbId>,
}

/// Selection kept in a small JSON file.
pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SelectionStore for FileSelectionStore {
    fn load(&self) -> Option<DbId> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "No selection file");
                return None;
            }
        };
        match serde_json::from_str::<SelectionFile>(&text) {
            Ok(file) => file.current_setlist_id,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt selection file");
                None
            }
        }
    }

    fn save(&self, id: Option<DbId>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = SelectionFile {
            current_setlist_id: id,
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

/// Process-local selection, forgotten on exit.
#[derive(Default)]
pub struct MemorySelectionStore {
    current: Mutex<Option<DbId>>,
}

impl MemorySelectionStore {
    pub fn new(initial: Option<DbId>) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }
}

impl SelectionStore for MemorySelectionStore {
    fn load(&self) -> Option<DbId> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, id: Option<DbId>) -> ClientResult<()> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = id;
        Ok(())
    }
}
