//! SQL access, one repository per table.

mod setlist_repo;
mod song_repo;

pub use setlist_repo::SetlistRepo;
pub use song_repo::SongRepo;
