//! Setlist naming rules and the plain-text print export.

use crate::models::{Setlist, Song};
use crate::ordering::sort_by_position;

/// Title given to a setlist created without one.
pub const DEFAULT_SETLIST_TITLE: &str = "New Setlist";

/// Title given to a song added from the client's "add" action.
pub const DEFAULT_SONG_TITLE: &str = "New Song";

/// Message of the error returned when removing the only active setlist.
pub const LAST_SETLIST_MESSAGE: &str = "Cannot delete the last setlist";

/// Treat a missing or blank title as absent.
fn non_blank(title: Option<&str>) -> Option<&str> {
    title.filter(|t| !t.trim().is_empty())
}

/// Title for a new blank setlist.
pub fn resolve_title(requested: Option<&str>) -> String {
    non_blank(requested)
        .unwrap_or(DEFAULT_SETLIST_TITLE)
        .to_string()
}

/// Title for a copy of `source_title`, unless the caller asked for one.
pub fn copy_title(source_title: &str, requested: Option<&str>) -> String {
    match non_blank(requested) {
        Some(title) => title.to_string(),
        None => format!("{source_title} (Copy)"),
    }
}

/// Render a setlist as numbered plain text, ready to print.
///
/// ```text
/// Friday at the Anchor
/// 06/13/2025
///
/// 1. Opener
/// 2. Second
/// ```
pub fn render_text(setlist: &Setlist, songs: &[Song]) -> String {
    let mut ordered = songs.to_vec();
    sort_by_position(&mut ordered);

    let mut out = String::new();
    out.push_str(&setlist.title);
    out.push('\n');
    if let Some(date) = non_blank(setlist.date.as_deref()) {
        out.push_str(date);
        out.push('\n');
    }
    out.push('\n');
    for (n, song) in ordered.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", n + 1, song.title));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DbId;
    use chrono::Utc;

    fn setlist(title: &str, date: Option<&str>) -> Setlist {
        let now = Utc::now();
        Setlist {
            id: DbId::new_v4(),
            title: title.into(),
            date: date.map(Into::into),
            logo_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn song(setlist_id: DbId, title: &str, position: i32) -> Song {
        Song {
            id: DbId::new_v4(),
            setlist_id,
            title: title.into(),
            position,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn blank_title_falls_back_to_default() {
        assert_eq!(resolve_title(None), "New Setlist");
        assert_eq!(resolve_title(Some("   ")), "New Setlist");
        assert_eq!(resolve_title(Some("Gig")), "Gig");
    }

    #[test]
    fn copy_title_appends_suffix_unless_overridden() {
        assert_eq!(copy_title("Friday", None), "Friday (Copy)");
        assert_eq!(copy_title("Friday", Some("")), "Friday (Copy)");
        assert_eq!(copy_title("Friday", Some("Saturday")), "Saturday");
    }

    #[test]
    fn render_text_numbers_songs_in_position_order() {
        let list = setlist("Friday", Some("06/13/2025"));
        let songs = vec![
            song(list.id, "Closer", 30),
            song(list.id, "Opener", 10),
            song(list.id, "Middle", 20),
        ];

        let text = render_text(&list, &songs);
        assert_eq!(
            text,
            "Friday\n06/13/2025\n\n1. Opener\n2. Middle\n3. Closer\n"
        );
    }

    #[test]
    fn render_text_skips_missing_date() {
        let list = setlist("Empty", None);
        assert_eq!(render_text(&list, &[]), "Empty\n\n");
    }
}
