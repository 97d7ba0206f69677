//! Store contract checks shared by the in-memory and PostgreSQL suites.
//!
//! Each check starts from an empty store and asserts the behaviour every
//! [`SetlistStore`] implementation must provide.

#![allow(dead_code)]

use assert_matches::assert_matches;
use setlist_core::models::{
    CreateSetlist, CreateSong, Setlist, SongPosition, UpdateSetlist, UpdateSong,
};
use setlist_db::{RemoveOutcome, ReorderOutcome, SetlistStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub async fn new_setlist(store: &dyn SetlistStore, title: &str) -> Setlist {
    store
        .create_setlist(title, &CreateSetlist::default())
        .await
        .unwrap()
}

pub fn new_song(title: &str, position: Option<i32>) -> CreateSong {
    CreateSong {
        title: title.to_string(),
        position,
    }
}

async fn titles(store: &dyn SetlistStore, setlist: &Setlist) -> Vec<String> {
    store
        .list_songs(setlist.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect()
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

pub async fn list_excludes_inactive_and_orders_newest_first(store: &dyn SetlistStore) {
    let first = new_setlist(store, "First").await;
    let second = new_setlist(store, "Second").await;
    let third = new_setlist(store, "Third").await;

    assert_eq!(
        store.remove_setlist(second.id).await.unwrap(),
        RemoveOutcome::Removed
    );

    let listed: Vec<_> = store
        .list_setlists()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(listed, vec![third.id, first.id]);
    assert!(store.find_setlist(second.id).await.unwrap().is_none());
}

pub async fn last_active_setlist_cannot_be_removed(store: &dyn SetlistStore) {
    let only = new_setlist(store, "Only").await;

    assert_eq!(
        store.remove_setlist(only.id).await.unwrap(),
        RemoveOutcome::LastActive
    );
    assert!(store.find_setlist(only.id).await.unwrap().is_some());

    let other = new_setlist(store, "Other").await;
    assert_eq!(
        store.remove_setlist(only.id).await.unwrap(),
        RemoveOutcome::Removed
    );
    assert_eq!(
        store.remove_setlist(only.id).await.unwrap(),
        RemoveOutcome::NotFound
    );
    assert_eq!(
        store.remove_setlist(other.id).await.unwrap(),
        RemoveOutcome::LastActive
    );
}

pub async fn update_keeps_omitted_fields(store: &dyn SetlistStore) {
    let created = store
        .create_setlist(
            "Gig",
            &CreateSetlist {
                title: None,
                date: Some("06/13/2025".into()),
                logo_url: Some("data:image/png;base64,AAAA".into()),
            },
        )
        .await
        .unwrap();

    let updated = store
        .update_setlist(
            created.id,
            &UpdateSetlist {
                title: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("setlist should exist");

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.date.as_deref(), Some("06/13/2025"));
    assert_eq!(updated.logo_url, created.logo_url);

    let cleared = store.clear_logo(created.id).await.unwrap().unwrap();
    assert!(cleared.logo_url.is_none());
    assert_eq!(cleared.title, "Renamed");
}

pub async fn add_without_position_appends(store: &dyn SetlistStore) {
    let setlist = new_setlist(store, "Set").await;

    let first = store
        .add_song(setlist.id, &new_song("One", None))
        .await
        .unwrap();
    assert_eq!(first.position, 1);

    store
        .add_song(setlist.id, &new_song("Jump", Some(10)))
        .await
        .unwrap();
    let appended = store
        .add_song(setlist.id, &new_song("After", None))
        .await
        .unwrap();
    assert_eq!(appended.position, 11);
}

pub async fn append_after_max_position_saturates(store: &dyn SetlistStore) {
    let setlist = new_setlist(store, "Set").await;
    store
        .add_song(setlist.id, &new_song("Last", Some(i32::MAX)))
        .await
        .unwrap();

    let appended = store
        .add_song(setlist.id, &new_song("After", None))
        .await
        .unwrap();
    assert_eq!(appended.position, i32::MAX);
}

pub async fn copy_clones_songs_with_new_ids(store: &dyn SetlistStore) {
    let source = store
        .create_setlist(
            "Friday",
            &CreateSetlist {
                title: None,
                date: Some("Friday".into()),
                logo_url: Some("logo".into()),
            },
        )
        .await
        .unwrap();
    for (title, position) in [("A", 1), ("B", 2), ("C", 5)] {
        store
            .add_song(source.id, &new_song(title, Some(position)))
            .await
            .unwrap();
    }
    let original = store.list_songs(source.id).await.unwrap();

    let copy = store
        .copy_setlist(&source, "Friday (Copy)")
        .await
        .unwrap();

    assert_ne!(copy.setlist.id, source.id);
    assert_eq!(copy.setlist.title, "Friday (Copy)");
    assert_eq!(copy.setlist.date, source.date);
    assert_eq!(copy.setlist.logo_url, source.logo_url);

    let copied = store.list_songs(copy.setlist.id).await.unwrap();
    assert_eq!(copied.len(), original.len());
    for (a, b) in original.iter().zip(&copied) {
        assert_eq!(a.title, b.title);
        assert_eq!(a.position, b.position);
        assert_ne!(a.id, b.id);
        assert_eq!(b.setlist_id, copy.setlist.id);
    }
    assert_eq!(copy.songs, copied);
}

pub async fn reorder_applies_all_positions(store: &dyn SetlistStore) {
    let setlist = new_setlist(store, "Set").await;
    let a = store.add_song(setlist.id, &new_song("A", None)).await.unwrap();
    let b = store.add_song(setlist.id, &new_song("B", None)).await.unwrap();
    let c = store.add_song(setlist.id, &new_song("C", None)).await.unwrap();

    let outcome = store
        .reorder_songs(
            setlist.id,
            &[
                SongPosition { id: a.id, position: 3 },
                SongPosition { id: b.id, position: 1 },
                SongPosition { id: c.id, position: 2 },
            ],
        )
        .await
        .unwrap();

    let songs = assert_matches!(outcome, ReorderOutcome::Reordered(songs) => songs);
    let order: Vec<_> = songs.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(order, ["B", "C", "A"]);
    assert_eq!(titles(store, &setlist).await, ["B", "C", "A"]);
}

pub async fn reorder_with_foreign_song_changes_nothing(store: &dyn SetlistStore) {
    let setlist = new_setlist(store, "Set").await;
    let other = new_setlist(store, "Other").await;
    let a = store.add_song(setlist.id, &new_song("A", None)).await.unwrap();
    let b = store.add_song(setlist.id, &new_song("B", None)).await.unwrap();
    let foreign = store.add_song(other.id, &new_song("X", None)).await.unwrap();

    let outcome = store
        .reorder_songs(
            setlist.id,
            &[
                SongPosition { id: a.id, position: 9 },
                SongPosition { id: foreign.id, position: 0 },
                SongPosition { id: b.id, position: 8 },
            ],
        )
        .await
        .unwrap();

    assert_eq!(outcome, ReorderOutcome::UnknownSong(foreign.id));
    let songs = store.list_songs(setlist.id).await.unwrap();
    assert_eq!(songs[0].id, a.id);
    assert_eq!(songs[0].position, 1);
    assert_eq!(songs[1].position, 2);
    let foreign_after = store.list_songs(other.id).await.unwrap();
    assert_eq!(foreign_after[0].position, 1);
}

pub async fn song_updates_are_scoped_to_their_setlist(store: &dyn SetlistStore) {
    let setlist = new_setlist(store, "Set").await;
    let other = new_setlist(store, "Other").await;
    let song = store.add_song(setlist.id, &new_song("A", None)).await.unwrap();

    let wrong_scope = store
        .update_song(
            other.id,
            song.id,
            &UpdateSong {
                title: Some("Hijack".into()),
                position: None,
            },
        )
        .await
        .unwrap();
    assert!(wrong_scope.is_none());
    assert!(!store.delete_song(other.id, song.id).await.unwrap());

    let updated = store
        .update_song(
            setlist.id,
            song.id,
            &UpdateSong {
                title: Some("Renamed".into()),
                position: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.position, song.position);

    assert!(store.delete_song(setlist.id, song.id).await.unwrap());
    assert!(store.list_songs(setlist.id).await.unwrap().is_empty());
}

pub async fn clear_songs_removes_only_that_setlist(store: &dyn SetlistStore) {
    let setlist = new_setlist(store, "Set").await;
    let other = new_setlist(store, "Other").await;
    for title in ["A", "B", "C"] {
        store.add_song(setlist.id, &new_song(title, None)).await.unwrap();
    }
    store.add_song(other.id, &new_song("Keep", None)).await.unwrap();

    assert_eq!(store.clear_songs(setlist.id).await.unwrap(), 3);
    assert!(store.list_songs(setlist.id).await.unwrap().is_empty());
    assert_eq!(titles(store, &other).await, ["Keep"]);
}

pub async fn ensure_active_seeds_only_when_empty(store: &dyn SetlistStore) {
    let seeded = store
        .ensure_active_setlist("New Setlist")
        .await
        .unwrap()
        .expect("empty store should be seeded");
    assert_eq!(seeded.title, "New Setlist");
    assert!(seeded.is_active);

    assert!(store
        .ensure_active_setlist("New Setlist")
        .await
        .unwrap()
        .is_none());
    assert_eq!(store.list_setlists().await.unwrap().len(), 1);
}
