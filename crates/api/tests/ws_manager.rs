//! Unit tests for `WsManager`.
//!
//! These exercise the connection manager directly, without HTTP upgrades:
//! add/remove bookkeeping, membership, scoped dispatch and shutdown.

use axum::extract::ws::Message;
use setlist_api::ws::WsManager;
use setlist_core::types::DbId;
use setlist_events::{Scope, ScopedEvent, ServerEvent};

fn song_deleted(setlist_id: DbId) -> ScopedEvent {
    ScopedEvent {
        scope: Scope::Setlist(setlist_id),
        event: ServerEvent::SongDeleted {
            setlist_id,
            song_id: DbId::new_v4(),
        },
    }
}

fn setlist_removed() -> ScopedEvent {
    ScopedEvent {
        scope: Scope::Global,
        event: ServerEvent::SetlistRemoved { id: DbId::new_v4() },
    }
}

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let _rx = manager.add("conn-1".to_string()).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn join_and_leave_update_membership() {
    let manager = WsManager::new();
    let setlist_id = DbId::new_v4();
    let _rx = manager.add("conn-1".to_string()).await;

    assert!(manager.join("conn-1", setlist_id).await);
    assert!(!manager.join("ghost", setlist_id).await);
    assert_eq!(manager.member_count(setlist_id).await, 1);

    assert!(manager.leave("conn-1", setlist_id).await);
    assert!(!manager.leave("conn-1", setlist_id).await);
    assert_eq!(manager.member_count(setlist_id).await, 0);
}

#[tokio::test]
async fn global_events_reach_every_connection() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    let delivered = manager.dispatch(&setlist_removed()).await;

    assert_eq!(delivered, 2);
    assert!(matches!(rx1.try_recv(), Ok(Message::Text(_))));
    assert!(matches!(rx2.try_recv(), Ok(Message::Text(_))));
}

#[tokio::test]
async fn setlist_events_reach_only_joined_connections() {
    let manager = WsManager::new();
    let watched = DbId::new_v4();
    let mut viewer = manager.add("viewer".to_string()).await;
    let mut bystander = manager.add("bystander".to_string()).await;
    manager.join("viewer", watched).await;
    manager.join("bystander", DbId::new_v4()).await;

    let delivered = manager.dispatch(&song_deleted(watched)).await;

    assert_eq!(delivered, 1);
    let Ok(Message::Text(text)) = viewer.try_recv() else {
        panic!("viewer should receive a text frame");
    };
    let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(json["event"], "song:deleted");
    assert_eq!(json["data"]["setlist_id"], watched.to_string());
    assert!(bystander.try_recv().is_err());
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(matches!(rx.recv().await, Some(Message::Close(None))));
}

#[tokio::test]
async fn ping_all_sends_ping_frames() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.ping_all().await;

    assert!(matches!(rx.try_recv(), Ok(Message::Ping(_))));
}
