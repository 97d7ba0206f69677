//! Event and control-message wire formats.
//!
//! Server events are encoded as `{"event": "<name>", "data": <payload>}`;
//! client messages as `{"type": "join-setlist", "setlist_id": "<uuid>"}`.

use serde::{Deserialize, Serialize};
use setlist_core::models::{Setlist, Song};
use setlist_core::types::DbId;

use crate::bus::Scope;

/// A change pushed from the server to subscribed clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "setlist:created")]
    SetlistCreated(Setlist),

    #[serde(rename = "setlist:updated")]
    SetlistUpdated(Setlist),

    #[serde(rename = "setlist:removed")]
    SetlistRemoved { id: DbId },

    #[serde(rename = "song:added")]
    SongAdded { setlist_id: DbId, song: Song },

    #[serde(rename = "song:updated")]
    SongUpdated { setlist_id: DbId, song: Song },

    #[serde(rename = "song:deleted")]
    SongDeleted { setlist_id: DbId, song_id: DbId },

    #[serde(rename = "songs:reordered")]
    SongsReordered { setlist_id: DbId, songs: Vec<Song> },
}

impl ServerEvent {
    /// Wire name of the event, e.g. `"song:updated"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetlistCreated(_) => "setlist:created",
            Self::SetlistUpdated(_) => "setlist:updated",
            Self::SetlistRemoved { .. } => "setlist:removed",
            Self::SongAdded { .. } => "song:added",
            Self::SongUpdated { .. } => "song:updated",
            Self::SongDeleted { .. } => "song:deleted",
            Self::SongsReordered { .. } => "songs:reordered",
        }
    }

    /// The scope this event is delivered to.
    ///
    /// Creation and removal concern every client's setlist picker; all
    /// other events only matter to viewers of that setlist.
    pub fn scope(&self) -> Scope {
        match self {
            Self::SetlistCreated(_) | Self::SetlistRemoved { .. } => Scope::Global,
            Self::SetlistUpdated(setlist) => Scope::Setlist(setlist.id),
            Self::SongAdded { setlist_id, .. }
            | Self::SongUpdated { setlist_id, .. }
            | Self::SongDeleted { setlist_id, .. }
            | Self::SongsReordered { setlist_id, .. } => Scope::Setlist(*setlist_id),
        }
    }
}

/// A control message sent by a client over its WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Start receiving the events of a setlist.
    JoinSetlist { setlist_id: DbId },
    /// Stop receiving the events of a setlist.
    LeaveSetlist { setlist_id: DbId },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn song(setlist_id: DbId) -> Song {
        Song {
            id: DbId::new_v4(),
            setlist_id,
            title: "Opener".into(),
            position: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn song_event_encodes_name_and_payload() {
        let setlist_id = DbId::new_v4();
        let event = ServerEvent::SongUpdated {
            setlist_id,
            song: song(setlist_id),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "song:updated");
        assert_eq!(json["data"]["setlist_id"], setlist_id.to_string());
        assert_eq!(json["data"]["song"]["title"], "Opener");
        assert_eq!(event.name(), "song:updated");
    }

    #[test]
    fn removal_decodes_from_wire_text() {
        let id = DbId::new_v4();
        let text = format!(r#"{{"event":"setlist:removed","data":{{"id":"{id}"}}}}"#);
        let event: ServerEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(event, ServerEvent::SetlistRemoved { id });
        assert_eq!(event.scope(), Scope::Global);
    }

    #[test]
    fn song_events_are_scoped_to_their_setlist() {
        let setlist_id = DbId::new_v4();
        let event = ServerEvent::SongDeleted {
            setlist_id,
            song_id: DbId::new_v4(),
        };
        assert_eq!(event.scope(), Scope::Setlist(setlist_id));

        let event = ServerEvent::SongsReordered {
            setlist_id,
            songs: vec![],
        };
        assert_eq!(event.scope(), Scope::Setlist(setlist_id));
    }

    #[test]
    fn join_message_uses_kebab_case_type() {
        let setlist_id = DbId::new_v4();
        let text = format!(r#"{{"type":"join-setlist","setlist_id":"{setlist_id}"}}"#);
        let msg: ClientMessage = serde_json::from_str(&text).unwrap();
        assert_eq!(msg, ClientMessage::JoinSetlist { setlist_id });

        let leave = serde_json::to_value(ClientMessage::LeaveSetlist { setlist_id }).unwrap();
        assert_eq!(leave["type"], "leave-setlist");
    }
}
