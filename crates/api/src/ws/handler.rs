use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use setlist_events::ClientMessage;

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// GET /api/ws -- upgrade to a WebSocket carrying setlist events.
///
/// A fresh connection receives global events only; it joins setlists with
/// `{"type": "join-setlist", "setlist_id": "..."}`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Outbound messages flow from the manager channel through a spawned sender
/// task; inbound control messages are handled on the current task.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_client_message(&ws_manager, &conn_id, text.as_str()).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Apply a join/leave control message. Unknown payloads are ignored.
async fn handle_client_message(ws_manager: &WsManager, conn_id: &str, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::JoinSetlist { setlist_id }) => {
            ws_manager.join(conn_id, setlist_id).await;
            tracing::debug!(conn_id, %setlist_id, "Joined setlist");
        }
        Ok(ClientMessage::LeaveSetlist { setlist_id }) => {
            ws_manager.leave(conn_id, setlist_id).await;
            tracing::debug!(conn_id, %setlist_id, "Left setlist");
        }
        Err(e) => {
            tracing::debug!(conn_id, error = %e, "Ignoring malformed client message");
        }
    }
}
