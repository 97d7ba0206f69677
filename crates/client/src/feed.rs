//! WebSocket event feed with automatic reconnection.
//!
//! [`EventFeed::spawn`] connects to the server's `/api/ws` endpoint and
//! yields decoded [`ServerEvent`]s on a channel. Joined setlists are
//! remembered and re-joined after every reconnect. The [`FeedHandle`]
//! changes membership and stops the feed.

use std::collections::HashSet;
use std::time::Duration;

use futures::{Sink, SinkExt, StreamExt};
use setlist_core::types::DbId;
use setlist_events::{ClientMessage, ServerEvent};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Reconnection delay after a WebSocket failure.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug)]
enum FeedCommand {
    Join(DbId),
    Leave(DbId),
    Shutdown,
}

/// Control side of a running [`EventFeed`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    commands: mpsc::UnboundedSender<FeedCommand>,
}

impl FeedHandle {
    /// Start receiving a setlist's events (kept across reconnects).
    pub fn join(&self, setlist_id: DbId) {
        let _ = self.commands.send(FeedCommand::Join(setlist_id));
    }

    pub fn leave(&self, setlist_id: DbId) {
        let _ = self.commands.send(FeedCommand::Leave(setlist_id));
    }

    /// Close the connection and stop reconnecting.
    pub fn shutdown(&self) {
        let _ = self.commands.send(FeedCommand::Shutdown);
    }
}

enum SessionEnd {
    Disconnected,
    Shutdown,
}

pub struct EventFeed {
    url: String,
    reconnect_delay: Duration,
}

impl EventFeed {
    /// * `url` - WebSocket URL, e.g. `ws://localhost:3000/api/ws`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Run the feed on a background task.
    ///
    /// The task ends on [`FeedHandle::shutdown`], when every handle is
    /// dropped, or when the event receiver is dropped.
    pub fn spawn(self) -> (FeedHandle, mpsc::UnboundedReceiver<ServerEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        tokio::spawn(self.run(command_rx, event_tx));
        (
            FeedHandle {
                commands: command_tx,
            },
            event_rx,
        )
    }

    async fn run(
        self,
        mut commands: mpsc::UnboundedReceiver<FeedCommand>,
        events: mpsc::UnboundedSender<ServerEvent>,
    ) {
        let mut joined = HashSet::new();

        while !events.is_closed() {
            tracing::info!(url = %self.url, "Connecting to event feed");

            match connect_async(self.url.as_str()).await {
                Ok((ws_stream, _response)) => {
                    tracing::info!("Event feed connected");
                    match run_session(ws_stream, &mut joined, &mut commands, &events).await {
                        SessionEnd::Shutdown => break,
                        SessionEnd::Disconnected => {
                            tracing::warn!("Event feed disconnected, reconnecting");
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Event feed connection failed");
                }
            }

            // Keep tracking membership while waiting to reconnect.
            let sleep = tokio::time::sleep(self.reconnect_delay);
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    () = &mut sleep => break,
                    command = commands.recv() => match command {
                        Some(FeedCommand::Join(id)) => {
                            joined.insert(id);
                        }
                        Some(FeedCommand::Leave(id)) => {
                            joined.remove(&id);
                        }
                        Some(FeedCommand::Shutdown) | None => {
                            tracing::info!("Event feed stopped");
                            return;
                        }
                    },
                }
            }
        }

        tracing::info!("Event feed stopped");
    }
}

/// Drive one connection: replay joins, then forward events and commands
/// until either side goes away.
async fn run_session(
    ws_stream: WsStream,
    joined: &mut HashSet<DbId>,
    commands: &mut mpsc::UnboundedReceiver<FeedCommand>,
    events: &mpsc::UnboundedSender<ServerEvent>,
) -> SessionEnd {
    let (mut sink, mut stream) = ws_stream.split();

    for setlist_id in joined.iter().copied() {
        if send_control(&mut sink, ClientMessage::JoinSetlist { setlist_id })
            .await
            .is_err()
        {
            return SessionEnd::Disconnected;
        }
    }

    loop {
        tokio::select! {
            command = commands.recv() => {
                let message = match command {
                    Some(FeedCommand::Join(setlist_id)) => {
                        joined.insert(setlist_id);
                        ClientMessage::JoinSetlist { setlist_id }
                    }
                    Some(FeedCommand::Leave(setlist_id)) => {
                        joined.remove(&setlist_id);
                        ClientMessage::LeaveSetlist { setlist_id }
                    }
                    Some(FeedCommand::Shutdown) | None => {
                        let _ = sink.send(Message::Close(None)).await;
                        return SessionEnd::Shutdown;
                    }
                };
                if let Err(e) = send_control(&mut sink, message).await {
                    tracing::error!(error = %e, "Failed to send feed control message");
                    return SessionEnd::Disconnected;
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => {
                                tracing::debug!(event = event.name(), "Feed event");
                                if events.send(event).is_err() {
                                    return SessionEnd::Shutdown;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Skipping undecodable feed message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Server closed event feed");
                        return SessionEnd::Disconnected;
                    }
                    Some(Ok(_)) => {
                        // Pings are answered by tungstenite.
                    }
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Event feed receive error");
                        return SessionEnd::Disconnected;
                    }
                    None => return SessionEnd::Disconnected,
                }
            }
        }
    }
}

async fn send_control<S>(
    sink: &mut S,
    message: ClientMessage,
) -> Result<(), tokio_tungstenite::tungstenite::Error>
where
    S: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    // ClientMessage always serializes.
    let text = serde_json::to_string(&message).unwrap_or_default();
    sink.send(Message::Text(text)).await
}
