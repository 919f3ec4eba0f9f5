use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::sse::{Handshake, ServerEvent},
    error::ServiceError,
    state::SharedState,
};

/// Identifies the target SSE stream for connection logging.
#[derive(Clone, Copy, Debug)]
pub enum StreamKind {
    Public,
    Admin,
    Game(Uuid),
}

impl StreamKind {
    fn label(self) -> &'static str {
        match self {
            StreamKind::Public => "public",
            StreamKind::Admin => "admin",
            StreamKind::Game(_) => "game",
        }
    }
}

/// Subscribe to the shared public SSE stream.
pub fn subscribe_public(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.public_sse().subscribe()
}

/// Subscribe to the panel stream. Callers must have passed the panel gate.
pub fn subscribe_admin(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.admin_sse().subscribe()
}

/// Subscribe to the snapshots of one game session, counting as activity.
pub fn subscribe_game(
    state: &SharedState,
    session_id: Uuid,
) -> Result<broadcast::Receiver<ServerEvent>, ServiceError> {
    let session = state
        .session(session_id)
        .ok_or_else(|| ServiceError::NotFound(format!("game session {session_id}")))?;
    session.touch();
    Ok(session.hub().subscribe())
}

/// First event sent on every new connection.
pub async fn handshake(state: &SharedState, kind: StreamKind) -> Option<ServerEvent> {
    let payload = Handshake {
        stream: kind.label().to_string(),
        message: format!("{} stream connected", kind.label()),
        degraded: state.is_degraded().await,
    };
    match ServerEvent::json(Some("handshake".to_string()), &payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to serialize SSE handshake");
            None
        }
    }
}

fn to_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}

async fn session_closed(signal: &mut Option<watch::Receiver<()>>) {
    match signal {
        Some(closed) => {
            let _ = closed.changed().await;
        }
        None => std::future::pending().await,
    }
}

/// Convert a broadcast receiver into an SSE response, forwarding events until
/// the client disconnects or the hub goes away. With a `closed` signal the
/// stream also ends when that signal fires, e.g. when the panel is locked.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    kind: StreamKind,
    greeting: Option<ServerEvent>,
    mut closed: Option<watch::Receiver<()>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    info!(stream = kind.label(), "new SSE connection");

    tokio::spawn(async move {
        if let Some(greeting) = greeting {
            if tx.send(Ok(to_event(greeting))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                biased;
                _ = session_closed(&mut closed) => {
                    info!(stream = kind.label(), "SSE session closed, ending stream");
                    break;
                }
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // Skip lagged messages but keep the stream alive.
                            warn!(stream = kind.label(), skipped, "SSE subscriber lagging");
                            continue;
                        }
                    }
                }
            }
        }

        match kind {
            StreamKind::Game(id) => info!(session_id = %id, "game SSE stream disconnected"),
            other => info!(stream = other.label(), "SSE stream disconnected"),
        }
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
