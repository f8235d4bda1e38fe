use std::{pin::pin, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query,
        State,
    },
    response::Response,
};
use futures_util::{Stream, StreamExt};
use grid_core::RowError;
use runtime::{event_stream, FeedMode, SessionEngine, StreamEvent};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    pub mode: Option<FeedMode>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SessionEnd {
    Exhausted,
    ClientClosed,
    SendFailed,
    BadRow,
}

pub async fn stream_socket(
    Query(query): Query<StreamQuery>,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    let mode = query.mode.unwrap_or(FeedMode::Sim);
    ws.on_upgrade(move |socket| run_session(socket, state, mode))
}

async fn run_session(mut socket: WebSocket, state: AppState, mode: FeedMode) {
    info!(mode = mode.as_str(), "stream session opened");
    let engine = SessionEngine::new();
    let interval = state.tick_interval();

    let end = match mode {
        FeedMode::Sim => pump(socket, event_stream(state.replay_source(), engine), interval).await,
        FeedMode::Live => match state.live_source() {
            Ok(source) => pump(socket, event_stream(source, engine), interval).await,
            Err(err) => {
                warn!(error = %err, "failed to build live price client");
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
        },
    };

    info!(mode = mode.as_str(), end = ?end, "stream session closed");
}

/// Forwards events until the stream runs dry, the client goes away, or a row
/// fails to parse. Dropping the stream on return releases its source.
async fn pump<S>(mut socket: WebSocket, events: S, interval: Duration) -> SessionEnd
where
    S: Stream<Item = Result<StreamEvent, RowError>>,
{
    let mut events = pin!(events);
    loop {
        tokio::select! {
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::ClientClosed,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(error = %err, "stream client errored");
                        return SessionEnd::ClientClosed;
                    }
                }
            }
            next = events.next() => {
                match next {
                    Some(Ok(event)) => {
                        if send_event(&mut socket, &event).await.is_err() {
                            return SessionEnd::SendFailed;
                        }
                        if !interval.is_zero() {
                            tokio::time::sleep(interval).await;
                        }
                    }
                    Some(Err(err)) => {
                        warn!(error = %err, "stream stopped on unreadable row");
                        let _ = socket.send(Message::Close(None)).await;
                        return SessionEnd::BadRow;
                    }
                    None => {
                        let _ = socket.send(Message::Close(None)).await;
                        return SessionEnd::Exhausted;
                    }
                }
            }
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &StreamEvent) -> Result<(), ()> {
    let payload = event_json(event)?;
    socket.send(Message::Text(payload)).await.map_err(|_| ())
}

fn event_json(event: &StreamEvent) -> Result<String, ()> {
    serde_json::to_string(event).map_err(|_| ())
}
