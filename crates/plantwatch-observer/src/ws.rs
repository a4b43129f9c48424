//! `WebSocket` handler for the real-time fleet snapshot feed.
//!
//! Clients connect to `GET /ws/feed` and receive a JSON-encoded
//! [`FleetSnapshot`] per event: the current snapshot immediately on
//! join, then every snapshot the tick driver publishes afterwards.
//! The join snapshot is never re-delivered (the subscription filters
//! by sequence number), and a client that falls behind skips lagged
//! snapshots and resumes from the most recent one.
//!
//! A send failure or close frame is treated as a disconnect for that
//! subscriber only: the handler unregisters it and returns without
//! touching anyone else's delivery.
//!
//! [`FleetSnapshot`]: plantwatch_types::FleetSnapshot

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};

use plantwatch_types::FleetSnapshot;

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming fleet snapshots.
///
/// # Route
///
/// `GET /ws/feed`
pub async fn ws_feed(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: replay the current snapshot, then
/// forward each published snapshot as a text frame.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut subscription = state.store.subscribe().await;
    let subscriber = subscription.id();
    debug!(%subscriber, "WebSocket client connected");

    // Immediate replay of the current snapshot before any broadcast.
    let joined = subscription.join_snapshot();
    if send_snapshot(&mut socket, &joined).await.is_err() {
        let _ = state.store.unsubscribe(subscriber).await;
        debug!(%subscriber, "WebSocket client disconnected (join send failed)");
        return;
    }

    loop {
        tokio::select! {
            // Receive the next published snapshot from the driver.
            published = subscription.next() => {
                match published {
                    Some(snapshot) => {
                        if send_snapshot(&mut socket, &snapshot).await.is_err() {
                            debug!(%subscriber, "WebSocket client disconnected (send failed)");
                            break;
                        }
                    }
                    None => {
                        debug!(%subscriber, "feed channel closed, shutting down WebSocket");
                        break;
                    }
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%subscriber, "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let pong = Message::Pong(data);
                        if socket.send(pong).await.is_err() {
                            debug!(%subscriber, "WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%subscriber, "WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Ignore other message types (text, binary from client).
                    }
                }
            }
        }
    }

    let _ = state.store.unsubscribe(subscriber).await;
}

/// Serialize a snapshot and send it as a text frame.
///
/// A serialization failure is logged and swallowed (the connection
/// stays up); a transport failure is returned so the caller can treat
/// it as a disconnect.
async fn send_snapshot(socket: &mut WebSocket, snapshot: &FleetSnapshot) -> Result<(), ()> {
    let json = match serde_json::to_string(snapshot) {
        Ok(json) => json,
        Err(e) => {
            warn!("failed to serialize fleet snapshot: {e}");
            return Ok(());
        }
    };
    let msg: Message = Message::Text(json.into());
    socket.send(msg).await.map_err(|_err| ())
}
