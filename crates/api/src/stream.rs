//! The live broadcast fabric.
//!
//! `/stream` subscribers receive every published event: data messages and
//! governance activity. Fan-out is best-effort per subscriber — a slow or
//! broken socket is disconnected rather than stalling the publisher. The
//! server pings on the heartbeat interval and drops clients that stay
//! silent for two intervals.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{ApiError, Result};
use crate::state::{now_ms, AppState};

/// WebSocket close code sent when the subscriber cap is reached
/// (1013 = try again later).
const CLOSE_CAPACITY: u16 = 1013;

type WsSender = SplitSink<WebSocket, WsMessage>;

/// Counts active subscribers and refuses new ones over the cap.
#[derive(Clone)]
pub struct SubscriberRegistry {
    max: usize,
    count: Arc<AtomicUsize>,
}

/// Held for the lifetime of one subscriber; releases the slot on drop.
pub struct SubscriberSlot {
    count: Arc<AtomicUsize>,
}

impl SubscriberRegistry {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Claim a slot, unless the registry is full.
    pub fn try_acquire(&self) -> Option<SubscriberSlot> {
        let claimed = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                if n < self.max {
                    Some(n + 1)
                } else {
                    None
                }
            });
        claimed.ok().map(|_| SubscriberSlot {
            count: self.count.clone(),
        })
    }

    pub fn active(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Drop for SubscriberSlot {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// GET /stream — upgrade and join the broadcast.
pub async fn stream_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: Arc<AppState>, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();

    let Some(slot) = state.subscribers.try_acquire() else {
        let _ = sender
            .send(WsMessage::Close(Some(CloseFrame {
                code: CLOSE_CAPACITY,
                reason: "subscriber capacity reached".into(),
            })))
            .await;
        return;
    };
    let active = state.subscribers.active();
    info!(active, "stream subscriber connected");

    let hello = json!({
        "type": "connected",
        "subscribers": active,
        "timestamp": now_ms(),
    });
    if sender.send(WsMessage::Text(hello.to_string())).await.is_err() {
        drop(slot);
        return;
    }

    let mut events = state.events.subscribe();
    let heartbeat = Duration::from_millis(state.cfg.heartbeat_ms);
    let mut ping_timer = tokio::time::interval(heartbeat);
    // the first tick completes immediately; skip it
    ping_timer.tick().await;
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(payload) => {
                    if sender.send(WsMessage::Text(payload)).await.is_err() {
                        break;
                    }
                }
                // lagging behind the channel means this client is too slow
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "subscriber lagged, disconnecting");
                    break;
                }
                Err(RecvError::Closed) => break,
            },
            inbound = receiver.next() => match inbound {
                Some(Ok(frame)) => {
                    if !handle_frame(&state, &mut sender, frame, &mut last_seen).await {
                        break;
                    }
                }
                _ => break,
            },
            _ = ping_timer.tick() => {
                // two silent intervals terminate the subscriber
                if last_seen.elapsed() >= heartbeat * 2 {
                    debug!("subscriber missed heartbeat, terminating");
                    break;
                }
                if sender.send(WsMessage::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(slot);
    info!(active = state.subscribers.active(), "stream subscriber disconnected");
}

/// Returns false when the connection should close.
async fn handle_frame(
    state: &AppState,
    sender: &mut WsSender,
    frame: WsMessage,
    last_seen: &mut Instant,
) -> bool {
    match frame {
        WsMessage::Pong(_) => {
            *last_seen = Instant::now();
            true
        }
        WsMessage::Ping(_) => {
            // the transport answers pings; this still counts as liveness
            *last_seen = Instant::now();
            true
        }
        WsMessage::Text(text) => {
            *last_seen = Instant::now();
            if text.len() > state.cfg.max_frame_bytes {
                return send_error_event(sender, "too_large", "frame exceeds size limit").await;
            }
            match serde_json::from_str::<Value>(&text) {
                Ok(value) if value["type"] == "ping" => {
                    let pong = json!({ "type": "pong", "timestamp": now_ms() });
                    sender.send(WsMessage::Text(pong.to_string())).await.is_ok()
                }
                Ok(_) => true,
                Err(_) => send_error_event(sender, "invalid_input", "frame is not JSON").await,
            }
        }
        WsMessage::Binary(bytes) => {
            *last_seen = Instant::now();
            if bytes.len() > state.cfg.max_frame_bytes {
                return send_error_event(sender, "too_large", "frame exceeds size limit").await;
            }
            true
        }
        WsMessage::Close(_) => false,
    }
}

async fn send_error_event(sender: &mut WsSender, kind: &str, message: &str) -> bool {
    let event = json!({
        "type": "error",
        "error": kind,
        "message": message,
        "timestamp": now_ms(),
    });
    sender.send(WsMessage::Text(event.to_string())).await.is_ok()
}

/// POST /stream/broadcast (admin) — push an arbitrary event to all
/// subscribers.
pub async fn admin_broadcast(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<Json<Value>> {
    let token = headers.get("x-admin-token").and_then(|v| v.to_str().ok());
    if !state.is_admin(token) {
        return Err(ApiError::Unauthorized);
    }
    let _ = state.events.send(payload.to_string());
    Ok(Json(json!({
        "success": true,
        "subscribers": state.subscribers.active(),
    })))
}
