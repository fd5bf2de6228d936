//! Order events WebSocket endpoint (后厨/管理端实时推送)
//!
//! GET /ws/orders
//!
//! Server → client frames: `{"event": "<name>", "data": ...}` where name is
//! `payment-success`, `order-status-updated`, or `resync` after this client
//! fell behind and should re-poll `/admin/orders`. Incoming client frames
//! are ignored apart from close.

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::core::ServerState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws/orders", get(handle_orders_ws))
}

/// GET /ws/orders
pub async fn handle_orders_ws(
    State(state): State<ServerState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| orders_ws_session(socket, state))
}

async fn orders_ws_session(socket: WebSocket, state: ServerState) {
    let (mut sink, mut stream) = socket.split();
    let mut events = state.events.subscribe();
    let shutdown = state.shutdown.clone();

    tracing::info!(subscribers = state.events.subscriber_count(), "Realtime client connected");

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }

            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if send_frame(&mut sink, &event.to_frame()).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "Realtime client lagged, asking it to resync");
                        let frame = json!({ "event": "resync", "data": { "missed": n } });
                        if send_frame(&mut sink, &frame).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    tracing::info!("Realtime client disconnected");
}

async fn send_frame<S>(sink: &mut S, frame: &Value) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let text = serde_json::to_string(frame).map_err(|_| ())?;
    sink.send(Message::Text(text.into())).await.map_err(|_| ())
}
