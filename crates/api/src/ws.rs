//! Real-time notification stream over WebSocket.
//!
//! Each connection subscribes to the caller's own delivery topic; the
//! subscription is dropped (and the topic pruned) when the socket
//! closes.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use aegle_events::DeliveryChannel;

use crate::identity::Identity;
use crate::state::AppState;

/// GET /api/v1/ws -- upgrade to a WebSocket carrying the caller's
/// notification pushes as JSON text frames.
pub async fn ws_handler(
    identity: Identity,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let topic = identity.recipient().topic();
    ws.on_upgrade(move |socket| handle_socket(socket, state.channel, topic))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Subscribes to the caller's delivery topic.
///   2. Spawns a sender task forwarding pushed messages to the sink.
///   3. Processes inbound frames on the current task.
///   4. Unsubscribes on disconnect.
async fn handle_socket(socket: WebSocket, channel: Arc<DeliveryChannel>, topic: String) {
    tracing::info!(topic = %topic, "WebSocket connected");

    let mut subscription = channel.subscribe(&topic).await;
    let (mut sink, mut stream) = socket.split();

    let sender_topic = topic.clone();
    let send_task = tokio::spawn(async move {
        while let Some(push) = subscription.recv().await {
            let text = match serde_json::to_string(&push) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(topic = %sender_topic, error = %e, "Push not serializable");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                tracing::debug!(topic = %sender_topic, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: the stream is push-only, inbound frames are only
    // connection lifecycle.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(topic = %topic, "Pong received");
            }
            Ok(_msg) => {}
            Err(e) => {
                tracing::debug!(topic = %topic, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Aborting the sender drops the subscription, which unsubscribes.
    send_task.abort();
    tracing::info!(topic = %topic, "WebSocket disconnected");
}
