//! Per-topic publish/subscribe hub backed by `tokio::sync::broadcast`.
//!
//! Each topic owns an independent broadcast channel, created lazily on
//! first subscribe or publish. A [`Subscription`] lives for exactly one
//! client connection; when the last subscriber of a topic goes away the
//! topic's channel is pruned on the next publish.

use std::collections::HashMap;

use tokio::sync::broadcast;
use tokio::sync::RwLock;
use tracing::debug;

use crate::message::PushMessage;

/// Per-topic buffer capacity. When a subscriber lags behind by more than
/// this many messages, the oldest un-consumed messages are dropped.
const TOPIC_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// DeliveryChannel
// ---------------------------------------------------------------------------

/// In-process per-topic fan-out hub.
///
/// Publishing to a topic with no subscribers is not an error: real-time
/// push is best-effort on top of the durable notification rows, so a
/// message nobody is connected to receive is simply dropped.
#[derive(Default)]
pub struct DeliveryChannel {
    topics: RwLock<HashMap<String, broadcast::Sender<PushMessage>>>,
}

impl DeliveryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to all messages published on `topic`.
    pub async fn subscribe(&self, topic: &str) -> Subscription {
        let mut topics = self.topics.write().await;
        let sender = topics.entry(topic.to_string()).or_insert_with(|| {
            debug!(topic, "opening delivery topic");
            broadcast::channel(TOPIC_CAPACITY).0
        });
        Subscription {
            topic: topic.to_string(),
            receiver: sender.subscribe(),
        }
    }

    /// Publish a message to every current subscriber of `topic`.
    ///
    /// Returns the number of subscribers that received the message. A
    /// topic whose subscribers have all disconnected is removed here.
    pub async fn publish(&self, topic: &str, message: PushMessage) -> usize {
        let delivered = {
            let topics = self.topics.read().await;
            match topics.get(topic) {
                Some(sender) => sender.send(message).unwrap_or(0),
                None => 0,
            }
        };

        if delivered == 0 {
            let mut topics = self.topics.write().await;
            if topics
                .get(topic)
                .is_some_and(|sender| sender.receiver_count() == 0)
            {
                debug!(topic, "pruning idle delivery topic");
                topics.remove(topic);
            }
        }

        delivered
    }

    /// Number of live subscribers on `topic`.
    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .await
            .get(topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Number of topics with at least one open channel.
    pub async fn topic_count(&self) -> usize {
        self.topics.read().await.len()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A live subscription to one topic. Dropping it unsubscribes.
pub struct Subscription {
    topic: String,
    receiver: broadcast::Receiver<PushMessage>,
}

impl Subscription {
    /// The topic this subscription listens on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next message.
    ///
    /// Returns `None` once the topic is closed. A lagged subscriber skips
    /// the dropped messages and keeps receiving from the current position.
    pub async fn recv(&mut self) -> Option<PushMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(topic = %self.topic, skipped, "subscriber lagged, skipping");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
