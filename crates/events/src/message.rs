//! The push message envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message delivered to subscribers of a topic.
///
/// Constructed via [`PushMessage::new`] and enriched with
/// [`with_payload`](PushMessage::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    /// Dot-separated event name, e.g. `"notification.created"`.
    pub event: String,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the message was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PushMessage {
    /// Create a new message with an empty payload.
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the message.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_has_empty_object_payload() {
        let msg = PushMessage::new("notification.created");
        assert_eq!(msg.event, "notification.created");
        assert!(msg.payload.is_object());
        assert_eq!(msg.payload.as_object().map(|o| o.len()), Some(0));
    }

    #[test]
    fn serializes_with_stable_field_names() {
        let msg = PushMessage::new("status.updated")
            .with_payload(serde_json::json!({"status": "completed"}));

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["event"], "status.updated");
        assert_eq!(value["payload"]["status"], "completed");
        assert!(value["timestamp"].is_string());
    }
}
