//! Notification entity model and insert DTO.

use serde::{Deserialize, Serialize};

use aegle_core::notify::{NotificationType, Recipient};
use aegle_core::types::{EntityId, Timestamp};

/// One fan-out message targeted at exactly one recipient.
///
/// `read` is monotonic: it only ever flips false to true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: EntityId,
    pub recipient: Recipient,
    pub triage_id: Option<EntityId>,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

/// Fields for inserting one notification row.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient: Recipient,
    pub triage_id: Option<EntityId>,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub metadata: serde_json::Value,
}
