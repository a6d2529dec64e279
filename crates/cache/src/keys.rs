//! Deterministic cache key builders.
//!
//! Every cache entry is keyed from the owning entity's id so that the
//! writer of that entity can invalidate it without extra lookups.

use aegle_core::notify::Recipient;
use aegle_core::types::EntityId;

/// One triage record.
pub fn triage_record(id: EntityId) -> String {
    format!("triage:record:{id}")
}

/// A patient's triage-history list.
pub fn triage_history(patient_id: EntityId) -> String {
    format!("triage:history:{patient_id}")
}

/// A recipient's notification list.
pub fn notifications(recipient: Recipient) -> String {
    format!("notifications:list:{recipient}")
}

/// A recipient's unread-notification count.
pub fn unread_count(recipient: Recipient) -> String {
    format!("notifications:unread:{recipient}")
}
