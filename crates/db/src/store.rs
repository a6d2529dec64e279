//! Persistence boundary traits.
//!
//! The lifecycle engine talks to the relational store only through
//! [`TriageStore`] and [`DoctorDirectory`], so the Postgres-backed
//! implementation ([`PgStore`](crate::pg::PgStore)) can be swapped for
//! the in-memory one ([`MemoryStore`](crate::memory::MemoryStore)) in
//! tests and local development.
//!
//! Every method is per-row atomic. No multi-row transaction is assumed
//! to exist; cross-row consistency is the engine's job.

use async_trait::async_trait;

use aegle_core::notify::Recipient;
use aegle_core::triage::NoteStatus;
use aegle_core::types::EntityId;

use crate::error::StoreError;
use crate::models::{
    Doctor, DoctorNote, NewDoctorNote, NewNotification, NewTriageRecord, Notification,
    TriageRecord,
};

/// Outcome of a batched, per-row-atomic notification insert.
///
/// Rows in `written` are durably committed; rows in `failed` were not
/// written and are never retried by the store. The caller decides whether
/// a partial batch is acceptable.
#[derive(Debug, Default)]
pub struct NotificationBatch {
    pub written: Vec<Notification>,
    pub failed: Vec<FailedInsert>,
}

/// One row that could not be written during a batch insert.
#[derive(Debug)]
pub struct FailedInsert {
    pub recipient: Recipient,
    pub reason: String,
}

/// Transactional persistence for triage records, doctor notes, and
/// notifications.
#[async_trait]
pub trait TriageStore: Send + Sync {
    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Persist a new triage record with a fresh id.
    async fn create_triage(&self, new: NewTriageRecord) -> Result<TriageRecord, StoreError>;

    /// Fetch a triage record by id.
    async fn get_triage(&self, id: EntityId) -> Result<Option<TriageRecord>, StoreError>;

    /// List a patient's triage records, newest first.
    async fn list_triage_for_patient(
        &self,
        patient_id: EntityId,
        limit: i64,
    ) -> Result<Vec<TriageRecord>, StoreError>;

    /// Flip a record to reviewed, pointing it at the given note.
    ///
    /// Returns the updated record, or `NotFound` if the record does not
    /// exist.
    async fn mark_reviewed(
        &self,
        triage_id: EntityId,
        note_id: EntityId,
    ) -> Result<TriageRecord, StoreError>;

    /// Create or replace the note for a triage record.
    ///
    /// Keyed on `triage_id`: when a note already exists its content is
    /// updated in place and `id`/`created_at` are preserved.
    async fn upsert_note(&self, new: NewDoctorNote) -> Result<DoctorNote, StoreError>;

    /// Fetch the (at most one) note for a triage record.
    async fn get_note_for_triage(
        &self,
        triage_id: EntityId,
    ) -> Result<Option<DoctorNote>, StoreError>;

    /// Set a note's status. Used by the engine to compensate a note back
    /// to `pending` when the record flip fails after the note write.
    async fn set_note_status(
        &self,
        note_id: EntityId,
        status: NoteStatus,
    ) -> Result<(), StoreError>;

    /// Insert a batch of notification rows, one row at a time.
    ///
    /// Returns `Err` only when the store is unreachable outright; row-level
    /// failures are reported in the returned [`NotificationBatch`].
    async fn insert_notifications(
        &self,
        rows: Vec<NewNotification>,
    ) -> Result<NotificationBatch, StoreError>;

    /// List a recipient's notifications, newest first.
    async fn list_notifications(
        &self,
        recipient: Recipient,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError>;

    /// Count a recipient's unread notifications.
    async fn unread_count(&self, recipient: Recipient) -> Result<i64, StoreError>;

    /// Mark one notification as read.
    ///
    /// Recipient-scoped; returns `false` when no unread notification with
    /// that id belongs to the recipient. The flip is monotonic.
    async fn mark_notification_read(
        &self,
        id: EntityId,
        recipient: Recipient,
    ) -> Result<bool, StoreError>;

    /// Mark all of a recipient's notifications as read, returning how many
    /// were flipped.
    async fn mark_all_notifications_read(&self, recipient: Recipient) -> Result<u64, StoreError>;

    /// Delete one notification. A user-initiated side operation, not part
    /// of the lifecycle contract.
    async fn delete_notification(
        &self,
        id: EntityId,
        recipient: Recipient,
    ) -> Result<bool, StoreError>;
}

/// Recipient directory for the Red-urgency fan-out path.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    /// All doctors currently registered and active.
    async fn list_active_doctors(&self) -> Result<Vec<Doctor>, StoreError>;
}
