//! Engine error taxonomy.
//!
//! Three severities, matching who can act on them:
//!
//! - [`PersistenceError`] — the authoritative write failed; the whole
//!   operation failed.
//! - [`ReviewError`] — the review state machine could not complete.
//! - [`DeliveryWarning`] — a cache or delivery side effect failed after
//!   the authoritative write succeeded. Reported on the operation
//!   result, never as an error.

use aegle_core::notify::Recipient;
use aegle_core::types::EntityId;
use aegle_db::error::StoreError;

/// The authoritative store write failed. Fatal to the invoking operation.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct PersistenceError(#[from] pub StoreError);

/// Failure modes of the review state machine.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// No triage record with this id; nothing was written.
    #[error("triage record {0} not found")]
    TriageNotFound(EntityId),

    /// The record lookup itself failed; nothing was written.
    #[error("triage lookup failed: {0}")]
    Lookup(#[source] StoreError),

    /// The doctor note could not be written; the record is untouched.
    #[error("doctor note write failed: {0}")]
    NoteWrite(#[source] StoreError),

    /// The note was written but the record flip failed. The note has
    /// been compensated back to pending so the reviewed-iff-note
    /// invariant still holds.
    #[error("record review flip failed: {0}")]
    RecordFlip(#[source] StoreError),
}

/// A non-fatal side-effect failure.
///
/// Collected on `Submission`/`Review` results for diagnostics and logged
/// with `tracing`; never serialized into API responses.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryWarning {
    /// A cache write or invalidation failed.
    #[error("{operation} failed: {reason}")]
    SideEffect {
        operation: &'static str,
        reason: String,
    },

    /// A side effect exceeded its time budget.
    #[error("{operation} timed out after {budget_ms} ms")]
    Timeout {
        operation: &'static str,
        budget_ms: u64,
    },

    /// The Red-urgency doctor fan-out could not run at all.
    #[error("doctor fan-out skipped: {0}")]
    FanoutSkipped(String),

    /// One notification row was not written during fan-out. The row is
    /// not retried.
    #[error("notification for {recipient} not written: {reason}")]
    NotificationDropped {
        recipient: Recipient,
        reason: String,
    },
}
