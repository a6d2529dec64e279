//! Doctor note entity model and upsert DTO.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use aegle_core::triage::NoteStatus;
use aegle_core::types::{EntityId, Timestamp};

/// One clinician's disposition on a triage record.
///
/// At most one note exists per triage record; a second review replaces
/// the note's content in place, preserving `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorNote {
    pub id: EntityId,
    pub triage_id: EntityId,
    pub doctor_id: EntityId,
    pub diagnosis: String,
    pub notes: String,
    pub prescription: Option<String>,
    pub follow_up_needed: bool,
    pub follow_up_date: Option<NaiveDate>,
    pub status: NoteStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields for creating or replacing the note on a triage record.
#[derive(Debug, Clone)]
pub struct NewDoctorNote {
    pub triage_id: EntityId,
    pub doctor_id: EntityId,
    pub diagnosis: String,
    pub notes: String,
    pub prescription: Option<String>,
    pub follow_up_needed: bool,
    pub follow_up_date: Option<NaiveDate>,
    pub status: NoteStatus,
}
