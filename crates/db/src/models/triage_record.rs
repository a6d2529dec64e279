//! Triage record entity model and creation DTO.

use serde::{Deserialize, Serialize};

use aegle_core::triage::{TriageFlag, TriagePrediction, UrgencyLevel};
use aegle_core::types::{EntityId, Timestamp};

/// One AI-adjudicated patient submission.
///
/// Created exactly once per submission by the lifecycle engine; the only
/// mutation within this subsystem is the review flip (`doctor_reviewed`,
/// `doctor_note_id`). `urgency_level` is immutable once set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageRecord {
    pub id: EntityId,
    pub patient_id: EntityId,
    pub complaint: String,
    pub primary_category: String,
    pub urgency_level: UrgencyLevel,
    pub urgency_score: i16,
    pub extracted_symptoms: Vec<String>,
    pub detected_flags: Vec<TriageFlag>,
    pub summary: String,
    pub requires_doctor_review: bool,
    pub doctor_reviewed: bool,
    pub doctor_note_id: Option<EntityId>,
    pub created_at: Timestamp,
}

/// Fields for creating a triage record from a finalized prediction.
#[derive(Debug, Clone)]
pub struct NewTriageRecord {
    pub patient_id: EntityId,
    pub complaint: String,
    pub primary_category: String,
    pub urgency_level: UrgencyLevel,
    pub urgency_score: i16,
    pub extracted_symptoms: Vec<String>,
    pub detected_flags: Vec<TriageFlag>,
    pub summary: String,
    pub requires_doctor_review: bool,
}

impl NewTriageRecord {
    /// Build the row to persist from a finalized AI prediction.
    ///
    /// `requires_doctor_review` is derived from the urgency level, not
    /// taken from the caller.
    pub fn from_prediction(patient_id: EntityId, complaint: String, p: TriagePrediction) -> Self {
        Self {
            patient_id,
            complaint,
            requires_doctor_review: p.urgency_level.requires_doctor_review(),
            primary_category: p.primary_category,
            urgency_level: p.urgency_level,
            urgency_score: p.urgency_score,
            extracted_symptoms: p.extracted_symptoms,
            detected_flags: p.detected_flags,
            summary: p.summary,
        }
    }
}
