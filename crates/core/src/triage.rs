//! Triage classification types and validation helpers.
//!
//! The AI inference service is an external collaborator; this module
//! defines the shape of its finalized output ([`TriagePrediction`]) and
//! the enums that classify a triage record. Urgency is never computed
//! here, only carried.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum length for a patient complaint.
pub const MAX_COMPLAINT_LENGTH: usize = 5_000;

/// Maximum urgency score produced by the classifier.
pub const MAX_URGENCY_SCORE: i16 = 100;

/* --------------------------------------------------------------------------
Urgency
-------------------------------------------------------------------------- */

/// Urgency level assigned by the AI classification step.
///
/// Immutable once set on a record. `Red` cases require doctor review and
/// trigger the on-call fan-out path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrgencyLevel {
    Red,
    Yellow,
    Green,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Red => "Red",
            UrgencyLevel::Yellow => "Yellow",
            UrgencyLevel::Green => "Green",
        }
    }

    /// Whether records at this level must be reviewed by a doctor.
    pub fn requires_doctor_review(&self) -> bool {
        matches!(self, UrgencyLevel::Red)
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrgencyLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Red" => Ok(UrgencyLevel::Red),
            "Yellow" => Ok(UrgencyLevel::Yellow),
            "Green" => Ok(UrgencyLevel::Green),
            other => Err(CoreError::Validation(format!(
                "Invalid urgency level '{other}'. Must be one of: Red, Yellow, Green"
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Flags
-------------------------------------------------------------------------- */

/// A red-flag keyword detected by the classifier in the complaint text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageFlag {
    pub keyword: String,
    pub severity: String,
    pub reason: String,
    pub action: String,
}

/* --------------------------------------------------------------------------
Prediction
-------------------------------------------------------------------------- */

/// A finalized AI prediction for one patient complaint.
///
/// Consumed as already-validated input by the lifecycle engine; retries
/// against the AI service live upstream of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriagePrediction {
    pub primary_category: String,
    pub urgency_level: UrgencyLevel,
    pub urgency_score: i16,
    #[serde(default)]
    pub extracted_symptoms: Vec<String>,
    #[serde(default)]
    pub detected_flags: Vec<TriageFlag>,
    #[serde(default)]
    pub summary: String,
}

/* --------------------------------------------------------------------------
Note status
-------------------------------------------------------------------------- */

/// Disposition status of a doctor note.
///
/// `Pending` notes do not count as a completed review; the record-level
/// `doctor_reviewed` flag is true iff a `Reviewed` or `Completed` note
/// references the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    Pending,
    Reviewed,
    Completed,
}

impl NoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStatus::Pending => "pending",
            NoteStatus::Reviewed => "reviewed",
            NoteStatus::Completed => "completed",
        }
    }

    /// Whether a note at this status represents a completed review.
    pub fn is_reviewed(&self) -> bool {
        matches!(self, NoteStatus::Reviewed | NoteStatus::Completed)
    }
}

impl FromStr for NoteStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(NoteStatus::Pending),
            "reviewed" => Ok(NoteStatus::Reviewed),
            "completed" => Ok(NoteStatus::Completed),
            other => Err(CoreError::Validation(format!(
                "Invalid note status '{other}'. Must be one of: pending, reviewed, completed"
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate a raw patient complaint: non-empty after trimming, bounded length.
pub fn validate_complaint(complaint: &str) -> Result<(), CoreError> {
    if complaint.trim().is_empty() {
        return Err(CoreError::Validation(
            "Complaint must be a non-empty string".to_string(),
        ));
    }

    if complaint.len() > MAX_COMPLAINT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Complaint exceeds maximum length of {MAX_COMPLAINT_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Validate an urgency score is within the classifier's 0-100 range.
pub fn validate_urgency_score(score: i16) -> Result<(), CoreError> {
    if (0..=MAX_URGENCY_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Urgency score {score} out of range 0..={MAX_URGENCY_SCORE}"
        )))
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
