//! Repository for the `triage_records` table.

use sqlx::FromRow;

use aegle_core::triage::{TriageFlag, UrgencyLevel};
use aegle_core::types::{EntityId, Timestamp};

use crate::error::StoreError;
use crate::models::{NewTriageRecord, TriageRecord};
use crate::DbPool;

/// Column list for `triage_records` queries.
const COLUMNS: &str = "id, patient_id, complaint, primary_category, urgency_level, \
     urgency_score, extracted_symptoms, detected_flags, summary, \
     requires_doctor_review, doctor_reviewed, doctor_note_id, created_at";

/// A raw row; enums and JSONB columns are decoded in [`TriageRow::into_domain`].
#[derive(Debug, FromRow)]
struct TriageRow {
    id: EntityId,
    patient_id: EntityId,
    complaint: String,
    primary_category: String,
    urgency_level: String,
    urgency_score: i16,
    extracted_symptoms: Vec<String>,
    detected_flags: serde_json::Value,
    summary: String,
    requires_doctor_review: bool,
    doctor_reviewed: bool,
    doctor_note_id: Option<EntityId>,
    created_at: Timestamp,
}

impl TriageRow {
    fn into_domain(self) -> Result<TriageRecord, StoreError> {
        let urgency_level: UrgencyLevel = self
            .urgency_level
            .parse()
            .map_err(|e| StoreError::Decode(format!("triage_records.urgency_level: {e}")))?;
        let detected_flags: Vec<TriageFlag> = serde_json::from_value(self.detected_flags)
            .map_err(|e| StoreError::Decode(format!("triage_records.detected_flags: {e}")))?;

        Ok(TriageRecord {
            id: self.id,
            patient_id: self.patient_id,
            complaint: self.complaint,
            primary_category: self.primary_category,
            urgency_level,
            urgency_score: self.urgency_score,
            extracted_symptoms: self.extracted_symptoms,
            detected_flags,
            summary: self.summary,
            requires_doctor_review: self.requires_doctor_review,
            doctor_reviewed: self.doctor_reviewed,
            doctor_note_id: self.doctor_note_id,
            created_at: self.created_at,
        })
    }
}

/// Provides row operations for triage records.
pub(crate) struct TriageRepo;

impl TriageRepo {
    /// Insert a new record, returning the persisted row.
    pub async fn create(pool: &DbPool, new: &NewTriageRecord) -> Result<TriageRecord, StoreError> {
        let flags = serde_json::to_value(&new.detected_flags)
            .map_err(|e| StoreError::Decode(format!("detected_flags: {e}")))?;

        let query = format!(
            "INSERT INTO triage_records \
             (patient_id, complaint, primary_category, urgency_level, urgency_score, \
              extracted_symptoms, detected_flags, summary, requires_doctor_review) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TriageRow>(&query)
            .bind(new.patient_id)
            .bind(&new.complaint)
            .bind(&new.primary_category)
            .bind(new.urgency_level.as_str())
            .bind(new.urgency_score)
            .bind(&new.extracted_symptoms)
            .bind(flags)
            .bind(&new.summary)
            .bind(new.requires_doctor_review)
            .fetch_one(pool)
            .await?;

        row.into_domain()
    }

    /// Fetch a record by id.
    pub async fn get(pool: &DbPool, id: EntityId) -> Result<Option<TriageRecord>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM triage_records WHERE id = $1");
        let row = sqlx::query_as::<_, TriageRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        row.map(TriageRow::into_domain).transpose()
    }

    /// List a patient's records, newest first.
    pub async fn list_for_patient(
        pool: &DbPool,
        patient_id: EntityId,
        limit: i64,
    ) -> Result<Vec<TriageRecord>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM triage_records \
             WHERE patient_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        let rows = sqlx::query_as::<_, TriageRow>(&query)
            .bind(patient_id)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        rows.into_iter().map(TriageRow::into_domain).collect()
    }

    /// Flip a record to reviewed and point it at the note. Single-row atomic.
    pub async fn mark_reviewed(
        pool: &DbPool,
        triage_id: EntityId,
        note_id: EntityId,
    ) -> Result<TriageRecord, StoreError> {
        let query = format!(
            "UPDATE triage_records \
             SET doctor_reviewed = true, doctor_note_id = $2 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TriageRow>(&query)
            .bind(triage_id)
            .bind(note_id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => row.into_domain(),
            None => Err(StoreError::NotFound {
                entity: "TriageRecord",
                id: triage_id,
            }),
        }
    }
}
