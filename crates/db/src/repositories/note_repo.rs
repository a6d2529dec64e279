//! Repository for the `doctor_notes` table.
//!
//! At most one note exists per triage record, enforced by the
//! `uq_doctor_notes_triage_id` constraint; the upsert replaces content in
//! place on conflict.

use chrono::NaiveDate;
use sqlx::FromRow;

use aegle_core::triage::NoteStatus;
use aegle_core::types::{EntityId, Timestamp};

use crate::error::StoreError;
use crate::models::{DoctorNote, NewDoctorNote};
use crate::DbPool;

/// Column list for `doctor_notes` queries.
const COLUMNS: &str = "id, triage_id, doctor_id, diagnosis, notes, prescription, \
     follow_up_needed, follow_up_date, status, created_at, updated_at";

#[derive(Debug, FromRow)]
struct NoteRow {
    id: EntityId,
    triage_id: EntityId,
    doctor_id: EntityId,
    diagnosis: String,
    notes: String,
    prescription: Option<String>,
    follow_up_needed: bool,
    follow_up_date: Option<NaiveDate>,
    status: String,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl NoteRow {
    fn into_domain(self) -> Result<DoctorNote, StoreError> {
        let status: NoteStatus = self
            .status
            .parse()
            .map_err(|e| StoreError::Decode(format!("doctor_notes.status: {e}")))?;

        Ok(DoctorNote {
            id: self.id,
            triage_id: self.triage_id,
            doctor_id: self.doctor_id,
            diagnosis: self.diagnosis,
            notes: self.notes,
            prescription: self.prescription,
            follow_up_needed: self.follow_up_needed,
            follow_up_date: self.follow_up_date,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Provides row operations for doctor notes.
pub(crate) struct NoteRepo;

impl NoteRepo {
    /// Create or replace the note for a triage record.
    ///
    /// On conflict the existing row's `id` and `created_at` survive; all
    /// content fields and `updated_at` are replaced.
    pub async fn upsert(pool: &DbPool, new: &NewDoctorNote) -> Result<DoctorNote, StoreError> {
        let query = format!(
            "INSERT INTO doctor_notes \
             (triage_id, doctor_id, diagnosis, notes, prescription, \
              follow_up_needed, follow_up_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT ON CONSTRAINT uq_doctor_notes_triage_id DO UPDATE SET \
               doctor_id = EXCLUDED.doctor_id, \
               diagnosis = EXCLUDED.diagnosis, \
               notes = EXCLUDED.notes, \
               prescription = EXCLUDED.prescription, \
               follow_up_needed = EXCLUDED.follow_up_needed, \
               follow_up_date = EXCLUDED.follow_up_date, \
               status = EXCLUDED.status, \
               updated_at = now() \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, NoteRow>(&query)
            .bind(new.triage_id)
            .bind(new.doctor_id)
            .bind(&new.diagnosis)
            .bind(&new.notes)
            .bind(&new.prescription)
            .bind(new.follow_up_needed)
            .bind(new.follow_up_date)
            .bind(new.status.as_str())
            .fetch_one(pool)
            .await?;

        row.into_domain()
    }

    /// Fetch the note for a triage record, if any.
    pub async fn get_by_triage(
        pool: &DbPool,
        triage_id: EntityId,
    ) -> Result<Option<DoctorNote>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM doctor_notes WHERE triage_id = $1");
        let row = sqlx::query_as::<_, NoteRow>(&query)
            .bind(triage_id)
            .fetch_optional(pool)
            .await?;

        row.map(NoteRow::into_domain).transpose()
    }

    /// Set a note's status by note id.
    pub async fn set_status(
        pool: &DbPool,
        note_id: EntityId,
        status: NoteStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE doctor_notes SET status = $2, updated_at = now() WHERE id = $1",
        )
        .bind(note_id)
        .bind(status.as_str())
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "DoctorNote",
                id: note_id,
            });
        }
        Ok(())
    }
}
