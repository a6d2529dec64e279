//! PostgreSQL-backed implementations of the persistence boundary.

use async_trait::async_trait;

use aegle_core::notify::Recipient;
use aegle_core::triage::NoteStatus;
use aegle_core::types::EntityId;

use crate::error::StoreError;
use crate::models::{
    Doctor, DoctorNote, NewDoctorNote, NewNotification, NewTriageRecord, Notification,
    TriageRecord,
};
use crate::repositories::doctor_repo::DoctorRepo;
use crate::repositories::note_repo::NoteRepo;
use crate::repositories::notification_repo::NotificationRepo;
use crate::repositories::triage_repo::TriageRepo;
use crate::store::{DoctorDirectory, FailedInsert, NotificationBatch, TriageStore};
use crate::DbPool;

/// [`TriageStore`] and [`DoctorDirectory`] over a sqlx connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl TriageStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_triage(&self, new: NewTriageRecord) -> Result<TriageRecord, StoreError> {
        TriageRepo::create(&self.pool, &new).await
    }

    async fn get_triage(&self, id: EntityId) -> Result<Option<TriageRecord>, StoreError> {
        TriageRepo::get(&self.pool, id).await
    }

    async fn list_triage_for_patient(
        &self,
        patient_id: EntityId,
        limit: i64,
    ) -> Result<Vec<TriageRecord>, StoreError> {
        TriageRepo::list_for_patient(&self.pool, patient_id, limit).await
    }

    async fn mark_reviewed(
        &self,
        triage_id: EntityId,
        note_id: EntityId,
    ) -> Result<TriageRecord, StoreError> {
        TriageRepo::mark_reviewed(&self.pool, triage_id, note_id).await
    }

    async fn upsert_note(&self, new: NewDoctorNote) -> Result<DoctorNote, StoreError> {
        NoteRepo::upsert(&self.pool, &new).await
    }

    async fn get_note_for_triage(
        &self,
        triage_id: EntityId,
    ) -> Result<Option<DoctorNote>, StoreError> {
        NoteRepo::get_by_triage(&self.pool, triage_id).await
    }

    async fn set_note_status(
        &self,
        note_id: EntityId,
        status: NoteStatus,
    ) -> Result<(), StoreError> {
        NoteRepo::set_status(&self.pool, note_id, status).await
    }

    /// Insert rows one at a time; each insert is atomic on its own.
    ///
    /// A failed row never aborts the rest of the batch.
    async fn insert_notifications(
        &self,
        rows: Vec<NewNotification>,
    ) -> Result<NotificationBatch, StoreError> {
        let mut batch = NotificationBatch::default();

        for row in rows {
            match NotificationRepo::insert_one(&self.pool, &row).await {
                Ok(written) => batch.written.push(written),
                Err(e) => {
                    tracing::warn!(
                        recipient = %row.recipient,
                        error = %e,
                        "Notification insert failed"
                    );
                    batch.failed.push(FailedInsert {
                        recipient: row.recipient,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(batch)
    }

    async fn list_notifications(
        &self,
        recipient: Recipient,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError> {
        NotificationRepo::list_for_recipient(&self.pool, recipient, unread_only, limit).await
    }

    async fn unread_count(&self, recipient: Recipient) -> Result<i64, StoreError> {
        NotificationRepo::unread_count(&self.pool, recipient).await
    }

    async fn mark_notification_read(
        &self,
        id: EntityId,
        recipient: Recipient,
    ) -> Result<bool, StoreError> {
        NotificationRepo::mark_read(&self.pool, id, recipient).await
    }

    async fn mark_all_notifications_read(&self, recipient: Recipient) -> Result<u64, StoreError> {
        NotificationRepo::mark_all_read(&self.pool, recipient).await
    }

    async fn delete_notification(
        &self,
        id: EntityId,
        recipient: Recipient,
    ) -> Result<bool, StoreError> {
        NotificationRepo::delete(&self.pool, id, recipient).await
    }
}

#[async_trait]
impl DoctorDirectory for PgStore {
    async fn list_active_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        DoctorRepo::list_active(&self.pool).await
    }
}
