//! In-memory implementation of the persistence boundary.
//!
//! Backs tests and local development. Behaves like the Postgres store at
//! the trait level (per-row atomicity, upsert semantics, monotonic read
//! flag) and adds fault injection so failure paths can be exercised
//! deterministically.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use aegle_core::notify::Recipient;
use aegle_core::triage::NoteStatus;
use aegle_core::types::EntityId;

use crate::error::StoreError;
use crate::models::{
    Doctor, DoctorNote, NewDoctorNote, NewNotification, NewTriageRecord, Notification,
    TriageRecord,
};
use crate::store::{DoctorDirectory, FailedInsert, NotificationBatch, TriageStore};

#[derive(Default)]
struct Inner {
    records: Vec<TriageRecord>,
    // Keyed by triage_id: the at-most-one-note-per-record invariant.
    notes: HashMap<EntityId, DoctorNote>,
    notifications: Vec<Notification>,
    doctors: Vec<Doctor>,
}

/// Fault-injection switches. All default to off.
#[derive(Default)]
struct Faults {
    create_triage: bool,
    mark_reviewed: bool,
    upsert_note: bool,
    insert_notifications: bool,
    directory: bool,
    recipients: HashSet<Recipient>,
}

/// In-memory [`TriageStore`] + [`DoctorDirectory`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    faults: RwLock<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an active doctor and return it.
    pub async fn seed_doctor(&self, name: &str) -> Doctor {
        let doctor = Doctor {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        self.inner.write().await.doctors.push(doctor.clone());
        doctor
    }

    /// Register a doctor that `list_active_doctors` must not return.
    pub async fn seed_inactive_doctor(&self, name: &str) -> Doctor {
        let mut doctor = self.seed_doctor(name).await;
        doctor.is_active = false;
        let mut inner = self.inner.write().await;
        if let Some(d) = inner.doctors.iter_mut().find(|d| d.id == doctor.id) {
            d.is_active = false;
        }
        doctor
    }

    /// Make `create_triage` fail with `Unavailable`.
    pub async fn fail_create_triage(&self, on: bool) {
        self.faults.write().await.create_triage = on;
    }

    /// Make `mark_reviewed` fail with `Unavailable`.
    pub async fn fail_mark_reviewed(&self, on: bool) {
        self.faults.write().await.mark_reviewed = on;
    }

    /// Make `upsert_note` fail with `Unavailable`.
    pub async fn fail_upsert_note(&self, on: bool) {
        self.faults.write().await.upsert_note = on;
    }

    /// Make the whole notification batch insert fail with `Unavailable`.
    pub async fn fail_insert_notifications(&self, on: bool) {
        self.faults.write().await.insert_notifications = on;
    }

    /// Make `list_active_doctors` fail with `Unavailable`.
    pub async fn fail_directory(&self, on: bool) {
        self.faults.write().await.directory = on;
    }

    /// Reject notification inserts targeted at one recipient, leaving the
    /// rest of a batch to succeed.
    pub async fn fail_notifications_for(&self, recipient: Recipient) {
        self.faults.write().await.recipients.insert(recipient);
    }

    /// All notifications currently stored, oldest first.
    pub async fn all_notifications(&self) -> Vec<Notification> {
        self.inner.read().await.notifications.clone()
    }
}

fn unavailable(op: &str) -> StoreError {
    StoreError::Unavailable(format!("injected fault: {op}"))
}

#[async_trait]
impl TriageStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_triage(&self, new: NewTriageRecord) -> Result<TriageRecord, StoreError> {
        if self.faults.read().await.create_triage {
            return Err(unavailable("create_triage"));
        }

        let record = TriageRecord {
            id: Uuid::new_v4(),
            patient_id: new.patient_id,
            complaint: new.complaint,
            primary_category: new.primary_category,
            urgency_level: new.urgency_level,
            urgency_score: new.urgency_score,
            extracted_symptoms: new.extracted_symptoms,
            detected_flags: new.detected_flags,
            summary: new.summary,
            requires_doctor_review: new.requires_doctor_review,
            doctor_reviewed: false,
            doctor_note_id: None,
            created_at: Utc::now(),
        };
        self.inner.write().await.records.push(record.clone());
        Ok(record)
    }

    async fn get_triage(&self, id: EntityId) -> Result<Option<TriageRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.records.iter().find(|r| r.id == id).cloned())
    }

    async fn list_triage_for_patient(
        &self,
        patient_id: EntityId,
        limit: i64,
    ) -> Result<Vec<TriageRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .rev() // insertion order, newest first
            .filter(|r| r.patient_id == patient_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn mark_reviewed(
        &self,
        triage_id: EntityId,
        note_id: EntityId,
    ) -> Result<TriageRecord, StoreError> {
        if self.faults.read().await.mark_reviewed {
            return Err(unavailable("mark_reviewed"));
        }

        let mut inner = self.inner.write().await;
        match inner.records.iter_mut().find(|r| r.id == triage_id) {
            Some(record) => {
                record.doctor_reviewed = true;
                record.doctor_note_id = Some(note_id);
                Ok(record.clone())
            }
            None => Err(StoreError::NotFound {
                entity: "TriageRecord",
                id: triage_id,
            }),
        }
    }

    async fn upsert_note(&self, new: NewDoctorNote) -> Result<DoctorNote, StoreError> {
        if self.faults.read().await.upsert_note {
            return Err(unavailable("upsert_note"));
        }

        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let note = match inner.notes.get(&new.triage_id) {
            // Replace in place: id and created_at survive.
            Some(existing) => DoctorNote {
                id: existing.id,
                created_at: existing.created_at,
                triage_id: new.triage_id,
                doctor_id: new.doctor_id,
                diagnosis: new.diagnosis,
                notes: new.notes,
                prescription: new.prescription,
                follow_up_needed: new.follow_up_needed,
                follow_up_date: new.follow_up_date,
                status: new.status,
                updated_at: now,
            },
            None => DoctorNote {
                id: Uuid::new_v4(),
                triage_id: new.triage_id,
                doctor_id: new.doctor_id,
                diagnosis: new.diagnosis,
                notes: new.notes,
                prescription: new.prescription,
                follow_up_needed: new.follow_up_needed,
                follow_up_date: new.follow_up_date,
                status: new.status,
                created_at: now,
                updated_at: now,
            },
        };
        inner.notes.insert(new.triage_id, note.clone());
        Ok(note)
    }

    async fn get_note_for_triage(
        &self,
        triage_id: EntityId,
    ) -> Result<Option<DoctorNote>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.notes.get(&triage_id).cloned())
    }

    async fn set_note_status(
        &self,
        note_id: EntityId,
        status: NoteStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.notes.values_mut().find(|n| n.id == note_id) {
            Some(note) => {
                note.status = status;
                note.updated_at = Utc::now();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "DoctorNote",
                id: note_id,
            }),
        }
    }

    async fn insert_notifications(
        &self,
        rows: Vec<NewNotification>,
    ) -> Result<NotificationBatch, StoreError> {
        let faults = self.faults.read().await;
        if faults.insert_notifications {
            return Err(unavailable("insert_notifications"));
        }
        let rejected = faults.recipients.clone();
        drop(faults);

        let mut batch = NotificationBatch::default();
        let mut inner = self.inner.write().await;

        for row in rows {
            if rejected.contains(&row.recipient) {
                batch.failed.push(FailedInsert {
                    recipient: row.recipient,
                    reason: "injected fault: recipient rejected".to_string(),
                });
                continue;
            }
            let notification = Notification {
                id: Uuid::new_v4(),
                recipient: row.recipient,
                triage_id: row.triage_id,
                kind: row.kind,
                title: row.title,
                message: row.message,
                read: false,
                metadata: row.metadata,
                created_at: Utc::now(),
            };
            inner.notifications.push(notification.clone());
            batch.written.push(notification);
        }

        Ok(batch)
    }

    async fn list_notifications(
        &self,
        recipient: Recipient,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .notifications
            .iter()
            .rev()
            .filter(|n| n.recipient == recipient && (!unread_only || !n.read))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn unread_count(&self, recipient: Recipient) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .notifications
            .iter()
            .filter(|n| n.recipient == recipient && !n.read)
            .count() as i64)
    }

    async fn mark_notification_read(
        &self,
        id: EntityId,
        recipient: Recipient,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient == recipient && !n.read)
        {
            Some(n) => {
                n.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, recipient: Recipient) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let mut flipped = 0;
        for n in inner
            .notifications
            .iter_mut()
            .filter(|n| n.recipient == recipient && !n.read)
        {
            n.read = true;
            flipped += 1;
        }
        Ok(flipped)
    }

    async fn delete_notification(
        &self,
        id: EntityId,
        recipient: Recipient,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.notifications.len();
        inner
            .notifications
            .retain(|n| !(n.id == id && n.recipient == recipient));
        Ok(inner.notifications.len() < before)
    }
}

#[async_trait]
impl DoctorDirectory for MemoryStore {
    async fn list_active_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        if self.faults.read().await.directory {
            return Err(unavailable("list_active_doctors"));
        }
        let inner = self.inner.read().await;
        Ok(inner
            .doctors
            .iter()
            .filter(|d| d.is_active)
            .cloned()
            .collect())
    }
}
