//! The triage record lifecycle: submit, review, and the cached reads.
//!
//! Both mutation paths share one ordering: authoritative store write,
//! then cache invalidation/population, then notification fan-out. The
//! store write is the only step that can fail the operation; everything
//! after it degrades into [`DeliveryWarning`]s on the result.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tracing::{error, warn};

use aegle_cache::{keys, read_through, Cache};
use aegle_core::notify::{NotificationType, Recipient};
use aegle_core::triage::{NoteStatus, TriagePrediction};
use aegle_core::types::EntityId;
use aegle_db::error::StoreError;
use aegle_db::models::{DoctorNote, NewDoctorNote, NewTriageRecord, TriageRecord};
use aegle_db::store::{DoctorDirectory, TriageStore};

use crate::config::EngineConfig;
use crate::effects;
use crate::error::{DeliveryWarning, PersistenceError, ReviewError};
use crate::notifier::{NotificationPayload, Notifier};

/// Largest history page the cache holds. Requests for more bypass the
/// cache.
const HISTORY_PAGE: i64 = 50;

// ---------------------------------------------------------------------------
// Result & input types
// ---------------------------------------------------------------------------

/// Outcome of a successful submit: the durable record plus any side
/// effects that failed after the write.
#[derive(Debug)]
pub struct Submission {
    pub record: TriageRecord,
    pub warnings: Vec<DeliveryWarning>,
}

/// Outcome of a successful review.
#[derive(Debug)]
pub struct Review {
    pub record: TriageRecord,
    pub note: DoctorNote,
    pub warnings: Vec<DeliveryWarning>,
}

/// Clinician-entered content of a review.
#[derive(Debug, Clone)]
pub struct NoteFields {
    pub diagnosis: String,
    pub notes: String,
    pub prescription: Option<String>,
    pub follow_up_needed: bool,
    pub follow_up_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// LifecycleEngine
// ---------------------------------------------------------------------------

/// Owns the triage record lifecycle and its consistency guarantees.
pub struct LifecycleEngine {
    store: Arc<dyn TriageStore>,
    directory: Arc<dyn DoctorDirectory>,
    cache: Arc<dyn Cache>,
    notifier: Arc<Notifier>,
    config: EngineConfig,
}

impl LifecycleEngine {
    pub fn new(
        store: Arc<dyn TriageStore>,
        directory: Arc<dyn DoctorDirectory>,
        cache: Arc<dyn Cache>,
        notifier: Arc<Notifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            directory,
            cache,
            notifier,
            config,
        }
    }

    // -- submit -------------------------------------------------------------

    /// Persist a finalized AI prediction as a new triage record.
    ///
    /// After the durable write: the record is cached under its own key,
    /// the patient's history key is invalidated, and a Red urgency fans
    /// out an `urgent_case` notification to every active doctor. None of
    /// those steps can fail the submission.
    pub async fn submit(
        &self,
        patient_id: EntityId,
        complaint: String,
        prediction: TriagePrediction,
    ) -> Result<Submission, PersistenceError> {
        let new = NewTriageRecord::from_prediction(patient_id, complaint, prediction);
        let fan_out = new.requires_doctor_review;

        let record = self.store.create_triage(new).await?;
        let mut warnings = Vec::new();

        self.cache_record(&record, &mut warnings).await;
        self.invalidate_history(record.patient_id, &mut warnings).await;

        if fan_out {
            self.fan_out_to_doctors(&record, &mut warnings).await;
        }

        Ok(Submission { record, warnings })
    }

    /// Notify every active doctor about a Red-urgency record.
    async fn fan_out_to_doctors(
        &self,
        record: &TriageRecord,
        warnings: &mut Vec<DeliveryWarning>,
    ) {
        let doctors = match self.directory.list_active_doctors().await {
            Ok(doctors) => doctors,
            Err(e) => {
                warn!(triage_id = %record.id, error = %e, "doctor directory unavailable");
                warnings.push(DeliveryWarning::FanoutSkipped(e.to_string()));
                return;
            }
        };
        if doctors.is_empty() {
            warn!(triage_id = %record.id, "urgent case with no active doctors");
            return;
        }

        let recipients = doctors.iter().map(|d| Recipient::doctor(d.id)).collect();
        let payload = NotificationPayload::new(
            NotificationType::UrgentCase,
            "Urgent case awaiting review",
            format!(
                "A {} case scored {} and needs immediate review.",
                record.primary_category, record.urgency_score
            ),
        )
        .for_triage(record.id)
        .with_metadata(json!({
            "urgency_level": record.urgency_level,
            "urgency_score": record.urgency_score,
            "primary_category": record.primary_category,
        }));

        match self.notifier.notify_many(recipients, payload).await {
            Ok(result) => {
                for f in result.failed {
                    warnings.push(DeliveryWarning::NotificationDropped {
                        recipient: f.recipient,
                        reason: f.reason,
                    });
                }
            }
            Err(e) => warnings.push(DeliveryWarning::FanoutSkipped(e.to_string())),
        }
    }

    // -- review -------------------------------------------------------------

    /// Record a clinician's review of a triage record.
    ///
    /// The note is upserted keyed on the triage id (a second review
    /// replaces the first in place), then the record is flipped to
    /// reviewed. If the flip fails the note write is rolled back: a
    /// pre-existing note gets its previous content and status back, a
    /// fresh note is demoted to pending. Either way `doctor_reviewed`
    /// stays true iff a completed note references the record, and a
    /// failed review leaves both rows as they were. After both writes:
    /// caches invalidated, patient notified.
    pub async fn review(
        &self,
        triage_id: EntityId,
        doctor_id: EntityId,
        fields: NoteFields,
    ) -> Result<Review, ReviewError> {
        let existing = self
            .store
            .get_triage(triage_id)
            .await
            .map_err(ReviewError::Lookup)?
            .ok_or(ReviewError::TriageNotFound(triage_id))?;
        let first_review = !existing.doctor_reviewed;

        // Snapshot for rollback: the upsert below overwrites this note
        // in place.
        let prior_note = self
            .store
            .get_note_for_triage(triage_id)
            .await
            .map_err(ReviewError::Lookup)?;

        let note = self
            .store
            .upsert_note(NewDoctorNote {
                triage_id,
                doctor_id,
                diagnosis: fields.diagnosis,
                notes: fields.notes,
                prescription: fields.prescription,
                follow_up_needed: fields.follow_up_needed,
                follow_up_date: fields.follow_up_date,
                status: NoteStatus::Completed,
            })
            .await
            .map_err(ReviewError::NoteWrite)?;

        let record = match self.store.mark_reviewed(triage_id, note.id).await {
            Ok(record) => record,
            Err(e) => {
                self.roll_back_note(triage_id, note.id, prior_note).await;
                return Err(match e {
                    StoreError::NotFound { .. } => ReviewError::TriageNotFound(triage_id),
                    e => ReviewError::RecordFlip(e),
                });
            }
        };

        let mut warnings = Vec::new();
        self.invalidate_record(record.id, &mut warnings).await;
        self.invalidate_history(record.patient_id, &mut warnings).await;

        let patient = Recipient::patient(record.patient_id);

        self.notify_patient(
            patient,
            NotificationPayload::new(
                NotificationType::DoctorNote,
                "Your triage result was reviewed",
                format!("A doctor reviewed your case: {}", note.diagnosis),
            )
            .for_triage(record.id)
            .with_metadata(json!({ "note_id": note.id, "doctor_id": note.doctor_id })),
            &mut warnings,
        )
        .await;

        if first_review {
            self.notify_patient(
                patient,
                NotificationPayload::new(
                    NotificationType::StatusUpdate,
                    "Triage status updated",
                    "Your triage case status changed to completed.",
                )
                .for_triage(record.id),
                &mut warnings,
            )
            .await;
        }

        if note.follow_up_needed {
            self.notify_patient(
                patient,
                NotificationPayload::new(
                    NotificationType::FollowUp,
                    "Follow-up recommended",
                    "Your doctor recommends a follow-up appointment.",
                )
                .for_triage(record.id)
                .with_metadata(json!({ "follow_up_date": note.follow_up_date })),
                &mut warnings,
            )
            .await;
        }

        Ok(Review {
            record,
            note,
            warnings,
        })
    }

    /// Undo a note upsert after the record flip failed.
    ///
    /// A record that already carried a note gets that note's content and
    /// status written back (the upsert key keeps the id stable); a record
    /// without one has its fresh note demoted to pending. Rollback
    /// failures are logged, not propagated: the caller is already
    /// returning the flip error.
    async fn roll_back_note(
        &self,
        triage_id: EntityId,
        note_id: EntityId,
        prior: Option<DoctorNote>,
    ) {
        let outcome = match prior {
            Some(prev) => self
                .store
                .upsert_note(NewDoctorNote {
                    triage_id,
                    doctor_id: prev.doctor_id,
                    diagnosis: prev.diagnosis,
                    notes: prev.notes,
                    prescription: prev.prescription,
                    follow_up_needed: prev.follow_up_needed,
                    follow_up_date: prev.follow_up_date,
                    status: prev.status,
                })
                .await
                .map(|_| ()),
            None => self.store.set_note_status(note_id, NoteStatus::Pending).await,
        };
        if let Err(e) = outcome {
            error!(note_id = %note_id, error = %e, "note rollback after failed flip did not apply");
        }
    }

    async fn notify_patient(
        &self,
        patient: Recipient,
        payload: NotificationPayload,
        warnings: &mut Vec<DeliveryWarning>,
    ) {
        if let Err(e) = self.notifier.notify_one(patient, payload).await {
            warnings.push(DeliveryWarning::NotificationDropped {
                recipient: patient,
                reason: e.to_string(),
            });
        }
    }

    // -- reads --------------------------------------------------------------

    /// Fetch a record, read-through on its cache key.
    ///
    /// Misses are not negatively cached; a missing record costs a store
    /// round-trip every time.
    pub async fn get_record(
        &self,
        id: EntityId,
    ) -> Result<Option<TriageRecord>, PersistenceError> {
        let key = keys::triage_record(id);
        match self.cache.get(&key).await {
            Ok(Some(value)) => match serde_json::from_value::<TriageRecord>(value) {
                Ok(record) => return Ok(Some(record)),
                Err(e) => warn!(%key, error = %e, "discarding undecodable cached record"),
            },
            Ok(None) => {}
            Err(e) => warn!(%key, error = %e, "cache read failed, falling through to store"),
        }

        let record = self.store.get_triage(id).await?;
        if let Some(record) = &record {
            let mut sink = Vec::new();
            self.cache_record(record, &mut sink).await;
        }
        Ok(record)
    }

    /// A patient's triage history, newest first, read-through cached.
    pub async fn patient_history(
        &self,
        patient_id: EntityId,
        limit: i64,
    ) -> Result<Vec<TriageRecord>, PersistenceError> {
        if limit > HISTORY_PAGE {
            return Ok(self.store.list_triage_for_patient(patient_id, limit).await?);
        }

        let key = keys::triage_history(patient_id);
        let mut page: Vec<TriageRecord> = read_through(
            self.cache.as_ref(),
            &key,
            self.config.record_ttl,
            || self.store.list_triage_for_patient(patient_id, HISTORY_PAGE),
        )
        .await?;
        page.truncate(limit.max(0) as usize);
        Ok(page)
    }

    /// Drop any cached copy of the record, then re-read it from the
    /// store and re-populate the cache.
    pub async fn refresh_record(
        &self,
        id: EntityId,
    ) -> Result<Option<TriageRecord>, PersistenceError> {
        let mut warnings = Vec::new();
        self.invalidate_record(id, &mut warnings).await;

        let record = self.store.get_triage(id).await?;
        if let Some(record) = &record {
            self.invalidate_history(record.patient_id, &mut warnings).await;
            self.cache_record(record, &mut warnings).await;
        }
        Ok(record)
    }

    /// The note attached to a record, if any.
    pub async fn note_for_record(
        &self,
        triage_id: EntityId,
    ) -> Result<Option<DoctorNote>, PersistenceError> {
        Ok(self.store.get_note_for_triage(triage_id).await?)
    }

    // -- cache plumbing -----------------------------------------------------

    async fn cache_record(&self, record: &TriageRecord, warnings: &mut Vec<DeliveryWarning>) {
        let value = match serde_json::to_value(record) {
            Ok(value) => value,
            Err(e) => {
                warn!(id = %record.id, error = %e, "record not cacheable");
                return;
            }
        };
        if let Err(w) = effects::bounded(
            self.config.side_effect_timeout,
            "triage record cache populate",
            self.cache
                .set(&keys::triage_record(record.id), value, self.config.record_ttl),
        )
        .await
        {
            warnings.push(w);
        }
    }

    async fn invalidate_record(&self, id: EntityId, warnings: &mut Vec<DeliveryWarning>) {
        if let Err(w) = effects::bounded(
            self.config.side_effect_timeout,
            "triage record invalidate",
            self.cache.delete(&keys::triage_record(id)),
        )
        .await
        {
            warnings.push(w);
        }
    }

    async fn invalidate_history(&self, patient_id: EntityId, warnings: &mut Vec<DeliveryWarning>) {
        if let Err(w) = effects::bounded(
            self.config.side_effect_timeout,
            "triage history invalidate",
            self.cache.delete(&keys::triage_history(patient_id)),
        )
        .await
        {
            warnings.push(w);
        }
    }
}
