//! Behavioral tests for `MemoryStore`.
//!
//! The memory store must match the Postgres store at the trait level:
//! per-row atomicity, upsert-in-place note semantics, recipient-scoped
//! notification visibility, and a monotonic read flag.

use assert_matches::assert_matches;
use uuid::Uuid;

use aegle_core::notify::{NotificationType, Recipient};
use aegle_core::triage::{NoteStatus, TriageFlag, UrgencyLevel};
use aegle_db::memory::MemoryStore;
use aegle_db::models::{NewDoctorNote, NewNotification, NewTriageRecord};
use aegle_db::{DoctorDirectory, StoreError, TriageStore};

fn new_record(patient_id: Uuid, urgency: UrgencyLevel) -> NewTriageRecord {
    NewTriageRecord {
        patient_id,
        complaint: "severe chest pain radiating to left arm".to_string(),
        primary_category: "cardiac".to_string(),
        urgency_level: urgency,
        urgency_score: 90,
        extracted_symptoms: vec!["chest pain".to_string(), "arm pain".to_string()],
        detected_flags: vec![TriageFlag {
            keyword: "chest pain".to_string(),
            severity: "high".to_string(),
            reason: "possible cardiac event".to_string(),
            action: "immediate evaluation".to_string(),
        }],
        summary: "possible acute coronary syndrome".to_string(),
        requires_doctor_review: urgency.requires_doctor_review(),
    }
}

fn new_note(triage_id: Uuid, doctor_id: Uuid, diagnosis: &str) -> NewDoctorNote {
    NewDoctorNote {
        triage_id,
        doctor_id,
        diagnosis: diagnosis.to_string(),
        notes: "reviewed history and vitals".to_string(),
        prescription: None,
        follow_up_needed: false,
        follow_up_date: None,
        status: NoteStatus::Reviewed,
    }
}

fn new_notification(recipient: Recipient) -> NewNotification {
    NewNotification {
        recipient,
        triage_id: None,
        kind: NotificationType::General,
        title: "hello".to_string(),
        message: "world".to_string(),
        metadata: serde_json::json!({}),
    }
}

// ---------------------------------------------------------------------------
// Triage records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn created_record_is_immediately_retrievable() {
    let store = MemoryStore::new();
    let patient = Uuid::new_v4();

    let record = store
        .create_triage(new_record(patient, UrgencyLevel::Red))
        .await
        .unwrap();

    let fetched = store.get_triage(record.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, record.id);
    assert_eq!(fetched.patient_id, patient);
    assert!(!fetched.doctor_reviewed);
    assert!(fetched.doctor_note_id.is_none());
    assert!(fetched.requires_doctor_review);
}

#[tokio::test]
async fn history_is_newest_first_and_patient_scoped() {
    let store = MemoryStore::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let first = store
        .create_triage(new_record(alice, UrgencyLevel::Green))
        .await
        .unwrap();
    let second = store
        .create_triage(new_record(alice, UrgencyLevel::Yellow))
        .await
        .unwrap();
    store
        .create_triage(new_record(bob, UrgencyLevel::Red))
        .await
        .unwrap();

    let history = store.list_triage_for_patient(alice, 50).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
    assert_eq!(history[1].id, first.id);

    let limited = store.list_triage_for_patient(alice, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, second.id);
}

#[tokio::test]
async fn mark_reviewed_on_missing_record_is_not_found() {
    let store = MemoryStore::new();
    let missing = Uuid::new_v4();

    let err = store.mark_reviewed(missing, Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, StoreError::NotFound { entity: "TriageRecord", .. });
}

// ---------------------------------------------------------------------------
// Doctor notes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upsert_replaces_note_in_place() {
    let store = MemoryStore::new();
    let record = store
        .create_triage(new_record(Uuid::new_v4(), UrgencyLevel::Red))
        .await
        .unwrap();

    let doctor_a = Uuid::new_v4();
    let doctor_b = Uuid::new_v4();

    let first = store
        .upsert_note(new_note(record.id, doctor_a, "angina"))
        .await
        .unwrap();
    let second = store
        .upsert_note(new_note(record.id, doctor_b, "myocardial infarction"))
        .await
        .unwrap();

    // Same row: id and created_at survive, content is replaced.
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.diagnosis, "myocardial infarction");
    assert_eq!(second.doctor_id, doctor_b);

    let stored = store.get_note_for_triage(record.id).await.unwrap().unwrap();
    assert_eq!(stored.diagnosis, "myocardial infarction");
}

#[tokio::test]
async fn set_note_status_flips_and_errors_on_missing() {
    let store = MemoryStore::new();
    let record = store
        .create_triage(new_record(Uuid::new_v4(), UrgencyLevel::Yellow))
        .await
        .unwrap();
    let note = store
        .upsert_note(new_note(record.id, Uuid::new_v4(), "migraine"))
        .await
        .unwrap();

    store
        .set_note_status(note.id, NoteStatus::Pending)
        .await
        .unwrap();
    let stored = store.get_note_for_triage(record.id).await.unwrap().unwrap();
    assert_eq!(stored.status, NoteStatus::Pending);

    let err = store
        .set_note_status(Uuid::new_v4(), NoteStatus::Completed)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::NotFound { entity: "DoctorNote", .. });
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batch_insert_reports_per_row_failures() {
    let store = MemoryStore::new();
    let ok_recipient = Recipient::doctor(Uuid::new_v4());
    let bad_recipient = Recipient::doctor(Uuid::new_v4());
    store.fail_notifications_for(bad_recipient).await;

    let batch = store
        .insert_notifications(vec![
            new_notification(ok_recipient),
            new_notification(bad_recipient),
        ])
        .await
        .unwrap();

    assert_eq!(batch.written.len(), 1);
    assert_eq!(batch.written[0].recipient, ok_recipient);
    assert_eq!(batch.failed.len(), 1);
    assert_eq!(batch.failed[0].recipient, bad_recipient);

    // Only the written row is visible.
    assert_eq!(store.all_notifications().await.len(), 1);
}

#[tokio::test]
async fn notifications_are_recipient_scoped() {
    let store = MemoryStore::new();
    let id = Uuid::new_v4();
    // Same uuid, different kind: must not see each other's notifications.
    let as_patient = Recipient::patient(id);
    let as_doctor = Recipient::doctor(id);

    store
        .insert_notifications(vec![new_notification(as_patient)])
        .await
        .unwrap();

    assert_eq!(
        store.list_notifications(as_patient, false, 50).await.unwrap().len(),
        1
    );
    assert!(store
        .list_notifications(as_doctor, false, 50)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn read_flag_is_monotonic_and_scoped() {
    let store = MemoryStore::new();
    let recipient = Recipient::patient(Uuid::new_v4());
    let other = Recipient::patient(Uuid::new_v4());

    let batch = store
        .insert_notifications(vec![new_notification(recipient)])
        .await
        .unwrap();
    let id = batch.written[0].id;

    // Wrong recipient cannot flip it.
    assert!(!store.mark_notification_read(id, other).await.unwrap());
    assert_eq!(store.unread_count(recipient).await.unwrap(), 1);

    // Owner flips it once; the second call is a no-op.
    assert!(store.mark_notification_read(id, recipient).await.unwrap());
    assert!(!store.mark_notification_read(id, recipient).await.unwrap());
    assert_eq!(store.unread_count(recipient).await.unwrap(), 0);

    let unread = store.list_notifications(recipient, true, 50).await.unwrap();
    assert!(unread.is_empty());
}

#[tokio::test]
async fn mark_all_read_counts_flipped_rows() {
    let store = MemoryStore::new();
    let recipient = Recipient::doctor(Uuid::new_v4());

    store
        .insert_notifications(vec![
            new_notification(recipient),
            new_notification(recipient),
            new_notification(recipient),
        ])
        .await
        .unwrap();

    assert_eq!(store.mark_all_notifications_read(recipient).await.unwrap(), 3);
    assert_eq!(store.mark_all_notifications_read(recipient).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_notification_is_owner_scoped() {
    let store = MemoryStore::new();
    let recipient = Recipient::patient(Uuid::new_v4());
    let other = Recipient::patient(Uuid::new_v4());

    let batch = store
        .insert_notifications(vec![new_notification(recipient)])
        .await
        .unwrap();
    let id = batch.written[0].id;

    assert!(!store.delete_notification(id, other).await.unwrap());
    assert!(store.delete_notification(id, recipient).await.unwrap());
    assert!(store.all_notifications().await.is_empty());
}

// ---------------------------------------------------------------------------
// Doctor directory
// ---------------------------------------------------------------------------

#[tokio::test]
async fn directory_lists_only_active_doctors() {
    let store = MemoryStore::new();
    let active = store.seed_doctor("Dr. Chen").await;
    store.seed_inactive_doctor("Dr. Retired").await;

    let doctors = store.list_active_doctors().await.unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].id, active.id);
}

#[tokio::test]
async fn injected_faults_surface_as_unavailable() {
    let store = MemoryStore::new();
    store.fail_create_triage(true).await;

    let err = store
        .create_triage(new_record(Uuid::new_v4(), UrgencyLevel::Green))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Unavailable(_));

    store.fail_create_triage(false).await;
    assert!(store
        .create_triage(new_record(Uuid::new_v4(), UrgencyLevel::Green))
        .await
        .is_ok());
}
