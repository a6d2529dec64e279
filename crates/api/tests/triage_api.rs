//! Integration tests for the `/triage` resource: submit, reads, review,
//! and the Red-urgency fan-out as seen over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use aegle_core::triage::UrgencyLevel;
use common::{body_json, build_test_app, expect_json, get, post, post_json, send, Caller};

// ---------------------------------------------------------------------------
// Identity & validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_without_identity_headers_is_unauthorized() {
    let t = build_test_app(UrgencyLevel::Green);
    let response = send(
        &t.app,
        Method::POST,
        "/api/v1/triage",
        None,
        Some(json!({ "complaint": "headache" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn doctors_cannot_submit_complaints() {
    let t = build_test_app(UrgencyLevel::Green);
    let response = post_json(
        &t.app,
        "/api/v1/triage",
        Caller::doctor(Uuid::new_v4()),
        json!({ "complaint": "headache" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn empty_complaint_is_rejected_before_classification() {
    let t = build_test_app(UrgencyLevel::Green);
    let response = post_json(
        &t.app,
        "/api/v1/triage",
        Caller::patient(),
        json!({ "complaint": "   " }),
    )
    .await;

    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn classifier_outage_maps_to_503() {
    let t = build_test_app(UrgencyLevel::Green);
    t.classifier.set_unavailable(true);

    let response = post_json(
        &t.app,
        "/api/v1/triage",
        Caller::patient(),
        json!({ "complaint": "headache" }),
    )
    .await;

    let json = expect_json(response, StatusCode::SERVICE_UNAVAILABLE).await;
    assert_eq!(json["code"], "UPSTREAM_UNAVAILABLE");
}

// ---------------------------------------------------------------------------
// Submit & read paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patient_submits_and_fetches_record() {
    let t = build_test_app(UrgencyLevel::Green);
    let patient = Caller::patient();

    let response = post_json(
        &t.app,
        "/api/v1/triage",
        patient,
        json!({ "complaint": "mild headache since yesterday" }),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["doctor_reviewed"], false);

    let response = get(&t.app, &format!("/api/v1/triage/{id}"), patient).await;
    let fetched = expect_json(response, StatusCode::OK).await;
    assert_eq!(fetched["data"]["complaint"], "mild headache since yesterday");
    assert_eq!(fetched["data"]["urgency_level"], "Green");
}

#[tokio::test]
async fn foreign_patient_record_is_hidden_as_404() {
    let t = build_test_app(UrgencyLevel::Green);
    let owner = Caller::patient();

    let response = post_json(
        &t.app,
        "/api/v1/triage",
        owner,
        json!({ "complaint": "private matter" }),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = get(&t.app, &format!("/api/v1/triage/{id}"), Caller::patient()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Doctors see any record.
    let response = get(
        &t.app,
        &format!("/api/v1/triage/{id}"),
        Caller::doctor(Uuid::new_v4()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn history_is_newest_first() {
    let t = build_test_app(UrgencyLevel::Green);
    let patient = Caller::patient();

    for complaint in ["first", "second"] {
        let response = post_json(
            &t.app,
            "/api/v1/triage",
            patient,
            json!({ "complaint": complaint }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get(&t.app, "/api/v1/triage/history", patient).await;
    let json = expect_json(response, StatusCode::OK).await;
    let records = json["data"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["complaint"], "second");
    assert_eq!(records[1]["complaint"], "first");
}

#[tokio::test]
async fn refresh_returns_the_authoritative_record() {
    let t = build_test_app(UrgencyLevel::Green);
    let patient = Caller::patient();

    let response = post_json(
        &t.app,
        "/api/v1/triage",
        patient,
        json!({ "complaint": "sore throat" }),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = post(&t.app, &format!("/api/v1/triage/{id}/refresh"), patient).await;
    let refreshed = expect_json(response, StatusCode::OK).await;
    assert_eq!(refreshed["data"]["complaint"], "sore throat");
}

// ---------------------------------------------------------------------------
// Red-urgency fan-out over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn red_submission_notifies_on_call_doctors() {
    let t = build_test_app(UrgencyLevel::Red);
    let doctor = t.store.seed_doctor("Dr. Reyes").await;
    t.store.seed_doctor("Dr. Okafor").await;

    let response = post_json(
        &t.app,
        "/api/v1/triage",
        Caller::patient(),
        json!({ "complaint": "crushing chest pain" }),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(created["data"]["requires_doctor_review"], true);

    let response = get(&t.app, "/api/v1/notifications", Caller::doctor(doctor.id)).await;
    let json = expect_json(response, StatusCode::OK).await;
    let notifications = json["data"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "urgent_case");
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[tokio::test]
async fn doctor_reviews_and_patient_is_notified() {
    let t = build_test_app(UrgencyLevel::Red);
    t.store.seed_doctor("Dr. Reyes").await;
    let patient = Caller::patient();

    let response = post_json(
        &t.app,
        "/api/v1/triage",
        patient,
        json!({ "complaint": "chest pain" }),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let doctor = Caller::doctor(Uuid::new_v4());
    let response = post_json(
        &t.app,
        &format!("/api/v1/triage/{id}/review"),
        doctor,
        json!({
            "diagnosis": "angina",
            "notes": "ECG recommended",
            "follow_up_needed": true,
            "follow_up_date": "2026-09-15"
        }),
    )
    .await;
    let review = expect_json(response, StatusCode::OK).await;
    assert_eq!(review["data"]["record"]["doctor_reviewed"], true);
    assert_eq!(review["data"]["note"]["diagnosis"], "angina");

    let response = get(&t.app, &format!("/api/v1/triage/{id}/note"), patient).await;
    let note = expect_json(response, StatusCode::OK).await;
    assert_eq!(note["data"]["diagnosis"], "angina");

    let response = get(&t.app, "/api/v1/notifications", patient).await;
    let json = expect_json(response, StatusCode::OK).await;
    let kinds: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap().to_string())
        .collect();
    assert!(kinds.contains(&"doctor_note".to_string()));
    assert!(kinds.contains(&"status_update".to_string()));
    assert!(kinds.contains(&"follow_up".to_string()));
}

#[tokio::test]
async fn patients_cannot_review() {
    let t = build_test_app(UrgencyLevel::Green);
    let patient = Caller::patient();

    let response = post_json(
        &t.app,
        "/api/v1/triage",
        patient,
        json!({ "complaint": "headache" }),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = post_json(
        &t.app,
        &format!("/api/v1/triage/{id}/review"),
        patient,
        json!({ "diagnosis": "self-diagnosed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn review_of_missing_record_is_404() {
    let t = build_test_app(UrgencyLevel::Green);

    let response = post_json(
        &t.app,
        &format!("/api/v1/triage/{}/review", Uuid::new_v4()),
        Caller::doctor(Uuid::new_v4()),
        json!({ "diagnosis": "n/a" }),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn review_requires_a_diagnosis() {
    let t = build_test_app(UrgencyLevel::Green);
    let patient = Caller::patient();

    let response = post_json(
        &t.app,
        "/api/v1/triage",
        patient,
        json!({ "complaint": "headache" }),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = post_json(
        &t.app,
        &format!("/api/v1/triage/{id}/review"),
        Caller::doctor(Uuid::new_v4()),
        json!({ "diagnosis": "  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
