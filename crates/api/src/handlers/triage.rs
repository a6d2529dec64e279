//! Handlers for the `/triage` resource.
//!
//! All endpoints require identity headers. Patients see only their own
//! records; a foreign record id answers 404, not 403, so record ids are
//! not probeable.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use aegle_core::notify::RecipientKind;
use aegle_core::triage::validate_complaint;
use aegle_db::models::TriageRecord;
use aegle_engine::NoteFields;

use crate::error::{AppError, AppResult};
use crate::identity::Identity;
use crate::state::AppState;

/// Default page size for triage history.
const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// Maximum page size for triage history.
const MAX_HISTORY_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `POST /triage`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Free-text patient complaint.
    pub complaint: String,
    /// Optional structured context forwarded to the classifier
    /// (age, known conditions, medications).
    #[serde(default)]
    pub patient_data: Option<serde_json::Value>,
}

/// Query parameters for `GET /triage/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of results. Defaults to 20, capped at 50.
    pub limit: Option<i64>,
}

/// Body for `POST /triage/{id}/review`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub diagnosis: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub prescription: Option<String>,
    #[serde(default)]
    pub follow_up_needed: bool,
    #[serde(default)]
    pub follow_up_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/triage
///
/// Classify the caller's complaint and persist the resulting triage
/// record. Returns 201 with the record; a Red urgency has already fanned
/// out to on-call doctors by the time the response is sent.
pub async fn submit(
    identity: Identity,
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if identity.role != RecipientKind::Patient {
        return Err(AppError::Forbidden(
            "Only patients can submit complaints".into(),
        ));
    }
    validate_complaint(&req.complaint)?;

    let prediction = state
        .classifier
        .classify(&req.complaint, req.patient_data.as_ref())
        .await?;

    let submission = state
        .engine
        .submit(identity.user_id, req.complaint, prediction)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": submission.record })),
    ))
}

/// GET /api/v1/triage/history
///
/// The authenticated patient's triage records, newest first.
pub async fn history(
    identity: Identity,
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> AppResult<Json<serde_json::Value>> {
    if identity.role != RecipientKind::Patient {
        return Err(AppError::Forbidden("History is patient-scoped".into()));
    }
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let records = state.engine.patient_history(identity.user_id, limit).await?;
    Ok(Json(serde_json::json!({ "data": records })))
}

/// GET /api/v1/triage/{id}
pub async fn get_record(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let record = fetch_visible(&state, &identity, id).await?;
    Ok(Json(serde_json::json!({ "data": record })))
}

/// POST /api/v1/triage/{id}/refresh
///
/// Drop any cached copy of the record and re-read it from the store.
pub async fn refresh(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    // Same visibility rule as a plain read.
    fetch_visible(&state, &identity, id).await?;

    let record = state
        .engine
        .refresh_record(id)
        .await?
        .ok_or(AppError::NotFound {
            entity: "TriageRecord",
            id,
        })?;
    Ok(Json(serde_json::json!({ "data": record })))
}

/// GET /api/v1/triage/{id}/note
///
/// The doctor note attached to a record, if any.
pub async fn get_note(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    fetch_visible(&state, &identity, id).await?;

    let note = state.engine.note_for_record(id).await?;
    Ok(Json(serde_json::json!({ "data": note })))
}

/// POST /api/v1/triage/{id}/review
///
/// Record a doctor's review. A second review of the same record replaces
/// the existing note in place.
pub async fn review(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> AppResult<Json<serde_json::Value>> {
    identity.require_doctor()?;
    if req.diagnosis.trim().is_empty() {
        return Err(AppError::BadRequest("Diagnosis must not be empty".into()));
    }

    let review = state
        .engine
        .review(
            id,
            identity.user_id,
            NoteFields {
                diagnosis: req.diagnosis,
                notes: req.notes,
                prescription: req.prescription,
                follow_up_needed: req.follow_up_needed,
                follow_up_date: req.follow_up_date,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({
        "data": {
            "record": review.record,
            "note": review.note,
        }
    })))
}

/// Fetch a record, enforcing patient visibility.
async fn fetch_visible(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
) -> AppResult<TriageRecord> {
    let record = state
        .engine
        .get_record(id)
        .await?
        .ok_or(AppError::NotFound {
            entity: "TriageRecord",
            id,
        })?;

    if identity.role == RecipientKind::Patient && record.patient_id != identity.user_id {
        return Err(AppError::NotFound {
            entity: "TriageRecord",
            id,
        });
    }
    Ok(record)
}
