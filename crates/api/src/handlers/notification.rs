//! Handlers for the `/notifications` resource.
//!
//! Every endpoint is scoped to the caller's own notifications via the
//! identity headers; there is no way to address another recipient's rows.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::identity::Identity;
use crate::state::AppState;

/// Maximum page size for notification listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for notification listing.
const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, return only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
}

/// GET /api/v1/notifications
///
/// List the caller's notifications, newest first.
pub async fn list(
    identity: Identity,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let unread_only = params.unread_only.unwrap_or(false);

    let notifications = state
        .notifier
        .list(identity.recipient(), unread_only, limit)
        .await?;
    Ok(Json(serde_json::json!({ "data": notifications })))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    identity: Identity,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = state.notifier.unread_count(identity.recipient()).await?;
    Ok(Json(serde_json::json!({ "data": { "count": count } })))
}

/// POST /api/v1/notifications/{id}/read
///
/// Mark a single notification as read. Returns 204 No Content, or 404 if
/// no unread notification with this id belongs to the caller.
pub async fn mark_read(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let flipped = state.notifier.mark_read(id, identity.recipient()).await?;
    if !flipped {
        return Err(AppError::NotFound {
            entity: "Notification",
            id,
        });
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read-all
///
/// Mark all of the caller's notifications as read. Returns the number of
/// notifications that were flipped.
pub async fn mark_all_read(
    identity: Identity,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = state.notifier.mark_all_read(identity.recipient()).await?;
    Ok(Json(serde_json::json!({ "data": { "marked_read": count } })))
}

/// DELETE /api/v1/notifications/{id}
pub async fn delete(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let deleted = state.notifier.delete(id, identity.recipient()).await?;
    if !deleted {
        return Err(AppError::NotFound {
            entity: "Notification",
            id,
        });
    }
    Ok(StatusCode::NO_CONTENT)
}
