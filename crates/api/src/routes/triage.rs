//! Route definitions for the `/triage` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::triage;
use crate::state::AppState;

/// Routes mounted at `/triage`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(triage::submit))
        .route("/history", get(triage::history))
        .route("/{id}", get(triage::get_record))
        .route("/{id}/refresh", post(triage::refresh))
        .route("/{id}/note", get(triage::get_note))
        .route("/{id}/review", post(triage::review))
}
