pub mod health;
pub mod notification;
pub mod triage;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                               notification stream (WebSocket)
///
/// /triage                           submit (POST)
/// /triage/history                   patient history (GET)
/// /triage/{id}                      get record (GET)
/// /triage/{id}/refresh              invalidate-and-refetch (POST)
/// /triage/{id}/note                 doctor note (GET)
/// /triage/{id}/review               doctor review (POST)
///
/// /notifications                    list (GET)
/// /notifications/unread-count       unread count (GET)
/// /notifications/read-all           mark all read (POST)
/// /notifications/{id}/read          mark read (POST)
/// /notifications/{id}               delete (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/triage", triage::router())
        .nest("/notifications", notification::router())
}
