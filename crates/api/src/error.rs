use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use aegle_ai::ClassifierError;
use aegle_core::error::CoreError;
use aegle_core::types::EntityId;
use aegle_db::error::StoreError;
use aegle_engine::{PersistenceError, ReviewError};

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain error types and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `aegle_core` (validation, etc.).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The authoritative store write or read failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The review state machine could not complete.
    #[error(transparent)]
    Review(#[from] ReviewError),

    /// The AI classification service failed or is unreachable.
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    /// A resource scoped to the caller was not found.
    #[error("{entity} with id {id} not found")]
    NotFound {
        entity: &'static str,
        id: EntityId,
    },

    /// Identity headers missing or malformed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller's role does not permit the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal_error()
                }
            },

            AppError::Persistence(PersistenceError(store)) => classify_store_error(store),

            AppError::Review(review) => match review {
                ReviewError::TriageNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("TriageRecord with id {id} not found"),
                ),
                other => {
                    tracing::error!(error = %other, "Review failed");
                    internal_error()
                }
            },

            // The AI service is an upstream dependency: its failures are
            // 503, never 500.
            AppError::Classifier(err) => {
                tracing::warn!(error = %err, "Classification service unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "UPSTREAM_UNAVAILABLE",
                    "Triage classification is temporarily unavailable".to_string(),
                )
            }

            AppError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a store error into an HTTP status, error code, and message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        StoreError::Unavailable(msg) => {
            tracing::error!(error = %msg, "Store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "The data store is temporarily unavailable".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Store error");
            internal_error()
        }
    }
}
