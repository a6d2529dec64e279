//! The classification trait and its error type.

use async_trait::async_trait;

use aegle_core::triage::TriagePrediction;

/// Errors from the classification layer.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("classification request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("classification service error ({status}): {body}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered 2xx but the body did not decode.
    #[error("unreadable classification response: {0}")]
    Decode(String),
}

/// Turns a free-text complaint into a structured triage prediction.
///
/// Implementations are injected as `Arc<dyn Classifier>`; the engine and
/// API never know which one they are talking to.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify `complaint`, optionally enriched with structured patient
    /// context (age, known conditions, medications).
    async fn classify(
        &self,
        complaint: &str,
        patient_data: Option<&serde_json::Value>,
    ) -> Result<TriagePrediction, ClassifierError>;
}
