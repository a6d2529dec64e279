//! HTTP client for the external triage classification service.

use async_trait::async_trait;
use tracing::debug;

use aegle_core::triage::TriagePrediction;

use crate::classifier::{Classifier, ClassifierError};

/// [`Classifier`] backed by the triage service's `POST /api/triage`
/// endpoint.
pub struct HttpClassifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClassifier {
    /// Create a client for the service at `base_url`
    /// (e.g. `http://localhost:8001`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        complaint: &str,
        patient_data: Option<&serde_json::Value>,
    ) -> Result<TriagePrediction, ClassifierError> {
        let body = serde_json::json!({
            "complaint_text": complaint,
            "patient_data": patient_data,
        });

        let response = self
            .client
            .post(format!("{}/api/triage", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let prediction: TriagePrediction = response
            .json()
            .await
            .map_err(|e| ClassifierError::Decode(e.to_string()))?;

        debug!(
            urgency = %prediction.urgency_level,
            score = prediction.urgency_score,
            "classification received"
        );
        Ok(prediction)
    }
}
