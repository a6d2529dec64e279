//! Canned classifier for tests and offline development.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use aegle_core::triage::{TriagePrediction, UrgencyLevel};

use crate::classifier::{Classifier, ClassifierError};

/// [`Classifier`] that returns a fixed prediction.
///
/// The prediction's urgency can be chosen per instance, so tests can
/// drive both the fan-out and the quiet paths.
pub struct StubClassifier {
    prediction: TriagePrediction,
    unavailable: AtomicBool,
}

impl StubClassifier {
    /// Stub that predicts the given urgency with a plausible payload.
    pub fn with_urgency(urgency: UrgencyLevel) -> Self {
        let score = match urgency {
            UrgencyLevel::Red => 92,
            UrgencyLevel::Yellow => 55,
            UrgencyLevel::Green => 12,
        };
        Self {
            prediction: TriagePrediction {
                primary_category: "general".to_string(),
                urgency_level: urgency,
                urgency_score: score,
                extracted_symptoms: vec!["headache".to_string()],
                detected_flags: Vec::new(),
                summary: "stub prediction".to_string(),
            },
            unavailable: AtomicBool::new(false),
        }
    }

    /// Stub that returns exactly `prediction`.
    pub fn with_prediction(prediction: TriagePrediction) -> Self {
        Self {
            prediction,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every `classify` call fail as if the service were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(
        &self,
        _complaint: &str,
        _patient_data: Option<&serde_json::Value>,
    ) -> Result<TriagePrediction, ClassifierError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ClassifierError::Service {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(self.prediction.clone())
    }
}
