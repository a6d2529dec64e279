//! AI classification boundary.
//!
//! - [`Classifier`] — the trait the rest of the system depends on.
//! - [`HttpClassifier`] — [`reqwest`] client for the external triage
//!   classification service.
//! - [`StubClassifier`] — canned predictions for tests and local
//!   development without the service.

pub mod classifier;
pub mod http;
pub mod stub;

pub use classifier::{Classifier, ClassifierError};
pub use http::HttpClassifier;
pub use stub::StubClassifier;
