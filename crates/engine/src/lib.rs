//! Triage record lifecycle and notification fan-out.
//!
//! This crate owns the consistency guarantees of the backend:
//!
//! - [`LifecycleEngine`] — submit, review, and the cached read paths.
//!   Store writes are the only steps that can fail an operation; cache
//!   and delivery side effects degrade into [`DeliveryWarning`]s.
//! - [`Notifier`] — durable notification fan-out plus the notification
//!   read model. A notification is pushed to a live subscriber only
//!   after its row is committed.
//!
//! Every collaborator is injected (`Arc<dyn …>`), so the whole engine
//! runs against in-memory fakes in tests.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod notifier;

mod effects;

pub use config::EngineConfig;
pub use error::{DeliveryWarning, PersistenceError, ReviewError};
pub use lifecycle::{LifecycleEngine, NoteFields, Review, Submission};
pub use notifier::{FanoutResult, NotificationPayload, Notifier};
