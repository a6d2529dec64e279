use std::sync::Arc;

use aegle_ai::Classifier;
use aegle_db::store::TriageStore;
use aegle_engine::{LifecycleEngine, Notifier};
use aegle_events::DeliveryChannel;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The triage record lifecycle engine.
    pub engine: Arc<LifecycleEngine>,
    /// Notification fan-out and read model.
    pub notifier: Arc<Notifier>,
    /// Real-time per-recipient delivery hub (WebSocket fan-out).
    pub channel: Arc<DeliveryChannel>,
    /// AI classification boundary.
    pub classifier: Arc<dyn Classifier>,
    /// Store handle, used directly only by the health check.
    pub store: Arc<dyn TriageStore>,
}
