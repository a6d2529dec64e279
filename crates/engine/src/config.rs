//! Engine tuning knobs.

use std::time::Duration;

use aegle_cache::ttl;

/// Timeouts and TTLs for the engine's side-effect paths.
///
/// The side-effect budget is deliberately much shorter than any store
/// timeout: a slow cache or delivery channel must not hold a mutation
/// hostage.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Budget for one cache or delivery call. Exceeding it produces a
    /// `DeliveryWarning::Timeout`, never an operation failure.
    pub side_effect_timeout: Duration,

    /// TTL for cached triage records and history lists.
    pub record_ttl: Duration,

    /// TTL for cached notification lists and unread counts.
    pub notification_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            side_effect_timeout: Duration::from_millis(250),
            record_ttl: ttl::SHORT,
            notification_ttl: ttl::SHORT,
        }
    }
}
