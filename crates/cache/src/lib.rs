//! Read-accelerator cache for the Aegle triage backend.
//!
//! The cache is never the system of record: its absence or staleness may
//! only cost latency, never correctness. [`Cache`] is the boundary trait;
//! [`RedisCache`] is the production implementation, [`MemoryCache`] backs
//! tests and single-node development, and [`NoopCache`] lets a deployment
//! run with caching disabled entirely.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod keys;
pub mod memory;
pub mod noop;
pub mod redis_cache;
pub mod ttl;

pub use memory::MemoryCache;
pub use noop::NoopCache;
pub use redis_cache::RedisCache;

/// Errors produced by the cache boundary. Callers treat every one of
/// these as a degradation signal, never as operation failure.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Key/value store with per-key TTL.
///
/// `delete` is unconditional and idempotent: deleting a missing key is a
/// successful no-op.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError>;

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Read-through: return the cached value if present and unexpired,
/// otherwise load from the authoritative source, populate the cache, and
/// return the loaded value.
///
/// Cache failures (unreachable, corrupt entry) degrade to the loader and
/// are logged; only loader errors propagate.
pub async fn read_through<T, E, L, Fut>(
    cache: &dyn Cache,
    key: &str,
    ttl: Duration,
    loader: L,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    L: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    match cache.get(key).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(decoded) => return Ok(decoded),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
            }
        },
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(key, error = %e, "Cache read failed, falling through to store");
        }
    }

    let loaded = loader().await?;

    match serde_json::to_value(&loaded) {
        Ok(value) => {
            if let Err(e) = cache.set(key, value, ttl).await {
                tracing::warn!(key, error = %e, "Cache populate failed");
            }
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "Value not cacheable");
        }
    }

    Ok(loaded)
}
