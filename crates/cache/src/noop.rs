//! No-op cache for deployments without a cache tier.
//!
//! Every read is a miss and every write succeeds without storing
//! anything, so the system runs correctly (just slower) when no Redis
//! URL is configured.

use std::time::Duration;

use async_trait::async_trait;

use crate::{Cache, CacheError};

/// [`Cache`] that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl Cache for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        Ok(None)
    }

    async fn set(
        &self,
        _key: &str,
        _value: serde_json::Value,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
