//! Redis-backed cache.
//!
//! Uses a [`ConnectionManager`] so the connection is re-established
//! automatically after a drop; while Redis is unreachable, operations
//! fail fast and callers degrade to the store.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::{Cache, CacheError};

/// [`Cache`] over a Redis instance. Cheap to clone.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connect to Redis at `url` (e.g. `redis://localhost:6379/0`).
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;
        match raw {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let serialized = serde_json::to_string(&value)?;
        let mut conn = self.conn.clone();
        // SETEX: a zero TTL is invalid in Redis, clamp to one second.
        let secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, serialized, secs).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // DEL on a missing key is a no-op by Redis semantics.
        let _: () = conn.del(key).await?;
        Ok(())
    }
}
