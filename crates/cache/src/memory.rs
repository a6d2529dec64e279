//! In-memory cache with per-key expiry.
//!
//! Backs tests and single-node development. Expired entries are dropped
//! lazily on access. Fault injection makes every operation fail so the
//! cache-offline paths can be exercised.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{Cache, CacheError};

struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
}

/// In-memory [`Cache`] implementation.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    offline: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the cache being unreachable: every operation returns
    /// `CacheError::Unavailable` until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_online(&self) -> Result<(), CacheError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable("cache offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        self.check_online()?;

        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.check_online()?;

        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check_online()?;

        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = MemoryCache::new();
        cache
            .set("k", json!({"a": 1}), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache
            .set("k", json!(1), Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn delete_missing_key_is_a_noop() {
        let cache = MemoryCache::new();
        cache.delete("never-set").await.unwrap();

        cache
            .set("k", json!(true), Duration::from_secs(60))
            .await
            .unwrap();
        cache.delete("k").await.unwrap();
        cache.delete("k").await.unwrap(); // second delete is fine too
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn offline_cache_fails_every_operation() {
        let cache = MemoryCache::new();
        cache.set_offline(true);

        assert_matches!(cache.get("k").await, Err(CacheError::Unavailable(_)));
        assert_matches!(
            cache.set("k", json!(1), Duration::from_secs(1)).await,
            Err(CacheError::Unavailable(_))
        );
        assert_matches!(cache.delete("k").await, Err(CacheError::Unavailable(_)));

        cache.set_offline(false);
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
