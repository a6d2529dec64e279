//! Tests for the read-through helper against the in-memory cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use aegle_cache::{read_through, Cache, MemoryCache, NoopCache};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
}

/// Loader that counts how many times the authoritative source was hit.
struct CountingLoader {
    calls: AtomicUsize,
}

impl CountingLoader {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    async fn load(&self) -> Result<Snapshot, std::convert::Infallible> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as u32;
        Ok(Snapshot { version: n + 1 })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn miss_loads_and_populates() {
    let cache = MemoryCache::new();
    let loader = CountingLoader::new();

    let first = read_through(&cache, "snap", Duration::from_secs(60), || loader.load())
        .await
        .unwrap();
    assert_eq!(first.version, 1);
    assert_eq!(loader.calls(), 1);

    // Second read is served from cache: loader not called again.
    let second = read_through(&cache, "snap", Duration::from_secs(60), || loader.load())
        .await
        .unwrap();
    assert_eq!(second, first);
    assert_eq!(loader.calls(), 1);
}

#[tokio::test]
async fn invalidate_forces_recompute() {
    let cache = MemoryCache::new();
    let loader = CountingLoader::new();

    let _ = read_through(&cache, "snap", Duration::from_secs(60), || loader.load())
        .await
        .unwrap();

    // Invalidating a missing key must not error...
    cache.delete("some-other-key").await.unwrap();
    // ...and invalidating the real key forces the next read to recompute.
    cache.delete("snap").await.unwrap();

    let refreshed = read_through(&cache, "snap", Duration::from_secs(60), || loader.load())
        .await
        .unwrap();
    assert_eq!(refreshed.version, 2);
    assert_eq!(loader.calls(), 2);
}

#[tokio::test]
async fn offline_cache_degrades_to_loader() {
    let cache = MemoryCache::new();
    cache.set_offline(true);
    let loader = CountingLoader::new();

    // Both reads hit the loader; neither errors.
    let a = read_through(&cache, "snap", Duration::from_secs(60), || loader.load())
        .await
        .unwrap();
    let b = read_through(&cache, "snap", Duration::from_secs(60), || loader.load())
        .await
        .unwrap();
    assert_eq!(a.version, 1);
    assert_eq!(b.version, 2);
    assert_eq!(loader.calls(), 2);
}

#[tokio::test]
async fn expired_entry_recomputes() {
    let cache = MemoryCache::new();
    let loader = CountingLoader::new();

    let _ = read_through(&cache, "snap", Duration::from_millis(10), || loader.load())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let refreshed = read_through(&cache, "snap", Duration::from_millis(10), || loader.load())
        .await
        .unwrap();
    assert_eq!(refreshed.version, 2);
}

#[tokio::test]
async fn corrupt_entry_is_discarded() {
    let cache = MemoryCache::new();
    let loader = CountingLoader::new();

    // A value that does not decode as Snapshot.
    cache
        .set("snap", serde_json::json!("not-a-snapshot"), Duration::from_secs(60))
        .await
        .unwrap();

    let loaded = read_through(&cache, "snap", Duration::from_secs(60), || loader.load())
        .await
        .unwrap();
    assert_eq!(loaded.version, 1);
    assert_eq!(loader.calls(), 1);
}

#[tokio::test]
async fn loader_error_propagates() {
    let cache = MemoryCache::new();

    let result: Result<Snapshot, &str> =
        read_through(&cache, "snap", Duration::from_secs(60), || async {
            Err("store down")
        })
        .await;
    assert_eq!(result.unwrap_err(), "store down");
}

#[tokio::test]
async fn noop_cache_always_loads() {
    let cache = NoopCache;
    let loader = CountingLoader::new();

    let _ = read_through(&cache, "snap", Duration::from_secs(60), || loader.load())
        .await
        .unwrap();
    let _ = read_through(&cache, "snap", Duration::from_secs(60), || loader.load())
        .await
        .unwrap();
    assert_eq!(loader.calls(), 2);
}
