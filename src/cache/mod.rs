//! In-memory response cache
//!
//! Values are stored serialized as JSON with the time they were produced.
//! An entry is fresh while its age is below the caller's TTL; stale entries
//! are replaced on the next fetch. Nothing is evicted except by
//! [`TtlCache::invalidate_all`].

pub mod key;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

pub use key::{QUICK_STATS_KEY, sheet_key};

/// Default freshness window for fetched tables
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    data: Vec<u8>,
    stored_at: Instant,
}

/// Key -> (value, timestamp) map with per-key fetch de-duplication.
///
/// Concurrent callers for the same missing key queue behind one producer:
/// the first runs it, the rest find its result when they get the gate.
#[derive(Default)]
pub struct TtlCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    gates: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key` if younger than `ttl`, otherwise run
    /// `producer`, store its result with the current time and return it.
    ///
    /// Producer errors are returned as-is and nothing is stored.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, ttl: Duration, producer: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.get_fresh(key, ttl) {
            log::debug!("Cache hit: {}", key);
            return Ok(hit);
        }

        let gate = self.gate(key);
        let _turn = gate.lock().await;

        // Another caller may have filled the entry while we waited
        if let Some(hit) = self.get_fresh(key, ttl) {
            log::debug!("Cache hit after wait: {}", key);
            return Ok(hit);
        }

        log::debug!("Cache miss: {}", key);
        let value = producer().await?;
        self.put(key, &value);
        Ok(value)
    }

    /// Cached value for `key` if present, decodable and younger than `ttl`
    pub fn get_fresh<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<T> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() >= ttl {
            return None;
        }
        serde_json::from_slice(&entry.data).ok()
    }

    /// Store a value stamped with the current time, replacing any previous entry
    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        let data = match serde_json::to_vec(value) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Not caching {}: {}", key, e);
                return;
            }
        };

        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.to_string(),
                CacheEntry {
                    data,
                    stored_at: Instant::now(),
                },
            );
        }
    }

    /// Drop every entry, timestamp and fetch gate. Returns how many entries
    /// were removed.
    ///
    /// A producer still running keeps its own gate; callers arriving after
    /// this get a fresh one.
    pub fn invalidate_all(&self) -> usize {
        if let Ok(mut gates) = self.gates.lock() {
            gates.clear();
        }
        match self.entries.lock() {
            Ok(mut entries) => {
                let removed = entries.len();
                entries.clear();
                removed
            }
            Err(_) => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn gate(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        match self.gates.lock() {
            Ok(mut gates) => gates.entry(key.to_string()).or_default().clone(),
            // A poisoned gate map only costs de-duplication
            Err(_) => Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, Error};
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted(counter: &AtomicUsize, value: &str) -> Result<String> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(value.to_string())
    }

    #[tokio::test]
    async fn test_repeated_calls_within_ttl_produce_once() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(60);

        for _ in 0..3 {
            let v: String = cache
                .get_or_fetch("k", ttl, || counted(&calls, "v1"))
                .await
                .unwrap();
            assert_eq!(v, "v1");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_call_after_ttl_refetches() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_millis(20);

        let _: String = cache.get_or_fetch("k", ttl, || counted(&calls, "old")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let v: String = cache.get_or_fetch("k", ttl, || counted(&calls, "new")).await.unwrap();

        assert_eq!(v, "new");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_never_fresh() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let _: String = cache
                .get_or_fetch("k", Duration::ZERO, || counted(&calls, "v"))
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_producer_error_is_not_cached() {
        let cache = TtlCache::new();
        let ttl = Duration::from_secs(60);

        let err = cache
            .get_or_fetch::<String, _, _>("k", ttl, || async {
                Err(ApiError::Network("down".to_string()).into())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Network(_))));
        assert!(cache.is_empty());

        let calls = AtomicUsize::new(0);
        let _: String = cache.get_or_fetch("k", ttl, || counted(&calls, "v")).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_one_producer() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(60);

        let counter = &calls;
        let slow = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, Error>(7u32)
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch("k", ttl, slow),
            cache.get_or_fetch("k", ttl, slow)
        );

        assert_eq!(a.unwrap(), 7);
        assert_eq!(b.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_producer() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(60);

        let _: String = cache.get_or_fetch("a", ttl, || counted(&calls, "1")).await.unwrap();
        let _: String = cache.get_or_fetch("b", ttl, || counted(&calls, "2")).await.unwrap();

        assert_eq!(cache.invalidate_all(), 2);
        assert_eq!(cache.invalidate_all(), 0);
        assert!(cache.is_empty());

        let _: String = cache.get_or_fetch("a", ttl, || counted(&calls, "1")).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invalidate_all_drops_fetch_gates() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(60);

        for key in ["a", "b", "c"] {
            let _: String = cache.get_or_fetch(key, ttl, || counted(&calls, key)).await.unwrap();
        }
        assert_eq!(cache.gates.lock().unwrap().len(), 3);

        cache.invalidate_all();

        assert!(cache.gates.lock().unwrap().is_empty());
        let v: String = cache.get_or_fetch("a", ttl, || counted(&calls, "again")).await.unwrap();
        assert_eq!(v, "again");
        assert_eq!(cache.gates.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_get_fresh_wrong_type_is_a_miss() {
        let cache = TtlCache::new();
        cache.put("k", &"text");

        let hit: Option<u32> = cache.get_fresh("k", Duration::from_secs(60));
        assert!(hit.is_none());
    }
}
