//! Durable fetch cache with best-effort semantics
//!
//! Idempotent remote calls are memoized behind the durable cache keyed
//! `indexer:<platform>:<part>:<part>…` with a configured TTL. A failing
//! cache backend degrades to direct execution; cache errors never surface
//! to the indexing run.

use crate::fetch::FetchError;
use crate::storage::CacheStore;
use std::future::Future;
use std::time::Duration;

/// Platform-scoped cache-through wrapper for expensive fetches
#[derive(Debug, Clone)]
pub struct FetchCache {
    platform: String,
    enabled: bool,
    ttl: Duration,
}

impl FetchCache {
    /// Creates a cache wrapper for one platform
    ///
    /// Caching is active only when the global flag is on and the configured
    /// duration is positive.
    pub fn new(platform: &str, enabled: bool, cache_duration_secs: u64) -> Self {
        Self {
            platform: platform.to_string(),
            enabled: enabled && cache_duration_secs > 0,
            ttl: Duration::from_secs(cache_duration_secs),
        }
    }

    /// Whether this wrapper will consult the backend at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Builds the cache key for the given parts
    pub fn cache_key(&self, parts: &[&str]) -> String {
        format!("indexer:{}:{}", self.platform, parts.join(":"))
    }

    /// The key prefix covering every entry belonging to this platform
    pub fn key_prefix(&self) -> String {
        format!("indexer:{}:", self.platform)
    }

    /// Runs `op` through the cache
    ///
    /// Disabled caching executes `op` directly. On a hit the cached value is
    /// returned without running `op`; on a miss `op` runs and its result is
    /// stored with the configured TTL. Backend read/write failures are
    /// logged and swallowed; the fetch never fails because of the cache.
    pub async fn fetch_through<C, F, Fut>(
        &self,
        backend: &mut C,
        parts: &[&str],
        op: F,
    ) -> Result<String, FetchError>
    where
        C: CacheStore + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, FetchError>>,
    {
        if !self.enabled {
            return op().await;
        }

        let key = self.cache_key(parts);

        match backend.read(&key) {
            Ok(Some(value)) => {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(value);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "Cache read failed, fetching directly");
            }
        }

        let value = op().await?;

        if let Err(error) = backend.write(&key, &value, self.ttl) {
            tracing::warn!(key = %key, error = %error, "Cache write failed, continuing");
        } else {
            tracing::debug!(key = %key, "Cached result");
        }

        Ok(value)
    }

    /// Invalidates a single cache entry (operator-triggered, best-effort)
    pub fn invalidate<C: CacheStore + ?Sized>(&self, backend: &mut C, parts: &[&str]) {
        let key = self.cache_key(parts);
        if let Err(error) = backend.delete(&key) {
            tracing::warn!(key = %key, error = %error, "Cache invalidation failed");
        }
    }

    /// Invalidates every cache entry for this platform (operator-triggered,
    /// best-effort)
    pub fn invalidate_all<C: CacheStore + ?Sized>(&self, backend: &mut C) {
        let prefix = self.key_prefix();
        if let Err(error) = backend.delete_prefix(&prefix) {
            tracing::warn!(prefix = %prefix, error = %error, "Cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageError, StorageResult};
    use std::collections::HashMap;

    /// Simple in-memory backend for exercising hit/miss paths
    #[derive(Default)]
    struct MemoryCache {
        entries: HashMap<String, String>,
    }

    impl CacheStore for MemoryCache {
        fn read(&self, key: &str) -> StorageResult<Option<String>> {
            Ok(self.entries.get(key).cloned())
        }

        fn write(&mut self, key: &str, value: &str, _ttl: Duration) -> StorageResult<()> {
            self.entries.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn delete(&mut self, key: &str) -> StorageResult<()> {
            self.entries.remove(key);
            Ok(())
        }

        fn delete_prefix(&mut self, prefix: &str) -> StorageResult<()> {
            self.entries.retain(|k, _| !k.starts_with(prefix));
            Ok(())
        }
    }

    /// Backend that fails every operation
    struct BrokenCache;

    impl CacheStore for BrokenCache {
        fn read(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Database("cache backend down".to_string()))
        }

        fn write(&mut self, _key: &str, _value: &str, _ttl: Duration) -> StorageResult<()> {
            Err(StorageError::Database("cache backend down".to_string()))
        }

        fn delete(&mut self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Database("cache backend down".to_string()))
        }

        fn delete_prefix(&mut self, _prefix: &str) -> StorageResult<()> {
            Err(StorageError::Database("cache backend down".to_string()))
        }
    }

    #[test]
    fn test_cache_key_format() {
        let cache = FetchCache::new("gridverse", true, 3600);
        assert_eq!(
            cache.cache_key(&["scenes", "0,0"]),
            "indexer:gridverse:scenes:0,0"
        );
        assert_eq!(cache.key_prefix(), "indexer:gridverse:");
    }

    #[test]
    fn test_zero_duration_disables_cache() {
        assert!(!FetchCache::new("gridverse", true, 0).is_enabled());
        assert!(!FetchCache::new("gridverse", false, 3600).is_enabled());
        assert!(FetchCache::new("gridverse", true, 3600).is_enabled());
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = FetchCache::new("gridverse", true, 3600);
        let mut backend = MemoryCache::default();

        let first = cache
            .fetch_through(&mut backend, &["scenes", "0,0"], || async {
                Ok("fresh".to_string())
            })
            .await
            .unwrap();
        assert_eq!(first, "fresh");

        // Second call must be served from the cache, not the operation
        let second = cache
            .fetch_through(&mut backend, &["scenes", "0,0"], || async {
                Ok("should not run".to_string())
            })
            .await
            .unwrap();
        assert_eq!(second, "fresh");
    }

    #[tokio::test]
    async fn test_disabled_cache_executes_directly() {
        let cache = FetchCache::new("gridverse", false, 3600);
        let mut backend = MemoryCache::default();

        let value = cache
            .fetch_through(&mut backend, &["scenes", "0,0"], || async {
                Ok("direct".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "direct");
        assert!(backend.entries.is_empty());
    }

    #[tokio::test]
    async fn test_broken_backend_degrades_to_direct_execution() {
        let cache = FetchCache::new("gridverse", true, 3600);
        let mut backend = BrokenCache;

        let value = cache
            .fetch_through(&mut backend, &["sitemap"], || async {
                Ok("fetched anyway".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "fetched anyway");
    }

    #[tokio::test]
    async fn test_operation_error_propagates() {
        let cache = FetchCache::new("gridverse", true, 3600);
        let mut backend = MemoryCache::default();

        let result = cache
            .fetch_through(&mut backend, &["sitemap"], || async {
                Err(FetchError::Timeout {
                    url: "https://example.com".to_string(),
                })
            })
            .await;

        assert!(result.is_err());
        assert!(backend.entries.is_empty());
    }

    #[test]
    fn test_invalidate_single_key() {
        let cache = FetchCache::new("gridverse", true, 3600);
        let mut backend = MemoryCache::default();
        backend
            .write("indexer:gridverse:scenes:0,0", "x", Duration::from_secs(60))
            .unwrap();

        cache.invalidate(&mut backend, &["scenes", "0,0"]);
        assert!(backend.entries.is_empty());
    }

    #[test]
    fn test_invalidate_all_never_panics_on_broken_backend() {
        let cache = FetchCache::new("gridverse", true, 3600);
        let mut backend = BrokenCache;

        // Must swallow the backend failure
        cache.invalidate_all(&mut backend);
        cache.invalidate(&mut backend, &["scenes", "0,0"]);
    }
}
