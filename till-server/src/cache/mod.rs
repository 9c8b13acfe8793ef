//! In-process response cache
//!
//! Concurrent map of JSON snapshots with per-entry TTL deadlines. Reads
//! deserialize into the caller's type; anything stale, missing or
//! malformed is a miss. Writers invalidate by key prefix after their
//! mutation commits, so cached lists never outlive the data they copy.

use std::future::Future;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// TTL tiers
pub mod ttl {
    use std::time::Duration;

    pub const SHORT: Duration = Duration::from_secs(60);
    pub const MEDIUM: Duration = Duration::from_secs(300);
    pub const LONG: Duration = Duration::from_secs(1800);
    pub const VERY_LONG: Duration = Duration::from_secs(3600);
}

/// Key namespaces, one per cached resource family
pub mod keys {
    pub const ITEMS: &str = "items:";
    pub const CATEGORIES: &str = "categories:";
    pub const SALES: &str = "sales:";
    pub const SETTINGS: &str = "settings:";
    pub const PERMISSIONS: &str = "permissions:";

    /// Build a namespaced key.
    pub fn key(prefix: &str, suffix: &str) -> String {
        format!("{prefix}{suffix}")
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Shared cache handle, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    entries: std::sync::Arc<DashMap<String, CacheEntry>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed read. Expired entries are evicted on access.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        // A snapshot that no longer matches T is useless; treat as a miss.
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Store a value under `key` for `ttl`. Unserializable values are
    /// silently not cached.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Ok(value) = serde_json::to_value(value) else {
            tracing::debug!(key, "value not serializable, skipping cache");
            return;
        };
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry whose key starts with `prefix`. Returns the number
    /// of entries removed.
    pub fn delete_prefix(&self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    /// Read-through: return the cached value or run `loader`, caching its
    /// result. Loader errors propagate; cache trouble never does.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key) {
            return Ok(hit);
        }
        let value = loader().await?;
        self.set(key, &value, ttl);
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_round_trip() {
        let cache = Cache::new();
        cache.set("items:all", &vec![1, 2, 3], ttl::LONG);

        let hit: Option<Vec<i32>> = cache.get("items:all");
        assert_eq!(hit, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = Cache::new();
        cache.set("items:all", &"stale", Duration::ZERO);

        let hit: Option<String> = cache.get("items:all");
        assert!(hit.is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_type_mismatch_is_a_miss() {
        let cache = Cache::new();
        cache.set("settings:singleton", &"a string", ttl::MEDIUM);

        let hit: Option<Vec<i64>> = cache.get("settings:singleton");
        assert!(hit.is_none());
    }

    #[test]
    fn test_delete_prefix_only_hits_namespace() {
        let cache = Cache::new();
        cache.set("items:all", &1, ttl::LONG);
        cache.set("items:7", &2, ttl::LONG);
        cache.set("categories:all", &3, ttl::LONG);

        assert_eq!(cache.delete_prefix(keys::ITEMS), 2);
        assert!(cache.get::<i32>("items:all").is_none());
        assert_eq!(cache.get::<i32>("categories:all"), Some(3));
    }

    #[tokio::test]
    async fn test_get_or_set_loads_once() {
        let cache = Cache::new();
        let mut calls = 0;

        for _ in 0..3 {
            let value: Result<i64, std::convert::Infallible> = cache
                .get_or_set("items:all", ttl::LONG, || {
                    calls += 1;
                    async { Ok(42) }
                })
                .await;
            assert_eq!(value.unwrap(), 42);
        }
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_get_or_set_loader_error_propagates_and_skips_cache() {
        let cache = Cache::new();

        let result: Result<i64, &str> = cache
            .get_or_set("items:all", ttl::LONG, || async { Err("db down") })
            .await;
        assert_eq!(result.unwrap_err(), "db down");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_builder() {
        assert_eq!(keys::key(keys::PERMISSIONS, "CASHIER"), "permissions:CASHIER");
    }
}
