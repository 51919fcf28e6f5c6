//! In-process cache backend on a concurrent map.

use super::region::CacheRegion;
use super::traits::{CacheBackend, CacheResult, CacheStats};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Concurrent in-memory [`CacheBackend`].
///
/// Expiry is lazy: entries past their TTL are dropped when next read.
/// There is no background sweeper and no capacity bound; the region
/// count is fixed and the id space of a single catalog keeps this
/// comfortably small.
#[derive(Default)]
pub struct MemoryCacheBackend {
    entries: DashMap<(CacheRegion, String), CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, region: CacheRegion, key: &str) -> CacheResult<Option<Value>> {
        let map_key = (region, key.to_string());
        if let Some(entry) = self.entries.get(&map_key) {
            if entry.expires_at > Instant::now() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(entry.value.clone()));
            }
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }
        // Expired: drop the entry and report a miss.
        self.entries.remove(&map_key);
        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    async fn put(
        &self,
        region: CacheRegion,
        key: &str,
        value: &Value,
        ttl: Duration,
    ) -> CacheResult<()> {
        if value.is_null() {
            return Ok(());
        }
        self.entries.insert(
            (region, key.to_string()),
            CacheEntry {
                value: value.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn evict(&self, region: CacheRegion, key: &str) -> CacheResult<bool> {
        let removed = self.entries.remove(&(region, key.to_string())).is_some();
        if removed {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        Ok(removed)
    }

    async fn evict_region(&self, region: CacheRegion) -> CacheResult<u64> {
        let before = self.entries.len() as u64;
        self.entries.retain(|(r, _), _| *r != region);
        let removed = before - self.entries.len() as u64;
        self.evictions.fetch_add(removed, Ordering::Relaxed);
        Ok(removed)
    }

    async fn stats(&self) -> CacheResult<CacheStats> {
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entry_count: self.entries.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let cache = MemoryCacheBackend::new();
        cache
            .put(CacheRegion::Product, "1", &json!({"id": 1}), TTL)
            .await
            .unwrap();
        let hit = cache.get(CacheRegion::Product, "1").await.unwrap();
        assert_eq!(hit, Some(json!({"id": 1})));
    }

    #[tokio::test]
    async fn test_regions_are_isolated() {
        let cache = MemoryCacheBackend::new();
        cache
            .put(CacheRegion::Product, "1", &json!("p"), TTL)
            .await
            .unwrap();
        cache
            .put(CacheRegion::Variant, "1", &json!("v"), TTL)
            .await
            .unwrap();
        assert_eq!(cache.evict_region(CacheRegion::Product).await.unwrap(), 1);
        assert_eq!(
            cache.get(CacheRegion::Variant, "1").await.unwrap(),
            Some(json!("v"))
        );
    }

    #[tokio::test]
    async fn test_null_values_are_never_stored() {
        let cache = MemoryCacheBackend::new();
        cache
            .put(CacheRegion::Product, "1", &Value::Null, TTL)
            .await
            .unwrap();
        assert_eq!(cache.get(CacheRegion::Product, "1").await.unwrap(), None);
        assert_eq!(cache.stats().await.unwrap().entry_count, 0);
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = MemoryCacheBackend::new();
        cache
            .put(
                CacheRegion::Product,
                "1",
                &json!(1),
                Duration::from_millis(10),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get(CacheRegion::Product, "1").await.unwrap(), None);
        assert_eq!(cache.stats().await.unwrap().entry_count, 0);
    }

    #[tokio::test]
    async fn test_stats_track_hits_misses_evictions() {
        let cache = MemoryCacheBackend::new();
        cache
            .put(CacheRegion::Product, "1", &json!(1), TTL)
            .await
            .unwrap();
        cache.get(CacheRegion::Product, "1").await.unwrap();
        cache.get(CacheRegion::Product, "2").await.unwrap();
        cache.evict(CacheRegion::Product, "1").await.unwrap();
        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.entry_count, 0);
    }
}
