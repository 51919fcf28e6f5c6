//! Cache backend trait and statistics.

use super::region::CacheRegion;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors from a cache backend.
///
/// The cached catalog wrapper treats these as soft failures on the read
/// path (fall through to the store) and hard failures only where
/// skipping invalidation could serve stale data.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache backend failed: {reason}")]
    Backend { reason: String },
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Pluggable cache backend.
///
/// Values cross the trait boundary as JSON so backends stay ignorant of
/// entity types. A `put` of a JSON null is a no-op: absence is always
/// re-checked against the store.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a live entry. Expired entries count as misses.
    async fn get(&self, region: CacheRegion, key: &str) -> CacheResult<Option<Value>>;

    /// Store a value with the given lifetime. Null values are skipped.
    async fn put(
        &self,
        region: CacheRegion,
        key: &str,
        value: &Value,
        ttl: Duration,
    ) -> CacheResult<()>;

    /// Remove one entry. Returns whether an entry was present.
    async fn evict(&self, region: CacheRegion, key: &str) -> CacheResult<bool>;

    /// Remove every entry in a region, returning the removed count.
    async fn evict_region(&self, region: CacheRegion) -> CacheResult<u64>;

    /// Usage statistics.
    async fn stats(&self) -> CacheResult<CacheStats>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entry_count: u64,
}

impl CacheStats {
    /// Hit rate from 0.0 to 1.0.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
