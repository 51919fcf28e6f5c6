//! Cache layer with explicit regions and write-then-invalidate rules.
//!
//! The cache is organized into fixed [`CacheRegion`]s, one per cached
//! shape (single product, single variant, variant list, product page).
//! Backends are pluggable via [`CacheBackend`]; entries carry a TTL and
//! null values are never stored, so a deleted row cannot shadow a later
//! re-read.
//!
//! Invalidation is the caller's job: the cached catalog wrapper in the
//! service crate applies its eviction table after each confirmed write.
//! Backends only provide the primitives (get, put, evict, evict region).

pub mod memory;
pub mod region;
pub mod traits;

pub use memory::MemoryCacheBackend;
pub use region::CacheRegion;
pub use traits::{CacheBackend, CacheError, CacheResult, CacheStats};

use std::time::Duration;

/// Default lifetime of a cache entry (one hour).
pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(60 * 60);

/// Tunables for the cache layer.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long entries stay valid. Applied uniformly to all regions.
    pub entry_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            entry_ttl: DEFAULT_ENTRY_TTL,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(entry_ttl: Duration) -> Self {
        Self { entry_ttl }
    }
}
