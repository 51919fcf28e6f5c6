//! Storage layer for the shopfeed catalog.
//!
//! Defines the [`CatalogStore`] trait that database backends implement,
//! an in-memory [`MockCatalogStore`] for tests and local development,
//! and the [`cache`] module with the pluggable cache backend the cached
//! catalog wrapper sits on.

pub mod cache;
pub mod mock;
pub mod store;

pub use cache::{
    CacheBackend, CacheConfig, CacheError, CacheRegion, CacheResult, CacheStats,
    MemoryCacheBackend,
};
pub use mock::MockCatalogStore;
pub use store::{CatalogStore, ProductUpdate, StoreResult};
