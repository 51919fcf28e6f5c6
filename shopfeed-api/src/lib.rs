//! Shopfeed service layer.
//!
//! Wires the catalog store, the cache coherence wrapper, the catalog
//! service, and the background feed-ingestion job into one deployable
//! unit. The binary in `main.rs` runs the ingestion loop against
//! Postgres; everything here is also usable as a library with mock
//! implementations for tests.

pub mod cached_catalog;
pub mod constants;
pub mod db;
pub mod error;
pub mod feed_source;
pub mod jobs;
pub mod services;
pub mod validation;

pub use cached_catalog::CachedCatalog;
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use feed_source::{FeedSource, HttpFeedSource};
pub use jobs::{ingestion_task, run_ingestion, IngestionConfig, IngestionReport};
pub use services::CatalogService;
