//! Service-wide default values.

/// Feed endpoint polled when no override is configured.
pub const DEFAULT_FEED_URL: &str = "https://famme.no/products.json";

/// Seconds between ingestion runs (one hour).
pub const DEFAULT_INGESTION_INTERVAL_SECS: u64 = 3600;

/// Most products accepted from the feed per ingestion run.
pub const DEFAULT_MAX_PRODUCTS: usize = 50;

/// Seconds an HTTP feed fetch may take before it is abandoned.
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 30;
