//! Feed ingestion background job.
//!
//! Periodically downloads the product feed, parses up to a capped
//! number of products, and persists them through the cached catalog.
//! A fetch failure or structurally broken feed aborts the run; a
//! persistence failure on one product is logged and the rest of the
//! batch continues. Every run inserts fresh rows; nothing deduplicates
//! against previous runs.
//!
//! The loop follows the shutdown-watch pattern used by the rest of the
//! service: a `watch::Receiver<bool>` flips to true when the process is
//! stopping, and missed ticks are skipped rather than bunched.

use crate::cached_catalog::CachedCatalog;
use crate::constants::{
    DEFAULT_FEED_URL, DEFAULT_INGESTION_INTERVAL_SECS, DEFAULT_MAX_PRODUCTS,
};
use crate::error::{ApiError, ApiResult};
use crate::feed_source::FeedSource;
use shopfeed_core::{FeedError, NewProduct};
use shopfeed_feed::FeedParser;
use shopfeed_storage::{CacheBackend, CatalogStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the ingestion job.
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Whether the periodic job runs at all. Off unless explicitly
    /// enabled, so a dev instance never hammers the live feed.
    pub enabled: bool,
    /// Feed endpoint to poll.
    pub feed_url: String,
    /// Time between runs.
    pub interval: Duration,
    /// Most products accepted per run.
    pub max_products: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            feed_url: DEFAULT_FEED_URL.to_string(),
            interval: Duration::from_secs(DEFAULT_INGESTION_INTERVAL_SECS),
            max_products: DEFAULT_MAX_PRODUCTS,
        }
    }
}

impl IngestionConfig {
    /// Read configuration from `SHOPFEED_INGESTION_*` environment
    /// variables, falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("SHOPFEED_INGESTION_ENABLED")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
            feed_url: std::env::var("SHOPFEED_FEED_URL")
                .unwrap_or_else(|_| DEFAULT_FEED_URL.to_string()),
            interval: Duration::from_secs(
                std::env::var("SHOPFEED_INGESTION_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_INGESTION_INTERVAL_SECS),
            ),
            max_products: std::env::var("SHOPFEED_INGESTION_MAX_PRODUCTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_PRODUCTS),
        }
    }
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionReport {
    /// Products accepted by the parser (before persistence).
    pub fetched: usize,
    pub products_saved: usize,
    pub variants_saved: usize,
    pub products_failed: usize,
}

// ============================================================================
// ONE INGESTION RUN
// ============================================================================

/// Fetch, parse, and persist one batch from the feed.
///
/// The fetch and parse happen on a blocking thread; only accepted
/// products cross back to the async side. Per-product persistence
/// failures do not abort the batch.
pub async fn run_ingestion<S, C, F>(
    catalog: &CachedCatalog<S, C>,
    source: Arc<F>,
    max_products: usize,
) -> ApiResult<IngestionReport>
where
    S: CatalogStore,
    C: CacheBackend,
    F: FeedSource + 'static,
{
    let parsed = tokio::task::spawn_blocking(move || -> Result<Vec<NewProduct>, FeedError> {
        let reader = source.fetch()?;
        FeedParser::new(reader).take(max_products).collect()
    })
    .await
    .map_err(|e| ApiError::internal_error(format!("ingestion task panicked: {e}")))??;

    let mut report = IngestionReport {
        fetched: parsed.len(),
        ..Default::default()
    };

    for draft in &parsed {
        match catalog.product_create(draft).await {
            Ok(product) => {
                report.products_saved += 1;
                report.variants_saved += product.variants.len();
            }
            Err(e) => {
                tracing::error!(title = %draft.title, error = %e, "failed to persist feed product");
                report.products_failed += 1;
            }
        }
    }

    Ok(report)
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Run ingestion on the configured interval until shutdown.
///
/// The first tick fires immediately; subsequent ticks follow
/// `config.interval` with missed ticks skipped.
pub async fn ingestion_task<S, C, F>(
    catalog: Arc<CachedCatalog<S, C>>,
    source: Arc<F>,
    config: IngestionConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    S: CatalogStore + 'static,
    C: CacheBackend + 'static,
    F: FeedSource + 'static,
{
    if !config.enabled {
        tracing::info!("feed ingestion disabled");
        return;
    }

    let mut ticker = interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        feed_url = %config.feed_url,
        interval_secs = config.interval.as_secs(),
        max_products = config.max_products,
        "feed ingestion task started"
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    tracing::info!("feed ingestion task shutting down");
                    break;
                }
            }

            _ = ticker.tick() => {
                match run_ingestion(&catalog, Arc::clone(&source), config.max_products).await {
                    Ok(report) => tracing::info!(
                        fetched = report.fetched,
                        products_saved = report.products_saved,
                        variants_saved = report.variants_saved,
                        products_failed = report.products_failed,
                        "ingestion run complete"
                    ),
                    Err(e) => tracing::error!(error = %e, "ingestion run failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use async_trait::async_trait;
    use shopfeed_core::{Product, ProductId, ProductVariant, StorageError, VariantId};
    use shopfeed_core::NewVariant;
    use shopfeed_storage::{
        CacheConfig, MemoryCacheBackend, MockCatalogStore, ProductUpdate, StoreResult,
    };
    use shopfeed_test_utils::{feed_document, product_json, variant_json};
    use std::io::Cursor;

    /// Feed source serving a fixed document.
    struct StaticFeedSource {
        body: String,
    }

    impl FeedSource for StaticFeedSource {
        fn fetch(&self) -> Result<Box<dyn std::io::Read + Send>, FeedError> {
            Ok(Box::new(Cursor::new(self.body.clone().into_bytes())))
        }
    }

    /// Feed source that always fails.
    struct FailingSource;

    impl FeedSource for FailingSource {
        fn fetch(&self) -> Result<Box<dyn std::io::Read + Send>, FeedError> {
            Err(FeedError::Unavailable {
                reason: "connection refused".to_string(),
            })
        }
    }

    /// Store wrapper that rejects one poisoned title, for exercising
    /// per-item failure isolation.
    struct FlakyStore {
        inner: MockCatalogStore,
        poison_title: String,
    }

    #[async_trait]
    impl CatalogStore for FlakyStore {
        async fn product_insert(&self, draft: &NewProduct) -> StoreResult<Product> {
            if draft.title == self.poison_title {
                return Err(StorageError::QueryFailed {
                    reason: "simulated insert failure".to_string(),
                });
            }
            self.inner.product_insert(draft).await
        }

        async fn product_get(&self, id: ProductId) -> StoreResult<Option<Product>> {
            self.inner.product_get(id).await
        }

        async fn product_page(
            &self,
            offset: u64,
            limit: u32,
            query: Option<&str>,
        ) -> StoreResult<Vec<Product>> {
            self.inner.product_page(offset, limit, query).await
        }

        async fn product_count(&self, query: Option<&str>) -> StoreResult<u64> {
            self.inner.product_count(query).await
        }

        async fn product_update(
            &self,
            id: ProductId,
            update: &ProductUpdate,
        ) -> StoreResult<bool> {
            self.inner.product_update(id, update).await
        }

        async fn product_delete(&self, id: ProductId) -> StoreResult<bool> {
            self.inner.product_delete(id).await
        }

        async fn variant_insert(
            &self,
            product_id: ProductId,
            draft: &NewVariant,
        ) -> StoreResult<ProductVariant> {
            self.inner.variant_insert(product_id, draft).await
        }

        async fn variant_insert_batch(
            &self,
            product_id: ProductId,
            drafts: &[NewVariant],
        ) -> StoreResult<Vec<ProductVariant>> {
            self.inner.variant_insert_batch(product_id, drafts).await
        }

        async fn variant_get(&self, id: VariantId) -> StoreResult<Option<ProductVariant>> {
            self.inner.variant_get(id).await
        }

        async fn variants_for_product(
            &self,
            product_id: ProductId,
        ) -> StoreResult<Vec<ProductVariant>> {
            self.inner.variants_for_product(product_id).await
        }

        async fn variant_update(&self, id: VariantId, update: &NewVariant) -> StoreResult<bool> {
            self.inner.variant_update(id, update).await
        }

        async fn variant_delete(&self, id: VariantId) -> StoreResult<Option<ProductId>> {
            self.inner.variant_delete(id).await
        }

        async fn variant_delete_for_product(&self, product_id: ProductId) -> StoreResult<u64> {
            self.inner.variant_delete_for_product(product_id).await
        }
    }

    fn catalog_with<S: CatalogStore>(store: S) -> CachedCatalog<S, MemoryCacheBackend> {
        CachedCatalog::new(
            store,
            Arc::new(MemoryCacheBackend::new()),
            CacheConfig::default(),
        )
    }

    fn two_product_feed() -> String {
        feed_document(&[
            product_json("Alpha Tee", "Famme", &[variant_json("Black", "49.99", true)]),
            product_json("Bravo Mug", "Famme", &[]),
        ])
    }

    #[tokio::test]
    async fn test_ingestion_persists_products_and_variants() {
        let catalog = catalog_with(MockCatalogStore::new());
        let source = Arc::new(StaticFeedSource {
            body: two_product_feed(),
        });

        let report = run_ingestion(&catalog, source, 50).await.unwrap();
        assert_eq!(
            report,
            IngestionReport {
                fetched: 2,
                products_saved: 2,
                variants_saved: 1,
                products_failed: 0,
            }
        );
        assert_eq!(catalog.store().product_count(None).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_cap_limits_accepted_products() {
        let items: Vec<String> = (0..60)
            .map(|i| product_json(&format!("Product {i}"), "Famme", &[]))
            .collect();
        let catalog = catalog_with(MockCatalogStore::new());
        let source = Arc::new(StaticFeedSource {
            body: feed_document(&items),
        });

        let report = run_ingestion(&catalog, source, 50).await.unwrap();
        assert_eq!(report.fetched, 50);
        assert_eq!(report.products_saved, 50);
    }

    #[tokio::test]
    async fn test_per_item_failure_does_not_abort_batch() {
        let store = FlakyStore {
            inner: MockCatalogStore::new(),
            poison_title: "Bravo Mug".to_string(),
        };
        let catalog = catalog_with(store);
        let source = Arc::new(StaticFeedSource {
            body: feed_document(&[
                product_json("Alpha Tee", "Famme", &[]),
                product_json("Bravo Mug", "Famme", &[]),
                product_json("Charlie Cap", "Famme", &[]),
            ]),
        });

        let report = run_ingestion(&catalog, source, 50).await.unwrap();
        assert_eq!(report.fetched, 3);
        assert_eq!(report.products_saved, 2);
        assert_eq!(report.products_failed, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_run() {
        let catalog = catalog_with(MockCatalogStore::new());
        let err = run_ingestion(&catalog, Arc::new(FailingSource), 50)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FeedUnavailable);
        assert_eq!(catalog.store().product_count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_feed_aborts_run() {
        let catalog = catalog_with(MockCatalogStore::new());
        let source = Arc::new(StaticFeedSource {
            body: r#"{"products": [{"title" BROKEN"#.to_string(),
        });
        let err = run_ingestion(&catalog, source, 50).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::FeedUnavailable);
    }

    #[tokio::test]
    async fn test_runs_accumulate_duplicates() {
        let catalog = catalog_with(MockCatalogStore::new());
        let source = Arc::new(StaticFeedSource {
            body: two_product_feed(),
        });

        run_ingestion(&catalog, Arc::clone(&source), 50).await.unwrap();
        run_ingestion(&catalog, source, 50).await.unwrap();

        // No dedup: each run appends fresh rows.
        assert_eq!(catalog.store().product_count(None).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_ingestion_invalidates_cached_pages() {
        let catalog = catalog_with(MockCatalogStore::new());
        let request = shopfeed_core::PageRequest::new(0, 10, None);
        let before = catalog.find_page(&request).await.unwrap();
        assert_eq!(before.total_items, 0);

        let source = Arc::new(StaticFeedSource {
            body: two_product_feed(),
        });
        run_ingestion(&catalog, source, 50).await.unwrap();

        let after = catalog.find_page(&request).await.unwrap();
        assert_eq!(after.total_items, 2);
    }

    #[test]
    fn test_config_defaults() {
        let config = IngestionConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.interval, Duration::from_secs(3600));
        assert_eq!(config.max_products, 50);
    }

    #[tokio::test]
    async fn test_disabled_task_returns_immediately() {
        let catalog = Arc::new(catalog_with(MockCatalogStore::new()));
        let source = Arc::new(StaticFeedSource {
            body: two_product_feed(),
        });
        let (_tx, rx) = watch::channel(false);
        ingestion_task(catalog.clone(), source, IngestionConfig::default(), rx).await;
        assert_eq!(catalog.store().product_count(None).await.unwrap(), 0);
    }
}
