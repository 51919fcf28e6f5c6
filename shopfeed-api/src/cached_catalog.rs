//! Cached catalog wrapper.
//!
//! Wraps any [`CatalogStore`] with a [`CacheBackend`] and keeps the two
//! coherent. Reads are read-through: a warm hit short-circuits the
//! store, a miss fetches and caches non-null results with the
//! configured TTL. Writes always hit the store first; cache entries are
//! only touched after the store has confirmed the write.
//!
//! Eviction per operation:
//!
//! | operation       | evicts                                             |
//! |-----------------|----------------------------------------------------|
//! | product_create  | all pages                                          |
//! | product_update  | that product, all pages                            |
//! | product_delete  | that product, all variants, all lists, all pages   |
//! | variant_create  | that product's variant list                        |
//! | variant_update  | all variants, all variant lists                    |
//! | variant_delete  | all variants, all variant lists                    |
//!
//! A cache failure on the read path degrades to a store read with a
//! warning; a failed eviction after a confirmed write is also only
//! warned about, since entries expire on their own.

use crate::error::ApiResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shopfeed_core::{
    NewProduct, NewVariant, Page, PageRequest, PageSlice, Product, ProductId, ProductVariant,
    VariantId,
};
use shopfeed_storage::{CacheBackend, CacheConfig, CacheRegion, CatalogStore, ProductUpdate};
use std::sync::Arc;
use tracing::warn;

/// Catalog store wrapper that keeps a cache coherent with the store.
pub struct CachedCatalog<S: CatalogStore, C: CacheBackend> {
    store: S,
    cache: Arc<C>,
    config: CacheConfig,
}

impl<S: CatalogStore, C: CacheBackend> CachedCatalog<S, C> {
    pub fn new(store: S, cache: Arc<C>, config: CacheConfig) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    /// The wrapped store, for operations that bypass the cache.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The shared cache backend.
    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    // ========================================================================
    // CACHE HELPERS
    // ========================================================================

    async fn cache_get<T: DeserializeOwned>(&self, region: CacheRegion, key: &str) -> Option<T> {
        match self.cache.get(region, key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!(%region, key, error = %e, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(%region, key, error = %e, "cache read failed, falling back to store");
                None
            }
        }
    }

    async fn cache_put<T: Serialize>(&self, region: CacheRegion, key: &str, value: &T) {
        let json = match serde_json::to_value(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(%region, key, error = %e, "failed to encode value for cache");
                return;
            }
        };
        if let Err(e) = self
            .cache
            .put(region, key, &json, self.config.entry_ttl)
            .await
        {
            warn!(%region, key, error = %e, "cache write failed");
        }
    }

    async fn evict(&self, region: CacheRegion, key: &str) {
        if let Err(e) = self.cache.evict(region, key).await {
            warn!(%region, key, error = %e, "cache eviction failed");
        }
    }

    async fn evict_region(&self, region: CacheRegion) {
        if let Err(e) = self.cache.evict_region(region).await {
            warn!(%region, error = %e, "cache region eviction failed");
        }
    }

    fn page_key(request: &PageRequest) -> String {
        format!(
            "{}:{}:{}",
            request.page,
            request.effective_size(),
            request.normalized_query().unwrap_or("")
        )
    }

    // ========================================================================
    // READ-THROUGH OPERATIONS
    // ========================================================================

    pub async fn product_get(&self, id: ProductId) -> ApiResult<Option<Product>> {
        let key = id.to_string();
        if let Some(product) = self.cache_get(CacheRegion::Product, &key).await {
            return Ok(Some(product));
        }
        let product = self.store.product_get(id).await?;
        if let Some(product) = &product {
            self.cache_put(CacheRegion::Product, &key, product).await;
        }
        Ok(product)
    }

    pub async fn variant_get(&self, id: VariantId) -> ApiResult<Option<ProductVariant>> {
        let key = id.to_string();
        if let Some(variant) = self.cache_get(CacheRegion::Variant, &key).await {
            return Ok(Some(variant));
        }
        let variant = self.store.variant_get(id).await?;
        if let Some(variant) = &variant {
            self.cache_put(CacheRegion::Variant, &key, variant).await;
        }
        Ok(variant)
    }

    pub async fn variants_for_product(
        &self,
        product_id: ProductId,
    ) -> ApiResult<Vec<ProductVariant>> {
        let key = product_id.to_string();
        if let Some(variants) = self.cache_get(CacheRegion::VariantList, &key).await {
            return Ok(variants);
        }
        let variants = self.store.variants_for_product(product_id).await?;
        self.cache_put(CacheRegion::VariantList, &key, &variants)
            .await;
        Ok(variants)
    }

    /// One page of products, cached under the normalized request key.
    pub async fn find_page(&self, request: &PageRequest) -> ApiResult<Page<Product>> {
        let key = Self::page_key(request);
        if let Some(page) = self.cache_get(CacheRegion::ProductPages, &key).await {
            return Ok(page);
        }

        let size = request.effective_size();
        let query = request.normalized_query();
        let total = self.store.product_count(query).await?;
        let page = match PageSlice::compute(request.page, size, total) {
            Some(slice) => {
                let items = self.store.product_page(slice.offset, size, query).await?;
                slice.into_page(items)
            }
            None => Page::empty(size),
        };

        self.cache_put(CacheRegion::ProductPages, &key, &page).await;
        Ok(page)
    }

    // ========================================================================
    // WRITE OPERATIONS (store first, then invalidate)
    // ========================================================================

    pub async fn product_create(&self, draft: &NewProduct) -> ApiResult<Product> {
        let product = self.store.product_insert(draft).await?;
        self.evict_region(CacheRegion::ProductPages).await;
        Ok(product)
    }

    pub async fn product_update(&self, id: ProductId, update: &ProductUpdate) -> ApiResult<bool> {
        let updated = self.store.product_update(id, update).await?;
        if updated {
            self.evict(CacheRegion::Product, &id.to_string()).await;
            self.evict_region(CacheRegion::ProductPages).await;
        }
        Ok(updated)
    }

    pub async fn product_delete(&self, id: ProductId) -> ApiResult<bool> {
        let deleted = self.store.product_delete(id).await?;
        if deleted {
            self.evict(CacheRegion::Product, &id.to_string()).await;
            self.evict_region(CacheRegion::Variant).await;
            self.evict_region(CacheRegion::VariantList).await;
            self.evict_region(CacheRegion::ProductPages).await;
        }
        Ok(deleted)
    }

    pub async fn variant_create(
        &self,
        product_id: ProductId,
        draft: &NewVariant,
    ) -> ApiResult<ProductVariant> {
        let variant = self.store.variant_insert(product_id, draft).await?;
        self.evict(CacheRegion::VariantList, &product_id.to_string())
            .await;
        Ok(variant)
    }

    pub async fn variant_create_batch(
        &self,
        product_id: ProductId,
        drafts: &[NewVariant],
    ) -> ApiResult<Vec<ProductVariant>> {
        let variants = self.store.variant_insert_batch(product_id, drafts).await?;
        self.evict(CacheRegion::VariantList, &product_id.to_string())
            .await;
        Ok(variants)
    }

    pub async fn variant_update(&self, id: VariantId, update: &NewVariant) -> ApiResult<bool> {
        let updated = self.store.variant_update(id, update).await?;
        if updated {
            self.evict_region(CacheRegion::Variant).await;
            self.evict_region(CacheRegion::VariantList).await;
        }
        Ok(updated)
    }

    pub async fn variant_delete(&self, id: VariantId) -> ApiResult<Option<ProductId>> {
        let parent = self.store.variant_delete(id).await?;
        if parent.is_some() {
            self.evict_region(CacheRegion::Variant).await;
            self.evict_region(CacheRegion::VariantList).await;
        }
        Ok(parent)
    }

    /// Evict the whole page region. Used by ingestion after each
    /// confirmed write so pages never serve a stale catalog.
    pub async fn invalidate_pages(&self) {
        self.evict_region(CacheRegion::ProductPages).await;
    }
}
