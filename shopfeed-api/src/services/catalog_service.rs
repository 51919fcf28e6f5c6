//! Catalog service.
//!
//! The operation surface callers use: validated writes and paginated,
//! cached reads. Validation always runs before any store or cache
//! interaction, and "row did not exist" is surfaced as a `NOT_FOUND`
//! error rather than a boolean.

use crate::cached_catalog::CachedCatalog;
use crate::error::{ApiError, ApiResult};
use crate::validation::{require_non_blank, require_non_negative_price};
use rust_decimal::Decimal;
use shopfeed_core::{
    NewProduct, NewVariant, Page, PageRequest, Product, ProductId, ProductVariant, VariantId,
};
use shopfeed_storage::{CacheBackend, CatalogStore, ProductUpdate};

/// High-level catalog operations.
pub struct CatalogService<S: CatalogStore, C: CacheBackend> {
    catalog: CachedCatalog<S, C>,
}

impl<S: CatalogStore, C: CacheBackend> CatalogService<S, C> {
    pub fn new(catalog: CachedCatalog<S, C>) -> Self {
        Self { catalog }
    }

    /// The underlying cached catalog, for jobs that share it.
    pub fn catalog(&self) -> &CachedCatalog<S, C> {
        &self.catalog
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// One page of products. Size is clamped to the service ceiling,
    /// out-of-range page indices snap into range, and a blank query
    /// means unfiltered.
    pub async fn find_page(
        &self,
        page: i64,
        size: i64,
        query: Option<&str>,
    ) -> ApiResult<Page<Product>> {
        let request = PageRequest::new(page, size, query);
        self.catalog.find_page(&request).await
    }

    pub async fn find_product(&self, id: ProductId) -> ApiResult<Product> {
        self.catalog
            .product_get(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("product not found: {id}")))
    }

    pub async fn find_variant(&self, id: VariantId) -> ApiResult<ProductVariant> {
        self.catalog
            .variant_get(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("variant not found: {id}")))
    }

    pub async fn find_variants(&self, product_id: ProductId) -> ApiResult<Vec<ProductVariant>> {
        self.catalog.variants_for_product(product_id).await
    }

    // ========================================================================
    // PRODUCT WRITES
    // ========================================================================

    pub async fn create_product(
        &self,
        title: &str,
        vendor: &str,
        product_type: Option<&str>,
    ) -> ApiResult<Product> {
        require_non_blank("title", title)?;
        require_non_blank("vendor", vendor)?;
        let draft = NewProduct {
            title: title.to_string(),
            vendor: vendor.to_string(),
            product_type: product_type.map(str::to_string),
            variants: Vec::new(),
        };
        self.catalog.product_create(&draft).await
    }

    pub async fn update_product(
        &self,
        id: ProductId,
        title: &str,
        vendor: &str,
        product_type: Option<&str>,
    ) -> ApiResult<Product> {
        require_non_blank("title", title)?;
        require_non_blank("vendor", vendor)?;
        let update = ProductUpdate {
            title: title.to_string(),
            vendor: vendor.to_string(),
            product_type: product_type.map(str::to_string),
        };
        if !self.catalog.product_update(id, &update).await? {
            return Err(ApiError::not_found(format!("product not found: {id}")));
        }
        self.find_product(id).await
    }

    pub async fn delete_product(&self, id: ProductId) -> ApiResult<()> {
        if !self.catalog.product_delete(id).await? {
            return Err(ApiError::not_found(format!("product not found: {id}")));
        }
        Ok(())
    }

    // ========================================================================
    // VARIANT WRITES
    // ========================================================================

    pub async fn create_variant(
        &self,
        product_id: ProductId,
        color: &str,
        size: Option<&str>,
        price: Decimal,
        available: bool,
    ) -> ApiResult<ProductVariant> {
        require_non_blank("color", color)?;
        require_non_negative_price(price)?;
        // Check the parent up front for a clean error instead of a
        // foreign-key failure from the store.
        self.find_product(product_id).await?;
        let draft = NewVariant {
            color_option: color.to_string(),
            size_option: size.map(str::to_string),
            price,
            available,
        };
        self.catalog.variant_create(product_id, &draft).await
    }

    pub async fn update_variant(
        &self,
        id: VariantId,
        color: &str,
        size: Option<&str>,
        price: Decimal,
        available: bool,
    ) -> ApiResult<ProductVariant> {
        require_non_blank("color", color)?;
        require_non_negative_price(price)?;
        let update = NewVariant {
            color_option: color.to_string(),
            size_option: size.map(str::to_string),
            price,
            available,
        };
        if !self.catalog.variant_update(id, &update).await? {
            return Err(ApiError::not_found(format!("variant not found: {id}")));
        }
        self.find_variant(id).await
    }

    pub async fn delete_variant(&self, id: VariantId) -> ApiResult<()> {
        if self.catalog.variant_delete(id).await?.is_none() {
            return Err(ApiError::not_found(format!("variant not found: {id}")));
        }
        Ok(())
    }
}
