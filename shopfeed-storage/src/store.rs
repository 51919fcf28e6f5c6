//! Catalog store trait for asynchronous database operations.
//!
//! Implementations back the catalog with a concrete store (Postgres in
//! production, an in-memory map in tests). All listing operations
//! return rows ordered by ascending id so pagination is stable.

use async_trait::async_trait;
use shopfeed_core::{
    NewProduct, NewVariant, Product, ProductId, ProductVariant, StorageError, VariantId,
};

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StorageError>;

/// Field replacement for an existing product. Variants are managed
/// through the variant operations, never through an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub title: String,
    pub vendor: String,
    pub product_type: Option<String>,
}

/// Async store for products and their variants.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // ========================================================================
    // PRODUCT OPERATIONS
    // ========================================================================

    /// Insert a product and its variant drafts, returning the stored
    /// entity with store-assigned ids.
    async fn product_insert(&self, draft: &NewProduct) -> StoreResult<Product>;

    /// Get a product by id, variants included.
    async fn product_get(&self, id: ProductId) -> StoreResult<Option<Product>>;

    /// Fetch one page of products ordered by id. When `query` is set,
    /// only products whose title contains it (case-insensitively) are
    /// considered.
    async fn product_page(
        &self,
        offset: u64,
        limit: u32,
        query: Option<&str>,
    ) -> StoreResult<Vec<Product>>;

    /// Count products, honoring the same filter as [`product_page`].
    ///
    /// [`product_page`]: CatalogStore::product_page
    async fn product_count(&self, query: Option<&str>) -> StoreResult<u64>;

    /// Replace a product's fields. Returns false when no row matched.
    async fn product_update(&self, id: ProductId, update: &ProductUpdate) -> StoreResult<bool>;

    /// Delete a product and all of its variants. Returns false when no
    /// row matched.
    async fn product_delete(&self, id: ProductId) -> StoreResult<bool>;

    // ========================================================================
    // VARIANT OPERATIONS
    // ========================================================================

    /// Insert a variant under an existing product.
    async fn variant_insert(
        &self,
        product_id: ProductId,
        draft: &NewVariant,
    ) -> StoreResult<ProductVariant>;

    /// Insert several variants under an existing product in one call.
    async fn variant_insert_batch(
        &self,
        product_id: ProductId,
        drafts: &[NewVariant],
    ) -> StoreResult<Vec<ProductVariant>>;

    /// Get a variant by id.
    async fn variant_get(&self, id: VariantId) -> StoreResult<Option<ProductVariant>>;

    /// List all variants of a product ordered by id.
    async fn variants_for_product(&self, product_id: ProductId)
        -> StoreResult<Vec<ProductVariant>>;

    /// Replace a variant's fields. Returns false when no row matched.
    async fn variant_update(&self, id: VariantId, update: &NewVariant) -> StoreResult<bool>;

    /// Delete a variant, returning its parent product id when a row
    /// matched.
    async fn variant_delete(&self, id: VariantId) -> StoreResult<Option<ProductId>>;

    /// Delete every variant of a product, returning the removed count.
    async fn variant_delete_for_product(&self, product_id: ProductId) -> StoreResult<u64>;
}
