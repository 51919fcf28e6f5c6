//! In-memory catalog store for tests and local development.
//!
//! Mirrors the ordering and cascade semantics of the Postgres store:
//! rows come back ordered by ascending id, title filtering is a
//! case-insensitive substring match, and deleting a product removes its
//! variants.

use crate::store::{CatalogStore, ProductUpdate, StoreResult};
use async_trait::async_trait;
use shopfeed_core::{
    NewProduct, NewVariant, Product, ProductId, ProductVariant, StorageError, VariantId,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

/// Thread-safe in-memory [`CatalogStore`].
#[derive(Default)]
pub struct MockCatalogStore {
    products: RwLock<BTreeMap<i64, Product>>,
    variants: RwLock<BTreeMap<i64, ProductVariant>>,
    next_product_id: AtomicI64,
    next_variant_id: AtomicI64,
}

impl MockCatalogStore {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(BTreeMap::new()),
            variants: RwLock::new(BTreeMap::new()),
            next_product_id: AtomicI64::new(1),
            next_variant_id: AtomicI64::new(1),
        }
    }

    fn matches(title: &str, query: Option<&str>) -> bool {
        match query {
            Some(q) => title.to_lowercase().contains(&q.to_lowercase()),
            None => true,
        }
    }

    fn variants_of(
        variants: &BTreeMap<i64, ProductVariant>,
        product_id: ProductId,
    ) -> Vec<ProductVariant> {
        variants
            .values()
            .filter(|v| v.product_id == product_id)
            .cloned()
            .collect()
    }
}

// Poisoned locks only happen after a panic in another test thread;
// surface them as a storage failure instead of panicking again.
macro_rules! read_lock {
    ($lock:expr) => {
        $lock.read().map_err(|_| StorageError::LockPoisoned)?
    };
}

macro_rules! write_lock {
    ($lock:expr) => {
        $lock.write().map_err(|_| StorageError::LockPoisoned)?
    };
}

#[async_trait]
impl CatalogStore for MockCatalogStore {
    async fn product_insert(&self, draft: &NewProduct) -> StoreResult<Product> {
        let id = ProductId::new(self.next_product_id.fetch_add(1, Ordering::SeqCst));
        let mut stored_variants = Vec::with_capacity(draft.variants.len());
        {
            let mut variants = write_lock!(self.variants);
            for variant_draft in &draft.variants {
                let variant_id = self.next_variant_id.fetch_add(1, Ordering::SeqCst);
                let variant = ProductVariant {
                    id: VariantId::new(variant_id),
                    product_id: id,
                    color_option: variant_draft.color_option.clone(),
                    size_option: variant_draft.size_option.clone(),
                    price: variant_draft.price,
                    available: variant_draft.available,
                };
                variants.insert(variant_id, variant.clone());
                stored_variants.push(variant);
            }
        }
        let product = Product {
            id,
            title: draft.title.clone(),
            vendor: draft.vendor.clone(),
            product_type: draft.product_type.clone(),
            variants: stored_variants,
        };
        let mut row = product.clone();
        row.variants = Vec::new();
        write_lock!(self.products).insert(id.as_i64(), row);
        Ok(product)
    }

    async fn product_get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let products = read_lock!(self.products);
        let Some(row) = products.get(&id.as_i64()) else {
            return Ok(None);
        };
        let mut product = row.clone();
        let variants = read_lock!(self.variants);
        product.variants = Self::variants_of(&variants, id);
        Ok(Some(product))
    }

    async fn product_page(
        &self,
        offset: u64,
        limit: u32,
        query: Option<&str>,
    ) -> StoreResult<Vec<Product>> {
        let products = read_lock!(self.products);
        let variants = read_lock!(self.variants);
        Ok(products
            .values()
            .filter(|p| Self::matches(&p.title, query))
            .skip(offset as usize)
            .take(limit as usize)
            .map(|row| {
                let mut product = row.clone();
                product.variants = Self::variants_of(&variants, product.id);
                product
            })
            .collect())
    }

    async fn product_count(&self, query: Option<&str>) -> StoreResult<u64> {
        let products = read_lock!(self.products);
        Ok(products
            .values()
            .filter(|p| Self::matches(&p.title, query))
            .count() as u64)
    }

    async fn product_update(&self, id: ProductId, update: &ProductUpdate) -> StoreResult<bool> {
        let mut products = write_lock!(self.products);
        let Some(row) = products.get_mut(&id.as_i64()) else {
            return Ok(false);
        };
        row.title = update.title.clone();
        row.vendor = update.vendor.clone();
        row.product_type = update.product_type.clone();
        Ok(true)
    }

    async fn product_delete(&self, id: ProductId) -> StoreResult<bool> {
        let removed = write_lock!(self.products).remove(&id.as_i64()).is_some();
        if removed {
            write_lock!(self.variants).retain(|_, v| v.product_id != id);
        }
        Ok(removed)
    }

    async fn variant_insert(
        &self,
        product_id: ProductId,
        draft: &NewVariant,
    ) -> StoreResult<ProductVariant> {
        if !read_lock!(self.products).contains_key(&product_id.as_i64()) {
            return Err(StorageError::QueryFailed {
                reason: format!("no parent product {product_id}"),
            });
        }
        let id = self.next_variant_id.fetch_add(1, Ordering::SeqCst);
        let variant = ProductVariant {
            id: VariantId::new(id),
            product_id,
            color_option: draft.color_option.clone(),
            size_option: draft.size_option.clone(),
            price: draft.price,
            available: draft.available,
        };
        write_lock!(self.variants).insert(id, variant.clone());
        Ok(variant)
    }

    async fn variant_insert_batch(
        &self,
        product_id: ProductId,
        drafts: &[NewVariant],
    ) -> StoreResult<Vec<ProductVariant>> {
        let mut out = Vec::with_capacity(drafts.len());
        for draft in drafts {
            out.push(self.variant_insert(product_id, draft).await?);
        }
        Ok(out)
    }

    async fn variant_get(&self, id: VariantId) -> StoreResult<Option<ProductVariant>> {
        Ok(read_lock!(self.variants).get(&id.as_i64()).cloned())
    }

    async fn variants_for_product(
        &self,
        product_id: ProductId,
    ) -> StoreResult<Vec<ProductVariant>> {
        let variants = read_lock!(self.variants);
        Ok(Self::variants_of(&variants, product_id))
    }

    async fn variant_update(&self, id: VariantId, update: &NewVariant) -> StoreResult<bool> {
        let mut variants = write_lock!(self.variants);
        let Some(variant) = variants.get_mut(&id.as_i64()) else {
            return Ok(false);
        };
        variant.color_option = update.color_option.clone();
        variant.size_option = update.size_option.clone();
        variant.price = update.price;
        variant.available = update.available;
        Ok(true)
    }

    async fn variant_delete(&self, id: VariantId) -> StoreResult<Option<ProductId>> {
        Ok(write_lock!(self.variants)
            .remove(&id.as_i64())
            .map(|v| v.product_id))
    }

    async fn variant_delete_for_product(&self, product_id: ProductId) -> StoreResult<u64> {
        let mut variants = write_lock!(self.variants);
        let before = variants.len();
        variants.retain(|_, v| v.product_id != product_id);
        Ok((before - variants.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfeed_test_utils::{draft_product, draft_variant};

    fn draft_with_variant(title: &str) -> NewProduct {
        let mut draft = draft_product(title);
        draft.variants.push(draft_variant("Black"));
        draft
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MockCatalogStore::new();
        let a = store.product_insert(&draft_product("A")).await.unwrap();
        let b = store.product_insert(&draft_product("B")).await.unwrap();
        assert_eq!(a.id.as_i64(), 1);
        assert_eq!(b.id.as_i64(), 2);
    }

    #[tokio::test]
    async fn test_get_includes_variants() {
        let store = MockCatalogStore::new();
        let saved = store
            .product_insert(&draft_with_variant("Tee"))
            .await
            .unwrap();
        let fetched = store.product_get(saved.id).await.unwrap().unwrap();
        assert_eq!(fetched.variants.len(), 1);
        assert_eq!(fetched.variants[0].product_id, saved.id);
    }

    #[tokio::test]
    async fn test_page_orders_by_id_and_respects_offset() {
        let store = MockCatalogStore::new();
        for title in ["C", "A", "B"] {
            store.product_insert(&draft_product(title)).await.unwrap();
        }
        let page = store.product_page(1, 2, None).await.unwrap();
        let titles: Vec<_> = page.iter().map(|p| p.title.as_str()).collect();
        // Insertion order, not alphabetical.
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_filter_is_case_insensitive_substring() {
        let store = MockCatalogStore::new();
        store
            .product_insert(&draft_product("Power Leggings"))
            .await
            .unwrap();
        store
            .product_insert(&draft_product("Sports Bra"))
            .await
            .unwrap();
        assert_eq!(store.product_count(Some("LEGG")).await.unwrap(), 1);
        let page = store.product_page(0, 10, Some("legg")).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Power Leggings");
    }

    #[tokio::test]
    async fn test_delete_cascades_to_variants() {
        let store = MockCatalogStore::new();
        let saved = store
            .product_insert(&draft_with_variant("Tee"))
            .await
            .unwrap();
        assert!(store.product_delete(saved.id).await.unwrap());
        assert_eq!(store.variants_for_product(saved.id).await.unwrap().len(), 0);
        assert!(!store.product_delete(saved.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_variant_delete_returns_parent_id() {
        let store = MockCatalogStore::new();
        let saved = store.product_insert(&draft_product("Tee")).await.unwrap();
        let variant = store
            .variant_insert(saved.id, &draft_variant("Red"))
            .await
            .unwrap();
        let parent = store.variant_delete(variant.id).await.unwrap();
        assert_eq!(parent, Some(saved.id));
        assert_eq!(store.variant_delete(variant.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_variant_insert_requires_parent() {
        let store = MockCatalogStore::new();
        let err = store
            .variant_insert(ProductId::new(999), &draft_variant("Red"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::QueryFailed { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_rows_return_false() {
        let store = MockCatalogStore::new();
        let update = ProductUpdate {
            title: "X".to_string(),
            vendor: "Y".to_string(),
            product_type: None,
        };
        assert!(!store
            .product_update(ProductId::new(7), &update)
            .await
            .unwrap());
        assert!(!store
            .variant_update(VariantId::new(7), &draft_variant("Red"))
            .await
            .unwrap());
    }
}
