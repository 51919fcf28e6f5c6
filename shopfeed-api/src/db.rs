//! PostgreSQL catalog store.
//!
//! Connection pooling via deadpool-postgres; the schema lives in
//! `migrations/V1__catalog.sql`. `DbClient` implements [`CatalogStore`]
//! with plain parameterized SQL, so everything above it is backend
//! agnostic.

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use rust_decimal::Decimal;
use shopfeed_core::{
    NewProduct, NewVariant, Product, ProductId, ProductVariant, StorageError, VariantId,
};
use shopfeed_storage::{CatalogStore, ProductUpdate, StoreResult};
use std::time::Duration;
use tokio_postgres::{NoTls, Row};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub max_size: usize,
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "shopfeed".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Read configuration from `SHOPFEED_DB_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SHOPFEED_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("SHOPFEED_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("SHOPFEED_DB_NAME").unwrap_or_else(|_| "shopfeed".to_string()),
            user: std::env::var("SHOPFEED_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("SHOPFEED_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("SHOPFEED_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("SHOPFEED_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> StoreResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StorageError::ConnectionFailed {
                reason: format!("failed to create pool: {e}"),
            })
    }
}

// ============================================================================
// DATABASE CLIENT
// ============================================================================

/// Pooled PostgreSQL client implementing [`CatalogStore`].
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn from_config(config: &DbConfig) -> StoreResult<Self> {
        Ok(Self::new(config.create_pool()?))
    }

    /// Current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    async fn conn(&self) -> StoreResult<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::ConnectionFailed {
                reason: e.to_string(),
            })
    }

    fn product_from_row(row: &Row) -> Product {
        Product {
            id: ProductId::new(row.get::<_, i64>(0)),
            title: row.get(1),
            vendor: row.get(2),
            product_type: row.get(3),
            variants: Vec::new(),
        }
    }

    fn variant_from_row(row: &Row) -> ProductVariant {
        ProductVariant {
            id: VariantId::new(row.get::<_, i64>(0)),
            product_id: ProductId::new(row.get::<_, i64>(1)),
            color_option: row.get(2),
            size_option: row.get(3),
            price: row.get::<_, Decimal>(4),
            available: row.get(5),
        }
    }

    /// Attach variants to an already-fetched set of product rows with
    /// one batched query.
    async fn attach_variants(
        &self,
        conn: &deadpool_postgres::Object,
        mut products: Vec<Product>,
    ) -> StoreResult<Vec<Product>> {
        if products.is_empty() {
            return Ok(products);
        }
        let ids: Vec<i64> = products.iter().map(|p| p.id.as_i64()).collect();
        let rows = conn
            .query(
                "SELECT id, product_id, color_option, size_option, price, available \
                 FROM product_variants WHERE product_id = ANY($1) ORDER BY id",
                &[&ids],
            )
            .await
            .map_err(query_failed)?;
        for row in &rows {
            let variant = Self::variant_from_row(row);
            if let Some(product) = products.iter_mut().find(|p| p.id == variant.product_id) {
                product.variants.push(variant);
            }
        }
        Ok(products)
    }
}

fn query_failed(e: tokio_postgres::Error) -> StorageError {
    StorageError::QueryFailed {
        reason: e.to_string(),
    }
}

fn transaction_failed(e: tokio_postgres::Error) -> StorageError {
    StorageError::TransactionFailed {
        reason: e.to_string(),
    }
}

#[async_trait]
impl CatalogStore for DbClient {
    async fn product_insert(&self, draft: &NewProduct) -> StoreResult<Product> {
        let mut conn = self.conn().await?;
        let tx = conn.transaction().await.map_err(transaction_failed)?;

        let row = tx
            .query_one(
                "INSERT INTO products (title, vendor, product_type) \
                 VALUES ($1, $2, $3) RETURNING id",
                &[&draft.title, &draft.vendor, &draft.product_type],
            )
            .await
            .map_err(query_failed)?;
        let id = ProductId::new(row.get::<_, i64>(0));

        let mut variants = Vec::with_capacity(draft.variants.len());
        for v in &draft.variants {
            let row = tx
                .query_one(
                    "INSERT INTO product_variants \
                     (product_id, color_option, size_option, price, available) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING id",
                    &[
                        &id.as_i64(),
                        &v.color_option,
                        &v.size_option,
                        &v.price,
                        &v.available,
                    ],
                )
                .await
                .map_err(query_failed)?;
            variants.push(ProductVariant {
                id: VariantId::new(row.get::<_, i64>(0)),
                product_id: id,
                color_option: v.color_option.clone(),
                size_option: v.size_option.clone(),
                price: v.price,
                available: v.available,
            });
        }

        tx.commit().await.map_err(transaction_failed)?;
        Ok(Product {
            id,
            title: draft.title.clone(),
            vendor: draft.vendor.clone(),
            product_type: draft.product_type.clone(),
            variants,
        })
    }

    async fn product_get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(
                "SELECT id, title, vendor, product_type FROM products WHERE id = $1",
                &[&id.as_i64()],
            )
            .await
            .map_err(query_failed)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let products = self
            .attach_variants(&conn, vec![Self::product_from_row(&row)])
            .await?;
        Ok(products.into_iter().next())
    }

    async fn product_page(
        &self,
        offset: u64,
        limit: u32,
        query: Option<&str>,
    ) -> StoreResult<Vec<Product>> {
        let conn = self.conn().await?;
        let rows = match query {
            Some(q) => {
                conn.query(
                    "SELECT id, title, vendor, product_type FROM products \
                     WHERE title ILIKE '%' || $1 || '%' \
                     ORDER BY id LIMIT $2 OFFSET $3",
                    &[&q, &(limit as i64), &(offset as i64)],
                )
                .await
            }
            None => {
                conn.query(
                    "SELECT id, title, vendor, product_type FROM products \
                     ORDER BY id LIMIT $1 OFFSET $2",
                    &[&(limit as i64), &(offset as i64)],
                )
                .await
            }
        }
        .map_err(query_failed)?;

        let products = rows.iter().map(Self::product_from_row).collect();
        self.attach_variants(&conn, products).await
    }

    async fn product_count(&self, query: Option<&str>) -> StoreResult<u64> {
        let conn = self.conn().await?;
        let row = match query {
            Some(q) => {
                conn.query_one(
                    "SELECT COUNT(*) FROM products WHERE title ILIKE '%' || $1 || '%'",
                    &[&q],
                )
                .await
            }
            None => conn.query_one("SELECT COUNT(*) FROM products", &[]).await,
        }
        .map_err(query_failed)?;
        Ok(row.get::<_, i64>(0) as u64)
    }

    async fn product_update(&self, id: ProductId, update: &ProductUpdate) -> StoreResult<bool> {
        let conn = self.conn().await?;
        let updated = conn
            .execute(
                "UPDATE products SET title = $2, vendor = $3, product_type = $4 WHERE id = $1",
                &[
                    &id.as_i64(),
                    &update.title,
                    &update.vendor,
                    &update.product_type,
                ],
            )
            .await
            .map_err(query_failed)?;
        Ok(updated > 0)
    }

    async fn product_delete(&self, id: ProductId) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let tx = conn.transaction().await.map_err(transaction_failed)?;

        // Explicit variant cleanup first; the schema's ON DELETE CASCADE
        // remains authoritative if this step fails.
        if let Err(e) = tx
            .execute(
                "DELETE FROM product_variants WHERE product_id = $1",
                &[&id.as_i64()],
            )
            .await
        {
            tracing::warn!(
                product_id = %id,
                error = %e,
                "variant cleanup failed, falling back to cascade delete"
            );
            tx.rollback().await.map_err(transaction_failed)?;
            let deleted = conn
                .execute("DELETE FROM products WHERE id = $1", &[&id.as_i64()])
                .await
                .map_err(query_failed)?;
            return Ok(deleted > 0);
        }

        let deleted = tx
            .execute("DELETE FROM products WHERE id = $1", &[&id.as_i64()])
            .await
            .map_err(query_failed)?;
        tx.commit().await.map_err(transaction_failed)?;
        Ok(deleted > 0)
    }

    async fn variant_insert(
        &self,
        product_id: ProductId,
        draft: &NewVariant,
    ) -> StoreResult<ProductVariant> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO product_variants \
                 (product_id, color_option, size_option, price, available) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id",
                &[
                    &product_id.as_i64(),
                    &draft.color_option,
                    &draft.size_option,
                    &draft.price,
                    &draft.available,
                ],
            )
            .await
            .map_err(query_failed)?;
        Ok(ProductVariant {
            id: VariantId::new(row.get::<_, i64>(0)),
            product_id,
            color_option: draft.color_option.clone(),
            size_option: draft.size_option.clone(),
            price: draft.price,
            available: draft.available,
        })
    }

    async fn variant_insert_batch(
        &self,
        product_id: ProductId,
        drafts: &[NewVariant],
    ) -> StoreResult<Vec<ProductVariant>> {
        let mut conn = self.conn().await?;
        let tx = conn.transaction().await.map_err(transaction_failed)?;
        let mut out = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let row = tx
                .query_one(
                    "INSERT INTO product_variants \
                     (product_id, color_option, size_option, price, available) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING id",
                    &[
                        &product_id.as_i64(),
                        &draft.color_option,
                        &draft.size_option,
                        &draft.price,
                        &draft.available,
                    ],
                )
                .await
                .map_err(query_failed)?;
            out.push(ProductVariant {
                id: VariantId::new(row.get::<_, i64>(0)),
                product_id,
                color_option: draft.color_option.clone(),
                size_option: draft.size_option.clone(),
                price: draft.price,
                available: draft.available,
            });
        }
        tx.commit().await.map_err(transaction_failed)?;
        Ok(out)
    }

    async fn variant_get(&self, id: VariantId) -> StoreResult<Option<ProductVariant>> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(
                "SELECT id, product_id, color_option, size_option, price, available \
                 FROM product_variants WHERE id = $1",
                &[&id.as_i64()],
            )
            .await
            .map_err(query_failed)?;
        Ok(row.as_ref().map(Self::variant_from_row))
    }

    async fn variants_for_product(
        &self,
        product_id: ProductId,
    ) -> StoreResult<Vec<ProductVariant>> {
        let conn = self.conn().await?;
        let rows = conn
            .query(
                "SELECT id, product_id, color_option, size_option, price, available \
                 FROM product_variants WHERE product_id = $1 ORDER BY id",
                &[&product_id.as_i64()],
            )
            .await
            .map_err(query_failed)?;
        Ok(rows.iter().map(Self::variant_from_row).collect())
    }

    async fn variant_update(&self, id: VariantId, update: &NewVariant) -> StoreResult<bool> {
        let conn = self.conn().await?;
        let updated = conn
            .execute(
                "UPDATE product_variants \
                 SET color_option = $2, size_option = $3, price = $4, available = $5 \
                 WHERE id = $1",
                &[
                    &id.as_i64(),
                    &update.color_option,
                    &update.size_option,
                    &update.price,
                    &update.available,
                ],
            )
            .await
            .map_err(query_failed)?;
        Ok(updated > 0)
    }

    async fn variant_delete(&self, id: VariantId) -> StoreResult<Option<ProductId>> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(
                "DELETE FROM product_variants WHERE id = $1 RETURNING product_id",
                &[&id.as_i64()],
            )
            .await
            .map_err(query_failed)?;
        Ok(row.map(|r| ProductId::new(r.get::<_, i64>(0))))
    }

    async fn variant_delete_for_product(&self, product_id: ProductId) -> StoreResult<u64> {
        let conn = self.conn().await?;
        conn.execute(
            "DELETE FROM product_variants WHERE product_id = $1",
            &[&product_id.as_i64()],
        )
        .await
        .map_err(query_failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_defaults() {
        let config = DbConfig::from_env();
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "shopfeed");
        assert_eq!(config.max_size, 16);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
