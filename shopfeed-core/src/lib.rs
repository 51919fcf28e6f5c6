//! SHOPFEED Core - Domain Types and Invariants
//!
//! Shared vocabulary for the shopfeed catalog pipeline:
//! - Catalog entities (products and their variants)
//! - Strongly-typed identifiers
//! - Pagination value objects and the page-clamping math
//! - Error taxonomy used across the storage, feed, and service layers
//!
//! This crate is deliberately free of I/O. Persistence lives behind the
//! `CatalogStore` trait in `shopfeed-storage`; parsing lives in
//! `shopfeed-feed`.

pub mod entities;
pub mod error;
pub mod ids;
pub mod page;

pub use entities::{NewProduct, NewVariant, Product, ProductVariant, NOT_APPLICABLE_SIZE};
pub use error::{FeedError, StorageError, ValidationError};
pub use ids::{EntityKind, ProductId, VariantId};
pub use page::{Page, PageRequest, PageSlice, MAX_PAGE_SIZE};
