//! Shared fixtures and builders for shopfeed tests.
//!
//! Entity fixtures return fully-populated values with sensible defaults
//! so tests only spell out the fields they care about. The `*_json`
//! builders assemble feed documents as raw strings, letting parser
//! tests splice in hand-written fragments (missing fields, nulls,
//! garbage) alongside well-formed items.

use rust_decimal::Decimal;
use shopfeed_core::{NewProduct, NewVariant, Product, ProductId, ProductVariant, VariantId};
use std::str::FromStr;

// ============================================================================
// Entity fixtures
// ============================================================================

/// A stored product with one variant attached.
pub fn sample_product(id: i64) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Test Product {id}"),
        vendor: "Famme".to_string(),
        product_type: Some("Leggings".to_string()),
        variants: vec![sample_variant(id * 100, id)],
    }
}

/// A stored variant belonging to the given product.
pub fn sample_variant(id: i64, product_id: i64) -> ProductVariant {
    ProductVariant {
        id: VariantId::new(id),
        product_id: ProductId::new(product_id),
        color_option: "Black".to_string(),
        size_option: Some("M".to_string()),
        price: Decimal::from_str("49.99").expect("literal price"),
        available: true,
    }
}

/// An unsaved product draft with no variants.
pub fn draft_product(title: &str) -> NewProduct {
    NewProduct {
        title: title.to_string(),
        vendor: "Famme".to_string(),
        product_type: Some("Leggings".to_string()),
        variants: Vec::new(),
    }
}

/// An unsaved variant draft.
pub fn draft_variant(color: &str) -> NewVariant {
    NewVariant {
        color_option: color.to_string(),
        size_option: Some("M".to_string()),
        price: Decimal::from_str("29.99").expect("literal price"),
        available: true,
    }
}

// ============================================================================
// Feed document builders
// ============================================================================

/// Wrap product fragments in a feed document envelope.
pub fn feed_document(products: &[String]) -> String {
    format!(r#"{{"products": [{}]}}"#, products.join(", "))
}

/// A well-formed product fragment with the given variants.
pub fn product_json(title: &str, vendor: &str, variants: &[String]) -> String {
    format!(
        r#"{{"title": {}, "vendor": {}, "product_type": "Leggings", "variants": [{}]}}"#,
        serde_json::to_string(title).expect("title encodes"),
        serde_json::to_string(vendor).expect("vendor encodes"),
        variants.join(", ")
    )
}

/// A well-formed variant fragment.
pub fn variant_json(color: &str, price: &str, available: bool) -> String {
    format!(
        r#"{{"option1": {}, "option2": "M", "price": {}, "available": {}}}"#,
        serde_json::to_string(color).expect("color encodes"),
        serde_json::to_string(price).expect("price encodes"),
        available
    )
}
