//! Catalog entity structures.
//!
//! `Product` and `ProductVariant` are the stored shapes (identifiers
//! assigned); `NewProduct` and `NewVariant` are the unsaved shapes
//! produced by the feed parser and by interactive create requests.

use crate::{ProductId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel size used when the source feed carries no usable size option.
pub const NOT_APPLICABLE_SIZE: &str = "N/A";

/// A catalog product.
///
/// Store reads return products with `variants` attached; the field
/// defaults to empty for payloads that omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub vendor: String,
    pub product_type: Option<String>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

/// A stored product variant. The owning product id is required and
/// immutable for the lifetime of the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub color_option: String,
    pub size_option: Option<String>,
    pub price: Decimal,
    pub available: bool,
}

/// An unsaved product, as extracted from the feed or supplied by a
/// create request. The store assigns the identifier on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub vendor: String,
    pub product_type: Option<String>,
    #[serde(default)]
    pub variants: Vec<NewVariant>,
}

/// An unsaved variant. The owning product id is supplied separately at
/// insert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVariant {
    pub color_option: String,
    pub size_option: Option<String>,
    pub price: Decimal,
    pub available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_product_serde_round_trip() {
        let product = Product {
            id: ProductId::new(3),
            title: "Alpha Tee".to_string(),
            vendor: "Famme".to_string(),
            product_type: Some("Tee".to_string()),
            variants: vec![ProductVariant {
                id: VariantId::new(9),
                product_id: ProductId::new(3),
                color_option: "Black".to_string(),
                size_option: Some("M".to_string()),
                price: Decimal::from_str("49.99").unwrap(),
                available: true,
            }],
        };

        let json = serde_json::to_string(&product).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_variants_default_to_empty() {
        let json = r#"{"id":1,"title":"Tee","vendor":"V","product_type":null}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.variants.is_empty());
    }
}
