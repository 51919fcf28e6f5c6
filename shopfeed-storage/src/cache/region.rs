//! Cache region names.

use std::fmt;

/// The fixed set of cache regions.
///
/// Each region holds one shape of value and has its own key space;
/// evicting one region never touches another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheRegion {
    /// Single products keyed by product id.
    Product,
    /// Single variants keyed by variant id.
    Variant,
    /// Per-product variant lists keyed by product id.
    VariantList,
    /// Whole result pages keyed by the requested page, size, and query.
    ProductPages,
}

impl CacheRegion {
    /// Every region, for bulk operations.
    pub const ALL: [CacheRegion; 4] = [
        CacheRegion::Product,
        CacheRegion::Variant,
        CacheRegion::VariantList,
        CacheRegion::ProductPages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheRegion::Product => "product",
            CacheRegion::Variant => "variant",
            CacheRegion::VariantList => "variant-list",
            CacheRegion::ProductPages => "product-pages",
        }
    }
}

impl fmt::Display for CacheRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
