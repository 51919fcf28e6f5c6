//! Pagination value objects and clamping math.
//!
//! A `Page<T>` is a read-only projection, recomputed per request and
//! cache-eligible as a value object. All edge-case normalization (size
//! ceiling, blank filters, zero totals, out-of-range indices) happens
//! here so that store implementations only ever see valid slices.

use serde::{Deserialize, Serialize};

/// Hard ceiling on the effective page size.
pub const MAX_PAGE_SIZE: u32 = 35;

/// One page of results.
///
/// Invariants: `items.len() <= size <= MAX_PAGE_SIZE` and
/// `page <= max(total_pages - 1, 0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Zero-based page index, clamped into range.
    pub page: u32,
    /// Effective page size after clamping.
    pub size: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    /// The canonical empty page returned when nothing matches.
    pub fn empty(size: u32) -> Self {
        Self {
            items: Vec::new(),
            page: 0,
            size,
            total_items: 0,
            total_pages: 0,
            has_prev: false,
            has_next: false,
        }
    }
}

/// Raw pagination inputs as supplied by a caller: any integer page, any
/// integer size, and an optional free-text filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
    pub query: Option<String>,
}

impl PageRequest {
    pub fn new(page: i64, size: i64, query: Option<&str>) -> Self {
        Self {
            page,
            size,
            query: query.map(str::to_string),
        }
    }

    /// Requested size clamped into `[1, MAX_PAGE_SIZE]`.
    pub fn effective_size(&self) -> u32 {
        self.size.clamp(1, MAX_PAGE_SIZE as i64) as u32
    }

    /// Trimmed filter text; blank means "no filter".
    pub fn normalized_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// Slice coordinates computed for a non-empty result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    pub page: u32,
    pub size: u32,
    pub offset: u64,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageSlice {
    /// Clamp a requested page index against the matching row count.
    ///
    /// Returns `None` when `total_items` is zero; callers then use
    /// `Page::empty` with the effective size.
    pub fn compute(requested_page: i64, size: u32, total_items: u64) -> Option<Self> {
        if total_items == 0 {
            return None;
        }
        let size_u64 = u64::from(size);
        let total_pages = total_items.div_ceil(size_u64) as u32;
        let max_page = total_pages - 1;
        let page = requested_page.clamp(0, i64::from(max_page)) as u32;
        Some(Self {
            page,
            size,
            offset: u64::from(page) * size_u64,
            total_items,
            total_pages,
            has_prev: page > 0,
            has_next: page < max_page,
        })
    }

    /// Attach the fetched items to produce the final page projection.
    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            page: self.page,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            has_prev: self.has_prev,
            has_next: self.has_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_size_clamped_to_ceiling() {
        let req = PageRequest::new(0, 100, None);
        assert_eq!(req.effective_size(), 35);
    }

    #[test]
    fn test_size_clamped_to_floor() {
        assert_eq!(PageRequest::new(0, 0, None).effective_size(), 1);
        assert_eq!(PageRequest::new(0, -3, None).effective_size(), 1);
    }

    #[test]
    fn test_blank_query_means_unfiltered() {
        assert_eq!(PageRequest::new(0, 10, None).normalized_query(), None);
        assert_eq!(PageRequest::new(0, 10, Some("   ")).normalized_query(), None);
        assert_eq!(
            PageRequest::new(0, 10, Some("  alpha ")).normalized_query(),
            Some("alpha")
        );
    }

    #[test]
    fn test_zero_total_yields_empty_page() {
        assert_eq!(PageSlice::compute(7, 35, 0), None);
        let page: Page<u32> = Page::empty(35);
        assert_eq!(page.page, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_prev);
        assert!(!page.has_next);
    }

    #[test]
    fn test_last_partial_page() {
        // total=80, size=35 -> 3 pages; page 2 holds the trailing 10 rows.
        let slice = PageSlice::compute(2, 35, 80).unwrap();
        assert_eq!(slice.total_pages, 3);
        assert_eq!(slice.offset, 70);
        assert!(slice.has_prev);
        assert!(!slice.has_next);
    }

    #[test]
    fn test_out_of_range_pages_clamped() {
        let low = PageSlice::compute(-5, 10, 10).unwrap();
        assert_eq!(low.page, 0);
        let high = PageSlice::compute(999, 10, 10).unwrap();
        assert_eq!(high.page, 0);
        assert_eq!(high.total_pages, 1);
    }

    #[test]
    fn test_middle_page_flags() {
        let slice = PageSlice::compute(1, 35, 80).unwrap();
        assert_eq!(slice.offset, 35);
        assert!(slice.has_prev);
        assert!(slice.has_next);
    }

    proptest! {
        #[test]
        fn prop_page_always_in_range(page in -1000i64..1000, size in 1u32..=35, total in 1u64..100_000) {
            let slice = PageSlice::compute(page, size, total).unwrap();
            prop_assert!(slice.page < slice.total_pages);
            prop_assert!(slice.offset < total);
            prop_assert_eq!(slice.has_prev, slice.page > 0);
            prop_assert_eq!(slice.has_next, slice.page + 1 < slice.total_pages);
        }

        #[test]
        fn prop_total_pages_covers_total_items(size in 1u32..=35, total in 1u64..100_000) {
            let slice = PageSlice::compute(0, size, total).unwrap();
            let capacity = u64::from(slice.total_pages) * u64::from(size);
            prop_assert!(capacity >= total);
            prop_assert!(capacity - total < u64::from(size));
        }
    }
}
