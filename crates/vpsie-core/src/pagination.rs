//! List options and page bookkeeping.
//!
//! Nothing here fetches anything. [`has_more`] and [`next`] are pure functions of
//! their inputs, so the loop that walks pages lives entirely with the caller:
//!
//! ```
//! use vpsie_core::pagination::{self, ListOptions};
//!
//! let mut options = ListOptions::new().with_per_page(10);
//! let mut visited = Vec::new();
//! loop {
//!     visited.push(options.page());
//!     // A real caller would issue the list request here.
//!     let (returned, total) = (10, Some(25));
//!     if !pagination::has_more(&options, returned, total) {
//!         break;
//!     }
//!     options = pagination::next(&options);
//! }
//! assert_eq!(visited, vec![1, 2, 3]);
//! ```

use crate::query::QueryParams;

/// Default page size when none is given.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Query key carrying the page number.
pub const PAGE_PARAM: &str = "page";

/// Query key carrying the page size.
pub const PER_PAGE_PARAM: &str = "per_page";

/// Paging and filtering options for list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    page: u32,
    per_page: u32,
    filters: Vec<(String, String)>,
}

impl ListOptions {
    /// First page with the default page size and no filters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            filters: Vec::new(),
        }
    }

    /// Select a page. Pages are 1-based; `0` is treated as `1`.
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Set the page size. A size of `0` is treated as `1`.
    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Add an endpoint-specific filter.
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    /// Current page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Filters in insertion order.
    #[must_use]
    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    /// Convert to URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut params = QueryParams::new();
        params.push(PAGE_PARAM, self.page);
        params.push(PER_PAGE_PARAM, self.per_page);
        params.extend(self.filters.iter().map(|(k, v)| (k.as_str(), v)));
        params.into_pairs()
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// One decoded page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total number of items across all pages, when the endpoint reports it
    pub total: Option<u64>,
}

impl<T> Page<T> {
    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether another page should be requested after this one.
    #[must_use]
    pub fn has_more(&self, options: &ListOptions) -> bool {
        has_more(options, self.items.len(), self.total)
    }

    /// Discard the paging metadata.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Whether a page fetched with `options` that returned `returned` items is
/// followed by another one.
///
/// With a known `total`, more pages exist while `page * per_page < total`.
/// Without one, a full page is taken to mean there may be more.
#[must_use]
pub fn has_more(options: &ListOptions, returned: usize, total: Option<u64>) -> bool {
    if returned == 0 {
        return false;
    }
    match total {
        Some(total) => u64::from(options.page) * u64::from(options.per_page) < total,
        None => returned >= options.per_page as usize,
    }
}

/// Options for the page after `options`, keeping size and filters.
#[must_use]
pub fn next(options: &ListOptions) -> ListOptions {
    ListOptions {
        page: options.page.saturating_add(1),
        per_page: options.per_page,
        filters: options.filters.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_three_pages_for_twenty_five_items() {
        let mut options = ListOptions::new().with_per_page(10);
        let mut visited = vec![options.page()];
        let mut remaining = 25usize;

        loop {
            let returned = remaining.min(10);
            remaining -= returned;
            if !has_more(&options, returned, Some(25)) {
                break;
            }
            options = next(&options);
            visited.push(options.page());
        }

        assert_eq!(visited, vec![1, 2, 3]);
    }

    #[test]
    fn empty_page_has_no_more() {
        let options = ListOptions::new();
        assert!(!has_more(&options, 0, Some(100)));
        assert!(!has_more(&options, 0, None));
    }

    #[test]
    fn unknown_total_uses_page_fill() {
        let options = ListOptions::new().with_per_page(5);
        assert!(has_more(&options, 5, None));
        assert!(!has_more(&options, 4, None));
    }

    #[test]
    fn next_keeps_filters_and_size() {
        let options = ListOptions::new()
            .with_page(3)
            .with_per_page(50)
            .with_filter("dcIdentifier", "ny1");

        let following = next(&options);
        assert_eq!(following.page(), 4);
        assert_eq!(following.per_page(), 50);
        assert_eq!(following.filters(), options.filters());
        assert_eq!(options.page(), 3);
    }

    #[test]
    fn zero_values_are_clamped() {
        let options = ListOptions::new().with_page(0).with_per_page(0);
        assert_eq!(options.page(), 1);
        assert_eq!(options.per_page(), 1);
    }

    #[test]
    fn to_pairs_includes_paging_then_filters() {
        let pairs = ListOptions::new()
            .with_page(2)
            .with_per_page(10)
            .with_filter("status", "active")
            .to_pairs();

        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "2".to_string()),
                ("per_page".to_string(), "10".to_string()),
                ("status".to_string(), "active".to_string()),
            ]
        );
    }

    #[test]
    fn page_reports_more_from_total() {
        let page = Page {
            items: vec![1, 2],
            total: Some(4),
        };
        let options = ListOptions::new().with_per_page(2);
        assert!(page.has_more(&options));
        assert!(!page.has_more(&next(&options)));
        assert_eq!(page.len(), 2);
    }
}
