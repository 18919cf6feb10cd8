//! Client-side pagination math

use serde::Serialize;
use std::ops::Range;

/// Rows per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Current page (1-based) and a fixed page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// Start on page 1; a zero page size is treated as 1
    pub const fn new(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page: if per_page == 0 { 1 } else { per_page },
        }
    }

    /// Current page (1-based)
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Items per page
    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    /// `ceil(total / per_page)`; zero when there is nothing to show
    pub const fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.per_page)
    }

    /// Move to `page`, clamped to `[1, total_pages]`
    pub fn set_page(&mut self, page: usize, total: usize) {
        let last = self.total_pages(total).max(1);
        self.page = page.clamp(1, last);
    }

    /// Back to page 1
    pub const fn reset(&mut self) {
        self.page = 1;
    }

    /// Index of the first item on the current page
    pub const fn offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }

    /// Items `[(k-1)*p, k*p)` of `total`, cut to what exists
    ///
    /// Empty when the current page starts past the end.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = self.offset().min(total);
        let end = (self.offset() + self.per_page).min(total);
        start..end
    }

    /// Whether there is a page before this one
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether there is a page after this one
    pub const fn has_next(&self, total: usize) -> bool {
        self.offset() + self.per_page < total
    }
}

/// Pagination summary rendered under a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Current page (1-based)
    pub page: usize,

    /// Items per page
    pub per_page: usize,

    /// Total number of items after filtering
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there's a next page
    pub has_next: bool,

    /// Whether there's a previous page
    pub has_prev: bool,

    /// Next page number (if exists)
    pub next_page: Option<usize>,

    /// Previous page number (if exists)
    pub prev_page: Option<usize>,
}

impl PaginationMeta {
    /// Summarize `pagination` over `total` items
    pub const fn new(pagination: &Pagination, total: usize) -> Self {
        let page = pagination.page();
        let has_next = pagination.has_next(total);
        let has_prev = pagination.has_prev();

        Self {
            page,
            per_page: pagination.per_page(),
            total,
            total_pages: pagination.total_pages(total),
            has_next,
            has_prev,
            next_page: if has_next { Some(page + 1) } else { None },
            prev_page: if has_prev { Some(page - 1) } else { None },
        }
    }

    /// `Page k of n`
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(10, 1)]
    #[case(11, 2)]
    #[case(95, 10)]
    fn test_total_pages(#[case] total: usize, #[case] expected: usize) {
        assert_eq!(Pagination::new(10).total_pages(total), expected);
    }

    #[test]
    fn test_set_page_clamps() {
        let mut pagination = Pagination::new(10);

        pagination.set_page(7, 25);
        assert_eq!(pagination.page(), 3);

        pagination.set_page(0, 25);
        assert_eq!(pagination.page(), 1);

        pagination.set_page(4, 0);
        assert_eq!(pagination.page(), 1);
    }

    #[test]
    fn test_range_past_end_is_empty() {
        let mut pagination = Pagination::new(10);
        pagination.set_page(3, 30);

        assert_eq!(pagination.range(30), 20..30);
        assert!(pagination.range(12).is_empty());
    }

    #[test]
    fn test_pagination_meta() {
        let mut pagination = Pagination::new(10);
        pagination.set_page(2, 95);

        let meta = PaginationMeta::new(&pagination, 95);

        assert_eq!(meta.page, 2);
        assert_eq!(meta.per_page, 10);
        assert_eq!(meta.total_pages, 10);
        assert!(meta.has_next);
        assert!(meta.has_prev);
        assert_eq!(meta.next_page, Some(3));
        assert_eq!(meta.prev_page, Some(1));
        assert_eq!(meta.label(), "Page 2 of 10");
    }

    #[test]
    fn test_zero_page_size() {
        assert_eq!(Pagination::new(0).per_page(), 1);
    }

    proptest! {
        #[test]
        fn prop_pages_partition_items(total in 0usize..200, per_page in 1usize..25) {
            let mut pagination = Pagination::new(per_page);
            let pages = pagination.total_pages(total);
            let mut seen = Vec::new();

            for page in 1..=pages {
                pagination.set_page(page, total);
                let range = pagination.range(total);
                prop_assert_eq!(range.start, (page - 1) * per_page);
                prop_assert!(range.len() <= per_page);
                seen.extend(range);
            }

            prop_assert_eq!(seen, (0..total).collect::<Vec<_>>());
        }
    }
}
