//! Offset pagination helpers.
//!
//! Out-of-range parameters are clamped, never rejected: `page < 1` becomes 1
//! and `size` is forced into `[1, max_size]`.

use serde::{Deserialize, Serialize};

/// A normalized page request. Always `page >= 1` and `1 <= size <= max_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.size)
    }

    /// Rows to fetch for this page.
    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

/// Where a page sits within a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageWindow {
    /// Computes the window for `request` over `total_count` rows.
    ///
    /// `total_count = 0` yields zero pages whatever page was asked for.
    pub fn compute(total_count: u64, request: &PageRequest) -> Self {
        let size = u64::from(request.size.max(1));
        let page = u64::from(request.page.max(1));
        let total_pages = total_count.div_ceil(size);

        Self {
            offset: (page - 1) * size,
            limit: size,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Whether the requested page starts past the last row.
    pub fn is_past_end(&self, total_count: u64) -> bool {
        self.offset >= total_count
    }
}

/// Turns raw caller input into page requests and windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    default_size: u32,
    max_size: u32,
}

impl Paginator {
    pub fn new(default_size: u32, max_size: u32) -> Self {
        let max_size = max_size.max(1);
        Self {
            default_size: default_size.clamp(1, max_size),
            max_size,
        }
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Normalizes raw page/size input. Missing values take the defaults.
    pub fn request(&self, page: Option<i64>, size: Option<i64>) -> PageRequest {
        let page = page.unwrap_or(1).clamp(1, i64::from(u32::MAX));
        let size = size
            .unwrap_or(i64::from(self.default_size))
            .clamp(1, i64::from(self.max_size));

        PageRequest {
            page: page as u32,
            size: size as u32,
        }
    }

    /// Clamps `page` and `size`, then computes the window over `total_count` rows.
    pub fn paginate(&self, total_count: u64, page: i64, size: i64) -> PageWindow {
        PageWindow::compute(total_count, &self.request(Some(page), Some(size)))
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(10, 100)
    }
}

/// One page of results plus its metadata. This is exactly what gets cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Assembles a page from fetched rows.
    ///
    /// Rows are dropped when the request lies past the end so that the
    /// "past the end means empty" rule does not depend on the data store.
    pub fn assemble(items: Vec<T>, request: &PageRequest, total_count: u64) -> Self {
        let window = PageWindow::compute(total_count, request);
        let items = if window.is_past_end(total_count) {
            Vec::new()
        } else {
            items
        };

        Self {
            items,
            page: request.page,
            size: request.size,
            total_pages: window.total_pages,
            total_count,
            has_next: window.has_next,
            has_prev: window.has_prev,
        }
    }
}
