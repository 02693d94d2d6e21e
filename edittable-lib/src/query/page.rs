//! Page types and pagination bookkeeping.

use serde::Deserialize;
use serde::Serialize;

use super::SortSpec;
use crate::model::Row;

/// Returns the last page number for `total` rows at `limit` per page.
///
/// Always at least 1, so an empty table still has a page to show.
pub fn last_page(total: usize, limit: usize) -> usize {
    if limit == 0 {
        return 1;
    }
    total.div_ceil(limit).max(1)
}

/// The page sizes a table accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(usize);

impl PageSize {
    /// Allowed rows-per-page values.
    pub const ALLOWED: [usize; 4] = [10, 25, 50, 100];

    /// The page size used when nothing valid was asked for.
    pub const DEFAULT: PageSize = PageSize(10);

    /// Returns the page size if `n` is one of [`Self::ALLOWED`].
    pub fn new(n: usize) -> Option<Self> {
        Self::ALLOWED.contains(&n).then_some(Self(n))
    }

    /// Returns the page size for `n`, falling back to the smallest allowed.
    pub fn sanitize(n: usize) -> Self {
        Self::new(n).unwrap_or(Self::DEFAULT)
    }

    /// Returns the number of rows per page.
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Arguments of a page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    /// Rows per page.
    pub limit: usize,
    /// Sort keys in priority order.
    pub sort: SortSpec,
}

impl PageRequest {
    /// Creates an unsorted request.
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page,
            limit,
            sort: SortSpec::new(),
        }
    }

    /// Sets the sort keys.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Returns the index of the first row of the page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// One page of rows as declared by the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based page number.
    pub page: usize,
    /// Rows per page.
    pub limit: usize,
    /// Total rows across all pages.
    pub total: usize,
    /// Last page number. Recomputed from `total` when a backend omits it.
    #[serde(default)]
    pub last_page: usize,
    /// The rows on this page.
    #[serde(default)]
    pub items: Vec<Row>,
}

impl Page {
    /// Creates a page, deriving `last_page`.
    pub fn new(page: usize, limit: usize, total: usize, items: Vec<Row>) -> Self {
        Self {
            page,
            limit,
            total,
            last_page: last_page(total, limit),
            items,
        }
    }

    /// Fills in `last_page` if the backend left it out.
    pub(crate) fn normalized(mut self) -> Self {
        if self.last_page == 0 {
            self.last_page = last_page(self.total, self.limit);
        }
        self
    }

    /// Returns the pagination part of the page.
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total: self.total,
            last_page: self.last_page,
        }
    }
}

/// Pagination cursor of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current 1-based page.
    pub page: usize,
    /// Rows per page.
    pub limit: usize,
    /// Total rows known to the backend.
    pub total: usize,
    /// Last page number.
    pub last_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: PageSize::DEFAULT.get(),
            total: 0,
            last_page: 1,
        }
    }
}

impl Pagination {
    /// Clamps `page` into `[1, last_page]`.
    pub fn clamp(&self, page: usize) -> usize {
        page.clamp(1, self.last_page.max(1))
    }

    /// Returns the 1-based `(from, to, total)` of the rows on screen.
    ///
    /// `from` is 0 when the page is empty.
    pub fn visible_range(&self, rows_on_page: usize) -> (usize, usize, usize) {
        let offset = self.page.saturating_sub(1).saturating_mul(self.limit);
        let from = if rows_on_page > 0 { offset.saturating_add(1) } else { 0 };
        (from, offset.saturating_add(rows_on_page), self.total)
    }
}
