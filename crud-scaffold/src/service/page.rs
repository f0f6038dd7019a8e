//! Page request and page result types
//!
//! # Example
//!
//! ```rust
//! use crud_scaffold::config::QueryConfig;
//! use crud_scaffold::service::PageQuery;
//!
//! let config = QueryConfig::default();
//! let query = PageQuery::new()
//!     .with_page(3)
//!     .with_page_size(500)
//!     .with_order_by("name")
//!     .with_filter("name_bo");
//!
//! assert_eq!(query.page_size(&config), 100);
//! assert_eq!(query.offset(&config), 200);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::QueryConfig;

/// Parameters of a paged read
///
/// Missing, zero or negative values are normalised against a [`QueryConfig`] rather
/// than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    /// 1-based page number; `None`, 0 or negative means the first page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page; `None` means the configured default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Sort field name, resolved case-insensitively
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Filter string, e.g. `name_bob,city_paris`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Sort descending instead of ascending
    #[serde(default)]
    pub descending: bool,
}

impl PageQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn with_order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    /// Page number, at least 1
    #[must_use]
    pub fn page_number(&self) -> u32 {
        self.page
            .map_or(1, |page| u32::try_from(page.max(1)).unwrap_or(u32::MAX))
    }

    /// Page size between 1 and the configured maximum
    #[must_use]
    pub fn page_size(&self, config: &QueryConfig) -> u32 {
        let max = config.max_page_size.max(1);
        self.page_size
            .unwrap_or(config.default_page_size)
            .clamp(1, max)
    }

    /// Number of items before the requested page
    #[must_use]
    pub fn offset(&self, config: &QueryConfig) -> u64 {
        u64::from(self.page_number() - 1) * u64::from(self.page_size(config))
    }

    /// Filter string, if it has any non-whitespace content
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref().filter(|f| !f.trim().is_empty())
    }
}

/// One page of results plus the total behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Number of entities matching the filter, across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    /// Page size used for the query
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        Self {
            items,
            total,
            page,
            page_size,
        }
    }

    /// Number of pages needed for `total` items
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        let page_size = u64::from(self.page_size.max(1));
        let pages = self.total.div_ceil(page_size);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Transform every item, keeping the paging metadata
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
