//! Shared query parameter types for API handlers.

use serde::Deserialize;
use yamdb_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// The clamped `(limit, offset)` window.
    pub fn window(&self) -> (i64, i64) {
        page_window(self.limit, self.offset)
    }
}

/// Query parameters for list endpoints that also take a `?search=` filter.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchParams {
    /// The search term, with blank input treated as absent.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn window(&self) -> (i64, i64) {
        page_window(self.limit, self.offset)
    }
}

/// Clamp raw pagination input to the `(limit, offset)` actually applied.
pub fn page_window(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
        clamp_offset(offset),
    )
}
