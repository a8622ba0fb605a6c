//! Pagination and sort extraction.
//!
//! Out-of-range paging input is normalized, never rejected: listing
//! endpoints must stay answerable for any `page`/`limit` a client sends.

use crate::SortDir;
use crate::parse::RawQuery;
use crate::spec::EntityFieldSpec;

/// Configured bounds for listing endpoints.
#[derive(Debug, Clone)]
pub struct QueryLimits {
    /// Page size used when the client sends none (default: 10).
    pub default_limit: u64,
    /// Upper clamp for the page size (default: 250).
    pub max_limit: u64,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 250,
        }
    }
}

impl QueryLimits {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_limit(mut self, max: u64) -> Self {
        self.max_limit = max;
        self
    }
}

/// Normalized paging and sorting for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
    pub sort_field: String,
    pub sort_dir: SortDir,
}

impl PageRequest {
    /// Number of documents to skip before this page.
    ///
    /// Saturates instead of overflowing: the page number is client input
    /// and may be arbitrarily large.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Derive bounded pagination and sort parameters from the raw query.
///
/// `page` values below 1 (or unparsable) normalize to 1. `limit` is
/// clamped into `[1, max_limit]`. A sort field outside the find-all allow
/// list falls back to the spec default; unrecognized direction tokens fall
/// back to ascending.
#[must_use]
pub fn extract(spec: &EntityFieldSpec, raw: &RawQuery, limits: &QueryLimits) -> PageRequest {
    let page = raw
        .first("page")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(1, |p| p.max(1));

    let limit = raw
        .first("limit")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(limits.default_limit)
        .clamp(1, limits.max_limit);

    let sort_field = raw
        .first("sortField")
        .filter(|f| spec.allows_sort(f))
        .unwrap_or_else(|| spec.default_sort_field())
        .to_owned();

    let sort_dir = raw
        .first("sortType")
        .map_or(SortDir::Asc, SortDir::from_token);

    PageRequest {
        page,
        limit,
        sort_field,
        sort_dir,
    }
}
