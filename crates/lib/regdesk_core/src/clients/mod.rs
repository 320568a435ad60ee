//! Client record persistence and listing.

pub mod queries;
pub mod store;

use thiserror::Error;

use crate::validation::ValidationError;

/// Default page number.
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 10;

/// Default upper bound on page size.
pub const DEFAULT_MAX_LIMIT: u32 = 100;

/// Client record errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Client not found")]
    NotFound,

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

impl From<ValidationError> for ClientError {
    fn from(e: ValidationError) -> Self {
        ClientError::Validation(e.0)
    }
}

/// Normalized listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    /// Trimmed, non-empty search text.
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
        }
    }
}

impl ListQuery {
    /// Build a query from raw query-string values.
    ///
    /// Missing, non-numeric, or non-positive `page`/`limit` fall back to the
    /// defaults; `limit` is clamped to `max_limit`. Blank search means "all".
    pub fn from_raw(
        page: Option<&str>,
        limit: Option<&str>,
        search: Option<&str>,
        max_limit: u32,
    ) -> Self {
        let positive = |v: Option<&str>| {
            v.and_then(|s| s.trim().parse::<u32>().ok())
                .filter(|n| *n > 0)
        };
        Self {
            page: positive(page).unwrap_or(DEFAULT_PAGE),
            limit: positive(limit)
                .unwrap_or(DEFAULT_LIMIT)
                .min(max_limit.max(1)),
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Number of pages needed for `total` matches.
    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_missing_or_bad_values() {
        let q = ListQuery::from_raw(None, None, None, DEFAULT_MAX_LIMIT);
        assert_eq!(q, ListQuery::default());

        let q = ListQuery::from_raw(Some("abc"), Some("0"), Some("   "), DEFAULT_MAX_LIMIT);
        assert_eq!(q, ListQuery::default());

        let q = ListQuery::from_raw(Some("-3"), Some("-1"), None, DEFAULT_MAX_LIMIT);
        assert_eq!(q, ListQuery::default());
    }

    #[test]
    fn limit_is_capped() {
        let q = ListQuery::from_raw(Some("2"), Some("5000"), None, 100);
        assert_eq!(q.page, 2);
        assert_eq!(q.limit, 100);
    }

    #[test]
    fn search_is_trimmed() {
        let q = ListQuery::from_raw(None, None, Some("  Smith "), 100);
        assert_eq!(q.search.as_deref(), Some("Smith"));
    }

    #[test]
    fn offset_and_pages() {
        let q = ListQuery::from_raw(Some("3"), Some("10"), None, 100);
        assert_eq!(q.offset(), 20);
        assert_eq!(q.pages(15), 2);
        assert_eq!(q.pages(20), 2);
        assert_eq!(q.pages(21), 3);
        assert_eq!(q.pages(0), 0);
    }
}
