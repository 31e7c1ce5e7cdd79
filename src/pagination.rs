//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum transactions to return per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
        }
    }
}

/// A validated, one-based page request.
///
/// Both fields are always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// The one-based page number.
    pub page: u64,
    /// The maximum number of items on a page.
    pub limit: u64,
}

impl Pagination {
    /// Build a page request from the raw `page` and `limit` query parameters.
    ///
    /// Values that are missing, not an unsigned integer, or zero fall back to
    /// the defaults in `config`.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, config: &PaginationConfig) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(config.default_page.max(1)),
            limit: parse_positive(limit).unwrap_or(config.default_page_size.max(1)),
        }
    }

    /// The number of items that come before this page.
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// The number of pages needed to show `total_count` items.
    pub fn page_count(&self, total_count: u64) -> u64 {
        total_count.div_ceil(self.limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|&value| value > 0)
}
