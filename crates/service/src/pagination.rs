//! Pagination utilities for service layer
//!
//! Turns the optional `pageNumber`/`pageSize` query values into a concrete
//! skip/take window.

/// Page size defaults and the optional cap, usually taken from config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListLimits {
    pub default_page_size: u32,
    pub max_page_size: Option<u32>,
}

impl Default for ListLimits {
    fn default() -> Self { Self { default_page_size: 10, max_page_size: None } }
}

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page_number: u32,
    /// items per page
    pub page_size: u32,
}

impl Pagination {
    /// Fill in missing values from `limits`.
    pub fn resolve(page_number: Option<u32>, page_size: Option<u32>, limits: ListLimits) -> Self {
        Self {
            page_number: page_number.unwrap_or(1),
            page_size: page_size.unwrap_or(limits.default_page_size),
        }
    }

    /// Page 0 counts as page 1 and the size is clamped to `max_page_size`
    /// when one is set. A size of 0 yields an empty window.
    pub fn normalize(self, max_page_size: Option<u32>) -> (usize, usize) {
        let page = self.page_number.max(1);
        let take = match max_page_size {
            Some(max) => self.page_size.min(max),
            None => self.page_size,
        } as usize;
        let skip = ((page - 1) as usize).saturating_mul(take);
        (skip, take)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page_number: 1, page_size: 10 } }
}
