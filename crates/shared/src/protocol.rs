use serde::{Deserialize, Serialize};

use crate::domain::Contact;

/// Header carrying the size of the (filtered) collection on list responses.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
    pub query: Option<String>,
}

impl PageRequest {
    /// Zero page numbers and sizes are clamped to 1; a blank query means no filter.
    pub fn new(page: u32, page_size: u32, query: Option<&str>) -> Self {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            query,
        }
    }

    /// Query string pairs in the backend's `_page`/`_limit`/`q` convention.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("_page", self.page.to_string()),
            ("_limit", self.page_size.to_string()),
        ];
        if let Some(query) = &self.query {
            pairs.push(("q", query.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<Contact>,
    pub total: u64,
}

impl PageResult {
    pub fn new(items: Vec<Contact>, total: u64) -> Self {
        Self { items, total }
    }
}

pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}
