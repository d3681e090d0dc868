//! Paged response envelope used by the platform's list endpoints.

use serde::{Deserialize, Serialize};

/// One page of results plus paging metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Total number of pages for the query.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of matching elements.
    #[serde(default)]
    pub total_elements: u64,
    /// Whether another page follows this one.
    #[serde(default)]
    pub has_next: bool,
}

impl<T> PageData<T> {
    /// An empty page, used by queries that degrade instead of failing.
    pub const fn empty() -> Self {
        Self {
            data: Vec::new(),
            total_pages: 0,
            total_elements: 0,
            has_next: false,
        }
    }
}
