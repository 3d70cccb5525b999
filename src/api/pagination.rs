//! Page-number pagination envelope for list endpoints.

use serde::Serialize;

use crate::error::ApiError;

/// A single page of results.
///
/// `next` and `previous` are 1-based page numbers, null at the edges.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    /// Total number of matching items across all pages.
    pub count: u64,
    /// Next page number, if any.
    pub next: Option<u32>,
    /// Previous page number, if any.
    pub previous: Option<u32>,
    /// Items on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build the envelope for an already-validated page.
    pub fn new(page: u32, count: u64, page_size: u32, results: Vec<T>) -> Self {
        let pages = total_pages(count, page_size);
        Self {
            count,
            next: (page < pages).then(|| page + 1),
            previous: (page > 1).then(|| page - 1),
            results,
        }
    }
}

/// Number of pages needed for `count` items. An empty set still has one
/// (empty) first page.
pub fn total_pages(count: u64, page_size: u32) -> u32 {
    count
        .div_ceil(u64::from(page_size))
        .clamp(1, u64::from(u32::MAX)) as u32
}

/// Validate a 1-based page number against the item count.
pub fn check_page(page: u32, count: u64, page_size: u32) -> Result<(), ApiError> {
    if page == 0 || page > total_pages(count, page_size) {
        return Err(ApiError::InvalidPage);
    }
    Ok(())
}

/// Offset of the first item on a validated page.
pub fn page_offset(page: u32, page_size: u32) -> u64 {
    u64::from(page - 1) * u64::from(page_size)
}
