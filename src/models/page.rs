//! Pagination types

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{book::Book, loan::LoanDetails};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Highest page whose offset still fits in an `i64`
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Zero-based page request (`?page=0&size=20`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageRequest {
    /// Page number, starting at 0
    #[serde(default)]
    pub page: i64,
    /// Page size (1..=100, default 20)
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::of(0, DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    pub fn of(page: i64, size: i64) -> Self {
        Self { page, size }
    }

    pub fn page(&self) -> i64 {
        self.page.clamp(0, MAX_PAGE)
    }

    pub fn size(&self) -> i64 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.page() * self.size()
    }
}

/// A page of results with the total count across all pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[aliases(BookPage = Page<Book>, LoanPage = Page<LoanDetails>)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub page: i64,
    pub size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        let size = request.size();
        Self {
            content,
            total_elements,
            page: request.page(),
            size,
            total_pages: (total_elements + size - 1) / size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_clamped() {
        let request = PageRequest::of(-3, 1000);
        assert_eq!(request.page(), 0);
        assert_eq!(request.size(), MAX_PAGE_SIZE);
        assert_eq!(PageRequest::of(2, 0).size(), 1);
        assert_eq!(PageRequest::of(2, 10).offset(), 20);
    }

    #[test]
    fn test_huge_page_does_not_overflow_offset() {
        let request = PageRequest::of(i64::MAX, 20);
        assert_eq!(request.page(), MAX_PAGE);
        assert_eq!(request.offset(), MAX_PAGE * 20);

        let widest = PageRequest::of(i64::MAX, i64::MAX);
        assert!(widest.offset() > 0);
    }

    #[test]
    fn test_total_pages() {
        let page = Page::new(vec![1, 2, 3], PageRequest::of(0, 10), 21);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.size, 10);

        let empty: Page<i32> = Page::new(vec![], PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 0);
    }
}
