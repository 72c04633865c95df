//! Page-number pagination over search results.
//!
//! Pagination never fails: a page number that is not an integer or is below
//! one resolves to the first page, and a page number beyond the last page
//! resolves to the last page.

use serde::{Deserialize, Serialize};

use super::document::SearchDocument;

/// Page size used when a caller does not give one.
pub const DEFAULT_PAGE_SIZE: u64 = 3;

/// A requested page number, possibly malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageNumber {
    /// An integer page number (1-indexed; may be out of range).
    Number(i64),
    /// Input that is not an integer.
    Invalid(String),
}

impl Default for PageNumber {
    fn default() -> Self {
        PageNumber::Number(1)
    }
}

impl From<i64> for PageNumber {
    fn from(n: i64) -> Self {
        PageNumber::Number(n)
    }
}

impl From<i32> for PageNumber {
    fn from(n: i32) -> Self {
        PageNumber::Number(i64::from(n))
    }
}

impl From<u32> for PageNumber {
    fn from(n: u32) -> Self {
        PageNumber::Number(i64::from(n))
    }
}

impl From<u64> for PageNumber {
    fn from(n: u64) -> Self {
        PageNumber::Number(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<&str> for PageNumber {
    fn from(s: &str) -> Self {
        match s.trim().parse::<i64>() {
            Ok(n) => PageNumber::Number(n),
            Err(_) => PageNumber::Invalid(s.to_string()),
        }
    }
}

impl From<Option<i64>> for PageNumber {
    fn from(n: Option<i64>) -> Self {
        n.map(PageNumber::Number).unwrap_or_default()
    }
}

/// Page arithmetic for a result set of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    total: u64,
    page_size: u64,
}

impl Paginator {
    /// Creates a paginator; a zero page size is treated as one.
    pub fn new(total: u64, page_size: u64) -> Self {
        Self {
            total,
            page_size: page_size.max(1),
        }
    }

    /// Total number of results.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of results per page.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of pages; an empty result set still has one (empty) page.
    pub fn num_pages(&self) -> u64 {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.page_size)
        }
    }

    /// Resolves a requested page number to a valid one.
    pub fn clamp(&self, page: &PageNumber) -> u64 {
        match page {
            PageNumber::Invalid(_) => 1,
            PageNumber::Number(n) if *n < 1 => 1,
            PageNumber::Number(n) => (*n as u64).min(self.num_pages()),
        }
    }

    /// Returns the `(from, size)` window of a valid page.
    pub fn window(&self, page: u64) -> (u64, u64) {
        let from = (page.max(1) - 1) * self.page_size;
        let size = self.page_size.min(self.total.saturating_sub(from));
        (from, size)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    /// Documents on this page.
    pub items: Vec<SearchDocument>,

    /// The 1-indexed page number actually served.
    pub number: u64,

    /// Pagination of the result set the page belongs to.
    pub paginator: Paginator,
}

impl ResultPage {
    /// Number of documents on the page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the page holds no documents.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of results across all pages.
    pub fn total(&self) -> u64 {
        self.paginator.total()
    }

    /// Number of pages.
    pub fn num_pages(&self) -> u64 {
        self.paginator.num_pages()
    }

    /// Returns true if a later page exists.
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    /// Returns true if an earlier page exists.
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// 1-based position of the first item in the whole result set
    /// (0 when the result set is empty).
    pub fn start_index(&self) -> u64 {
        if self.total() == 0 {
            0
        } else {
            self.paginator.window(self.number).0 + 1
        }
    }

    /// 1-based position of the last item in the whole result set.
    pub fn end_index(&self) -> u64 {
        let (from, size) = self.paginator.window(self.number);
        from + size
    }

    /// Iterates the documents on the page.
    pub fn iter(&self) -> std::slice::Iter<'_, SearchDocument> {
        self.items.iter()
    }
}

impl IntoIterator for ResultPage {
    type Item = SearchDocument;
    type IntoIter = std::vec::IntoIter<SearchDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_pages() {
        assert_eq!(Paginator::new(7, 3).num_pages(), 3);
        assert_eq!(Paginator::new(6, 3).num_pages(), 2);
        assert_eq!(Paginator::new(0, 3).num_pages(), 1);
        assert_eq!(Paginator::new(5, 0).page_size(), 1);
    }

    #[test]
    fn test_clamp() {
        let paginator = Paginator::new(7, 3);
        assert_eq!(paginator.clamp(&PageNumber::from(1)), 1);
        assert_eq!(paginator.clamp(&PageNumber::from(3)), 3);
        assert_eq!(paginator.clamp(&PageNumber::from(99)), 3);
        assert_eq!(paginator.clamp(&PageNumber::from(0)), 1);
        assert_eq!(paginator.clamp(&PageNumber::from(-4)), 1);
        assert_eq!(paginator.clamp(&PageNumber::from("two")), 1);
        assert_eq!(paginator.clamp(&PageNumber::from(" 2 ")), 2);
    }

    #[test]
    fn test_window() {
        let paginator = Paginator::new(7, 3);
        assert_eq!(paginator.window(1), (0, 3));
        assert_eq!(paginator.window(3), (6, 1));
        assert_eq!(Paginator::new(0, 3).window(1), (0, 0));
    }

    #[test]
    fn test_page_indices() {
        let page = ResultPage {
            items: Vec::new(),
            number: 3,
            paginator: Paginator::new(7, 3),
        };
        assert_eq!(page.start_index(), 7);
        assert_eq!(page.end_index(), 7);
        assert!(!page.has_next());
        assert!(page.has_previous());

        let empty = ResultPage {
            items: Vec::new(),
            number: 1,
            paginator: Paginator::new(0, 3),
        };
        assert_eq!(empty.start_index(), 0);
        assert_eq!(empty.end_index(), 0);
    }
}
