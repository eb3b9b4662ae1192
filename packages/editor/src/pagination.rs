//! Page size and 1-based page arithmetic over a filtered row list

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EditorError;

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Sizes offered by the page size control
pub const PAGE_SIZE_CHOICES: [PageSize; 5] = [
    PageSize::Fixed(10),
    PageSize::Fixed(20),
    PageSize::Fixed(50),
    PageSize::Fixed(100),
    PageSize::All,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PageSizeRepr", into = "PageSizeRepr")]
pub enum PageSize {
    Fixed(usize),
    All,
}

impl PageSize {
    /// Rows per page, `None` meaning everything on one page
    pub fn limit(self) -> Option<usize> {
        match self {
            PageSize::Fixed(n) => Some(n.max(1)),
            PageSize::All => None,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Fixed(DEFAULT_PAGE_SIZE)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Fixed(n) => write!(f, "{n}"),
            PageSize::All => f.write_str("all"),
        }
    }
}

impl FromStr for PageSize {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed == "-1" {
            return Ok(PageSize::All);
        }
        match trimmed.parse::<usize>() {
            Ok(n) if n > 0 => Ok(PageSize::Fixed(n)),
            _ => Err(EditorError::InvalidPageSize(s.to_string())),
        }
    }
}

/// Config files may say `"pageSize": 20` or `"pageSize": "all"`
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PageSizeRepr {
    Count(usize),
    Text(String),
}

impl TryFrom<PageSizeRepr> for PageSize {
    type Error = EditorError;

    fn try_from(repr: PageSizeRepr) -> Result<Self, Self::Error> {
        match repr {
            PageSizeRepr::Count(0) => Err(EditorError::InvalidPageSize("0".to_string())),
            PageSizeRepr::Count(n) => Ok(PageSize::Fixed(n)),
            PageSizeRepr::Text(text) => text.parse(),
        }
    }
}

impl From<PageSize> for PageSizeRepr {
    fn from(size: PageSize) -> Self {
        match size {
            PageSize::Fixed(n) => PageSizeRepr::Count(n),
            PageSize::All => PageSizeRepr::Text("all".to_string()),
        }
    }
}

/// Current page within a list whose length may change between calls.
///
/// The stored page is clamped against the list length whenever a range is
/// computed, so shrinking the list never yields an empty page past the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: PageSize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl Pager {
    pub fn new(page_size: PageSize) -> Self {
        Self { page: 1, page_size }
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Changing the size starts over at page 1
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page = 1;
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Current page for a list of `total` rows, 1-based
    pub fn page(&self, total: usize) -> usize {
        self.page.clamp(1, self.page_count(total))
    }

    pub fn page_count(&self, total: usize) -> usize {
        match self.page_size.limit() {
            Some(n) => total.div_ceil(n).max(1),
            None => 1,
        }
    }

    pub fn set_page(&mut self, page: usize, total: usize) {
        self.page = page.clamp(1, self.page_count(total));
    }

    pub fn next(&mut self, total: usize) {
        self.set_page(self.page(total) + 1, total);
    }

    pub fn previous(&mut self, total: usize) {
        self.set_page(self.page(total).saturating_sub(1), total);
    }

    /// Index range of the current page
    pub fn range(&self, total: usize) -> Range<usize> {
        match self.page_size.limit() {
            Some(n) => {
                let start = ((self.page(total) - 1) * n).min(total);
                start..(start + n).min(total)
            }
            None => 0..total,
        }
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }

    pub fn info(&self, total: usize) -> PageInfo {
        let range = self.range(total);
        PageInfo {
            page: self.page(total),
            page_count: self.page_count(total),
            first: if total == 0 { 0 } else { range.start + 1 },
            last: range.end,
            total,
        }
    }
}

/// Numbers behind "Showing X to Y of N results" and "Page p of P"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub page_count: usize,
    pub first: usize,
    pub last: usize,
    pub total: usize,
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} to {} of {} results (page {} of {})",
            self.first, self.last, self.total, self.page, self.page_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        let pager = Pager::new(PageSize::Fixed(50));
        assert_eq!(pager.page_count(0), 1);
        assert_eq!(pager.page_count(50), 1);
        assert_eq!(pager.page_count(51), 2);
        assert_eq!(Pager::new(PageSize::All).page_count(5000), 1);
    }

    #[test]
    fn test_set_page_clamps() {
        let mut pager = Pager::new(PageSize::Fixed(10));
        pager.set_page(7, 25);
        assert_eq!(pager.page(25), 3);
        pager.set_page(0, 25);
        assert_eq!(pager.page(25), 1);
    }

    #[test]
    fn test_range_clamps_after_list_shrinks() {
        let mut pager = Pager::new(PageSize::Fixed(10));
        pager.set_page(3, 25);
        assert_eq!(pager.range(25), 20..25);
        assert_eq!(pager.range(12), 10..12);
        assert_eq!(pager.range(0), 0..0);
    }

    #[test]
    fn test_next_and_previous_stop_at_bounds() {
        let mut pager = Pager::new(PageSize::Fixed(10));
        pager.previous(30);
        assert_eq!(pager.page(30), 1);
        pager.next(30);
        pager.next(30);
        pager.next(30);
        assert_eq!(pager.page(30), 3);
    }

    #[test]
    fn test_page_info_text() {
        let mut pager = Pager::new(PageSize::Fixed(50));
        pager.set_page(2, 120);
        assert_eq!(
            pager.info(120).to_string(),
            "Showing 51 to 100 of 120 results (page 2 of 3)"
        );
        assert_eq!(
            pager.info(0).to_string(),
            "Showing 0 to 0 of 0 results (page 1 of 1)"
        );
    }

    #[test]
    fn test_page_size_parsing() {
        assert_eq!("all".parse::<PageSize>().unwrap(), PageSize::All);
        assert_eq!("-1".parse::<PageSize>().unwrap(), PageSize::All);
        assert_eq!("20".parse::<PageSize>().unwrap(), PageSize::Fixed(20));
        assert!("0".parse::<PageSize>().is_err());
        assert!("ten".parse::<PageSize>().is_err());
    }

    #[test]
    fn test_page_size_serde_accepts_number_or_keyword() {
        let fixed: PageSize = serde_json::from_str("20").unwrap();
        let all: PageSize = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(fixed, PageSize::Fixed(20));
        assert_eq!(all, PageSize::All);
        assert_eq!(serde_json::to_string(&PageSize::All).unwrap(), "\"all\"");
    }
}
