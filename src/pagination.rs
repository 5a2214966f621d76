// 📄 Pagination - page arithmetic for member listings

use serde::Serialize;

pub const DEFAULT_PER_PAGE: u32 = 18;

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Out-of-range values are clamped to page 1 / one item per page
    pub fn new(page: Option<u32>, per_page: u32) -> Self {
        PageRequest {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, DEFAULT_PER_PAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let per_page = u64::from(request.per_page);
        let total_pages = u32::try_from(total.div_ceil(per_page)).unwrap_or(u32::MAX);

        Page {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages,
        }
    }

    /// Slice an already-materialized result set
    pub fn from_items(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let items = all
            .into_iter()
            .skip(offset)
            .take(request.per_page as usize)
            .collect();

        Page::new(items, request, total)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_clamps() {
        let req = PageRequest::new(Some(0), 0);
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 1);
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(Some(3), 18);
        assert_eq!(req.offset(), 36);
        assert_eq!(req.limit(), 18);
    }

    #[test]
    fn test_from_items_slices_and_counts() {
        let all: Vec<u32> = (1..=40).collect();

        let first = Page::from_items(all.clone(), PageRequest::new(Some(1), 18));
        assert_eq!(first.items.len(), 18);
        assert_eq!(first.total, 40);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next());

        let last = Page::from_items(all.clone(), PageRequest::new(Some(3), 18));
        assert_eq!(last.items, vec![37, 38, 39, 40]);
        assert!(!last.has_next());

        let beyond = Page::from_items(all, PageRequest::new(Some(9), 18));
        assert!(beyond.items.is_empty());
    }

    #[test]
    fn test_empty_page() {
        let page: Page<u32> = Page::from_items(vec![], PageRequest::default());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.per_page, DEFAULT_PER_PAGE);
        assert!(!page.has_next());
    }
}
