use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// One-based page request, normalized so that `page >= 1` and `1 <= limit <= MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(page: Option<usize>, limit: Option<usize>, default_limit: usize) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(default_limit)
            .clamp(1, MAX_PAGE_SIZE);
        Self { page, limit }
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Slice one page out of an already filtered and ordered collection.
    pub fn apply<T>(&self, items: Vec<T>) -> Page<T> {
        let total_count = items.len();
        let items = items
            .into_iter()
            .skip(self.offset())
            .take(self.limit)
            .collect();

        Page {
            items,
            meta: PageMeta {
                current_page: self.page,
                total_pages: total_count.div_ceil(self.limit),
                total_count,
                limit: self.limit,
            },
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub limit: usize,
}
