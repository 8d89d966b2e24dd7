use serde::Serialize;

/// Rows per page for provider listings and per-source match tables.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Position of one page within a paginated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total_items: usize,
}

impl PageInfo {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// One-based row number of the first row on this page.
    pub fn first_row_number(&self) -> usize {
        (self.page - 1) * self.page_size + 1
    }
}

/// Offset-slicing paginator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.page_size)
    }

    /// Clamps `page` into `1..=total_pages` (page 1 for an empty list).
    pub fn clamp(&self, page: usize, total_items: usize) -> usize {
        page.clamp(1, self.total_pages(total_items).max(1))
    }

    pub fn info(&self, page: usize, total_items: usize) -> PageInfo {
        PageInfo {
            page: self.clamp(page, total_items),
            total_pages: self.total_pages(total_items),
            page_size: self.page_size,
            total_items,
        }
    }

    pub fn slice<'a, T>(&self, items: &'a [T], page: usize) -> (&'a [T], PageInfo) {
        let info = self.info(page, items.len());
        let start = (info.page - 1) * self.page_size;
        let end = (start + self.page_size).min(items.len());
        (&items[start.min(items.len())..end], info)
    }
}
