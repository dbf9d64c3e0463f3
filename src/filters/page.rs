/// Pagination of one table. The page size is fixed for the table's
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    page: u64,
    rows_per_page: u64,
}

impl PageState {
    pub fn new(rows_per_page: u64) -> Self {
        Self {
            page: 0,
            rows_per_page: rows_per_page.max(1),
        }
    }

    /// Zero-based page index.
    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn rows_per_page(&self) -> u64 {
        self.rows_per_page
    }

    pub fn skip(&self) -> u64 {
        self.page.saturating_mul(self.rows_per_page)
    }

    pub fn take(&self) -> u64 {
        self.rows_per_page
    }

    pub fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.rows_per_page)
    }

    /// Advance if another page exists.
    pub fn next(&mut self, total_items: u64) -> bool {
        if self.page.saturating_add(1) < self.total_pages(total_items) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page`, capped at the last index whose offset fits in `u64`.
    pub fn go_to(&mut self, page: u64) {
        self.page = page.min(self.max_page());
    }

    fn max_page(&self) -> u64 {
        u64::MAX / self.rows_per_page
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// Pull the index back onto the last page after the total shrank.
    pub fn clamp(&mut self, total_items: u64) -> bool {
        let last = self.total_pages(total_items).saturating_sub(1);
        if self.page > last {
            self.page = last;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_page_of_twelve() {
        let mut page = PageState::new(5);
        page.go_to(2);
        assert_eq!(page.skip(), 10);
        assert_eq!(page.take(), 5);
        assert_eq!(page.total_pages(12), 3);
        assert!(!page.next(12));
    }

    #[test]
    fn navigation_bounds() {
        let mut page = PageState::new(5);
        assert!(!page.prev());
        assert!(page.next(6));
        assert!(!page.next(6));
        assert!(page.prev());
        assert_eq!(page.total_pages(0), 0);
        assert!(!page.next(0));
    }

    #[test]
    fn clamp_after_shrink() {
        let mut page = PageState::new(5);
        page.go_to(2);
        assert!(page.clamp(10));
        assert_eq!(page.page(), 1);
        assert!(!page.clamp(10));
        assert!(page.clamp(0));
        assert_eq!(page.page(), 0);
    }

    #[test]
    fn huge_page_index_does_not_overflow() {
        let mut page = PageState::new(5);
        page.go_to(u64::MAX);
        assert_eq!(page.page(), u64::MAX / 5);
        assert_eq!(page.skip(), u64::MAX / 5 * 5);
        assert!(!page.next(u64::MAX));

        let mut single = PageState::new(1);
        single.go_to(u64::MAX);
        assert_eq!(single.skip(), u64::MAX);
        assert!(!single.next(u64::MAX));
        assert!(single.prev());
    }
}
