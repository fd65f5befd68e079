//! Pagination state for list views.
//!
//! Tracks the current page, the page size and the server-reported total.
//! Every mutator returns `true` when the state changed so the owning view
//! knows it has to re-fetch.

use crate::api::ListMeta;

/// Page size used when a view does not ask for a specific one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page/limit/total triple for one list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    /// Current page, 1-based. Not clamped by `set_page`.
    pub page: usize,
    /// Items per page, always > 0.
    pub limit: usize,
    /// Authoritative item count reported by the API.
    pub total: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PaginationState {
    /// Creates pagination state on page 1 with the given page size.
    pub fn new(limit: usize) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            total: 0,
        }
    }

    /// Number of pages, never less than 1.
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.limit).max(1)
    }

    pub fn can_go_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    /// Sets the page directly.
    ///
    /// Out-of-range values are accepted on purpose: callers may jump before
    /// `total` is known.
    pub fn set_page(&mut self, page: usize) -> bool {
        let changed = self.page != page;
        self.page = page;
        changed
    }

    /// Records the item count from the latest fetch. Does not clamp `page`.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    /// Changes the page size and returns to page 1.
    pub fn set_limit(&mut self, limit: usize) -> bool {
        let limit = limit.max(1);
        let changed = self.limit != limit || self.page != 1;
        self.limit = limit;
        self.page = 1;
        changed
    }

    /// Moves forward one page, clamped to the last page.
    pub fn next_page(&mut self) -> bool {
        let target = (self.page + 1).min(self.total_pages());
        self.set_page(target)
    }

    /// Moves back one page, clamped to page 1.
    pub fn prev_page(&mut self) -> bool {
        let target = self.page.saturating_sub(1).max(1);
        self.set_page(target)
    }

    pub fn go_to_first_page(&mut self) -> bool {
        self.set_page(1)
    }

    pub fn go_to_last_page(&mut self) -> bool {
        self.set_page(self.total_pages())
    }

    /// Zero-based index of the first item on the current page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.limit
    }

    /// Syncs with the `meta` block of a paginated API response.
    pub fn apply_meta(&mut self, meta: &ListMeta) {
        if meta.limit > 0 {
            self.limit = meta.limit;
        }
        if meta.page > 0 {
            self.page = meta.page;
        }
        self.total = meta.total;
    }

    /// Human readable range, e.g. "Showing 11-20 of 45".
    pub fn range_label(&self) -> String {
        if self.total == 0 {
            return "No results".to_string();
        }
        let first = (self.offset() + 1).min(self.total);
        let last = (self.offset() + self.limit).min(self.total);
        format!("Showing {}-{} of {}", first, last, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_defaults() {
        let state = PaginationState::new(10);
        assert_eq!(state.page, 1);
        assert_eq!(state.limit, 10);
        assert_eq!(state.total, 0);
        assert_eq!(state.total_pages(), 1);
        assert!(!state.can_go_next());
        assert!(!state.can_go_prev());
    }

    #[test]
    fn test_zero_limit_is_bumped() {
        let state = PaginationState::new(0);
        assert_eq!(state.limit, 1);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let mut state = PaginationState::new(10);
        state.set_total(45);
        assert_eq!(state.total_pages(), 5);
        state.set_total(50);
        assert_eq!(state.total_pages(), 5);
        state.set_total(51);
        assert_eq!(state.total_pages(), 6);
    }

    #[test]
    fn test_next_page_stops_at_last() {
        let mut state = PaginationState::new(10);
        state.set_total(45);
        for _ in 0..4 {
            assert!(state.next_page());
        }
        assert_eq!(state.page, 5);
        assert!(!state.next_page());
        assert_eq!(state.page, 5);
    }

    #[test]
    fn test_prev_page_stops_at_first() {
        let mut state = PaginationState::new(10);
        state.set_total(45);
        assert!(!state.prev_page());
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_set_page_is_not_clamped() {
        let mut state = PaginationState::new(10);
        state.set_page(7);
        assert_eq!(state.page, 7);
        // Navigation pulls an out-of-range page back into bounds
        state.set_total(30);
        state.next_page();
        assert_eq!(state.page, 3);
    }

    #[test]
    fn test_set_total_does_not_clamp() {
        let mut state = PaginationState::new(10);
        state.set_total(100);
        state.go_to_last_page();
        assert_eq!(state.page, 10);
        state.set_total(5);
        assert_eq!(state.page, 10);
    }

    #[test]
    fn test_set_limit_resets_page() {
        let mut state = PaginationState::new(10);
        state.set_total(100);
        state.set_page(4);
        assert!(state.set_limit(25));
        assert_eq!(state.page, 1);
        assert_eq!(state.limit, 25);
        assert_eq!(state.total_pages(), 4);
    }

    #[test]
    fn test_first_and_last() {
        let mut state = PaginationState::new(20);
        state.set_total(95);
        assert!(state.go_to_last_page());
        assert_eq!(state.page, 5);
        assert!(state.can_go_prev());
        assert!(state.go_to_first_page());
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_apply_meta() {
        let mut state = PaginationState::new(10);
        state.apply_meta(&ListMeta {
            page: 3,
            limit: 25,
            total: 120,
            total_pages: 5,
        });
        assert_eq!(state.page, 3);
        assert_eq!(state.limit, 25);
        assert_eq!(state.total, 120);
        assert_eq!(state.offset(), 50);
    }

    #[test]
    fn test_range_label() {
        let mut state = PaginationState::new(10);
        assert_eq!(state.range_label(), "No results");
        state.set_total(45);
        state.set_page(5);
        assert_eq!(state.range_label(), "Showing 41-45 of 45");
    }

    proptest! {
        #[test]
        fn prop_page_stays_in_bounds(
            total in 0usize..10_000,
            limit in 1usize..200,
            moves in proptest::collection::vec(any::<bool>(), 0..64),
        ) {
            let mut state = PaginationState::new(limit);
            state.set_total(total);
            let expected_pages = total.div_ceil(limit).max(1);
            prop_assert_eq!(state.total_pages(), expected_pages);
            for forward in moves {
                if forward {
                    state.next_page();
                } else {
                    state.prev_page();
                }
                prop_assert!(state.page >= 1);
                prop_assert!(state.page <= state.total_pages());
            }
        }
    }
}
