//! State for an entity list view.
//!
//! Combines pagination, bulk selection and filters with the row cursor, the
//! search input and the rows of the last fetch. Mutators that change what the
//! server should return report `true` so the caller can schedule a fetch.

use std::time::{Duration, Instant};

use crate::api::{ListPage, ListQuery};
use crate::classify::ClassifiedError;
use crate::debounce::Debouncer;
use crate::entity::{record_id, Entity};
use crate::export::Record;
use crate::shortcuts::InputFocus;
use crate::ui_utils::scrolled_offset;

use super::{FilterState, PaginationState, SelectionState};

/// Page sizes offered by `+`/`-`.
pub const PAGE_SIZES: &[usize] = &[10, 25, 50, 100];

/// Rows kept visible around the cursor.
const WINDOW_SIZE: usize = 20;

#[derive(Debug, Clone)]
pub struct ListViewState {
    pub entity: Entity,
    pub pagination: PaginationState,
    pub selection: SelectionState,
    pub filters: FilterState,
    /// Rows of the current page as returned by the API.
    pub records: Vec<Record>,
    /// Cursor row within `records`.
    pub selected_index: usize,
    pub scroll: usize,
    pub loading: bool,
    pub last_error: Option<ClassifiedError>,
    /// Search input is focused.
    pub search_active: bool,
    /// Text typed into the search box, applied after the debounce delay.
    pub search_input: String,
    /// Bulk delete is awaiting confirmation.
    pub confirm_delete: bool,
    search_debounce: Debouncer<String>,
}

impl ListViewState {
    pub fn new(entity: Entity, page_size: usize, search_delay: Duration) -> Self {
        Self {
            entity,
            pagination: PaginationState::new(page_size),
            selection: SelectionState::new(),
            filters: FilterState::new(),
            records: Vec::new(),
            selected_index: 0,
            scroll: 0,
            loading: false,
            last_error: None,
            search_active: false,
            search_input: String::new(),
            confirm_delete: false,
            search_debounce: Debouncer::new(search_delay),
        }
    }

    /// Request parameters for the current page and filters.
    pub fn query(&self) -> ListQuery {
        ListQuery {
            page: self.pagination.page,
            limit: self.pagination.limit,
            filters: self.filters.to_query_pairs(),
        }
    }

    /// Marks a fetch as started and returns its parameters.
    pub fn begin_fetch(&mut self) -> ListQuery {
        self.loading = true;
        self.query()
    }

    /// Installs a fetched page.
    pub fn apply_page(&mut self, page: ListPage) {
        self.pagination.apply_meta(&page.meta);
        self.records = page.records;
        self.loading = false;
        self.last_error = None;
        self.clamp_cursor();
    }

    pub fn apply_error(&mut self, error: ClassifiedError) {
        self.loading = false;
        self.last_error = Some(error);
    }

    pub fn current_record(&self) -> Option<&Record> {
        self.records.get(self.selected_index)
    }

    pub fn navigate_up(&mut self) -> bool {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.scroll = scrolled_offset(self.selected_index, self.scroll, WINDOW_SIZE);
            true
        } else {
            false
        }
    }

    pub fn navigate_down(&mut self) -> bool {
        if self.selected_index + 1 < self.records.len() {
            self.selected_index += 1;
            self.scroll = scrolled_offset(self.selected_index, self.scroll, WINDOW_SIZE);
            true
        } else {
            false
        }
    }

    fn clamp_cursor(&mut self) {
        self.selected_index = self.selected_index.min(self.records.len().saturating_sub(1));
        self.scroll = self.scroll.min(self.selected_index);
    }

    /// The rows on screen are about to change: the cursor returns to the
    /// top and ticks from the old page are dropped.
    fn leave_page(&mut self) {
        self.selected_index = 0;
        self.scroll = 0;
        self.selection.clear_selection();
        self.confirm_delete = false;
    }

    /// Toggles the row under the cursor. Returns `false` when there is none.
    pub fn toggle_current(&mut self) -> bool {
        match self.current_record().map(record_id) {
            Some(id) if !id.is_empty() => {
                self.selection.toggle(&id);
                true
            }
            _ => false,
        }
    }

    fn page_ids(&self) -> Vec<String> {
        self.records.iter().map(record_id).collect()
    }

    pub fn toggle_all(&mut self) {
        let ids = self.page_ids();
        self.selection.toggle_all(&ids, String::as_str);
    }

    pub fn all_selected(&self) -> bool {
        let ids = self.page_ids();
        self.selection.is_all_selected(&ids, String::as_str)
    }

    pub fn next_page(&mut self) -> bool {
        self.page_changed(|p| p.next_page())
    }

    pub fn prev_page(&mut self) -> bool {
        self.page_changed(|p| p.prev_page())
    }

    pub fn first_page(&mut self) -> bool {
        self.page_changed(|p| p.go_to_first_page())
    }

    pub fn last_page(&mut self) -> bool {
        self.page_changed(|p| p.go_to_last_page())
    }

    fn page_changed<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut PaginationState) -> bool,
    {
        let changed = f(&mut self.pagination);
        if changed {
            self.leave_page();
        }
        changed
    }

    /// Steps through `PAGE_SIZES`. `grow` picks the next larger size.
    pub fn step_page_size(&mut self, grow: bool) -> bool {
        let current = self.pagination.limit;
        let next = if grow {
            PAGE_SIZES.iter().copied().find(|&s| s > current)
        } else {
            PAGE_SIZES.iter().rev().copied().find(|&s| s < current)
        };
        match next {
            Some(size) => self.page_changed(|p| p.set_limit(size)),
            None => false,
        }
    }

    /// Moves the status filter to the next value for this entity.
    pub fn cycle_status(&mut self) -> String {
        let status = self.filters.cycle_status(self.entity.statuses()).to_string();
        self.pagination.set_page(1);
        self.leave_page();
        status
    }

    /// Clears filters and search. Returns `true` if anything was active.
    pub fn reset_filters(&mut self) -> bool {
        let active = self.filters.has_active_filters();
        self.filters.reset_filters();
        self.search_input.clear();
        self.search_debounce.cancel();
        if active {
            self.pagination.set_page(1);
            self.leave_page();
        }
        active
    }

    pub fn input_focus(&self) -> InputFocus {
        if self.search_active {
            InputFocus::TextInput {
                empty: self.search_input.is_empty(),
            }
        } else {
            InputFocus::None
        }
    }

    pub fn start_search(&mut self) {
        self.search_active = true;
        self.search_input = self.filters.search().to_string();
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        self.search_input.push(c);
        self.search_debounce.push(self.search_input.clone(), now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        if self.search_input.pop().is_some() {
            self.search_debounce.push(self.search_input.clone(), now);
        }
    }

    /// Applies debounced search text. Returns `true` when the filter changed.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.search_debounce.poll(now) {
            Some(text) => self.apply_search(text),
            None => false,
        }
    }

    /// Enter: applies the typed text now and leaves the input.
    pub fn commit_search(&mut self) -> bool {
        self.search_active = false;
        self.search_debounce.cancel();
        let text = self.search_input.clone();
        self.apply_search(text)
    }

    /// Esc: leaves the input, dropping text that has not been applied yet.
    pub fn cancel_search(&mut self) {
        self.search_active = false;
        self.search_debounce.cancel();
        self.search_input = self.filters.search().to_string();
    }

    fn apply_search(&mut self, text: String) -> bool {
        let text = text.trim().to_string();
        if text == self.filters.search() {
            return false;
        }
        self.filters.set_search(text);
        self.pagination.set_page(1);
        self.leave_page();
        true
    }

    /// Ids queued for bulk deletion.
    pub fn selected_ids(&self) -> Vec<String> {
        self.selection.selected_ids()
    }

    /// Called after a successful delete.
    pub fn after_delete(&mut self) {
        self.selection.clear_selection();
        self.confirm_delete = false;
    }
}
