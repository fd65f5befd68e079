//! Bulk selection state.
//!
//! Holds the set of row identifiers the user has ticked. "Select all" is
//! always relative to the rows currently on screen, never to a server total.

use std::collections::HashSet;

/// Set of selected identifiers for one list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: HashSet<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of a single id.
    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Selects every visible item, or clears everything if they already are.
    ///
    /// Selecting replaces the previous selection with exactly the ids of
    /// `items`, so ticks from an earlier page do not survive.
    pub fn toggle_all<T, F>(&mut self, items: &[T], get_id: F)
    where
        F: Fn(&T) -> &str,
    {
        if self.is_all_selected(items, &get_id) {
            self.selected.clear();
        } else {
            self.selected = items.iter().map(|item| get_id(item).to_string()).collect();
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// True when `items` is non-empty and every one of them is selected.
    pub fn is_all_selected<T, F>(&self, items: &[T], get_id: F) -> bool
    where
        F: Fn(&T) -> &str,
    {
        !items.is_empty() && items.iter().all(|item| self.selected.contains(get_id(item)))
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in sorted order.
    pub fn selected_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }
}
