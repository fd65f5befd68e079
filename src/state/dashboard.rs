//! Dashboard page state.
//!
//! Holds the entity launcher selection and the orders-by-status breakdown.

use crate::api::ListQuery;
use crate::charts::{status_breakdown, StatusCount};
use crate::classify::ClassifiedError;
use crate::entity::Entity;
use crate::export::Record;

/// Number of recent orders sampled for the status chart.
pub const ORDER_SAMPLE_SIZE: usize = 100;
const PANE_MIN: u16 = 10;
const PANE_MAX: u16 = 90;

/// State for the Dashboard view.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Highlighted entry in the entity launcher.
    pub selected_index: usize,
    /// Width of the launcher pane (percentage).
    pub pane_ratio: u16,
    /// Orders grouped by status, in first-seen order.
    pub order_counts: Vec<StatusCount>,
    /// Orders the breakdown was computed from.
    pub sample_size: usize,
    /// Total orders reported by the API.
    pub order_total: usize,
    pub loading: bool,
    pub last_error: Option<ClassifiedError>,
}

impl DashboardState {
    /// Creates a new dashboard state with default values.
    pub fn new() -> Self {
        Self {
            pane_ratio: 30,
            ..Default::default()
        }
    }

    /// Moves the launcher highlight up.
    ///
    /// Returns `true` if the selection changed.
    pub fn navigate_up(&mut self) -> bool {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            true
        } else {
            false
        }
    }

    /// Moves the launcher highlight down.
    ///
    /// Returns `true` if the selection changed.
    pub fn navigate_down(&mut self) -> bool {
        if self.selected_index + 1 < Entity::ALL.len() {
            self.selected_index += 1;
            true
        } else {
            false
        }
    }

    pub fn selected_entity(&self) -> Entity {
        Entity::ALL[self.selected_index.min(Entity::ALL.len() - 1)]
    }

    /// Resizes the launcher pane, keeping both panes visible.
    pub fn adjust_pane_ratio(&mut self, delta: i16) -> u16 {
        let ratio = (self.pane_ratio as i16 + delta).clamp(PANE_MIN as i16, PANE_MAX as i16);
        self.pane_ratio = ratio as u16;
        self.pane_ratio
    }

    /// Marks the chart as loading and returns the sample request for it.
    pub fn begin_fetch(&mut self) -> ListQuery {
        self.loading = true;
        ListQuery {
            page: 1,
            limit: ORDER_SAMPLE_SIZE,
            filters: Vec::new(),
        }
    }

    /// Recomputes the status chart from a page of orders.
    pub fn apply_orders(&mut self, orders: &[Record], total: usize) {
        self.order_counts = status_breakdown(orders, "status");
        self.sample_size = orders.len();
        self.order_total = total;
        self.loading = false;
        self.last_error = None;
    }

    pub fn apply_error(&mut self, error: ClassifiedError) {
        self.loading = false;
        self.last_error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_begin_fetch_requests_order_sample() {
        let mut state = DashboardState::new();
        let query = state.begin_fetch();
        assert!(state.loading);
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, crate::state::ORDER_SAMPLE_SIZE);
        assert!(query.filters.is_empty());
    }

    #[test]
    fn test_new_default_values() {
        let state = DashboardState::new();
        assert_eq!(state.selected_index, 0);
        assert_eq!(state.pane_ratio, 30);
        assert!(state.order_counts.is_empty());
    }

    #[test]
    fn test_navigate_up_at_top() {
        let mut state = DashboardState::new();
        assert!(!state.navigate_up());
        assert_eq!(state.selected_index, 0);
    }

    #[test]
    fn test_navigate_down_stops_at_last_entity() {
        let mut state = DashboardState {
            selected_index: Entity::ALL.len() - 2,
            ..Default::default()
        };
        assert!(state.navigate_down());
        assert!(!state.navigate_down());
        assert_eq!(state.selected_entity(), Entity::ALL[Entity::ALL.len() - 1]);
    }

    #[test]
    fn test_adjust_pane_ratio_clamps() {
        let mut state = DashboardState {
            pane_ratio: 85,
            ..Default::default()
        };
        assert_eq!(state.adjust_pane_ratio(10), 90);
        state.pane_ratio = 15;
        assert_eq!(state.adjust_pane_ratio(-10), 10);
    }

    #[test]
    fn test_apply_orders() {
        let mut state = DashboardState::new();
        state.loading = true;
        let orders: Vec<Record> = [
            json!({"id": "o1", "status": "paid"}),
            json!({"id": "o2", "status": "pending"}),
            json!({"id": "o3", "status": "paid"}),
        ]
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();
        state.apply_orders(&orders, 57);
        assert!(!state.loading);
        assert_eq!(state.sample_size, 3);
        assert_eq!(state.order_total, 57);
        assert_eq!(state.order_counts[0].status, "paid");
        assert_eq!(state.order_counts[0].count, 2);
    }
}
