// Library for testable modules
pub mod api;
pub mod async_task;
pub mod boundary;
pub mod charts;
pub mod classify;
pub mod config;
pub mod debounce;
pub mod entity;
pub mod error;
pub mod export;
pub mod ids;
pub mod key_handler;
pub mod logging;
pub mod notifications;
pub mod pages;
pub mod render_context;
pub mod screen;
pub mod shortcuts;
pub mod state;
pub mod status;
pub mod ui_utils;

use entity::Entity;

// Re-export main types used in tests
pub use api::{ApiClient, ListPage, ListQuery};
pub use classify::{parse_api_error, should_logout, user_message, ClassifiedError, ErrorKind};
pub use config::AppConfig;
pub use error::{ConfigError, ExportError};

/// Route of the dashboard page.
pub const DASHBOARD_ROUTE: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppMode {
    Login,
    Dashboard,
    List(Entity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Menu,
    View,
}

impl AppMode {
    /// Number of entries in the side menu: the dashboard plus every entity.
    pub const MENU_LEN: usize = Entity::ALL.len() + 1;

    /// Next view in menu order, wrapping around. Login has no successor.
    pub fn next(self) -> Self {
        match self {
            AppMode::Login => AppMode::Login,
            other => AppMode::from_menu_index((other.menu_index() + 1) % Self::MENU_LEN),
        }
    }

    pub fn menu_index(self) -> usize {
        match self {
            AppMode::Login | AppMode::Dashboard => 0,
            AppMode::List(entity) => Entity::ALL
                .iter()
                .position(|e| *e == entity)
                .map_or(0, |i| i + 1),
        }
    }

    pub fn from_menu_index(idx: usize) -> Self {
        match idx {
            0 => AppMode::Dashboard,
            i => Entity::ALL
                .get(i - 1)
                .copied()
                .map_or(AppMode::Dashboard, AppMode::List),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AppMode::Login => "Sign in",
            AppMode::Dashboard => "Dashboard",
            AppMode::List(entity) => entity.title(),
        }
    }

    /// Resolves a console route such as `/orders`.
    pub fn from_route(route: &str) -> Option<Self> {
        if route == DASHBOARD_ROUTE {
            Some(AppMode::Dashboard)
        } else {
            Entity::from_route(route).map(AppMode::List)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_wraps_through_menu() {
        let mut mode = AppMode::Dashboard;
        for _ in 0..AppMode::MENU_LEN {
            mode = mode.next();
        }
        assert_eq!(mode, AppMode::Dashboard);
        assert_eq!(AppMode::Dashboard.next(), AppMode::List(Entity::Users));
        assert_eq!(AppMode::List(Entity::Sessions).next(), AppMode::Dashboard);
        assert_eq!(AppMode::Login.next(), AppMode::Login);
    }

    #[test]
    fn test_menu_index_round_trip() {
        for idx in 0..AppMode::MENU_LEN {
            assert_eq!(AppMode::from_menu_index(idx).menu_index(), idx);
        }
    }

    #[test]
    fn test_from_route() {
        assert_eq!(AppMode::from_route("/dashboard"), Some(AppMode::Dashboard));
        assert_eq!(
            AppMode::from_route("/activity-logs"),
            Some(AppMode::List(Entity::ActivityLogs))
        );
        assert_eq!(AppMode::from_route("/nowhere"), None);
    }

    #[test]
    fn test_every_chord_route_resolves() {
        for (_, route) in shortcuts::NAVIGATION_ROUTES {
            assert!(AppMode::from_route(route).is_some(), "{}", route);
        }
    }
}
