use crate::state::{DashboardState, ListViewState, LoginState};
use crate::status::StatusMessage;
use crate::{AppMode, Focus};

/// Read-only view of the app handed to `Screen::render`, reducing parameter
/// proliferation
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    // App state
    pub mode: AppMode,
    pub focus: Focus,
    pub show_help: bool,
    pub menu_selected_index: usize,
    pub status: &'a StatusMessage,
    /// `g` pressed, waiting for the second key.
    pub chord_pending: bool,
    pub api_base_url: &'a str,

    // Page state
    pub dashboard: &'a DashboardState,
    pub login: &'a LoginState,
    /// State of the active list view, when one is shown.
    pub list: Option<&'a ListViewState>,
}

impl<'a> RenderContext<'a> {
    /// Text for the right-hand side of the status bar.
    pub fn key_hint(&self) -> &'static str {
        if self.chord_pending {
            return "g … waiting for route key";
        }
        match (self.mode, self.focus) {
            (AppMode::Login, _) => "Enter: Sign in  Ctrl-C: Quit",
            (_, Focus::Menu) => "↑↓: Move  Enter: Open  Tab: Next view  ?: Help  q: Quit",
            (AppMode::Dashboard, Focus::View) => "g+key: Go to  r: Refresh  C: Clear cache  ?: Help",
            (AppMode::List(_), Focus::View) => match self.list {
                Some(list) if list.search_active => "Enter: Apply  Esc: Cancel",
                Some(list) if list.confirm_delete => "y: Delete  any other key: Cancel",
                _ => "/: Search  Space: Select  e/x: Export  D: Delete  ?: Help",
            },
        }
    }
}
