use ratatui::{
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

use crate::shortcuts::chord_for_route;
use crate::ui_utils::{focused_block, list_state};
use crate::{AppMode, Focus, DASHBOARD_ROUTE};

/// Sidebar listing the dashboard and every entity view, with its `g` chord.
#[derive(Debug)]
pub struct MainMenu {
    entries: Vec<(AppMode, &'static str)>,
}

impl Default for MainMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl MainMenu {
    pub fn new() -> Self {
        let entries = (0..AppMode::MENU_LEN)
            .map(AppMode::from_menu_index)
            .map(|mode| {
                let route = match mode {
                    AppMode::List(entity) => entity.route(),
                    _ => DASHBOARD_ROUTE.to_string(),
                };
                (mode, chord_for_route(&route).unwrap_or(""))
            })
            .collect();
        Self { entries }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, selected_index: usize, focus: Focus) {
        let mut state = list_state(selected_index, self.entries.len());
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|(mode, chord)| {
                ListItem::new(Line::from(vec![
                    Span::raw(mode.title()),
                    Span::styled(format!(" {}", chord), Style::new().dark_gray()),
                ]))
            })
            .collect();

        frame.render_stateful_widget(
            List::new(items)
                .block(focused_block("Menu", focus == Focus::Menu))
                .highlight_style(Style::new().reversed())
                .highlight_symbol("> "),
            area,
            &mut state,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    #[test]
    fn test_menu_lists_every_view_with_chord() {
        let menu = MainMenu::new();
        assert_eq!(menu.entries.len(), AppMode::MENU_LEN);
        assert_eq!(menu.entries[0].0, AppMode::Dashboard);
        assert_eq!(menu.entries[1].0, AppMode::List(Entity::ALL[0]));
        assert!(menu.entries.iter().all(|(_, chord)| chord.starts_with("g ")));
    }
}
