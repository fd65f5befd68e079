use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};

use crate::shortcuts::{ShortcutBinding, ShortcutCategory, SHORTCUTS};

const KEY_WIDTH: usize = 14;

#[derive(Debug)]
pub struct HelpPage;

impl Default for HelpPage {
    fn default() -> Self {
        Self::new()
    }
}

/// Shortcut lines for one category, in table order.
pub fn section_lines(category: ShortcutCategory) -> Vec<Line<'static>> {
    SHORTCUTS
        .iter()
        .filter(|b| b.category == category)
        .map(binding_line)
        .collect()
}

fn binding_line(binding: &ShortcutBinding) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:<width$}", binding.keys, width = KEY_WIDTH),
            Style::new().bold().cyan(),
        ),
        Span::raw(binding.description),
    ])
}

impl HelpPage {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let area = area.centered(Constraint::Percentage(80), Constraint::Percentage(90));
        frame.render_widget(Clear, area);
        // Fill the overlay to avoid a transparent background bleeding through
        frame.render_widget(
            Block::bordered()
                .title("Keyboard shortcuts (Esc to close)")
                .style(Style::new().bg(Color::Black)),
            area,
        );

        let inner = area.inner(ratatui::layout::Margin::new(1, 1));
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(cols[1]);

        for (category, rect) in [
            (ShortcutCategory::Navigation, cols[0]),
            (ShortcutCategory::Actions, right[0]),
            (ShortcutCategory::System, right[1]),
        ] {
            frame.render_widget(
                Paragraph::new(section_lines(category))
                    .block(Block::bordered().title(category.title())),
                rect,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_cover_all_shortcuts() {
        let total: usize = [
            ShortcutCategory::Navigation,
            ShortcutCategory::Actions,
            ShortcutCategory::System,
        ]
        .into_iter()
        .map(|c| section_lines(c).len())
        .sum();
        assert_eq!(total, SHORTCUTS.len());
    }
}
