use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    widgets::{BarChart, Block, List, ListItem, Paragraph},
    Frame,
};
use throbber_widgets_tui::ThrobberState;

use crate::charts::to_bar_data;
use crate::classify::user_message;
use crate::entity::Entity;
use crate::shortcuts::chord_for_route;
use crate::state::DashboardState;
use crate::status::StatusMessage;
use crate::ui_utils::{list_state, loading_throbber};

#[derive(Debug)]
pub struct Dashboard;

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

fn chord_for(entity: Entity) -> &'static str {
    chord_for_route(&entity.route()).unwrap_or("")
}

impl Dashboard {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, state: &DashboardState, spinner: &mut ThrobberState) {
        let block = Block::bordered().title("Dashboard").blue();
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(state.pane_ratio),
                Constraint::Percentage(100 - state.pane_ratio),
            ])
            .split(inner);

        // Left: entity launcher
        let items: Vec<ListItem> = Entity::ALL
            .iter()
            .map(|e| ListItem::new(format!("{:<4} {}", chord_for(*e), e.title())))
            .collect();
        let mut list_state = list_state(state.selected_index, Entity::ALL.len());
        frame.render_stateful_widget(
            List::new(items)
                .block(Block::bordered().title("Open (Enter)"))
                .highlight_symbol(">> ")
                .highlight_style(Style::new().reversed()),
            cols[0],
            &mut list_state,
        );

        // Right: orders by status
        let title = format!(
            "Orders by status (last {} of {})",
            state.sample_size, state.order_total
        );
        let chart_block = Block::bordered().title(title);

        if state.loading {
            let chart_inner = chart_block.inner(cols[1]);
            frame.render_widget(chart_block, cols[1]);
            frame.render_stateful_widget(loading_throbber("Loading orders..."), chart_inner, spinner);
        } else if let Some(err) = &state.last_error {
            frame.render_widget(
                Paragraph::new(StatusMessage::error(user_message(err)).line())
                    .block(chart_block),
                cols[1],
            );
        } else if state.order_counts.is_empty() {
            frame.render_widget(
                Paragraph::new(StatusMessage::info("No orders yet").line()).block(chart_block),
                cols[1],
            );
        } else {
            let data = to_bar_data(&state.order_counts);
            frame.render_widget(
                BarChart::default()
                    .block(chart_block)
                    .data(&data)
                    .bar_width(10)
                    .bar_gap(2)
                    .bar_style(Style::new().cyan())
                    .value_style(Style::new().black().on_cyan()),
                cols[1],
            );
        }
    }
}
