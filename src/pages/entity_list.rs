use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use throbber_widgets_tui::ThrobberState;

use crate::classify::user_message;
use crate::entity::{format_cell, record_id};
use crate::state::ListViewState;
use crate::status::StatusMessage;
use crate::ui_utils::{focused_block, loading_throbber, table_state};

const CHECKED: &str = "[x]";
const UNCHECKED: &str = "[ ]";
const ID_WIDTH: u16 = 14;

#[derive(Debug, Default)]
pub struct EntityListPage;

/// One-line summary of the active filters.
pub fn filter_summary(state: &ListViewState) -> Line<'static> {
    let mut spans = Vec::new();
    let search = if state.search_active {
        format!("{}_", state.search_input)
    } else if state.filters.search().is_empty() {
        "-".to_string()
    } else {
        state.filters.search().to_string()
    };
    spans.push(Span::styled("Search: ", Style::new().gray()));
    spans.push(if state.search_active {
        Span::styled(search, Style::new().yellow())
    } else {
        Span::raw(search)
    });

    if !state.entity.statuses().is_empty() {
        let status = match state.filters.status() {
            "" => "all",
            s => s,
        };
        spans.push(Span::styled("   Status: ", Style::new().gray()));
        spans.push(Span::raw(status.to_string()));
    }
    if state.filters.has_active_filters() {
        spans.push(Span::styled("   (c to clear)", Style::new().dark_gray()));
    }
    Line::from(spans)
}

/// Footer text: page range, page number and selection count.
pub fn footer_text(state: &ListViewState) -> String {
    let p = &state.pagination;
    let mut text = format!(
        "{}  |  Page {}/{}  |  {} per page",
        p.range_label(),
        p.page,
        p.total_pages(),
        p.limit
    );
    if !state.selection.is_empty() {
        text.push_str(&format!("  |  {} selected", state.selection.len()));
    }
    text
}

impl EntityListPage {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        state: &ListViewState,
        focused: bool,
        spinner: &mut ThrobberState,
    ) {
        let block = focused_block(state.entity.title(), focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        frame.render_widget(Paragraph::new(filter_summary(state)), rows[0]);
        self.render_table(frame, rows[1], state, spinner);
        frame.render_widget(
            Paragraph::new(Line::from(footer_text(state)).dark_gray()),
            rows[2],
        );

        if state.confirm_delete {
            self.render_confirm(frame, area, state.selection.len());
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect, state: &ListViewState, spinner: &mut ThrobberState) {
        if state.loading && state.records.is_empty() {
            let label = format!("Loading {}...", state.entity.title().to_lowercase());
            frame.render_stateful_widget(loading_throbber(label), area, spinner);
            return;
        }
        if let Some(err) = &state.last_error {
            frame.render_widget(
                Paragraph::new(StatusMessage::error(user_message(err)).line()),
                area,
            );
            return;
        }
        if state.records.is_empty() {
            frame.render_widget(Paragraph::new(StatusMessage::info("No results").line()), area);
            return;
        }

        let columns = state.entity.columns();
        let all = if state.all_selected() { CHECKED } else { UNCHECKED };
        let mut header = vec![Cell::from(all), Cell::from("ID")];
        header.extend(columns.iter().map(|c| Cell::from(c.label)));

        let body: Vec<Row> = state
            .records
            .iter()
            .map(|record| {
                let mark = if state.selection.is_selected(&record_id(record)) {
                    CHECKED
                } else {
                    UNCHECKED
                };
                let mut cells = vec![
                    Cell::from(mark),
                    Cell::from(state.entity.display_id(record)).cyan(),
                ];
                cells.extend(columns.iter().map(|c| Cell::from(format_cell(c, record))));
                Row::new(cells)
            })
            .collect();

        let mut widths = vec![Constraint::Length(3), Constraint::Length(ID_WIDTH)];
        widths.extend(columns.iter().map(|c| Constraint::Min(c.width)));

        let mut row_state = table_state(state.selected_index, state.scroll, state.records.len());
        frame.render_stateful_widget(
            Table::new(body, widths)
                .header(Row::new(header).bold().underlined())
                .row_highlight_style(Style::new().reversed())
                .highlight_symbol("> "),
            area,
            &mut row_state,
        );
    }

    fn render_confirm(&self, frame: &mut Frame, area: Rect, count: usize) {
        let popup = area.centered(Constraint::Length(44), Constraint::Length(5));
        frame.render_widget(Clear, popup);
        let text = vec![
            Line::from(format!("Delete {} selected item(s)?", count)),
            Line::from(""),
            Line::from("y: confirm   any other key: cancel").gray(),
        ];
        frame.render_widget(
            Paragraph::new(text).block(Block::bordered().title("Confirm").red()),
            popup,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ListMeta, ListPage};
    use crate::entity::Entity;
    use serde_json::json;
    use std::time::Duration;

    fn state_with_rows() -> ListViewState {
        let mut state = ListViewState::new(Entity::Users, 10, Duration::from_millis(300));
        state.apply_page(ListPage {
            records: vec![
                json!({"id": "u1", "name": "Ann"}).as_object().unwrap().clone(),
                json!({"id": "u2", "name": "Bob"}).as_object().unwrap().clone(),
            ],
            meta: ListMeta {
                page: 1,
                limit: 10,
                total: 12,
                total_pages: 2,
            },
        });
        state
    }

    #[test]
    fn test_footer_text() {
        let mut state = state_with_rows();
        assert_eq!(footer_text(&state), "Showing 1-10 of 12  |  Page 1/2  |  10 per page");
        state.toggle_current();
        assert!(footer_text(&state).ends_with("1 selected"));
    }

    #[test]
    fn test_filter_summary() {
        let mut state = state_with_rows();
        state.filters.set_status("active");
        let text: String = filter_summary(&state)
            .spans
            .iter()
            .map(|s| s.content.to_string())
            .collect();
        assert!(text.contains("Status: active"));
        assert!(text.contains("(c to clear)"));
    }

    #[test]
    fn test_renders_rows_and_selection() {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        let mut state = state_with_rows();
        state.toggle_current();
        let mut spinner = ThrobberState::default();
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                EntityListPage::new().render(frame, area, &state, true, &mut spinner)
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Ann"));
        assert!(text.contains(CHECKED));
        assert!(text.contains("Page 1/2"));
    }
}
