use ratatui::{
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, ListState, Paragraph, TableState},
    Frame,
};
use throbber_widgets_tui::{Throbber, BRAILLE_SIX};

/// Highlight state for a list; nothing is highlighted when the list is empty.
pub fn list_state(selected: usize, item_count: usize) -> ListState {
    let selected = (item_count > 0).then(|| selected.min(item_count - 1));
    ListState::default().with_selected(selected)
}

/// Highlight and scroll state for a table of `row_count` rows.
pub fn table_state(selected: usize, offset: usize, row_count: usize) -> TableState {
    if row_count == 0 {
        return TableState::default();
    }
    let selected = selected.min(row_count - 1);
    TableState::default()
        .with_selected(Some(selected))
        .with_offset(offset.min(selected))
}

/// Bordered block; the focused pane gets a yellow border and bold title.
pub fn focused_block(title: &str, is_focused: bool) -> Block<'_> {
    let block = Block::bordered();
    if is_focused {
        block
            .title(Line::from(title).bold())
            .border_style(Style::new().yellow())
    } else {
        block.title(title).border_style(Style::new().dark_gray())
    }
}

/// Spinner shown while a request is in flight.
pub fn loading_throbber(label: impl Into<String>) -> Throbber<'static> {
    Throbber::default()
        .label(label.into())
        .throbber_style(Style::new().cyan())
        .throbber_set(BRAILLE_SIX)
}

/// Scroll offset that keeps `selected` inside a window of `window_size` rows.
pub fn scrolled_offset(selected: usize, offset: usize, window_size: usize) -> usize {
    if selected < offset {
        selected
    } else if window_size > 0 && selected >= offset + window_size {
        selected + 1 - window_size
    } else {
        offset
    }
}

/// Single-field text form.
#[derive(Debug, Clone, Copy)]
pub struct InputForm<'a> {
    pub title: &'a str,
    pub label: &'a str,
    /// Text as it should be displayed (already masked for secrets).
    pub value: &'a str,
    pub notice: Option<&'a str>,
}

pub fn render_input_form(frame: &mut Frame, area: Rect, form: InputForm) {
    let mut lines = Vec::new();
    if let Some(notice) = form.notice {
        lines.push(Line::from(Span::styled(notice.to_string(), Style::new().yellow())));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(format!("{}:", form.label), Style::new().bold())),
        Line::from(vec![
            Span::raw("> "),
            Span::raw(form.value.to_string()),
            Span::styled("_", Style::new().slow_blink()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Enter: submit   Ctrl-C: quit", Style::new().gray())),
    ]);

    frame.render_widget(
        Paragraph::new(lines).block(focused_block(form.title, true)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_scrolled_offset() {
        assert_eq!(scrolled_offset(3, 5, 10), 3);
        assert_eq!(scrolled_offset(9, 0, 10), 0);
        assert_eq!(scrolled_offset(10, 0, 10), 1);
        assert_eq!(scrolled_offset(25, 5, 10), 16);
        assert_eq!(scrolled_offset(4, 2, 0), 2);
    }

    #[test]
    fn test_states_clamp() {
        assert_eq!(list_state(5, 0).selected(), None);
        assert_eq!(list_state(5, 3).selected(), Some(2));

        let table = table_state(8, 20, 4);
        assert_eq!(table.selected(), Some(3));
        assert_eq!(table.offset(), 3);
        assert_eq!(table_state(0, 0, 0).selected(), None);
    }

    #[test]
    fn test_input_form_shows_notice_and_value() {
        let mut terminal = Terminal::new(TestBackend::new(40, 9)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_input_form(
                    frame,
                    area,
                    InputForm {
                        title: "Sign in",
                        label: "Session token",
                        value: "•••",
                        notice: Some("Session expired"),
                    },
                )
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Session expired"));
        assert!(text.contains("> •••"));
    }
}
