use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Stylize,
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::state::LoginState;
use crate::ui_utils::{render_input_form, InputForm};

#[derive(Debug, Default)]
pub struct LoginPage;

impl LoginPage {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, state: &LoginState, api_base_url: &str) {
        let area = area.centered(Constraint::Length(60), Constraint::Length(10));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        frame.render_widget(
            Paragraph::new(Line::from(format!("API: {}", api_base_url)).gray()),
            rows[0],
        );

        let masked = state.masked();
        render_input_form(
            frame,
            rows[1],
            InputForm {
                title: "Sign in",
                label: "Session token",
                value: &masked,
                notice: state.notice.as_deref(),
            },
        );
    }
}
