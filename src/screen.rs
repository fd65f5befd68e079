use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Stylize,
    text::{Line, Span},
    widgets::Block,
    Frame,
};
use throbber_widgets_tui::ThrobberState;

use crate::boundary::RenderBoundary;
use crate::pages::dashboard::Dashboard;
use crate::pages::entity_list::EntityListPage;
use crate::pages::help::HelpPage;
use crate::pages::login::LoginPage;
use crate::pages::main_menu::MainMenu;
use crate::render_context::RenderContext;
use crate::{AppMode, Focus};

#[derive(Debug, Default)]
pub struct Screen {
    main_menu: MainMenu,
    dashboard: Dashboard,
    entity_list: EntityListPage,
    help: HelpPage,
    login: LoginPage,
}

impl Screen {
    pub fn new() -> Self {
        Self {
            main_menu: MainMenu::new(),
            dashboard: Dashboard::new(),
            entity_list: EntityListPage::new(),
            help: HelpPage::new(),
            login: LoginPage::new(),
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        ctx: &RenderContext,
        spinner: &mut ThrobberState,
        boundary: &mut RenderBoundary,
    ) {
        let area = frame.area();
        let title = Line::from(format!("vendadmin - {}", ctx.mode.title()))
            .bold()
            .blue()
            .left_aligned();
        let block = Block::bordered().title(title);
        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        // Split into main content and bottom status bar
        let vlayout = Layout::new(
            Direction::Vertical,
            [Constraint::Min(0), Constraint::Length(1)],
        )
        .split(inner_area);

        if ctx.mode == AppMode::Login {
            self.login.render(frame, vlayout[0], ctx.login, ctx.api_base_url);
        } else {
            // Inside main content, split into menu and page area
            let layout = Layout::new(
                Direction::Horizontal,
                [Constraint::Length(24), Constraint::Min(0)],
            )
            .split(vlayout[0]);

            self.main_menu
                .render(frame, layout[0], ctx.menu_selected_index, ctx.focus);
            boundary.render(frame, layout[1], |frame, page_area| match ctx.mode {
                AppMode::Dashboard => self.dashboard.render(frame, page_area, ctx.dashboard, spinner),
                AppMode::List(_) => {
                    if let Some(list) = ctx.list {
                        self.entity_list
                            .render(frame, page_area, list, ctx.focus == Focus::View, spinner);
                    }
                }
                AppMode::Login => {}
            });
        }

        // Render the status bar on bottom
        let mut status_line = ctx.status.line();
        status_line.push_span(Span::raw(format!("  |  {}", ctx.key_hint())));
        let status_line = status_line.on_dark_gray().white();
        frame.render_widget(status_line, vlayout[1]);

        if ctx.show_help {
            self.help.render(frame, area);
        }
    }
}
