use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossbeam::channel::Receiver;
use crossterm::event::KeyEvent;
use ratatui::{DefaultTerminal, Frame};
use throbber_widgets_tui::ThrobberState;

use vendadmin::api::ApiClient;
use vendadmin::async_task::{ApiOperation, OpOutcome, TaskManager, TaskResult};
use vendadmin::boundary::RenderBoundary;
use vendadmin::classify::{parse_api_error, should_logout, user_message, CaughtError, ErrorKind};
use vendadmin::config::AppConfig;
use vendadmin::entity::Entity;
use vendadmin::export::{export_to_csv, export_to_excel, FileDownloader};
use vendadmin::key_handler::{KeyAction, KeyContext, KeyHandler};
use vendadmin::notifications::{toast_message, NotificationTracker};
use vendadmin::render_context::RenderContext;
use vendadmin::screen::Screen;
use vendadmin::shortcuts::{Dispatch, InputFocus, ShortcutAction, ShortcutDispatcher};
use vendadmin::state::{DashboardState, ListViewState, LoginState};
use vendadmin::status::StatusMessage;
use vendadmin::{logging, AppMode, Focus};

// UI constants
const TICK: Duration = Duration::from_millis(100);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = AppConfig::load()?;
    logging::init(&config);
    tracing::info!(api = %config.api_base_url, "vendadmin starting");

    let app = App::new(config)?;
    let terminal = ratatui::init();
    let result = app.run(terminal);
    ratatui::restore();
    result
}

/// What a background request was for, so its result lands in the right place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestTarget {
    Dashboard,
    List(Entity),
    Mutation(Entity),
    Cache,
    Notifications,
}

pub struct App {
    running: bool,
    screen: Screen,
    key_handler: KeyHandler,
    dispatcher: ShortcutDispatcher,
    escape_rx: Receiver<()>,
    current_view: AppMode,
    focus: Focus,
    menu_selected_index: usize,
    status_message: StatusMessage,
    show_help: bool,
    config: AppConfig,
    client: ApiClient,
    tasks: TaskManager,
    in_flight: HashMap<u64, RequestTarget>,
    dashboard: DashboardState,
    login: LoginState,
    lists: HashMap<Entity, ListViewState>,
    notifications: NotificationTracker,
    last_notification_poll: Option<Instant>,
    downloader: FileDownloader,
    boundary: RenderBoundary,
    spinner: ThrobberState,
}

impl App {
    pub fn new(config: AppConfig) -> color_eyre::Result<Self> {
        let client = ApiClient::new(&config)?;
        let mut dispatcher = ShortcutDispatcher::new();
        let escape_rx = dispatcher.escape_bus().subscribe();
        let signed_in = client.has_token();

        let mut app = Self {
            running: false,
            screen: Screen::new(),
            key_handler: KeyHandler::new(),
            dispatcher,
            escape_rx,
            current_view: if signed_in { AppMode::Dashboard } else { AppMode::Login },
            focus: Focus::View,
            menu_selected_index: 0,
            status_message: StatusMessage::idle(),
            show_help: false,
            downloader: FileDownloader::new(config.export_dir.clone()),
            config,
            client,
            tasks: TaskManager::new(),
            in_flight: HashMap::new(),
            dashboard: DashboardState::new(),
            login: LoginState::new(),
            lists: HashMap::new(),
            notifications: NotificationTracker::new(),
            last_notification_poll: None,
            boundary: RenderBoundary::new(),
            spinner: ThrobberState::default(),
        };
        if signed_in {
            app.refresh_current();
        }
        Ok(app)
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            if let Some(key) = self.key_handler.next_key(TICK)? {
                self.handle_key(key, Instant::now());
            }
            self.tick(Instant::now());
        }
        self.dispatcher.reset();
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let ctx = RenderContext {
            mode: self.current_view,
            focus: self.focus,
            show_help: self.show_help,
            menu_selected_index: self.menu_selected_index,
            status: &self.status_message,
            chord_pending: self.dispatcher.is_chord_pending(),
            api_base_url: self.client.base_url().as_str(),
            dashboard: &self.dashboard,
            login: &self.login,
            list: match self.current_view {
                AppMode::List(entity) => self.lists.get(&entity),
                _ => None,
            },
        };
        self.screen
            .render(frame, &ctx, &mut self.spinner, &mut self.boundary);
    }

    /// Periodic work: chord expiry, debounced search, task results, polling.
    fn tick(&mut self, now: Instant) {
        self.dispatcher.tick(now);
        self.spinner.calc_next();
        self.status_message.expire(now);

        while self.escape_rx.try_recv().is_ok() {
            self.show_help = false;
            if let Some(list) = self.active_list_mut() {
                list.confirm_delete = false;
            }
        }

        let search_changed = self
            .active_list_mut()
            .map(|list| list.poll_search(now))
            .unwrap_or(false);
        if search_changed {
            self.refresh_current();
        }

        while let Some(result) = self.tasks.try_recv() {
            self.handle_task_result(result);
        }

        self.maybe_poll_notifications(now);
    }

    fn active_list(&self) -> Option<&ListViewState> {
        match self.current_view {
            AppMode::List(entity) => self.lists.get(&entity),
            _ => None,
        }
    }

    fn active_list_mut(&mut self) -> Option<&mut ListViewState> {
        match self.current_view {
            AppMode::List(entity) => self.lists.get_mut(&entity),
            _ => None,
        }
    }

    fn list_mut(&mut self, entity: Entity) -> &mut ListViewState {
        let page_size = self.config.page_size;
        let delay = Duration::from_millis(self.config.search_debounce_ms);
        self.lists
            .entry(entity)
            .or_insert_with(|| ListViewState::new(entity, page_size, delay))
    }

    fn input_focus(&self) -> InputFocus {
        match self.current_view {
            AppMode::Login => InputFocus::TextInput {
                empty: self.login.token_input.is_empty(),
            },
            _ => self
                .active_list()
                .map(ListViewState::input_focus)
                .unwrap_or_default(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        if self.current_view != AppMode::Login {
            match self.dispatcher.handle(&key, self.input_focus(), now) {
                Dispatch::Action(action) => return self.apply_shortcut(action),
                Dispatch::ChordPending | Dispatch::Consumed => return,
                Dispatch::Ignored => {}
            }
        }

        let ctx = KeyContext {
            mode: self.current_view,
            focus: self.focus,
            text_input: matches!(self.input_focus(), InputFocus::TextInput { .. }),
            confirming: self.active_list().is_some_and(|l| l.confirm_delete),
        };
        let action = self.key_handler.on_key_event(key, &ctx);
        self.handle_action(action, now);
    }

    fn apply_shortcut(&mut self, action: ShortcutAction) {
        match action {
            ShortcutAction::Cancel => {
                if let Some(list) = self.active_list_mut() {
                    if list.search_active {
                        list.cancel_search();
                        return;
                    }
                }
                self.focus = Focus::Menu;
            }
            ShortcutAction::ShowHelp => self.show_help = true,
            ShortcutAction::FocusSearch => {
                if let Some(list) = self.active_list_mut() {
                    list.start_search();
                    self.focus = Focus::View;
                    self.status_message = StatusMessage::info("Type to search, Enter to apply");
                }
            }
            ShortcutAction::Logout => self.logout(None),
            ShortcutAction::Navigate(route) => match AppMode::from_route(route) {
                Some(mode) => self.switch_view(mode),
                None => tracing::warn!(route, "no view for route"),
            },
        }
    }

    fn handle_action(&mut self, action: KeyAction, now: Instant) {
        match (self.current_view, action) {
            (_, KeyAction::Quit) => self.quit(),
            (AppMode::Login, action) => self.handle_login_action(action),
            (_, KeyAction::NextView) => {
                let next = self.current_view.next();
                self.switch_view(next);
            }
            (_, KeyAction::NavigateUp) if self.focus == Focus::Menu => {
                self.menu_selected_index = self.menu_selected_index.saturating_sub(1);
            }
            (_, KeyAction::NavigateDown) if self.focus == Focus::Menu => {
                self.menu_selected_index = (self.menu_selected_index + 1).min(AppMode::MENU_LEN - 1);
            }
            (_, KeyAction::Select) if self.focus == Focus::Menu => {
                self.switch_view(AppMode::from_menu_index(self.menu_selected_index));
            }
            (AppMode::Dashboard, KeyAction::Back) => self.focus = Focus::Menu,
            (AppMode::Dashboard, action) => self.handle_dashboard_action(action),
            (AppMode::List(entity), action) => self.handle_list_action(entity, action, now),
        }
    }

    fn handle_login_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::InputChar(c) => self.login.push_char(c),
            KeyAction::Backspace => self.login.pop_char(),
            KeyAction::Select => match self.login.submit() {
                Some(token) => {
                    self.client.set_token(Some(token));
                    tracing::info!("session token set");
                    self.status_message = StatusMessage::success("Signed in");
                    self.switch_view(AppMode::Dashboard);
                }
                None => self.status_message = StatusMessage::error("Enter a session token"),
            },
            _ => {}
        }
    }

    fn handle_dashboard_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::NavigateUp => {
                self.dashboard.navigate_up();
            }
            KeyAction::NavigateDown => {
                self.dashboard.navigate_down();
            }
            KeyAction::Select => {
                let entity = self.dashboard.selected_entity();
                self.switch_view(AppMode::List(entity));
            }
            KeyAction::Refresh => {
                self.boundary.reset();
                self.refresh_current();
            }
            KeyAction::ResizePane(delta) => {
                self.dashboard.adjust_pane_ratio(delta);
            }
            KeyAction::ClearCache => {
                self.spawn(ApiOperation::ClearCache, RequestTarget::Cache);
                self.status_message = StatusMessage::progress("Clearing server cache");
            }
            _ => {}
        }
    }

    fn handle_list_action(&mut self, entity: Entity, action: KeyAction, now: Instant) {
        let list = self.list_mut(entity);
        let refetch = match action {
            KeyAction::InputChar(c) if list.search_active => {
                list.push_search_char(c, now);
                false
            }
            KeyAction::Backspace if list.search_active => {
                list.pop_search_char(now);
                false
            }
            KeyAction::Select if list.search_active => list.commit_search(),
            KeyAction::NavigateUp => {
                list.navigate_up();
                false
            }
            KeyAction::NavigateDown => {
                list.navigate_down();
                false
            }
            KeyAction::PrevPage => list.prev_page(),
            KeyAction::NextPage => list.next_page(),
            KeyAction::FirstPage => list.first_page(),
            KeyAction::LastPage => list.last_page(),
            KeyAction::GrowPageSize => list.step_page_size(true),
            KeyAction::ShrinkPageSize => list.step_page_size(false),
            KeyAction::ToggleRow => {
                list.toggle_current();
                false
            }
            KeyAction::ToggleAll => {
                list.toggle_all();
                false
            }
            KeyAction::CycleStatus => {
                if entity.statuses().is_empty() {
                    false
                } else {
                    let status = list.cycle_status();
                    let shown = if status.is_empty() { "all" } else { status.as_str() };
                    self.status_message = StatusMessage::info(format!("Status: {}", shown));
                    true
                }
            }
            KeyAction::ResetFilters => list.reset_filters(),
            KeyAction::Refresh => {
                self.boundary.reset();
                true
            }
            KeyAction::DeleteSelected => {
                if !entity.supports_bulk_delete() {
                    self.status_message =
                        StatusMessage::error(format!("{} cannot be deleted", entity.title()));
                } else if list.selection.is_empty() {
                    self.status_message = StatusMessage::info("Select rows with Space first");
                } else {
                    list.confirm_delete = true;
                }
                false
            }
            KeyAction::Confirm => {
                list.confirm_delete = false;
                let ids = list.selected_ids();
                self.delete_rows(entity, ids);
                false
            }
            KeyAction::Back if list.confirm_delete => {
                list.confirm_delete = false;
                false
            }
            KeyAction::Back if list.search_active => {
                list.cancel_search();
                false
            }
            KeyAction::Back => {
                self.focus = Focus::Menu;
                false
            }
            KeyAction::ExportCsv => {
                self.export(entity, false);
                false
            }
            KeyAction::ExportXlsx => {
                self.export(entity, true);
                false
            }
            _ => false,
        };
        if refetch {
            self.refresh_current();
        }
    }

    fn switch_view(&mut self, mode: AppMode) {
        if mode == self.current_view {
            self.focus = Focus::View;
            return;
        }
        tracing::debug!(from = ?self.current_view, to = ?mode, "switching view");
        self.dispatcher.reset();
        self.boundary.reset();
        self.current_view = mode;
        self.menu_selected_index = mode.menu_index();
        self.focus = Focus::View;
        if let AppMode::List(entity) = mode {
            self.list_mut(entity);
        }
        self.refresh_current();
    }

    fn spawn(&mut self, op: ApiOperation, target: RequestTarget) {
        let id = self.tasks.spawn_operation(&self.client, op);
        self.in_flight.insert(id, target);
    }

    /// Re-fetches whatever the current view shows.
    fn refresh_current(&mut self) {
        match self.current_view {
            AppMode::Login => {}
            AppMode::Dashboard => {
                let query = self.dashboard.begin_fetch();
                self.spawn(
                    ApiOperation::FetchList {
                        entity: Entity::Orders,
                        query,
                    },
                    RequestTarget::Dashboard,
                );
            }
            AppMode::List(entity) => {
                let query = self.list_mut(entity).begin_fetch();
                tracing::info!(entity = %entity, page = query.page, limit = query.limit, "fetching");
                self.spawn(ApiOperation::FetchList { entity, query }, RequestTarget::List(entity));
            }
        }
    }

    fn delete_rows(&mut self, entity: Entity, ids: Vec<String>) {
        if ids.is_empty() {
            return;
        }
        self.status_message = StatusMessage::progress(format!("Deleting {} item(s)", ids.len()));
        let op = if ids.len() == 1 {
            ApiOperation::Delete {
                entity,
                id: ids[0].clone(),
            }
        } else {
            ApiOperation::BulkDelete { entity, ids }
        };
        self.spawn(op, RequestTarget::Mutation(entity));
    }

    fn export(&mut self, entity: Entity, excel: bool) {
        let Some(list) = self.lists.get(&entity) else {
            return;
        };
        let columns = entity.export_columns();
        let filename = format!(
            "{}-{}",
            entity.path(),
            Utc::now().format("%Y%m%d-%H%M%S")
        );
        let result = if excel {
            export_to_excel(
                &list.records,
                &filename,
                entity.title(),
                Some(columns.as_slice()),
                &mut self.downloader,
            )
        } else {
            export_to_csv(
                &list.records,
                &format!("{}.csv", filename),
                Some(columns.as_slice()),
                &mut self.downloader,
            )
        };
        self.status_message = match result {
            Ok(Some(path)) => StatusMessage::success(format!("Exported to {}", path.display())),
            Ok(None) => StatusMessage::info("No data to export"),
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                let classified = parse_api_error(&CaughtError::from(&e));
                StatusMessage::error(user_message(&classified))
            }
        };
    }

    fn handle_task_result(&mut self, result: TaskResult) {
        let Some(target) = self.in_flight.remove(&result.id) else {
            tracing::debug!(id = result.id, "result for unknown task");
            return;
        };
        match result.outcome {
            Ok(outcome) => self.apply_outcome(target, outcome),
            Err(failure) => {
                let classified = parse_api_error(&CaughtError::from(failure));
                if classified.kind == ErrorKind::Server {
                    tracing::error!(op = result.label, kind = %classified.kind, status = ?classified.status, "request failed");
                } else {
                    tracing::warn!(op = result.label, kind = %classified.kind, status = ?classified.status, "request failed");
                }
                if should_logout(&classified) {
                    self.logout(Some(user_message(&classified)));
                    return;
                }
                let message = user_message(&classified);
                match target {
                    RequestTarget::Dashboard => self.dashboard.apply_error(classified),
                    RequestTarget::List(entity) => self.list_mut(entity).apply_error(classified),
                    // Polling failures stay in the log.
                    RequestTarget::Notifications => return,
                    RequestTarget::Mutation(_) | RequestTarget::Cache => {}
                }
                self.status_message = StatusMessage::error(message);
            }
        }
    }

    fn apply_outcome(&mut self, target: RequestTarget, outcome: OpOutcome) {
        match (target, outcome) {
            (RequestTarget::Dashboard, OpOutcome::Listed { page, .. }) => {
                self.dashboard.apply_orders(&page.records, page.meta.total);
            }
            (RequestTarget::List(_), OpOutcome::Listed { entity, page }) => {
                self.list_mut(entity).apply_page(page);
            }
            (_, OpOutcome::Deleted { entity, count }) => {
                self.list_mut(entity).after_delete();
                self.status_message = StatusMessage::success(format!(
                    "Deleted {} {}",
                    count,
                    entity.title().to_lowercase()
                ));
                if self.current_view == AppMode::List(entity) {
                    self.refresh_current();
                }
            }
            (_, OpOutcome::CacheCleared) => {
                self.status_message = StatusMessage::success("Server cache cleared");
            }
            (_, OpOutcome::Notifications(records)) => {
                let fresh = self.notifications.observe_records(&records, Utc::now());
                if let Some(toast) = toast_message(fresh.len()) {
                    self.status_message = StatusMessage::info(toast);
                }
            }
            (target, outcome) => {
                tracing::debug!(?target, ?outcome, "unexpected task outcome");
            }
        }
    }

    fn maybe_poll_notifications(&mut self, now: Instant) {
        if self.current_view == AppMode::Login || self.config.notification_poll_secs == 0 {
            return;
        }
        let interval = Duration::from_secs(self.config.notification_poll_secs);
        let due = self
            .last_notification_poll
            .is_none_or(|last| now.saturating_duration_since(last) >= interval);
        if due {
            self.last_notification_poll = Some(now);
            self.spawn(ApiOperation::PollNotifications, RequestTarget::Notifications);
        }
    }

    /// Drops the session and returns to the login screen.
    fn logout(&mut self, reason: Option<String>) {
        self.client.set_token(None);
        self.notifications.reset();
        self.last_notification_poll = None;
        self.lists.clear();
        self.in_flight.clear();
        self.dashboard = DashboardState::new();
        self.dispatcher.reset();
        if self.current_view != AppMode::Login {
            tracing::info!("signed out");
            self.current_view = AppMode::Login;
            self.login = match reason {
                Some(reason) => LoginState::with_notice(reason),
                None => LoginState::new(),
            };
        }
        self.status_message = StatusMessage::info("Signed out");
    }

    fn quit(&mut self) {
        self.running = false;
    }
}
