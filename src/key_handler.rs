use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{AppMode, Focus};

const PANE_STEP: i16 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    Quit,
    Back,
    NextView,
    NavigateUp,
    NavigateDown,
    PrevPage,
    NextPage,
    FirstPage,
    LastPage,
    GrowPageSize,
    ShrinkPageSize,
    Select,
    ToggleRow,
    ToggleAll,
    CycleStatus,
    ResetFilters,
    ExportCsv,
    ExportXlsx,
    DeleteSelected,
    Refresh,
    ClearCache,
    /// Widens (positive) or narrows the dashboard launcher pane, in percent.
    ResizePane(i16),
    Confirm,
    InputChar(char),
    Backspace,
    None,
}

/// What the key handler needs to know about the app to interpret a key.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext {
    pub mode: AppMode,
    pub focus: Focus,
    /// A text field (search box or token input) has focus.
    pub text_input: bool,
    /// A yes/no prompt is open.
    pub confirming: bool,
}

#[derive(Debug, Default)]
pub struct KeyHandler;

impl KeyHandler {
    pub fn new() -> Self {
        Self
    }

    /// Waits up to `tick` for a key press.
    pub fn next_key(&mut self, tick: Duration) -> color_eyre::Result<Option<KeyEvent>> {
        if !event::poll(tick)? {
            return Ok(None);
        }
        match event::read()? {
            // it's important to check KeyEventKind::Press to avoid handling key release events
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
            _ => Ok(None),
        }
    }

    pub fn on_key_event(&self, key: KeyEvent, ctx: &KeyContext) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return KeyAction::Quit;
        }

        if ctx.text_input {
            return match key.code {
                KeyCode::Esc => KeyAction::Back,
                KeyCode::Enter => KeyAction::Select,
                KeyCode::Backspace => KeyAction::Backspace,
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    KeyAction::InputChar(c)
                }
                _ => KeyAction::None,
            };
        }

        if ctx.confirming {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => KeyAction::Confirm,
                _ => KeyAction::Back,
            };
        }

        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => KeyAction::Back,
            (_, KeyCode::Char('q')) => KeyAction::Quit,
            (KeyModifiers::NONE, KeyCode::Tab) => KeyAction::NextView,
            (_, KeyCode::Enter) => KeyAction::Select,
            (KeyModifiers::NONE, KeyCode::Up | KeyCode::Char('k')) => KeyAction::NavigateUp,
            (KeyModifiers::NONE, KeyCode::Down | KeyCode::Char('j')) => KeyAction::NavigateDown,
            _ if ctx.focus == Focus::Menu => KeyAction::None,
            _ => Self::view_key(key, ctx.mode),
        }
    }

    fn view_key(key: KeyEvent, mode: AppMode) -> KeyAction {
        match mode {
            AppMode::Login => KeyAction::None,
            AppMode::Dashboard => match key.code {
                KeyCode::Char('r') => KeyAction::Refresh,
                KeyCode::Char('C') => KeyAction::ClearCache,
                KeyCode::Char('<') => KeyAction::ResizePane(-PANE_STEP),
                KeyCode::Char('>') => KeyAction::ResizePane(PANE_STEP),
                _ => KeyAction::None,
            },
            AppMode::List(_) => match key.code {
                KeyCode::Left | KeyCode::Char('[') => KeyAction::PrevPage,
                KeyCode::Right | KeyCode::Char(']') => KeyAction::NextPage,
                KeyCode::Home => KeyAction::FirstPage,
                KeyCode::End => KeyAction::LastPage,
                KeyCode::Char('+') | KeyCode::Char('=') => KeyAction::GrowPageSize,
                KeyCode::Char('-') => KeyAction::ShrinkPageSize,
                KeyCode::Char(' ') => KeyAction::ToggleRow,
                KeyCode::Char('a') => KeyAction::ToggleAll,
                KeyCode::Char('s') => KeyAction::CycleStatus,
                KeyCode::Char('c') => KeyAction::ResetFilters,
                KeyCode::Char('e') => KeyAction::ExportCsv,
                KeyCode::Char('x') => KeyAction::ExportXlsx,
                KeyCode::Char('D') => KeyAction::DeleteSelected,
                KeyCode::Char('r') => KeyAction::Refresh,
                _ => KeyAction::None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctx(mode: AppMode) -> KeyContext {
        KeyContext {
            mode,
            focus: Focus::View,
            text_input: false,
            confirming: false,
        }
    }

    #[test]
    fn maps_basic_keys() {
        let kh = KeyHandler::new();
        let c = ctx(AppMode::Dashboard);
        assert_eq!(kh.on_key_event(key(KeyCode::Char('q')), &c), KeyAction::Quit);
        assert_eq!(kh.on_key_event(key(KeyCode::Tab), &c), KeyAction::NextView);
        assert_eq!(kh.on_key_event(key(KeyCode::Up), &c), KeyAction::NavigateUp);
        assert_eq!(kh.on_key_event(key(KeyCode::Char('j')), &c), KeyAction::NavigateDown);
        assert_eq!(kh.on_key_event(key(KeyCode::Char('C')), &c), KeyAction::ClearCache);
        assert_eq!(kh.on_key_event(key(KeyCode::Char('>')), &c), KeyAction::ResizePane(PANE_STEP));
    }

    #[test]
    fn maps_list_keys() {
        let kh = KeyHandler::new();
        let c = ctx(AppMode::List(Entity::Orders));
        let cases = [
            (KeyCode::Left, KeyAction::PrevPage),
            (KeyCode::Char(']'), KeyAction::NextPage),
            (KeyCode::End, KeyAction::LastPage),
            (KeyCode::Char('+'), KeyAction::GrowPageSize),
            (KeyCode::Char(' '), KeyAction::ToggleRow),
            (KeyCode::Char('a'), KeyAction::ToggleAll),
            (KeyCode::Char('s'), KeyAction::CycleStatus),
            (KeyCode::Char('c'), KeyAction::ResetFilters),
            (KeyCode::Char('e'), KeyAction::ExportCsv),
            (KeyCode::Char('x'), KeyAction::ExportXlsx),
            (KeyCode::Char('D'), KeyAction::DeleteSelected),
            (KeyCode::Char('r'), KeyAction::Refresh),
        ];
        for (code, expected) in cases {
            assert_eq!(kh.on_key_event(key(code), &c), expected, "{:?}", code);
        }
    }

    #[test]
    fn list_keys_inactive_in_menu() {
        let kh = KeyHandler::new();
        let c = KeyContext {
            focus: Focus::Menu,
            ..ctx(AppMode::List(Entity::Users))
        };
        assert_eq!(kh.on_key_event(key(KeyCode::Char('a')), &c), KeyAction::None);
        assert_eq!(kh.on_key_event(key(KeyCode::Down), &c), KeyAction::NavigateDown);
    }

    #[test]
    fn text_input_captures_characters() {
        let kh = KeyHandler::new();
        let c = KeyContext {
            text_input: true,
            ..ctx(AppMode::List(Entity::Users))
        };
        assert_eq!(kh.on_key_event(key(KeyCode::Char('q')), &c), KeyAction::InputChar('q'));
        assert_eq!(kh.on_key_event(key(KeyCode::Backspace), &c), KeyAction::Backspace);
        assert_eq!(kh.on_key_event(key(KeyCode::Enter), &c), KeyAction::Select);
        assert_eq!(kh.on_key_event(key(KeyCode::Esc), &c), KeyAction::Back);

        let ctrl_c = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char('c'))
        };
        assert_eq!(kh.on_key_event(ctrl_c, &c), KeyAction::Quit);
    }

    #[test]
    fn confirmation_prompt() {
        let kh = KeyHandler::new();
        let c = KeyContext {
            confirming: true,
            ..ctx(AppMode::List(Entity::Users))
        };
        assert_eq!(kh.on_key_event(key(KeyCode::Char('y')), &c), KeyAction::Confirm);
        assert_eq!(kh.on_key_event(key(KeyCode::Char('n')), &c), KeyAction::Back);
        assert_eq!(kh.on_key_event(key(KeyCode::Char('q')), &c), KeyAction::Back);
    }
}
