//! Global keyboard shortcuts and the `g <key>` navigation chords.
//!
//! The dispatcher is a small state machine: `Idle`, or waiting for the second
//! key of a chord since some `Instant`. Time is passed in by the caller so the
//! expiry window can be driven from the event loop tick and from tests.

use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, Sender};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// How long a started chord waits for its second key.
pub const CHORD_TIMEOUT: Duration = Duration::from_millis(1000);

const CHORD_LEADER: char = 'g';

use self::ShortcutCategory::{Actions, Navigation, System};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutCategory {
    Navigation,
    Actions,
    System,
}

impl ShortcutCategory {
    pub fn title(self) -> &'static str {
        match self {
            ShortcutCategory::Navigation => "Navigation",
            ShortcutCategory::Actions => "Actions",
            ShortcutCategory::System => "System",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutBinding {
    pub keys: &'static str,
    pub description: &'static str,
    pub category: ShortcutCategory,
}

const fn bind(keys: &'static str, description: &'static str, category: ShortcutCategory) -> ShortcutBinding {
    ShortcutBinding {
        keys,
        description,
        category,
    }
}

/// Chord → route table.
pub const NAVIGATION_ROUTES: &[(&str, &str)] = &[
    ("g d", "/dashboard"),
    ("g u", "/users"),
    ("g m", "/machines"),
    ("g p", "/products"),
    ("g o", "/orders"),
    ("g c", "/campaigns"),
    ("g k", "/coupons"),
    ("g v", "/vouchers"),
    ("g t", "/categories"),
    ("g f", "/feedback"),
    ("g a", "/activity-logs"),
    ("g n", "/notifications"),
    ("g s", "/sessions"),
];

/// Chord that opens `route`, if any.
pub fn chord_for_route(route: &str) -> Option<&'static str> {
    NAVIGATION_ROUTES
        .iter()
        .find(|(_, r)| *r == route)
        .map(|(chord, _)| *chord)
}

/// Everything shown in the help overlay.
pub const SHORTCUTS: &[ShortcutBinding] = &[
    bind("g d", "Go to dashboard", Navigation),
    bind("g u", "Go to users", Navigation),
    bind("g m", "Go to machines", Navigation),
    bind("g p", "Go to products", Navigation),
    bind("g o", "Go to orders", Navigation),
    bind("g c", "Go to campaigns", Navigation),
    bind("g k", "Go to coupons", Navigation),
    bind("g v", "Go to vouchers", Navigation),
    bind("g t", "Go to categories", Navigation),
    bind("g f", "Go to feedback", Navigation),
    bind("g a", "Go to activity logs", Navigation),
    bind("g n", "Go to notifications", Navigation),
    bind("g s", "Go to sessions", Navigation),
    bind("↑ ↓ / j k", "Move row cursor", Navigation),
    bind("← → / [ ]", "Previous / next page", Navigation),
    bind("Home / End", "First / last page", Navigation),
    bind("Tab", "Next view", Navigation),
    bind("Enter", "Open selected item", Navigation),
    bind("/", "Focus search", Actions),
    bind("Space", "Toggle row selection", Actions),
    bind("a", "Toggle all rows on page", Actions),
    bind("s", "Cycle status filter", Actions),
    bind("c", "Clear filters", Actions),
    bind("+ / -", "Change page size", Actions),
    bind("e", "Export CSV", Actions),
    bind("x", "Export Excel", Actions),
    bind("D", "Delete selected rows", Actions),
    bind("r", "Refresh", Actions),
    bind("C", "Clear server cache (dashboard)", Actions),
    bind("< / >", "Resize dashboard panes", Actions),
    bind("?", "Show keyboard shortcuts", System),
    bind("Esc", "Close dialogs / cancel", System),
    bind("Shift+L", "Log out", System),
    bind("q / Ctrl+C", "Quit", System),
];

/// Where keyboard focus currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFocus {
    #[default]
    None,
    TextInput { empty: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Cancel,
    ShowHelp,
    FocusSearch,
    Logout,
    Navigate(&'static str),
}

/// Outcome of feeding one key to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Action(ShortcutAction),
    /// `g` was pressed; waiting for the second key.
    ChordPending,
    /// Swallowed with no effect.
    Consumed,
    /// Not a global shortcut; the caller may handle it.
    Ignored,
}

/// Fan-out of cancel signals to any component that wants to close on Esc.
#[derive(Debug, Default)]
pub struct EscapeBus {
    subscribers: Vec<Sender<()>>,
}

impl EscapeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<()> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Sends one signal to every live subscriber and forgets dropped ones.
    /// Returns the number of subscribers reached.
    pub fn broadcast(&mut self) -> usize {
        self.subscribers.retain(|tx| tx.send(()).is_ok());
        self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Resolves a chord such as `"g d"` to its route.
pub fn route_for_chord(chord: &str) -> Option<&'static str> {
    NAVIGATION_ROUTES
        .iter()
        .find(|(keys, _)| *keys == chord)
        .map(|(_, path)| *path)
}

fn is_plain(modifiers: KeyModifiers) -> bool {
    !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

#[derive(Debug, Default)]
pub struct ShortcutDispatcher {
    chord_started: Option<Instant>,
    escape: EscapeBus,
}

impl ShortcutDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn escape_bus(&mut self) -> &mut EscapeBus {
        &mut self.escape
    }

    pub fn is_chord_pending(&self) -> bool {
        self.chord_started.is_some()
    }

    /// Expires a pending chord whose window has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(started) = self.chord_started {
            if now.saturating_duration_since(started) >= CHORD_TIMEOUT {
                tracing::trace!("chord expired");
                self.chord_started = None;
            }
        }
    }

    /// Drops any pending chord.
    pub fn reset(&mut self) {
        self.chord_started = None;
    }

    pub fn handle(&mut self, key: &KeyEvent, focus: InputFocus, now: Instant) -> Dispatch {
        if let InputFocus::TextInput { empty } = focus {
            return if empty && key.code == KeyCode::Char('/') {
                self.reset();
                Dispatch::Action(ShortcutAction::FocusSearch)
            } else {
                Dispatch::Ignored
            };
        }

        if key.code == KeyCode::Esc {
            self.reset();
            let reached = self.escape.broadcast();
            tracing::debug!(subscribers = reached, "escape broadcast");
            return Dispatch::Action(ShortcutAction::Cancel);
        }

        let plain = is_plain(key.modifiers);

        let global = match key.code {
            KeyCode::Char('k' | 'K')
                if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER) =>
            {
                Some(Dispatch::Consumed)
            }
            KeyCode::Char('?') if plain => Some(Dispatch::Action(ShortcutAction::ShowHelp)),
            KeyCode::Char('/') if plain => Some(Dispatch::Action(ShortcutAction::FocusSearch)),
            KeyCode::Char('L') if plain => Some(Dispatch::Action(ShortcutAction::Logout)),
            _ => None,
        };
        if let Some(dispatch) = global {
            self.reset();
            return dispatch;
        }

        if plain && key.code == KeyCode::Char(CHORD_LEADER) {
            self.chord_started = Some(now);
            return Dispatch::ChordPending;
        }

        self.tick(now);
        if self.chord_started.take().is_none() {
            return Dispatch::Ignored;
        }
        match key.code {
            KeyCode::Char(c) if plain && c.is_ascii_alphabetic() => {
                let chord = format!("{} {}", CHORD_LEADER, c.to_ascii_lowercase());
                match route_for_chord(&chord) {
                    Some(path) => Dispatch::Action(ShortcutAction::Navigate(path)),
                    None => Dispatch::Consumed,
                }
            }
            _ => Dispatch::Ignored,
        }
    }

    /// Resolves a shortcut by its written form, e.g. `"g o"` or `"Shift+L"`.
    pub fn trigger_shortcut(&mut self, keys: &str) -> Option<ShortcutAction> {
        match keys {
            "Esc" | "Escape" => {
                self.reset();
                self.escape.broadcast();
                Some(ShortcutAction::Cancel)
            }
            "?" => Some(ShortcutAction::ShowHelp),
            "/" => Some(ShortcutAction::FocusSearch),
            "Shift+L" => Some(ShortcutAction::Logout),
            chord => route_for_chord(chord).map(ShortcutAction::Navigate),
        }
    }
}
