//! Keeps a panicking page from taking the whole terminal down.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

type ErrorHook = Box<dyn FnMut(&str)>;

pub struct RenderBoundary {
    error: Option<String>,
    on_error: ErrorHook,
}

impl std::fmt::Debug for RenderBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderBoundary")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Default for RenderBoundary {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static SUPPRESS_HOOK: Cell<bool> = const { Cell::new(false) };
}

static INSTALL_HOOK: Once = Once::new();

/// Wraps the current process hook, once, so a panic inside `guard` on this
/// thread skips it. Panics anywhere else still reach the wrapped hook.
/// Must run after `ratatui::init` so its terminal-restoring hook is the one
/// wrapped.
fn install_filtering_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !SUPPRESS_HOOK.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// Clears the suppression flag even if `catch_unwind` itself unwinds.
struct Suppressed;

impl Suppressed {
    fn enter() -> Self {
        SUPPRESS_HOOK.with(|flag| flag.set(true));
        Suppressed
    }
}

impl Drop for Suppressed {
    fn drop(&mut self) {
        SUPPRESS_HOOK.with(|flag| flag.set(false));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl RenderBoundary {
    /// Boundary that logs caught panics through `tracing`.
    pub fn new() -> Self {
        Self::with_hook(|message| tracing::error!(error = message, "page render panicked"))
    }

    pub fn with_hook<F>(on_error: F) -> Self
    where
        F: FnMut(&str) + 'static,
    {
        Self {
            error: None,
            on_error: Box::new(on_error),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Clears the recorded failure so the next frame renders the page again.
    pub fn reset(&mut self) {
        self.error = None;
    }

    /// Runs `render` unless a previous call failed. Returns `false` when the
    /// fallback should be shown instead.
    ///
    /// The process panic hook is skipped for panics raised by `render` on
    /// this thread; the terminal's restore hook must not fire for a panic we
    /// recover from. The hook itself is never swapped out, so worker threads
    /// keep their reports.
    pub fn guard<F>(&mut self, render: F) -> bool
    where
        F: FnOnce(),
    {
        if self.error.is_some() {
            return false;
        }

        install_filtering_hook();
        let result = {
            let _quiet = Suppressed::enter();
            panic::catch_unwind(AssertUnwindSafe(render))
        };

        match result {
            Ok(()) => true,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                (self.on_error)(&message);
                self.error = Some(message);
                false
            }
        }
    }

    /// Renders with `render`, or the fallback panel once it has failed.
    pub fn render<F>(&mut self, frame: &mut Frame, area: Rect, render: F)
    where
        F: FnOnce(&mut Frame, Rect),
    {
        let ok = self.guard(|| render(&mut *frame, area));
        if !ok {
            self.render_fallback(frame, area);
        }
    }

    fn render_fallback(&self, frame: &mut Frame, area: Rect) {
        let message = self.error.as_deref().unwrap_or("unknown error");
        let lines = vec![
            Line::from("This view failed to render."),
            Line::from(""),
            Line::from(message.to_string()),
            Line::from(""),
            Line::from("Press r to retry."),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Something went wrong")
            .border_style(Style::default().fg(Color::Red));
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }
}
