//! Status-bar messages.
//!
//! Confirmations and notices are toasts: they fall back to the idle hint
//! [`TOAST_TTL`] after they were first shown. Errors and progress messages
//! stay until something replaces them.

use std::fmt;
use std::time::{Duration, Instant};

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

pub const TOAST_TTL: Duration = Duration::from_secs(5);
pub const IDLE_TEXT: &str = "Ready | Press ? for help";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Idle,
    Success,
    Info,
    Progress,
    Error,
}

impl Severity {
    pub fn symbol(self) -> &'static str {
        match self {
            Severity::Idle => "",
            Severity::Success => "✓",
            Severity::Info => "ℹ",
            Severity::Progress => "⟳",
            Severity::Error => "✗",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Severity::Idle => Color::White,
            Severity::Success => Color::Green,
            Severity::Info => Color::Cyan,
            Severity::Progress => Color::Yellow,
            Severity::Error => Color::Red,
        }
    }

    fn is_toast(self) -> bool {
        matches!(self, Severity::Success | Severity::Info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    severity: Severity,
    text: String,
    /// Set on the first `expire` call after the message was raised.
    shown_at: Option<Instant>,
}

impl Default for StatusMessage {
    fn default() -> Self {
        Self::idle()
    }
}

impl StatusMessage {
    fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
            shown_at: None,
        }
    }

    pub fn idle() -> Self {
        Self::new(Severity::Idle, IDLE_TEXT)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Severity::Success, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, text)
    }

    pub fn progress(text: impl Into<String>) -> Self {
        Self::new(Severity::Progress, format!("{}...", text.into()))
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Drops an expired toast. Returns `true` when the message changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        if !self.severity.is_toast() {
            return false;
        }
        match self.shown_at {
            None => {
                self.shown_at = Some(now);
                false
            }
            Some(at) if now.saturating_duration_since(at) >= TOAST_TTL => {
                *self = Self::idle();
                true
            }
            Some(_) => false,
        }
    }

    /// Symbol in the severity color, text in the default style.
    pub fn line(&self) -> Line<'static> {
        if self.severity == Severity::Idle {
            return Line::from(self.text.clone());
        }
        Line::from(vec![
            Span::styled(self.severity.symbol(), Style::new().fg(self.severity.color())),
            Span::raw(" "),
            Span::raw(self.text.clone()),
        ])
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Idle => f.write_str(&self.text),
            severity => write!(f, "{} {}", severity.symbol(), self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(StatusMessage::success("Saved").to_string(), "✓ Saved");
        assert_eq!(StatusMessage::progress("Deleting").to_string(), "⟳ Deleting...");
        assert_eq!(StatusMessage::idle().to_string(), IDLE_TEXT);
    }

    #[test]
    fn test_toast_expires_after_ttl() {
        let t0 = Instant::now();
        let mut status = StatusMessage::success("Exported");
        assert!(!status.expire(t0));
        assert!(!status.expire(t0 + TOAST_TTL - Duration::from_millis(1)));
        assert!(status.expire(t0 + TOAST_TTL));
        assert_eq!(status.severity(), Severity::Idle);
    }

    #[test]
    fn test_errors_stay() {
        let t0 = Instant::now();
        let mut status = StatusMessage::error("Server error");
        status.expire(t0);
        assert!(!status.expire(t0 + TOAST_TTL * 10));
        assert_eq!(status.text(), "Server error");
    }

    #[test]
    fn test_line_colors_symbol() {
        let line = StatusMessage::error("Nope").line();
        assert_eq!(line.spans[0].content, "✗");
        assert_eq!(line.spans[0].style.fg, Some(Color::Red));
        assert_eq!(line.spans[2].content, "Nope");
    }
}
