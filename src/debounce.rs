//! Poll-driven debouncer.
//!
//! The event loop pushes values as they arrive and polls on every tick. A value
//! is released only after `delay` has elapsed since the most recent push.

use std::time::{Duration, Instant};

/// Delay applied to search input before a list is re-fetched.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the quiet window.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Releases the pending value once the quiet window has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.saturating_duration_since(*at) >= self.delay => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Releases the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_releases_after_delay() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.push("a", start);
        assert_eq!(d.poll(start + Duration::from_millis(100)), None);
        assert_eq!(d.poll(start + Duration::from_millis(300)), Some("a"));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_push_restarts_window() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.push("a", start);
        d.push("ab", start + Duration::from_millis(200));
        assert_eq!(d.poll(start + Duration::from_millis(400)), None);
        assert_eq!(d.poll(start + Duration::from_millis(500)), Some("ab"));
    }

    #[test]
    fn test_flush_and_cancel() {
        let now = Instant::now();
        let mut d = Debouncer::new(Duration::from_secs(10));
        d.push(1, now);
        assert_eq!(d.flush(), Some(1));
        d.push(2, now);
        d.cancel();
        assert_eq!(d.poll(now + Duration::from_secs(60)), None);
    }
}
