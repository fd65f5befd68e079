//! Tracks which notifications the user has already been told about.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::entity::record_id;
use crate::export::Record;

#[derive(Debug, Clone, Default)]
pub struct NotificationTracker {
    last_checked: Option<DateTime<Utc>>,
    known_ids: HashSet<String>,
}

impl NotificationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a poll result and returns ids not seen before, in input order.
    ///
    /// The first poll after construction or `reset` only seeds the known set,
    /// so existing notifications are not announced as new. The known set is
    /// replaced by this poll's ids, so it never outgrows one response.
    pub fn observe<I, S>(&mut self, ids: I, now: DateTime<Utc>) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let seeding = self.last_checked.is_none();
        self.last_checked = Some(now);

        let mut current = HashSet::new();
        let mut fresh = Vec::new();
        for id in ids {
            let id = id.into();
            if id.is_empty() || current.contains(&id) {
                continue;
            }
            if !seeding && !self.known_ids.contains(&id) {
                fresh.push(id.clone());
            }
            current.insert(id);
        }
        self.known_ids = current;
        if !fresh.is_empty() {
            tracing::info!(count = fresh.len(), "new notifications");
        }
        fresh
    }

    /// Same as `observe`, reading ids from notification records.
    pub fn observe_records(&mut self, records: &[Record], now: DateTime<Utc>) -> Vec<String> {
        self.observe(records.iter().map(record_id), now)
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.last_checked
    }

    pub fn known_count(&self) -> usize {
        self.known_ids.len()
    }

    /// Forgets everything, e.g. on logout.
    pub fn reset(&mut self) {
        self.last_checked = None;
        self.known_ids.clear();
    }
}

/// Status bar text for a batch of new notifications.
pub fn toast_message(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 new notification".to_string()),
        n => Some(format!("{} new notifications", n)),
    }
}
