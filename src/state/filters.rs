//! Filter state for list views.
//!
//! A flat bag of filter values with three known fields plus caller-defined
//! extensions. The default bag is the canonical "no filters" state.

use std::collections::BTreeMap;

use chrono::NaiveDate;

/// Inclusive date range filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The filter values themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub search: String,
    pub status: String,
    pub date_range: Option<DateRange>,
    /// Entity-specific extension fields, keyed by query parameter name.
    pub extra: BTreeMap<String, String>,
}

/// Current filters plus the defaults they reset to.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    initial: Filters,
    current: Filters,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a non-empty default bag.
    pub fn with_defaults(initial: Filters) -> Self {
        Self {
            current: initial.clone(),
            initial,
        }
    }

    pub fn filters(&self) -> &Filters {
        &self.current
    }

    pub fn search(&self) -> &str {
        &self.current.search
    }

    pub fn status(&self) -> &str {
        &self.current.status
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.current.search = search.into();
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.current.status = status.into();
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        self.current.date_range = range;
    }

    /// Sets any field by name. `search` and `status` map onto the known
    /// fields, everything else is stored as an extension.
    pub fn set_filter(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match key {
            "search" => self.current.search = value,
            "status" => self.current.status = value,
            _ => {
                self.current.extra.insert(key.to_string(), value);
            }
        }
    }

    pub fn reset_filters(&mut self) {
        self.current = self.initial.clone();
    }

    pub fn has_active_filters(&self) -> bool {
        let f = &self.current;
        !f.search.is_empty()
            || !f.status.is_empty()
            || f.date_range.is_some()
            || f.extra.values().any(|v| !v.is_empty())
    }

    /// Advances the status filter through `statuses`, wrapping back to "all"
    /// (the empty string) after the last one.
    pub fn cycle_status(&mut self, statuses: &[&str]) -> &str {
        let next = match statuses.iter().position(|s| *s == self.current.status) {
            Some(idx) if idx + 1 < statuses.len() => statuses[idx + 1],
            Some(_) => "",
            None if self.current.status.is_empty() => statuses.first().copied().unwrap_or(""),
            None => "",
        };
        self.current.status = next.to_string();
        &self.current.status
    }

    /// Query parameters for the list endpoint. Empty values are skipped.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let f = &self.current;
        let mut pairs = Vec::new();
        if !f.search.is_empty() {
            pairs.push(("search".to_string(), f.search.clone()));
        }
        if !f.status.is_empty() {
            pairs.push(("status".to_string(), f.status.clone()));
        }
        if let Some(range) = f.date_range {
            pairs.push(("startDate".to_string(), range.start.format("%Y-%m-%d").to_string()));
            pairs.push(("endDate".to_string(), range.end.format("%Y-%m-%d").to_string()));
        }
        for (key, value) in &f.extra {
            if !value.is_empty() {
                pairs.push((key.clone(), value.clone()));
            }
        }
        pairs
    }
}
