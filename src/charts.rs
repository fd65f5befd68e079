//! Fixed-schema records for dashboard charts and their ratatui adapters.

use serde::Serialize;
use serde_json::Value;

use crate::export::{stringify_value, Record};

/// Label used for records with no value in the grouped field.
pub const UNKNOWN_STATUS: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// Counts records per value of `field`, in first-seen order.
pub fn status_breakdown(records: &[Record], field: &str) -> Vec<StatusCount> {
    let mut counts: Vec<StatusCount> = Vec::new();
    for record in records {
        let status = match record.get(field) {
            None | Some(Value::Null) => UNKNOWN_STATUS.to_string(),
            Some(value) => {
                let s = stringify_value(value);
                if s.is_empty() {
                    UNKNOWN_STATUS.to_string()
                } else {
                    s
                }
            }
        };
        match counts.iter_mut().find(|c| c.status == status) {
            Some(entry) => entry.count += 1,
            None => counts.push(StatusCount { status, count: 1 }),
        }
    }
    counts
}

/// Borrowed `(label, value)` pairs as accepted by `BarChart::data`.
pub fn to_bar_data(counts: &[StatusCount]) -> Vec<(&str, u64)> {
    counts.iter().map(|c| (c.status.as_str(), c.count)).collect()
}

pub fn total(counts: &[StatusCount]) -> u64 {
    counts.iter().map(|c| c.count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Value) -> Vec<Record> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_breakdown_keeps_first_seen_order() {
        let rows = records(json!([
            {"status": "pending"},
            {"status": "completed"},
            {"status": "pending"},
            {"status": null},
            {}
        ]));
        let counts = status_breakdown(&rows, "status");
        assert_eq!(
            counts,
            vec![
                StatusCount { status: "pending".into(), count: 2 },
                StatusCount { status: "completed".into(), count: 1 },
                StatusCount { status: UNKNOWN_STATUS.into(), count: 2 },
            ]
        );
        assert_eq!(total(&counts), 5);
    }

    #[test]
    fn test_bar_data() {
        let counts = vec![
            StatusCount { status: "paid".into(), count: 3 },
            StatusCount { status: "refunded".into(), count: 1 },
        ];
        assert_eq!(to_bar_data(&counts), vec![("paid", 3), ("refunded", 1)]);
    }

    #[test]
    fn test_serializes_fixed_schema() {
        let value = serde_json::to_value(StatusCount { status: "paid".into(), count: 2 }).unwrap();
        assert_eq!(value, json!({"status": "paid", "count": 2}));
    }
}
