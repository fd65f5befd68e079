//! Catalogue of the platform entities the console can list.
//!
//! Each entity knows its API path, the key its rows arrive under, the
//! columns worth showing, and how to render its identifiers.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::export::{stringify_value, ExportColumn, Record};
use crate::ids;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Users,
    Machines,
    Products,
    Orders,
    Campaigns,
    Coupons,
    Vouchers,
    Categories,
    Feedback,
    ActivityLogs,
    Notifications,
    Sessions,
}

/// How a column's values are rendered in tables and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Money,
    DateTime,
    Flag,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
    /// Relative width in the table.
    pub width: u16,
}

const fn col(key: &'static str, label: &'static str, kind: ColumnKind, width: u16) -> ColumnSpec {
    ColumnSpec {
        key,
        label,
        kind,
        width,
    }
}

use self::ColumnKind::{DateTime as Date, Flag, Money, Text};

impl Entity {
    pub const ALL: [Entity; 12] = [
        Entity::Users,
        Entity::Machines,
        Entity::Products,
        Entity::Orders,
        Entity::Campaigns,
        Entity::Coupons,
        Entity::Vouchers,
        Entity::Categories,
        Entity::Feedback,
        Entity::ActivityLogs,
        Entity::Notifications,
        Entity::Sessions,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Entity::Users => "Users",
            Entity::Machines => "Machines",
            Entity::Products => "Products",
            Entity::Orders => "Orders",
            Entity::Campaigns => "Campaigns",
            Entity::Coupons => "Coupons",
            Entity::Vouchers => "Vouchers",
            Entity::Categories => "Categories",
            Entity::Feedback => "Feedback",
            Entity::ActivityLogs => "Activity Logs",
            Entity::Notifications => "Notifications",
            Entity::Sessions => "Sessions",
        }
    }

    /// API path segment, also used as the console route.
    pub fn path(self) -> &'static str {
        match self {
            Entity::Users => "users",
            Entity::Machines => "machines",
            Entity::Products => "products",
            Entity::Orders => "orders",
            Entity::Campaigns => "campaigns",
            Entity::Coupons => "coupons",
            Entity::Vouchers => "vouchers",
            Entity::Categories => "categories",
            Entity::Feedback => "feedback",
            Entity::ActivityLogs => "activity-logs",
            Entity::Notifications => "notifications",
            Entity::Sessions => "sessions",
        }
    }

    /// Key of the row array inside a paginated response's `data` object.
    pub fn plural_key(self) -> &'static str {
        match self {
            Entity::ActivityLogs => "activityLogs",
            other => other.path(),
        }
    }

    pub fn route(self) -> String {
        format!("/{}", self.path())
    }

    pub fn from_route(route: &str) -> Option<Self> {
        let path = route.trim_start_matches('/');
        Entity::ALL.into_iter().find(|e| e.path() == path)
    }

    /// Status vocabulary for the status filter; empty when not filterable.
    pub fn statuses(self) -> &'static [&'static str] {
        match self {
            Entity::Users => &["active", "inactive", "suspended"],
            Entity::Machines => &["online", "offline", "maintenance"],
            Entity::Products => &["active", "inactive"],
            Entity::Orders => &["pending", "paid", "completed", "cancelled", "refunded"],
            Entity::Campaigns => &["draft", "active", "ended"],
            Entity::Coupons => &["active", "expired", "disabled"],
            Entity::Vouchers => &["active", "redeemed", "expired"],
            Entity::Feedback => &["open", "in_progress", "resolved"],
            Entity::Notifications => &["unread", "read"],
            Entity::Sessions => &["active", "revoked"],
            Entity::Categories | Entity::ActivityLogs => &[],
        }
    }

    /// Whether the list endpoint returns a bare array that is paginated locally.
    pub fn client_paginated(self) -> bool {
        matches!(self, Entity::Categories | Entity::Sessions)
    }

    pub fn supports_bulk_delete(self) -> bool {
        !matches!(self, Entity::ActivityLogs | Entity::Sessions)
    }

    pub fn columns(self) -> &'static [ColumnSpec] {
        match self {
            Entity::Users => USERS_COLUMNS,
            Entity::Machines => MACHINES_COLUMNS,
            Entity::Products => PRODUCTS_COLUMNS,
            Entity::Orders => ORDERS_COLUMNS,
            Entity::Campaigns => CAMPAIGNS_COLUMNS,
            Entity::Coupons => COUPONS_COLUMNS,
            Entity::Vouchers => VOUCHERS_COLUMNS,
            Entity::Categories => CATEGORIES_COLUMNS,
            Entity::Feedback => FEEDBACK_COLUMNS,
            Entity::ActivityLogs => ACTIVITY_LOGS_COLUMNS,
            Entity::Notifications => NOTIFICATIONS_COLUMNS,
            Entity::Sessions => SESSIONS_COLUMNS,
        }
    }

    /// Readable id for a row.
    pub fn display_id(self, record: &Record) -> String {
        let id = record_id(record);
        let field = |key: &str| record.get(key).and_then(Value::as_str).map(str::to_string);
        match self {
            Entity::Users => ids::format_user_id(&id),
            Entity::Machines => ids::format_machine_id(&id, field("tag").as_deref()),
            Entity::Products => ids::format_product_id(&id),
            Entity::Orders => ids::format_order_reference(&id, field("reference").as_deref()),
            Entity::Feedback => ids::format_feedback_id(&id),
            Entity::Campaigns => ids::format_id(&id, "CMP"),
            Entity::Coupons => ids::format_id(&id, "CPN"),
            Entity::Vouchers => ids::format_id(&id, "VCH"),
            Entity::Categories => ids::format_id(&id, "CAT"),
            Entity::ActivityLogs => ids::format_id(&id, "LOG"),
            Entity::Notifications => ids::format_id(&id, "NTF"),
            Entity::Sessions => ids::format_id(&id, "SES"),
        }
    }

    /// Export projection: raw id first, then the table columns.
    pub fn export_columns(self) -> Vec<ExportColumn> {
        let mut columns = vec![ExportColumn::new("id", "ID")];
        columns.extend(self.columns().iter().map(|spec| {
            let column = ExportColumn::new(spec.key, spec.label);
            match spec.kind {
                ColumnKind::Text => column,
                ColumnKind::Money => column.with_format(format_money),
                ColumnKind::DateTime => column.with_format(format_datetime),
                ColumnKind::Flag => column.with_format(format_flag),
            }
        }));
        columns
    }
}

const USERS_COLUMNS: &[ColumnSpec] = &[
    col("name", "Name", Text, 20),
    col("email", "Email", Text, 28),
    col("role", "Role", Text, 10),
    col("status", "Status", Text, 10),
    col("createdAt", "Joined", Date, 16),
];

const MACHINES_COLUMNS: &[ColumnSpec] = &[
    col("name", "Name", Text, 20),
    col("location", "Location", Text, 26),
    col("status", "Status", Text, 12),
    col("lastSeenAt", "Last Seen", Date, 16),
];

const PRODUCTS_COLUMNS: &[ColumnSpec] = &[
    col("name", "Name", Text, 24),
    col("category", "Category", Text, 14),
    col("price", "Price", Money, 10),
    col("stock", "Stock", Text, 8),
    col("status", "Status", Text, 10),
];

const ORDERS_COLUMNS: &[ColumnSpec] = &[
    col("customerName", "Customer", Text, 20),
    col("machineName", "Machine", Text, 16),
    col("totalAmount", "Total", Money, 10),
    col("status", "Status", Text, 12),
    col("createdAt", "Placed", Date, 16),
];

const CAMPAIGNS_COLUMNS: &[ColumnSpec] = &[
    col("name", "Name", Text, 24),
    col("status", "Status", Text, 10),
    col("startDate", "Starts", Date, 16),
    col("endDate", "Ends", Date, 16),
];

const COUPONS_COLUMNS: &[ColumnSpec] = &[
    col("code", "Code", Text, 14),
    col("discount", "Discount", Text, 10),
    col("usageCount", "Used", Text, 8),
    col("status", "Status", Text, 10),
    col("expiresAt", "Expires", Date, 16),
];

const VOUCHERS_COLUMNS: &[ColumnSpec] = &[
    col("code", "Code", Text, 14),
    col("value", "Value", Money, 10),
    col("status", "Status", Text, 10),
    col("expiresAt", "Expires", Date, 16),
];

const CATEGORIES_COLUMNS: &[ColumnSpec] = &[
    col("name", "Name", Text, 20),
    col("description", "Description", Text, 36),
    col("productCount", "Products", Text, 10),
];

const FEEDBACK_COLUMNS: &[ColumnSpec] = &[
    col("subject", "Subject", Text, 28),
    col("rating", "Rating", Text, 8),
    col("status", "Status", Text, 12),
    col("createdAt", "Received", Date, 16),
];

const ACTIVITY_LOGS_COLUMNS: &[ColumnSpec] = &[
    col("actor", "Actor", Text, 18),
    col("action", "Action", Text, 28),
    col("resource", "Resource", Text, 16),
    col("createdAt", "When", Date, 16),
];

const NOTIFICATIONS_COLUMNS: &[ColumnSpec] = &[
    col("title", "Title", Text, 30),
    col("type", "Type", Text, 12),
    col("read", "Read", Flag, 6),
    col("createdAt", "Sent", Date, 16),
];

const SESSIONS_COLUMNS: &[ColumnSpec] = &[
    col("userEmail", "User", Text, 24),
    col("ipAddress", "IP", Text, 16),
    col("userAgent", "Agent", Text, 24),
    col("lastActiveAt", "Last Active", Date, 16),
];

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// The row identifier as a string, accepting `id` or `_id`.
pub fn record_id(record: &Record) -> String {
    record
        .get("id")
        .or_else(|| record.get("_id"))
        .map(stringify_value)
        .unwrap_or_default()
}

pub fn format_money(value: &Value) -> String {
    match value {
        Value::Number(n) => n.as_f64().map(|f| format!("{:.2}", f)).unwrap_or_default(),
        Value::String(s) => s
            .parse::<f64>()
            .map(|f| format!("{:.2}", f))
            .unwrap_or_else(|_| s.clone()),
        other => stringify_value(other),
    }
}

/// RFC 3339 timestamps become `YYYY-MM-DD HH:MM` (UTC); other values pass through.
pub fn format_datetime(value: &Value) -> String {
    match value.as_str() {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| s.to_string()),
        None => stringify_value(value),
    }
}

pub fn format_flag(value: &Value) -> String {
    match value {
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        other => stringify_value(other),
    }
}

/// Cell text for a table column.
pub fn format_cell(spec: &ColumnSpec, record: &Record) -> String {
    let value = record.get(spec.key).unwrap_or(&Value::Null);
    match spec.kind {
        ColumnKind::Text => stringify_value(value),
        ColumnKind::Money => format_money(value),
        ColumnKind::DateTime => format_datetime(value),
        ColumnKind::Flag => format_flag(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_routes_round_trip() {
        for entity in Entity::ALL {
            assert_eq!(Entity::from_route(&entity.route()), Some(entity));
        }
        assert_eq!(Entity::from_route("/dashboard"), None);
    }

    #[test]
    fn test_display_id_per_entity() {
        let user = record(json!({"id": "abcdef1234567890"}));
        assert_eq!(Entity::Users.display_id(&user), "USR-ABCDEF12");

        let machine = record(json!({"id": "8a4b2c1d-e5f6-47a8-9b1c-2d3e4f5a6b7c", "tag": "VM001"}));
        assert_eq!(Entity::Machines.display_id(&machine), "VM001");

        let order = record(json!({"_id": "feedface1234"}));
        assert_eq!(Entity::Orders.display_id(&order), "ORD-FEEDFACE");

        let coupon = record(json!({"id": 42}));
        assert_eq!(Entity::Coupons.display_id(&coupon), "42");
    }

    #[test]
    fn test_cell_formatting() {
        assert_eq!(format_money(&json!(3)), "3.00");
        assert_eq!(format_money(&json!("4.5")), "4.50");
        assert_eq!(format_datetime(&json!("2024-03-01T10:15:00+02:00")), "2024-03-01 08:15");
        assert_eq!(format_datetime(&json!("yesterday")), "yesterday");
        assert_eq!(format_flag(&json!(true)), "Yes");
    }

    #[test]
    fn test_export_columns_start_with_id() {
        let columns = Entity::Products.export_columns();
        assert_eq!(columns[0].label, "ID");
        assert_eq!(columns.len(), Entity::Products.columns().len() + 1);
        let price = columns.iter().find(|c| c.key == "price").unwrap();
        let format = price.format.as_ref().unwrap();
        assert_eq!(format(&json!(1.5)), "1.50");
    }
}
