//! Short, human readable display tokens for opaque identifiers.
//!
//! Every formatter treats an empty id as missing and renders `N/A`.

use uuid::Uuid;

/// Number of characters kept when shortening an id.
pub const DEFAULT_ID_LENGTH: usize = 8;

/// Placeholder for a missing identifier.
pub const MISSING_ID: &str = "N/A";

/// Uppercased prefix of `id`, `len` characters long.
pub fn short_id(id: &str, len: usize) -> String {
    if id.is_empty() {
        return MISSING_ID.to_string();
    }
    id.chars().take(len).collect::<String>().to_uppercase()
}

/// True for the canonical hyphenated form `8-4-4-4-12`, hex digits only.
pub fn is_uuid(value: &str) -> bool {
    // Uuid::try_parse also accepts simple, braced and urn forms; at exactly
    // 36 characters only the hyphenated form parses.
    value.len() == 36 && Uuid::try_parse(value).is_ok()
}

/// Prefixes and shortens UUIDs; anything else is assumed readable already.
pub fn format_id(id: &str, prefix: &str) -> String {
    if id.is_empty() {
        return MISSING_ID.to_string();
    }
    if is_uuid(id) {
        format!("{}-{}", prefix, short_id(id, DEFAULT_ID_LENGTH))
    } else {
        id.to_string()
    }
}

fn prefixed(prefix: &str, id: &str) -> String {
    if id.is_empty() {
        return MISSING_ID.to_string();
    }
    format!("{}-{}", prefix, short_id(id, DEFAULT_ID_LENGTH))
}

pub fn format_user_id(id: &str) -> String {
    prefixed("USR", id)
}

pub fn format_feedback_id(id: &str) -> String {
    prefixed("FDB", id)
}

/// Machines usually carry a readable tag (e.g. `VM001`); prefer it.
pub fn format_machine_id(id: &str, tag: Option<&str>) -> String {
    match tag {
        Some(tag) if !tag.is_empty() => tag.to_string(),
        _ => prefixed("MCH", id),
    }
}

/// Short product ids pass through; long ones lose a `prod_` prefix first.
pub fn format_product_id(id: &str) -> String {
    if id.is_empty() {
        return MISSING_ID.to_string();
    }
    if id.chars().count() <= DEFAULT_ID_LENGTH {
        return id.to_string();
    }
    let stripped = id.strip_prefix("prod_").unwrap_or(id);
    prefixed("PRD", stripped)
}

/// Uses the order's own reference number when it has one.
pub fn format_order_reference(id: &str, reference: Option<&str>) -> String {
    match reference {
        Some(reference) if !reference.is_empty() => reference.to_string(),
        _ => prefixed("ORD", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("abcdef1234567890", 8), "ABCDEF12");
        assert_eq!(short_id("abc", 8), "ABC");
        assert_eq!(short_id("abcdef", 4), "ABCD");
        assert_eq!(short_id("", 8), "N/A");
    }

    #[test]
    fn test_is_uuid() {
        assert!(is_uuid("8a4b2c1d-e5f6-47a8-9b1c-2d3e4f5a6b7c"));
        assert!(is_uuid("8A4B2C1D-E5F6-47A8-9B1C-2D3E4F5A6B7C"));
        assert!(!is_uuid("not-a-uuid"));
        assert!(!is_uuid("8a4b2c1de5f647a89b1c2d3e4f5a6b7c"));
        assert!(!is_uuid("{8a4b2c1d-e5f6-47a8-9b1c-2d3e4f5a6b7c}"));
        assert!(!is_uuid("8a4b2c1d-e5f6-47a8-9b1c-2d3e4f5a6b7g"));
        assert!(!is_uuid(""));
    }

    #[test]
    fn test_format_id() {
        assert_eq!(
            format_id("8a4b2c1d-e5f6-47a8-9b1c-2d3e4f5a6b7c", "USR"),
            "USR-8A4B2C1D"
        );
        assert_eq!(format_id("VM-042", "MCH"), "VM-042");
        assert_eq!(format_id("", "MCH"), "N/A");
    }

    #[test]
    fn test_entity_formatters() {
        assert_eq!(format_user_id("abcdef1234567890"), "USR-ABCDEF12");
        assert_eq!(format_feedback_id("1234abcd5678"), "FDB-1234ABCD");
        assert_eq!(format_user_id(""), "N/A");
    }

    #[test]
    fn test_machine_tag_wins() {
        assert_eq!(
            format_machine_id("8a4b2c1d-e5f6-47a8-9b1c-2d3e4f5a6b7c", Some("VM001")),
            "VM001"
        );
        assert_eq!(format_machine_id("deadbeefcafe", Some("")), "MCH-DEADBEEF");
        assert_eq!(format_machine_id("deadbeefcafe", None), "MCH-DEADBEEF");
    }

    #[test]
    fn test_product_ids() {
        assert_eq!(format_product_id("P-001"), "P-001");
        assert_eq!(format_product_id("prod_9f8e7d6c5b4a"), "PRD-9F8E7D6C");
        assert_eq!(format_product_id("a1b2c3d4e5f6"), "PRD-A1B2C3D4");
        assert_eq!(format_product_id(""), "N/A");
    }

    #[test]
    fn test_order_reference() {
        assert_eq!(format_order_reference("abc", Some("ORD-2024-0001")), "ORD-2024-0001");
        assert_eq!(format_order_reference("feedface1234", None), "ORD-FEEDFACE");
        assert_eq!(format_order_reference("", None), "N/A");
    }
}
