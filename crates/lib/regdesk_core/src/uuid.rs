//! Record identifiers.
//!
//! Accounts and clients use UUIDv7 generated app-side, so IDs sort in
//! creation order and break ties between rows created in the same instant.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// Parse a path segment into an ID. Malformed input yields `None` so callers
/// can treat it like an unknown ID.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
