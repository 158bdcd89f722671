//! Identifier rules shared by type names and field names.
//!
//! Names end up inside SQL JSON paths, so anything outside
//! `[A-Za-z_][A-Za-z0-9_]*` is rejected before it reaches storage.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid name regex"));

/// Field name holding the document identity.
pub const ID_FIELD: &str = "id";
/// Field name holding the soft-delete timestamp.
pub const DELETED_FIELD: &str = "deleted";

/// Returns whether `value` is a usable type or field name.
pub fn is_valid_name(value: &str) -> bool {
    NAME_RE.is_match(value)
}

/// Returns whether `value` is one of the names owned by the core.
pub fn is_reserved_field(value: &str) -> bool {
    value == ID_FIELD || value == DELETED_FIELD
}
