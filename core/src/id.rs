//! Identity helpers for VGraph elements and commits.
//!
//! Every node, edge and commit is identified by a random UUIDv4 rendered in
//! its canonical hyphenated lowercase form. Ids are plain strings so they
//! travel unchanged through the store and the commit wire format.

use std::sync::OnceLock;

use regex_lite::Regex;
use uuid::Uuid;

use crate::{ValidationError, ValidationResult};

fn uuid_v4_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            "(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$",
        )
        .expect("uuid pattern is valid")
    })
}

/// Generate a fresh random UUIDv4.
pub fn generate_uuid_v4() -> String {
    Uuid::new_v4().to_string()
}

/// Returns true if `id` is a canonical UUIDv4 (case-insensitive).
pub fn is_valid_uuid_v4(id: &str) -> bool {
    uuid_v4_pattern().is_match(id)
}

/// Check an id, failing with `Invalid Id`.
pub fn check_id(id: &str) -> ValidationResult<()> {
    if is_valid_uuid_v4(id) {
        Ok(())
    } else {
        Err(ValidationError::InvalidId)
    }
}
