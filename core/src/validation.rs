//! Grammars for labels, property keys, property values and repos.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::{Properties, PropertyValue, ValidationError, ValidationResult};

/// Maximum length of a repo identifier.
pub const MAX_REPO_LEN: usize = 255;

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[A-Za-z][A-Za-z_]{0,254}$").expect("label pattern is valid"))
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new("^[A-Za-z][A-Za-z0-9_]{0,254}$").expect("key pattern is valid")
    })
}

/// Returns true if `label` is a letter followed by up to 254 letters or underscores.
pub fn is_valid_label(label: &str) -> bool {
    label_pattern().is_match(label)
}

/// Returns true if `key` is a letter followed by up to 254 letters, digits or underscores.
pub fn is_valid_property_key(key: &str) -> bool {
    key_pattern().is_match(key)
}

/// Returns true if a raw JSON value is a boolean, a finite number, a string,
/// or a non-empty array whose items all share one of those types.
pub fn is_valid_property_value(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Bool(_) | Value::String(_) => true,
        Value::Number(n) => n.as_f64().is_some_and(f64::is_finite),
        Value::Array(items) => match items.first() {
            None => false,
            Some(Value::Bool(_)) => items.iter().all(Value::is_boolean),
            Some(Value::String(_)) => items.iter().all(Value::is_string),
            Some(Value::Number(_)) => items
                .iter()
                .all(|item| item.as_f64().is_some_and(f64::is_finite)),
            Some(_) => false,
        },
        Value::Null | Value::Object(_) => false,
    }
}

/// Returns true if `repo` has between 1 and 255 characters.
pub fn is_valid_repo(repo: &str) -> bool {
    let len = repo.chars().count();
    (1..=MAX_REPO_LEN).contains(&len)
}

/// Check a label, failing with `Invalid Label`.
pub fn check_label(label: &str) -> ValidationResult<()> {
    if is_valid_label(label) {
        Ok(())
    } else {
        Err(ValidationError::InvalidLabel)
    }
}

/// Check a property key, failing with `Invalid Key`.
pub fn check_property_key(key: &str) -> ValidationResult<()> {
    if is_valid_property_key(key) {
        Ok(())
    } else {
        Err(ValidationError::InvalidKey)
    }
}

/// Check a typed property value, failing with `Invalid Value`.
pub fn check_property_value(value: &PropertyValue) -> ValidationResult<()> {
    if value.is_valid() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue)
    }
}

/// Check every key and value of a property map. Keys are checked before values.
pub fn check_properties(props: &Properties) -> ValidationResult<()> {
    for (key, value) in props {
        check_property_key(key)?;
        check_property_value(value)?;
    }
    Ok(())
}

/// Check a repo identifier, failing with `Invalid Repo`.
pub fn check_repo(repo: &str) -> ValidationResult<()> {
    if is_valid_repo(repo) {
        Ok(())
    } else {
        Err(ValidationError::InvalidRepo)
    }
}
