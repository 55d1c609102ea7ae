// Validation utilities module
// Field extraction helpers for loosely-typed JSON request bodies

use serde_json::Value;

/// Why a single field failed extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIssue {
    /// Missing, `null`, or empty
    Required,
    /// Present but not a JSON string
    TypeMismatch,
}

/// Extracts a required string field without altering it
///
/// An empty string counts as missing. Whitespace is preserved, which is what
/// password fields need.
pub fn required_str(value: Option<&Value>) -> Result<&str, FieldIssue> {
    match value {
        None | Some(Value::Null) => Err(FieldIssue::Required),
        Some(Value::String(s)) if s.is_empty() => Err(FieldIssue::Required),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(FieldIssue::TypeMismatch),
    }
}

/// Extracts a required string field and trims it
///
/// A value that is blank after trimming counts as missing.
pub fn required_trimmed(value: Option<&Value>) -> Result<&str, FieldIssue> {
    let raw = required_str(value)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldIssue::Required);
    }
    Ok(trimmed)
}

/// Checks a length range in characters (not bytes), both bounds inclusive
pub fn length_within(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

/// Normalizes an email for storage and comparison: trimmed, lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates email address grammar
pub fn is_valid_email(email: &str) -> bool {
    validator::validate_email(email)
}
