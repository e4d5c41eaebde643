//! Field checks applied before anything is sent to the backend.

use chrono::NaiveDate;

use crate::error::{EngineError, Result};

const WORKSPACE_PREFIXES: [&str; 4] = ["WH", "WS", "DR", "CR"];

fn digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// Canonical workspace id: `WH`, `WS`, `DR` or `CR` followed by three digits (`WS001`).
pub fn is_valid_workspace_id(id: &str) -> bool {
    id.get(..2)
        .zip(id.get(2..))
        .is_some_and(|(prefix, rest)| WORKSPACE_PREFIXES.contains(&prefix) && digits(rest, 3))
}

pub fn is_valid_phone(phone: &str) -> bool {
    digits(phone, 10)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let shaped = input.len() == 10 && input.as_bytes()[4] == b'-' && input.as_bytes()[7] == b'-';
    if !shaped {
        return Err(EngineError::validation("date", format!("'{}' is not YYYY-MM-DD", input)));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|e| EngineError::validation("date", format!("'{}': {}", input, e)))
}

/// Trimmed, non-empty booking purpose.
pub fn require_purpose(purpose: &str) -> Result<&str> {
    let trimmed = purpose.trim();
    if trimmed.is_empty() {
        Err(EngineError::validation("purpose", "purpose is required for booking"))
    } else {
        Ok(trimmed)
    }
}

/// Visitor name must be present and the phone must be ten digits.
pub fn validate_visitor(name: &str, phone: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(EngineError::validation("visitor name", "visitor name is required"));
    }
    if !is_valid_phone(phone) {
        return Err(EngineError::validation("phone", "phone number must be 10 digits"));
    }
    Ok(())
}
