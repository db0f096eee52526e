//! Date-pattern helpers.
//!
//! Patterns use the chrono strftime dialect (`%Y-%m-%d %H:%M:%S`). A value
//! matches a pattern when it parses as a datetime, a bare date, or a bare
//! time under that pattern.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Check whether a string conforms to a date pattern.
///
/// # Examples
///
/// ```
/// use jdocs_util::dates::matches_pattern;
///
/// assert!(matches_pattern("2024-01-31", "%Y-%m-%d"));
/// assert!(matches_pattern("2024-01-31 08:30:00", "%Y-%m-%d %H:%M:%S"));
/// assert!(!matches_pattern("31/01/2024", "%Y-%m-%d"));
/// assert!(!matches_pattern("2024-13-01", "%Y-%m-%d"));
/// ```
pub fn matches_pattern(s: &str, pattern: &str) -> bool {
    NaiveDateTime::parse_from_str(s, pattern).is_ok()
        || NaiveDate::parse_from_str(s, pattern).is_ok()
        || NaiveTime::parse_from_str(s, pattern).is_ok()
}

/// Parse a timestamp string under a pattern.
///
/// A bare date is promoted to midnight so callers always get a full
/// datetime back.
pub fn parse_timestamp(s: &str, pattern: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, pattern)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Format a timestamp under a pattern.
pub fn format_timestamp(ts: &NaiveDateTime, pattern: &str) -> String {
    ts.format(pattern).to_string()
}
