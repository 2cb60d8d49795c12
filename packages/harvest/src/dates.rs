//! Flexible date parsing shared by the admission test and the
//! normalization stage.
//!
//! Sources render dates however they like, so parsing tries a fixed cascade
//! of formats: ISO first, then locale numeric, then long-text forms. Total
//! failure yields `None` — a date that cannot be parsed is an expected miss,
//! never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// ISO and ISO-with-time forms, tried first.
const ISO_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const ISO_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Locale numeric forms, US-style month-first.
const NUMERIC_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%m/%d/%y"];

const NUMERIC_DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M", "%m/%d/%Y %I:%M %p"];

/// Long-text forms. chrono accepts both full and abbreviated month names
/// for `%B`, so these cover "January 5, 2024", "Jan 5, 2024", "5 Jan 2024".
const TEXT_FORMATS: &[&str] = &["%B %d, %Y", "%B %d %Y", "%d %B %Y", "%d %B, %Y"];

/// Parse a raw date string through the format cascade.
///
/// Returns the first format that matches, or `None` when nothing does.
pub fn parse_flexible(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // RFC 3339 timestamps show up in data attributes
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    for format in ISO_FORMATS.iter().chain(NUMERIC_FORMATS).chain(TEXT_FORMATS) {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    for format in ISO_DATETIME_FORMATS.iter().chain(NUMERIC_DATETIME_FORMATS) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_iso_forms() {
        assert_eq!(parse_flexible("2024-01-05"), Some(d("2024-01-05")));
        assert_eq!(parse_flexible("2024/01/05"), Some(d("2024-01-05")));
        assert_eq!(parse_flexible("2024-01-05T14:30:00"), Some(d("2024-01-05")));
        assert_eq!(
            parse_flexible("2024-01-05T14:30:00Z"),
            Some(d("2024-01-05"))
        );
    }

    #[test]
    fn test_numeric_forms() {
        assert_eq!(parse_flexible("01/05/2024"), Some(d("2024-01-05")));
        assert_eq!(parse_flexible("01-05-2024"), Some(d("2024-01-05")));
        assert_eq!(parse_flexible("01/05/2024 2:30 PM"), Some(d("2024-01-05")));
    }

    #[test]
    fn test_text_forms() {
        assert_eq!(parse_flexible("January 5, 2024"), Some(d("2024-01-05")));
        assert_eq!(parse_flexible("Jan 5, 2024"), Some(d("2024-01-05")));
        assert_eq!(parse_flexible("5 Jan 2024"), Some(d("2024-01-05")));
        assert_eq!(parse_flexible("5 January 2024"), Some(d("2024-01-05")));
    }

    #[test]
    fn test_iso_tried_before_numeric() {
        // 2024-01-05 must not be read as month 2024
        assert_eq!(parse_flexible("2024-01-05"), Some(d("2024-01-05")));
    }

    #[test]
    fn test_failure_is_none() {
        assert_eq!(parse_flexible("not a date"), None);
        assert_eq!(parse_flexible(""), None);
        assert_eq!(parse_flexible("   "), None);
        assert_eq!(parse_flexible("13/45/2024"), None);
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(parse_flexible("  2024-01-05  "), Some(d("2024-01-05")));
    }
}
