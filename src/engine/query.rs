//! Date-text normalization for point-in-time queries.
//!
//! The two original front-ends speak different formats (the form uses
//! ISO-like dates, the menu uses day-month-year), and source files carry
//! midnight timestamps. Everything funnels through one parser that yields
//! the canonical calendar-date key, so the index only ever sees one form.

use chrono::{NaiveDate, NaiveDateTime};

/// Date-only formats, tried first. Order matters: ISO wins ties.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y"];

/// Timestamped forms; the time-of-day is discarded after parsing.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse user- or file-supplied date text into the canonical key.
///
/// Returns `None` when no supported format matches; the caller decides
/// whether that is `InvalidInput` (query) or a load failure (ingest).
pub fn parse_date_input(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// The formats listed in user-facing "bad input" messages.
pub fn supported_formats_hint() -> &'static str {
    "YYYY-MM-DD or DD-MM-YYYY"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn iso_and_day_month_year_parse_to_the_same_key() {
        assert_eq!(parse_date_input("2024-01-02"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date_input("02-01-2024"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date_input("02.01.2024"), Some(d(2024, 1, 2)));
    }

    #[test]
    fn timestamps_normalize_to_the_calendar_day() {
        assert_eq!(
            parse_date_input("2024-01-02 00:00:00"),
            Some(d(2024, 1, 2))
        );
        assert_eq!(
            parse_date_input("2024-01-02T15:30:00"),
            Some(d(2024, 1, 2))
        );
        assert_eq!(
            parse_date_input("2024-01-02T15:30:00.250"),
            Some(d(2024, 1, 2))
        );
    }

    #[test]
    fn whitespace_is_tolerated() {
        assert_eq!(parse_date_input("  2024-01-02  "), Some(d(2024, 1, 2)));
    }

    #[test]
    fn garbage_is_rejected_not_panicked_on() {
        for input in ["", "   ", "not-a-date", "2024-13-01", "99-99-9999", "2024"] {
            assert_eq!(parse_date_input(input), None, "input: {input:?}");
        }
    }
}
