//! Date normalization for the loosely formatted timestamps found in studio exports.
//!
//! Two shapes show up in practice:
//! - ISO-8601 with a literal `T`: `2025-09-30T23:18:14.368Z`
//! - localized: `2025-09-30, 6:49 PM`
//!
//! Instants are compared by calendar year and month only. An explicit offset
//! (`Z`, `+02:00`) is dropped and the wall-clock fields are kept as written,
//! so the exporting system's local time is assumed to be the viewer's.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// A parsed timestamp with no timezone attached.
pub type CanonicalInstant = NaiveDateTime;

// A trailing literal `Z` is dropped like any other offset.
const ISO_NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%MZ",
];

const ISO_OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%d %I:%M %p",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
];

const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse an export timestamp. Empty or unrecognized text yields None,
/// and callers leave such rows out of every month bucket.
pub fn parse_date(text: &str) -> Option<CanonicalInstant> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.contains('T') {
        return parse_iso(text);
    }

    let cleaned = text.replace(", ", " ");
    parse_local(&cleaned)
}

fn parse_iso(text: &str) -> Option<CanonicalInstant> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    ISO_OFFSET_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(text, f).ok())
        .map(|dt| dt.naive_local())
        .or_else(|| {
            ISO_NAIVE_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        })
}

fn parse_local(text: &str) -> Option<CanonicalInstant> {
    LOCAL_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| {
            DATE_ONLY_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// True iff the instant falls in zero-indexed `month` of `year`.
pub fn is_in_month(instant: &CanonicalInstant, month: u32, year: i32) -> bool {
    instant.year() == year && instant.month0() == month
}

/// True iff the instant falls in `start_month`, `start_month + 1` or
/// `start_month + 2` of `year`. There is no wraparound: months past
/// December never match, so callers pick a start that fits in the year.
pub fn is_in_three_month_window(instant: &CanonicalInstant, start_month: u32, year: i32) -> bool {
    let month = instant.month0();
    instant.year() == year && month >= start_month && month <= start_month + 2
}
