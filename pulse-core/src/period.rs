//! Month buckets: the (year, zero-indexed month) unit every aggregation is keyed on.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::is_in_month;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Resolve a full English month name ("September") to its zero-indexed number.
pub fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32)
}

/// A calendar month. `month` is zero-indexed (January = 0).
///
/// Ordering is chronological. `Display` renders the `"{year}-{month}"` key
/// the target tables were originally published with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawMonthBucket")]
pub struct MonthBucket {
    pub(crate) year: i32,
    pub(crate) month: u32,
}

#[derive(Deserialize)]
struct RawMonthBucket {
    year: i32,
    month: u32,
}

impl TryFrom<RawMonthBucket> for MonthBucket {
    type Error = String;

    fn try_from(raw: RawMonthBucket) -> Result<Self, Self::Error> {
        MonthBucket::new(raw.year, raw.month)
            .ok_or_else(|| format!("no month bucket for year {} month {}", raw.year, raw.month))
    }
}

/// True when every day of `year` and of its neighbours is a valid `NaiveDate`,
/// so trailing windows and the comparison month stay representable.
pub fn is_supported_year(year: i32) -> bool {
    year > NaiveDate::MIN.year() && year < NaiveDate::MAX.year()
}

impl MonthBucket {
    /// Returns None when `month` is outside 0..=11 or the year is not supported.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (month < 12 && is_supported_year(year)).then_some(Self { year, month })
    }

    pub fn of(instant: &NaiveDateTime) -> Self {
        Self {
            year: instant.year(),
            month: instant.month0(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Zero-indexed
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Shift by a signed number of months, rolling the year over as needed.
    pub fn offset(self, months: i32) -> Self {
        let total = i64::from(self.year) * 12 + i64::from(self.month) + i64::from(months);
        // |total| / 12 stays well inside i32 for any i32 year and month shift.
        Self {
            year: total.div_euclid(12) as i32,
            month: total.rem_euclid(12) as u32,
        }
    }

    pub fn previous(self) -> Self {
        self.offset(-1)
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[self.month as usize]
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.offset(1);
        NaiveDate::from_ymd_opt(next.year, next.month + 1, 1)
            .and_then(|first| first.pred_opt())
            .map(|last| last.day())
            // Only December can lack a representable successor.
            .unwrap_or(31)
    }

    pub fn contains(&self, instant: &NaiveDateTime) -> bool {
        is_in_month(instant, self.month, self.year)
    }

    /// `count` consecutive buckets ending at (and including) this one, oldest first.
    pub fn trailing(self, count: u32) -> impl Iterator<Item = MonthBucket> {
        (0..count as i32).rev().map(move |back| self.offset(-back))
    }

    pub fn trailing_window(self, months: u32) -> TrailingWindow {
        TrailingWindow { end: self, months }
    }

    /// "September 2025"
    pub fn long_label(&self) -> String {
        format!("{} {}", self.name(), self.year)
    }

    /// Chart axis label relative to the selected year:
    /// "March" in the selected year, "March..." one year before, "March '23" otherwise.
    pub fn chart_label(&self, selected_year: i32) -> String {
        if self.year == selected_year {
            self.name().to_string()
        } else if i64::from(self.year) == i64::from(selected_year) - 1 {
            format!("{}...", self.name())
        } else {
            format!("{} '{:02}", self.name(), self.year.rem_euclid(100))
        }
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

/// The last `months` buckets ending at `end`, inclusive.
///
/// Membership is checked bucket by bucket, so a window that crosses
/// a year boundary (Nov, Dec, Jan) covers all of its months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailingWindow {
    end: MonthBucket,
    months: u32,
}

impl TrailingWindow {
    pub fn start(&self) -> MonthBucket {
        self.end.offset(1 - self.months as i32)
    }

    pub fn end(&self) -> MonthBucket {
        self.end
    }

    pub fn buckets(&self) -> impl Iterator<Item = MonthBucket> {
        self.end.trailing(self.months)
    }

    pub fn contains(&self, instant: &NaiveDateTime) -> bool {
        let bucket = MonthBucket::of(instant);
        bucket >= self.start() && bucket <= self.end
    }
}
