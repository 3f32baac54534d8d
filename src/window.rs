//! Inclusive calendar date windows for filtering listing items.
//!
//! The upstream listing carries creation timestamps as locale-formatted
//! strings. A [`DateWindow`] parses them leniently and answers whether the
//! item falls inside a caller-supplied `[start, end]` range. Unparsable
//! timestamps are out-of-window, never errors: the window is a filter, not a
//! validator.

use crate::error::ScrapeError;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

/// Timestamp formats the upstream has been observed to use, tried in order.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%b %d %Y %I:%M:%S %p",
    "%b %d, %Y %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

/// Date-only fallbacks for items whose timestamp omits the time part.
const DATE_FORMATS: [&str; 3] = ["%b %d %Y", "%Y-%m-%d", "%m/%d/%Y"];

/// An inclusive `[start, end]` pair of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Build a window from explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidWindow`] when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScrapeError> {
        if start > end {
            return Err(ScrapeError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The default window: the `days` most recent days, ending today.
    pub fn last_days(days: i64) -> Self {
        let end = Local::now().date_naive();
        let start = end - Duration::days(days.saturating_sub(1).max(0));
        Self { start, end }
    }

    /// Start of the window.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// End of the window.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether a parsed date falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether an item's raw creation timestamp falls inside the window.
    ///
    /// Absent or unparsable timestamps are treated as out-of-window.
    pub fn contains_str(&self, raw: Option<&str>) -> bool {
        match raw.and_then(parse_lenient) {
            Some(date) => self.contains(date),
            None => false,
        }
    }
}

/// Parse an upstream timestamp string into a calendar date, leniently.
///
/// Tries the known datetime formats first, then date-only forms, then
/// RFC 3339. Returns `None` rather than an error for anything unrecognized.
pub fn parse_lenient(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}
