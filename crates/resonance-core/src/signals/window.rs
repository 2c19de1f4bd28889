//! Window Engine: date parsing and the current/prior 30-day split.
//!
//! Bounds are inclusive and day-granular; time-of-day is discarded at parse
//! time. Rows with unparseable dates are excluded from windowed aggregation
//! but still receive article-level signals.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::schema::SchemaMap;
use crate::table::Table;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M:%S"];

/// Parse a date cell through the accepted formats, most specific first.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Parse the date column for every row. Emits a single warning covering all
/// unparseable cells.
pub fn parse_dates(table: &Table, schema: &SchemaMap) -> Vec<Option<NaiveDate>> {
    let Some(date_column) = schema.date.as_deref() else {
        return vec![None; table.len()];
    };

    let dates: Vec<Option<NaiveDate>> = (0..table.len())
        .map(|row| table.value(row, date_column).and_then(parse_date))
        .collect();

    let unparseable = dates.iter().filter(|d| d.is_none()).count();
    if unparseable > 0 {
        warn!(
            target: "resonance::signals",
            "{unparseable} row(s) with unparseable dates excluded from windowed aggregation"
        );
    }
    dates
}

// ============================================================================
// WINDOW SPLIT
// ============================================================================

/// An inclusive day-granularity date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowBounds {
    /// First day in the window
    pub start: NaiveDate,
    /// Last day in the window
    pub end: NaiveDate,
}

impl WindowBounds {
    /// Whether a date falls inside the window.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// The current and prior windows relative to `as_of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSplit {
    /// `[as_of - (window - 1), as_of]`
    pub current: WindowBounds,
    /// `[as_of - (2*window - 1), as_of - window]`
    pub prior: WindowBounds,
}

impl WindowSplit {
    /// Row indices whose date falls in the current window.
    pub fn current_rows(&self, dates: &[Option<NaiveDate>]) -> Vec<usize> {
        rows_in(dates, &self.current)
    }

    /// Row indices whose date falls in the prior window.
    pub fn prior_rows(&self, dates: &[Option<NaiveDate>]) -> Vec<usize> {
        rows_in(dates, &self.prior)
    }
}

fn rows_in(dates: &[Option<NaiveDate>], bounds: &WindowBounds) -> Vec<usize> {
    dates
        .iter()
        .enumerate()
        .filter_map(|(row, date)| match date {
            Some(d) if bounds.contains(*d) => Some(row),
            _ => None,
        })
        .collect()
}

/// Split the dated rows into current and prior windows.
///
/// `as_of` defaults to the maximum parseable date; returns `None` when no row
/// has a parseable date and no explicit anchor was given.
pub fn split_windows(
    dates: &[Option<NaiveDate>],
    as_of: Option<NaiveDate>,
    window_days: i64,
) -> Option<WindowSplit> {
    let anchor = as_of.or_else(|| dates.iter().flatten().max().copied())?;
    let current_start = anchor - Duration::days(window_days - 1);
    let prior_end = current_start - Duration::days(1);
    let prior_start = current_start - Duration::days(window_days);

    let split = WindowSplit {
        current: WindowBounds {
            start: current_start,
            end: anchor,
        },
        prior: WindowBounds {
            start: prior_start,
            end: prior_end,
        },
    };
    debug!(
        target: "resonance::signals",
        "window split: current {}..={}, prior {}..={}",
        split.current.start, split.current.end, split.prior.start, split.prior.end
    );
    Some(split)
}

// ============================================================================
// TESTS
// ============================================================================
