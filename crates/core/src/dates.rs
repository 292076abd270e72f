//! Calendar and day-count helpers shared by the metrics and prediction
//! engines.
//!
//! Every "days between two instants" figure in the crate goes through
//! [`days_between`] so that the aggregator and the predictor agree on
//! rounding.

use chrono::{Datelike, Duration, NaiveDate};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Milliseconds in one day.
pub const MS_PER_DAY: i64 = 86_400_000;

// ---------------------------------------------------------------------------
// Day arithmetic
// ---------------------------------------------------------------------------

/// Whole days from `from` to `to`, rounded towards positive infinity.
///
/// A partial day counts as a full day, so a project started yesterday
/// afternoon has been running for one day this morning. Negative spans
/// round towards zero (e.g. -1.5 days -> -1).
pub fn days_between(from: Timestamp, to: Timestamp) -> i64 {
    let ms = (to - from).num_milliseconds();
    -((-ms).div_euclid(MS_PER_DAY))
}

/// Add a whole number of days to a timestamp.
pub fn add_days(ts: Timestamp, days: i64) -> Timestamp {
    ts + Duration::days(days)
}

/// Round to the nearest integer, with exact halves rounding up.
///
/// `f64::round` rounds halves away from zero; reporting figures use
/// round-half-up so that `-2.5` becomes `-2`.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// `round(100 * part / whole)`, or 0 when `whole` is zero.
pub fn percentage(part: i64, whole: i64) -> i64 {
    if whole <= 0 {
        return 0;
    }
    round_half_up(100.0 * part as f64 / whole as f64)
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

// ---------------------------------------------------------------------------
// Calendar months
// ---------------------------------------------------------------------------

/// A half-open calendar month `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl MonthWindow {
    /// The calendar month containing `ts`.
    pub fn containing(ts: Timestamp) -> Self {
        Self::shifted(ts, 0)
    }

    /// The calendar month `offset` months away from the one containing `ts`
    /// (negative offsets go back in time).
    pub fn shifted(ts: Timestamp, offset: i32) -> Self {
        let (year, month) = shift_month(ts.year(), ts.month(), offset);
        let (next_year, next_month) = shift_month(year, month, 1);
        Self {
            start: first_of_month(year, month),
            end: first_of_month(next_year, next_month),
        }
    }

    /// Whether `ts` falls inside this month.
    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start && ts < self.end
    }

    /// Short month label, e.g. `"Oct 2026"`.
    pub fn label(&self) -> String {
        self.start.format("%b %Y").to_string()
    }
}

/// The `count` calendar months ending with the one containing `now`,
/// oldest first.
pub fn trailing_months(now: Timestamp, count: usize) -> Vec<MonthWindow> {
    (0..count)
        .rev()
        .map(|back| MonthWindow::shifted(now, -(back as i32)))
        .collect()
}

fn shift_month(year: i32, month: u32, offset: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + offset;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn first_of_month(year: i32, month: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
        .and_utc()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
