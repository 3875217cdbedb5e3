//! Calendar windows over irregular transaction dates
//!
//! A window is the half-open range `[start, start + period)`, where the period
//! is either a week or a calendar month. Windows are generated strictly forward
//! from the first day of the data and are contiguous.
//!
//! Monthly windows keep their day-of-month across the year, clamped to 28 so
//! that every generated date exists (see `Spacing::next`).

use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;

use crate::lib::entry::{Dataset, Entry};

/// Width of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spacing {
    Week,
    Month,
}

impl Spacing {
    /// Where the first window of a range starting on `date` begins
    pub fn anchor(self, date: NaiveDate) -> NaiveDate {
        match self {
            Spacing::Week => date,
            Spacing::Month => with_day(date.year(), date.month(), date.day().min(28)),
        }
    }

    /// Start of the window directly succeeding the one starting on `date`
    ///
    /// For months the day is carried over unchanged, it is the job of `anchor`
    /// to make sure it is at most 28.
    pub fn next(self, date: NaiveDate) -> NaiveDate {
        match self {
            Spacing::Week => date + Duration::weeks(1),
            Spacing::Month => {
                let (year, month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                with_day(year, month, date.day().min(28))
            }
        }
    }

    /// Exclusive end of the window starting on `start`
    pub fn window_end(self, start: NaiveDate) -> NaiveDate {
        self.next(start)
    }
}

impl fmt::Display for Spacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spacing::Week => write!(f, "week"),
            Spacing::Month => write!(f, "month"),
        }
    }
}

fn with_day(year: i32, month: u32, day: u32) -> NaiveDate {
    // day <= 28 exists in every month
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Starts of the windows covering `min_day ..= max_day`
///
/// Only starts strictly before `max_day` are produced: a window that would
/// begin exactly on `max_day` is dropped, so an entry dated `max_day` may fall
/// outside of every window. When no start is before `max_day` (in particular
/// when `min_day == max_day`) the first start is returned alone.
///
/// # Panics
///
/// If `min_day > max_day`.
pub fn windows(min_day: NaiveDate, max_day: NaiveDate, spacing: Spacing) -> Vec<NaiveDate> {
    assert!(
        min_day <= max_day,
        "window range {}..{} is reversed",
        min_day,
        max_day
    );
    let first = spacing.anchor(min_day);
    let mut starts = Vec::new();
    let mut current = first;
    while current < max_day {
        starts.push(current);
        current = spacing.next(current);
    }
    if starts.is_empty() {
        starts.push(first);
    }
    starts
}

/// Weekly window starts, see `windows`
pub fn weeks(min_day: NaiveDate, max_day: NaiveDate) -> Vec<NaiveDate> {
    windows(min_day, max_day, Spacing::Week)
}

/// Monthly window starts, see `windows`
pub fn months(min_day: NaiveDate, max_day: NaiveDate) -> Vec<NaiveDate> {
    windows(min_day, max_day, Spacing::Month)
}

/// Entries dated in `[min, max)`
pub fn time_filter<'d>(dataset: &'d Dataset, min: NaiveDate, max: NaiveDate) -> Vec<&'d Entry> {
    dataset
        .iter()
        .filter(|e| e.date >= min && e.date < max)
        .collect()
}

/// Split into one dataset per calendar month, chronologically
pub fn by_month(dataset: &Dataset) -> Vec<Dataset> {
    let mut keys = dataset
        .iter()
        .map(|e| (e.date.year(), e.date.month()))
        .collect::<Vec<_>>();
    keys.sort_unstable();
    keys.dedup();
    keys.into_iter()
        .filter_map(|(y, m)| dataset.select(|e| e.date.year() == y && e.date.month() == m))
        .collect()
}

/// Number of days in `month` (1..=12) of `year`
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(first_next)) => (first_next - first).num_days() as u32,
        _ => 30,
    }
}

/// Full English month name, as used for output directories and reports
pub fn month_name(date: NaiveDate) -> String {
    date.format("%B").to_string()
}
