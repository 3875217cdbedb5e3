//! Scaling a yearly income to arbitrary spans of days

use chrono::NaiveDate;

use crate::lib::entry::Dataset;

/// Income earned over a year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Income {
    pub annual: f64,
}

impl Income {
    pub fn from_annual(annual: f64) -> Self {
        Self { annual }
    }

    pub fn monthly(&self) -> f64 {
        self.annual / 12.0
    }

    /// Paycheck received each week, as seen by the savings curve:
    /// twelve months of income spread over 52 weeks
    pub fn weekly_payment(&self) -> f64 {
        self.annual / 52.0
    }
}

/// Share of `annual` earned over `period_days` days, on a 365-day year
pub fn prorate(period_days: i64, annual: f64) -> f64 {
    period_days as f64 * annual / 365.0
}

/// Income earned over the span of `dataset`
///
/// Both day counts exclude their end: the data span is `max - min`
/// and the year is `Dec 31 - Jan 1`, i.e. 364 or 365 days.
pub fn estimated_income_after_tax(dataset: &Dataset, year: i32, income: Income) -> f64 {
    let days_this_year = match (
        NaiveDate::from_ymd_opt(year, 12, 31),
        NaiveDate::from_ymd_opt(year, 1, 1),
    ) {
        (Some(last), Some(first)) => (last - first).num_days(),
        _ => 364,
    };
    dataset.exclusive_days() as f64 / days_this_year as f64 * income.annual
}
