//! Cumulative balance of weekly paychecks against daily spending

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use crate::lib::{date, entry::Dataset, income::Income, trend::Polynomial};

/// Share of each paycheck the goal curve assumes is put aside
pub const SAVINGS_GOAL: f64 = 0.2;

const TREND_DEGREE: usize = 3;

/// A signed change of balance on a given day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Everything needed to draw the savings chart
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsCurve {
    /// chronological events and the balance right after each
    pub dates: Vec<NaiveDate>,
    pub balance: Vec<f64>,
    /// one point per paycheck
    pub paydays: Vec<NaiveDate>,
    pub expected: Vec<f64>,
    /// fitted balance at each of `dates`, empty if no fit was possible
    pub trend: Vec<f64>,
}

/// Paychecks then per-day spending, stably sorted by date
///
/// Paychecks are inserted first, so on a day with both the paycheck
/// comes before the spending.
pub fn events(combined: &Dataset, income: Income) -> Vec<Event> {
    let mut events = date::weeks(combined.min_date(), combined.max_date())
        .into_iter()
        .map(|date| Event { date, amount: income.weekly_payment() })
        .collect::<Vec<_>>();
    let mut per_day = BTreeMap::<NaiveDate, f64>::new();
    for e in combined {
        *per_day.entry(e.date).or_insert(0.0) += e.price;
    }
    events.extend(per_day.into_iter().map(|(date, spent)| Event { date, amount: -spent }));
    events.sort_by_key(|e| e.date);
    events
}

/// Running balance and goal curve over `combined` (tracked and untracked entries)
///
/// The trend is fitted against the day of the year, so data spanning two
/// years folds onto the same abscissas.
pub fn saved_over_time(combined: &Dataset, income: Income) -> SavingsCurve {
    let paydays = date::weeks(combined.min_date(), combined.max_date());
    let expected = paydays
        .iter()
        .scan(0.0, |acc, _| {
            *acc += income.weekly_payment() * SAVINGS_GOAL;
            Some(*acc)
        })
        .collect();

    let events = events(combined, income);
    let dates = events.iter().map(|e| e.date).collect::<Vec<_>>();
    let balance = events
        .iter()
        .scan(0.0, |acc, e| {
            *acc += e.amount;
            Some(*acc)
        })
        .collect::<Vec<_>>();

    let days_of_year = dates.iter().map(|d| d.ordinal() as f64).collect::<Vec<_>>();
    let trend = match Polynomial::fit(&days_of_year, &balance, TREND_DEGREE) {
        Some(poly) => days_of_year.iter().map(|&x| poly.eval(x)).collect(),
        None => Vec::new(),
    };

    SavingsCurve {
        dates,
        balance,
        paydays,
        expected,
        trend,
    }
}
