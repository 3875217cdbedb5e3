//! Week-by-week spending projected to a whole month

use chrono::{Datelike, Duration};

use crate::lib::{
    date::{self, days_in_month},
    entry::{Dataset, Entry},
};

/// Spending rate over `total_days` scaled to the month of the latest entry
pub fn projected_spending(entries: &[&Entry], total_days: i64) -> f64 {
    let latest = match entries.iter().map(|e| e.date).max() {
        Some(d) => d,
        None => return 0.0,
    };
    let spent = entries.iter().map(|e| e.price).sum::<f64>();
    spent / total_days as f64 * days_in_month(latest.year(), latest.month()) as f64
}

/// Monthly projection of each week of `dataset`
///
/// A week without any entry projects to exactly `0`.
pub fn weekly_projection(dataset: &Dataset) -> Vec<f64> {
    let one_week = Duration::weeks(1);
    date::weeks(dataset.min_date(), dataset.max_date())
        .into_iter()
        .map(|start| {
            let week = date::time_filter(dataset, start, start + one_week);
            if week.is_empty() {
                0.0
            } else {
                projected_spending(&week, one_week.num_days())
            }
        })
        .collect()
}

/// Split off every entry costing at least `threshold`
///
/// Returns the remaining entries and the total of those removed. If every
/// entry is large the remainder is a zero-price placeholder dated like the
/// first entry, so that the week grid keeps its span.
pub fn filter_large_transactions(dataset: &Dataset, threshold: f64) -> (Dataset, f64) {
    let removed = dataset
        .iter()
        .filter(|e| e.price >= threshold)
        .map(|e| e.price)
        .sum::<f64>();
    let kept = dataset.select(|e| e.price < threshold).unwrap_or_else(|| {
        let first = dataset.min_date();
        let mut spacer = Entry::placeholder(first.year());
        spacer.date = first;
        Dataset::new(vec![spacer], first.year())
    });
    (kept, removed)
}
