//! Sums of prices by category and by window

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::lib::{
    date::{self, Spacing},
    entry::{Dataset, Entry},
    filter::Line,
    income::{self, Income},
};
use crate::load::error::Error;

pub const TOTAL_SPENT: &str = "Total spent";
pub const INCOME: &str = "Income";

/// Spending per category over a set of entries
///
/// The two synthetic keys are kept apart from the categories themselves,
/// `get` resolves both kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotals {
    categories: BTreeMap<String, f64>,
    total_spent: f64,
    income: f64,
}

impl CategoryTotals {
    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            TOTAL_SPENT => Some(self.total_spent),
            INCOME => Some(self.income),
            _ => self.categories.get(key).copied(),
        }
    }

    pub fn categories(&self) -> &BTreeMap<String, f64> {
        &self.categories
    }

    pub fn total_spent(&self) -> f64 {
        self.total_spent
    }

    pub fn income(&self) -> f64 {
        self.income
    }
}

/// Group by category and sum, with prorated income over the span of the data
///
/// The span counts both its first and last day.
pub fn category_spending(dataset: &Dataset, income: Income) -> CategoryTotals {
    let mut categories = BTreeMap::new();
    for e in dataset {
        *categories.entry(e.category.clone()).or_insert(0.0) += e.price;
    }
    CategoryTotals {
        categories,
        total_spent: dataset.total(),
        income: income::prorate(dataset.inclusive_days(), income.annual),
    }
}

/// Everything spent, including the untracked ledger
pub fn total_spent(dataset: &Dataset, untracked: &Dataset) -> f64 {
    dataset.total() + untracked.total()
}

/// Granularity of a plot, named after the span it is meant to display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    /// one month of data, bucketed by week
    Monthly,
    /// one year of data, bucketed by month
    Yearly,
}

impl Timeframe {
    pub fn spacing(self) -> Spacing {
        match self {
            Timeframe::Monthly => Spacing::Week,
            Timeframe::Yearly => Spacing::Month,
        }
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "monthly" => Ok(Timeframe::Monthly),
            "yearly" => Ok(Timeframe::Yearly),
            _ => Err(Error::InvalidTimeframe(s.to_string())),
        }
    }
}

/// Entries of a dataset split along consecutive windows
#[derive(Debug)]
pub struct Calendar<'d> {
    starts: Vec<NaiveDate>,
    parts: Vec<Vec<&'d Entry>>,
}

impl<'d> Calendar<'d> {
    /// Windows spanning the dataset, each holding the entries dated within it
    pub fn from_spacing(dataset: &'d Dataset, spacing: Spacing) -> Self {
        let starts = date::windows(dataset.min_date(), dataset.max_date(), spacing);
        let parts = starts
            .iter()
            .map(|&start| date::time_filter(dataset, start, spacing.window_end(start)))
            .collect();
        Self { starts, parts }
    }

    pub fn starts(&self) -> &[NaiveDate] {
        &self.starts
    }

    /// Per-window sum of the prices of entries accepted by `line`
    pub fn sum_line(&self, line: &Line) -> Vec<f64> {
        self.parts
            .iter()
            .map(|part| {
                part.iter()
                    .filter(|e| line.accepts(e))
                    .map(|e| e.price)
                    .sum()
            })
            .collect()
    }
}

/// One aggregated line, aligned with the window starts of its `Metrics`
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
    pub style: String,
}

/// Several series sharing the same windows
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub starts: Vec<NaiveDate>,
    pub series: Vec<Series>,
}

#[cfg(test)]
impl Metrics {
    /// `(window_start, value)` pairs of the series named `label`
    pub fn points(&self, label: &str) -> Option<Vec<(NaiveDate, f64)>> {
        self.series
            .iter()
            .find(|s| s.label == label)
            .map(|s| self.starts.iter().copied().zip(s.values.iter().copied()).collect())
    }
}

/// Every line summed independently over the same windows
pub fn metric_over_time(dataset: &Dataset, timeframe: Timeframe, lines: &[Line]) -> Metrics {
    let cal = Calendar::from_spacing(dataset, timeframe.spacing());
    let series = lines
        .iter()
        .map(|line| Series {
            label: line.label.clone(),
            values: cal.sum_line(line),
            style: line.style.clone(),
        })
        .collect();
    Metrics {
        starts: cal.starts().to_vec(),
        series,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::entry::test_util::*;
    use crate::lib::filter::{Combinator, Filter};

    macro_rules! close {
        ( $a:expr, $b:expr ) => {{
            let (a, b): (f64, f64) = ($a, $b);
            assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
        }};
    }

    #[test]
    fn two_food_purchases() {
        let d = dataset(vec![
            flagged(dt!(2024-1-1), "Food", 50.0, Some(true), Some(false)),
            flagged(dt!(2024-1-8), "Food", 30.0, Some(true), Some(false)),
        ]);
        let t = category_spending(&d, Income::from_annual(3000.0 * 12.0));
        close!(t.get("Food").unwrap(), 80.0);
        close!(t.get(TOTAL_SPENT).unwrap(), 80.0);
        close!(t.get(INCOME).unwrap(), income::prorate(8, 36000.0));
        let keys = t.categories().keys().collect::<Vec<_>>();
        assert_eq!(keys, vec!["Food"]);
        assert_eq!(t.get("Rent"), None);
    }

    #[test]
    fn categories_add_up_to_total() {
        let d = dataset(vec![
            entry(dt!(2024-1-3), "Rent", 900.0),
            entry(dt!(2024-1-4), "Food", 12.5),
            entry(dt!(2024-1-9), "Food", 7.25),
            entry(dt!(2024-2-1), "Refund", -20.0),
            entry(dt!(2024-2-2), "Bills", 110.0),
        ]);
        let t = category_spending(&d, Income::from_annual(50000.0));
        close!(t.categories().values().sum::<f64>(), t.total_spent());
        close!(t.get("Food").unwrap(), 19.75);
        assert_eq!(t.get("Missing"), None);
    }

    #[test]
    fn placeholder_has_one_day_of_income() {
        let d = Dataset::new(Vec::new(), 2024);
        let t = category_spending(&d, Income::from_annual(36500.0));
        close!(t.income(), 100.0);
        close!(t.total_spent(), 0.0);
    }

    #[test]
    fn untracked_only_in_totals() {
        let d = dataset(vec![entry(dt!(2024-1-1), "Food", 10.0)]);
        let u = dataset(vec![entry(dt!(2024-1-2), "Cash", 5.0)]);
        close!(total_spent(&d, &u), 15.0);
        let t = category_spending(&d, Income::from_annual(0.0));
        assert_eq!(t.get("Cash"), None);
    }

    #[test]
    fn timeframes() {
        assert_eq!("monthly".parse::<Timeframe>().unwrap(), Timeframe::Monthly);
        assert_eq!("yearly".parse::<Timeframe>().unwrap().spacing(), Spacing::Month);
        assert!(matches!(
            "weekly".parse::<Timeframe>(),
            Err(Error::InvalidTimeframe(s)) if s == "weekly"
        ));
    }

    fn line(label: &str, combinator: Combinator, filters: Vec<Filter>) -> Line {
        Line {
            label: label.to_string(),
            style: String::from("b"),
            combinator,
            filters,
        }
    }

    #[test]
    fn weekly_lines() {
        let d = dataset(vec![
            flagged(dt!(2024-1-1), "Food", 10.0, Some(true), Some(false)),
            flagged(dt!(2024-1-3), "Games", 20.0, Some(false), Some(true)),
            flagged(dt!(2024-1-9), "Food", 40.0, Some(true), Some(false)),
            flagged(dt!(2024-1-20), "Games", 80.0, Some(false), Some(true)),
        ]);
        let lines = vec![
            line("all", Combinator::All, Vec::new()),
            line("food", Combinator::All, vec![Filter::IsFood(true)]),
            line(
                "either",
                Combinator::Any,
                vec![Filter::Category(vec!["Games".into()]), Filter::MinPrice(30.0)],
            ),
        ];
        let m = metric_over_time(&d, Timeframe::Monthly, &lines);
        assert_eq!(m.starts, vec![dt!(2024-1-1), dt!(2024-1-8), dt!(2024-1-15)]);
        assert_eq!(m.series[0].values, vec![30.0, 40.0, 80.0]);
        assert_eq!(m.series[1].values, vec![10.0, 40.0, 0.0]);
        assert_eq!(m.series[2].values, vec![20.0, 40.0, 80.0]);
        assert_eq!(
            m.points("food").unwrap()[1],
            (dt!(2024-1-8), 40.0)
        );
    }

    #[test]
    fn monthly_windows_follow_anchor_day() {
        let d = dataset(vec![
            entry(dt!(2024-1-10), "A", 1.0),
            entry(dt!(2024-2-9), "A", 2.0),
            entry(dt!(2024-2-10), "A", 4.0),
            entry(dt!(2024-3-20), "A", 8.0),
        ]);
        let m = metric_over_time(&d, Timeframe::Yearly, &[line("a", Combinator::All, Vec::new())]);
        assert_eq!(m.starts, vec![dt!(2024-1-10), dt!(2024-2-10), dt!(2024-3-10)]);
        assert_eq!(m.series[0].values, vec![3.0, 4.0, 8.0]);
    }
}
