//! Built-in charts and configured plots, and which of them run on what
//!
//! Monthly charts are drawn once per month and once more on the whole year,
//! yearly charts only on the whole year.

use std::path::{Path, PathBuf};

use crate::cli::{
    plot::{self, Chart as LineChart, Curve},
    sankey,
};
use crate::lib::{
    date,
    entry::Dataset,
    income::Income,
    projection::{filter_large_transactions, weekly_projection},
    sankey::{flatten, flow_tree},
    savings,
    summary::{metric_over_time, Timeframe},
};
use crate::load::{
    config::Plot,
    error::{Error, Result},
};

pub const BY_WEEK: &str = "by_week";
pub const TOTAL_SAVED: &str = "total_saved";
pub const SANKEY: &str = "sankey";

pub const BUILTINS: &[&str] = &[BY_WEEK, TOTAL_SAVED, SANKEY];

/// Everything a chart needs besides the entries it is drawn from
#[derive(Debug, Clone)]
pub struct Context {
    pub income: Income,
    pub year: i32,
    pub sankey_other_threshold: f64,
    pub large_transaction_threshold: f64,
    /// spending outside of the monthly sheets
    pub untracked: Dataset,
}

impl Context {
    /// `data` together with the untracked ledger
    fn with_untracked(&self, data: &Dataset) -> Dataset {
        Dataset::concat([data, &self.untracked])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Monthly,
    Yearly,
}

type Draw = fn(&Dataset, &Context, &Path) -> Result<()>;

#[derive(Clone)]
pub enum Chart {
    Builtin {
        name: &'static str,
        scope: Scope,
        draw: Draw,
    },
    Configured(Plot),
}

impl Chart {
    pub fn name(&self) -> &str {
        match self {
            Chart::Builtin { name, .. } => name,
            Chart::Configured(plot) => &plot.name,
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            Chart::Builtin { scope, .. } => *scope,
            Chart::Configured(plot) => match plot.timeframe {
                Timeframe::Monthly => Scope::Monthly,
                Timeframe::Yearly => Scope::Yearly,
            },
        }
    }

    /// Output file of this chart in `dir`
    pub fn file(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.svg", self.name()))
    }

    pub fn draw(&self, data: &Dataset, ctx: &Context, dir: &Path) -> Result<()> {
        let file = self.file(dir);
        tracing::debug!("drawing {} into {}", self.name(), file.display());
        match self {
            Chart::Builtin { draw, .. } => draw(data, ctx, &file),
            Chart::Configured(plot) => {
                let metrics = metric_over_time(data, plot.timeframe, &plot.lines);
                plot::metrics_over_time(&metrics, &plot.title, &file)
            }
        }
    }
}

fn builtin(name: &str) -> Option<Chart> {
    let chart = |name: &'static str, scope: Scope, draw: Draw| Chart::Builtin { name, scope, draw };
    match name {
        BY_WEEK => Some(chart(BY_WEEK, Scope::Monthly, spent_by_week)),
        TOTAL_SAVED => Some(chart(TOTAL_SAVED, Scope::Yearly, saved_over_time)),
        SANKEY => Some(chart(SANKEY, Scope::Yearly, sankey_flow)),
        _ => None,
    }
}

/// The charts of a run
pub struct Registry {
    charts: Vec<Chart>,
}

impl Registry {
    /// Configured plots first, then the enabled built-ins
    /// (all of them when `enabled` is `None`)
    pub fn new(plots: Vec<Plot>, enabled: Option<&[String]>) -> Result<Self> {
        let mut charts = plots.into_iter().map(Chart::Configured).collect::<Vec<_>>();
        match enabled {
            None => charts.extend(BUILTINS.iter().filter_map(|n| builtin(n))),
            Some(names) => {
                for name in names {
                    charts.push(builtin(name).ok_or_else(|| Error::UnknownChart(name.clone()))?);
                }
            }
        }
        Ok(Self { charts })
    }

    pub fn scoped(&self, scope: Scope) -> impl Iterator<Item = &Chart> {
        self.charts.iter().filter(move |c| c.scope() == scope)
    }

    pub fn names(&self) -> Vec<&str> {
        self.charts.iter().map(Chart::name).collect()
    }
}

/// Spending per week projected over a month, against the monthly income
pub fn spent_by_week(data: &Dataset, ctx: &Context, file: &Path) -> Result<()> {
    by_week_chart(data, ctx, false).render(file)
}

/// Large transactions are left out of the weekly projections, and optionally
/// spread evenly over all weeks
fn by_week_chart(data: &Dataset, ctx: &Context, add_large_expenses_back: bool) -> LineChart {
    let (kept, large) = filter_large_transactions(data, ctx.large_transaction_threshold);
    let weeks = date::weeks(kept.min_date(), kept.max_date());
    let mut avgs = weekly_projection(&kept);
    if add_large_expenses_back {
        let share = large / avgs.len() as f64;
        avgs.iter_mut().for_each(|a| *a += share);
    }
    let goal = vec![ctx.income.monthly(); avgs.len()];
    let mean = avgs.iter().sum::<f64>() / avgs.len() as f64;
    let average = vec![mean; avgs.len()];
    LineChart::new("Prorated spending per week")
        .with(Curve::new("actual", &weeks, &avgs, "b"))
        .with(Curve::new("", &weeks, &avgs, "bo"))
        .with(Curve::new("goal", &weeks, &goal, "g"))
        .with(Curve::new("average", &weeks, &average, "r"))
}

/// Running balance since the first entry, with the savings goal and a trend
pub fn saved_over_time(data: &Dataset, ctx: &Context, file: &Path) -> Result<()> {
    let curve = savings::saved_over_time(&ctx.with_untracked(data), ctx.income);
    let mut chart = LineChart::new("Total Saved over Time")
        .with(Curve::new("Saved", &curve.dates, &curve.balance, "b"))
        .with(Curve::new("Goal", &curve.paydays, &curve.expected, "g"));
    if !curve.trend.is_empty() {
        chart = chart.with(Curve::new("Trend", &curve.dates, &curve.trend, "--b"));
    }
    chart.render(file)
}

/// Where the income of the year went
pub fn sankey_flow(data: &Dataset, ctx: &Context, file: &Path) -> Result<()> {
    let tree = flow_tree(
        &ctx.with_untracked(data),
        ctx.year,
        ctx.income,
        ctx.sankey_other_threshold,
    );
    let title = format!("Spending Flow for {}", ctx.year);
    sankey::sankey(&flatten(&tree), &title, file)
}
