//! The YAML run configuration
//!
//! ```yaml
//! globals:
//!   sankey_other_threshold: 0.02
//!   year: 2024
//!   charts: [by_week, total_saved, sankey]
//! plots:
//!   food:
//!     title: Food spending
//!     timeframe: monthly
//!     lines:
//!       - label: food
//!         style: g
//!         filters:
//!           - is_food: true
//! aggregations: {}
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::lib::{
    filter::{Combinator, Filter, Line},
    summary::Timeframe,
};
use crate::load::error::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub globals: Globals,
    #[serde(default)]
    pub plots: BTreeMap<String, PlotSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Globals {
    /// fraction of total spending below which a category is folded into "Other"
    pub sankey_other_threshold: f64,
    /// year the sheets belong to, overridden by `--year`
    pub year: Option<i32>,
    /// entries at least this expensive are left out of the by-week chart
    pub large_transaction_threshold: f64,
    /// enabled built-in charts, all of them if absent
    pub charts: Option<Vec<String>>,
}

impl Default for Globals {
    fn default() -> Self {
        Self {
            sankey_other_threshold: 0.02,
            year: None,
            large_transaction_threshold: 500.0,
            charts: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlotSpec {
    pub title: String,
    pub timeframe: String,
    #[serde(default)]
    pub lines: Vec<LineSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineSpec {
    pub label: String,
    #[serde(default = "default_style")]
    pub style: String,
    /// join filters with OR instead of AND
    #[serde(default)]
    pub disjunction: bool,
    #[serde(
        default,
        deserialize_with = "serde_yaml::with::singleton_map_recursive::deserialize"
    )]
    pub filters: Vec<Filter>,
}

fn default_style() -> String {
    String::from("b")
}

/// A validated plot, ready to be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub name: String,
    pub title: String,
    pub timeframe: Timeframe,
    pub lines: Vec<Line>,
}

impl Config {
    /// Parse `path`, or fall back to the defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(Error::io(path))?;
        Self::parse(&text).map_err(|source| Error::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Validate every configured plot
    ///
    /// Fails on the first invalid timeframe, before anything is computed.
    pub fn plots(&self) -> Result<Vec<Plot>> {
        self.plots
            .iter()
            .map(|(name, spec)| {
                Ok(Plot {
                    name: name.clone(),
                    title: spec.title.clone(),
                    timeframe: spec.timeframe.parse()?,
                    lines: spec
                        .lines
                        .iter()
                        .map(|l| Line {
                            label: l.label.clone(),
                            style: l.style.clone(),
                            combinator: if l.disjunction {
                                Combinator::Any
                            } else {
                                Combinator::All
                            },
                            filters: l.filters.clone(),
                        })
                        .collect(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLE: &str = "
globals:
  sankey_other_threshold: 0.05
  year: 2023

plots:
  food:
    title: Food over the month
    timeframe: monthly
    lines:
      - label: eating out
        style: r
        disjunction: true
        filters:
          - category: [Restaurants, Takeout]
          - description_contains: pizza
      - label: everything

aggregations: {}
";

    #[test]
    fn full_config() {
        let c = Config::parse(SAMPLE).unwrap();
        assert_eq!(c.globals.sankey_other_threshold, 0.05);
        assert_eq!(c.globals.year, Some(2023));
        assert_eq!(c.globals.large_transaction_threshold, 500.0);
        let plots = c.plots().unwrap();
        assert_eq!(plots.len(), 1);
        let p = &plots[0];
        assert_eq!(p.name, "food");
        assert_eq!(p.timeframe, Timeframe::Monthly);
        assert_eq!(p.lines[0].combinator, Combinator::Any);
        assert_eq!(p.lines[0].filters.len(), 2);
        assert_eq!(p.lines[1].style, "b");
        assert_eq!(p.lines[1].combinator, Combinator::All);
        assert!(p.lines[1].filters.is_empty());
    }

    #[test]
    fn empty_sections() {
        let c = Config::parse("globals: {}\n\nplots: {}\n\naggregations: {}").unwrap();
        assert_eq!(c.globals.sankey_other_threshold, 0.02);
        assert!(c.plots().unwrap().is_empty());
        assert!(Config::parse("").unwrap().plots.is_empty());
    }

    #[test]
    fn bad_timeframe_rejected() {
        let c = Config::parse(
            "plots:\n  p:\n    title: t\n    timeframe: daily\n    lines: []\n",
        )
        .unwrap();
        assert!(matches!(c.plots(), Err(Error::InvalidTimeframe(t)) if t == "daily"));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let c = Config::load(&dir.path().join("config.yml")).unwrap();
        assert!(c.globals.charts.is_none());
    }
}
