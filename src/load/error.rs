//! Failures of a run, and their pretty-printing for the terminal
//!
//! Every failure is fatal: the run stops at the first one and `main` prints
//! a `Report` before exiting.
//!
//! ```txt
//! --> Error: invalid date '2024-13-01' in spending/January.csv, row 4
//!  |      ? hint: dates are written YYYY-MM-DD, optionally followed by HH:MM:SS
//! ```

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed sheet {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid date '{value}' in {path}, row {row}")]
    BadDate { path: PathBuf, row: usize, value: String },
    #[error("invalid flag '{value}' for column {column} in {path}, row {row}")]
    BadFlag {
        path: PathBuf,
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("invalid income '{value}' in {path}")]
    BadIncome { path: PathBuf, value: String },
    #[error("no sheet found in {0}")]
    NoSheets(PathBuf),
    #[error("invalid timeframe: {0}")]
    InvalidTimeframe(String),
    #[error("unknown chart '{0}'")]
    UnknownChart(String),
}

impl Error {
    /// Attach the offending path to an I/O failure
    pub fn io<P: Into<PathBuf>>(path: P) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Error::Io { path, source }
    }

    /// What message to show to help fix the error
    pub fn hint(&self) -> Option<String> {
        use Error::*;
        match self {
            Io { .. } => Some("check that the file exists and is readable".to_string()),
            Csv { .. } => Some(
                "expected columns: date,description,vendor,category,price,is_food,controllable"
                    .to_string(),
            ),
            Yaml { .. } => Some("the config has sections globals, plots and aggregations".to_string()),
            Json(_) => None,
            BadDate { .. } => {
                Some("dates are written YYYY-MM-DD, optionally followed by HH:MM:SS".to_string())
            }
            BadFlag { .. } => Some("use 1/0, true/false, yes/no, or leave empty".to_string()),
            BadIncome { .. } => Some("the first line should be the yearly income, e.g. 52000".to_string()),
            NoSheets(_) => Some("export one CSV sheet per month into this directory".to_string()),
            InvalidTimeframe(_) => Some("timeframe is either 'monthly' or 'yearly'".to_string()),
            UnknownChart(_) => Some(format!("known charts are {}", crate::cli::charts::BUILTINS.join(", "))),
        }
    }
}

const RED: &str = "\x1b[0;91;1m";
const BLUE: &str = "\x1b[0;96;1m";
const WHITE: &str = "\x1b[0;1m";
const NONE: &str = "\x1b[0m";

/// Colored rendering of an error and its causes
pub struct Report<'e>(pub &'e Error);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}--> Error:{} {}{}", RED, WHITE, self.0, NONE)?;
        if let Some(hint) = self.0.hint() {
            writeln!(f, " {}|      {}? hint: {}{}", RED, BLUE, NONE, hint)?;
        }
        Ok(())
    }
}
