//! Reading sheets, income and configuration from disk

pub mod config;
pub mod error;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::lib::{
    entry::{Dataset, Entry},
    income::Income,
};
use error::{Error, Result};

/// A sheet row as written, before validation
#[derive(Debug, Deserialize)]
struct Row {
    date: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    vendor: String,
    #[serde(default)]
    category: String,
    price: f64,
    #[serde(default)]
    is_food: String,
    #[serde(default)]
    controllable: String,
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Tri-state flag: empty is unknown
fn parse_flag(s: &str) -> std::result::Result<Option<bool>, ()> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "yes" => Ok(Some(true)),
        "0" | "false" | "no" => Ok(Some(false)),
        _ => Err(()),
    }
}

/// Read one sheet from CSV text
///
/// `path` is only used to report errors. A sheet without rows yields the
/// placeholder entry of `year`.
pub fn parse_sheet<R: std::io::Read>(reader: R, path: &Path, year: i32) -> Result<Dataset> {
    let mut entries = Vec::new();
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    for (i, row) in rdr.deserialize::<Row>().enumerate() {
        // header is row 1
        let line = i + 2;
        let row = row.map_err(|source| Error::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let date = parse_date(&row.date).ok_or_else(|| Error::BadDate {
            path: path.to_path_buf(),
            row: line,
            value: row.date.clone(),
        })?;
        let flag = |column: &'static str, value: &str| {
            parse_flag(value).map_err(|()| Error::BadFlag {
                path: path.to_path_buf(),
                row: line,
                column,
                value: value.to_string(),
            })
        };
        entries.push(Entry {
            date,
            is_food: flag("is_food", &row.is_food)?,
            controllable: flag("controllable", &row.controllable)?,
            description: row.description,
            vendor: row.vendor,
            category: row.category,
            price: row.price,
        });
    }
    if entries.is_empty() {
        tracing::warn!("{} has no rows, using a placeholder entry", path.display());
    }
    Ok(Dataset::new(entries, year))
}

/// Read one sheet file
pub fn read_data(path: &Path, year: i32) -> Result<Dataset> {
    let file = std::fs::File::open(path).map_err(Error::io(path))?;
    let data = parse_sheet(file, path, year)?;
    tracing::debug!("read {} entries from {}", data.len(), path.display());
    Ok(data)
}

/// Monthly sheets of `root`, i.e. every `.csv` except the untracked ledger,
/// by file name
pub fn sheet_paths(root: &Path, untracked: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for item in std::fs::read_dir(root).map_err(Error::io(root))? {
        let path = item.map_err(Error::io(root))?.path();
        let is_csv = path.extension().map(|e| e.eq_ignore_ascii_case("csv")).unwrap_or(false);
        if is_csv && path.file_name() != untracked.file_name() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// All monthly sheets of `root` combined into one dataset
pub fn combined(root: &Path, untracked: &Path, year: i32) -> Result<Dataset> {
    let paths = sheet_paths(root, untracked)?;
    if paths.is_empty() {
        return Err(Error::NoSheets(root.to_path_buf()));
    }
    let sheets = paths
        .iter()
        .map(|p| read_data(p, year))
        .collect::<Result<Vec<_>>>()?;
    let all = Dataset::concat(&sheets);
    tracing::info!("loaded {} entries from {} sheets", all.len(), sheets.len());
    Ok(all)
}

/// Annual income from the first line of `path`
pub fn read_income(path: &Path) -> Result<Income> {
    let text = std::fs::read_to_string(path).map_err(Error::io(path))?;
    let first = text.lines().next().unwrap_or("").trim();
    first
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .map(Income::from_annual)
        .ok_or_else(|| Error::BadIncome {
            path: path.to_path_buf(),
            value: first.to_string(),
        })
}
