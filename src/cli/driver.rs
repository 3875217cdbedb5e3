//! One run over all sheets: clear the output directory, then write the bills
//! report and every chart, month by month and for the whole year

use std::path::{Path, PathBuf};

use crate::cli::{
    charts::{Context, Registry, Scope},
    table::format_currency,
};
use crate::lib::{
    bills, date,
    entry::Dataset,
    summary::{category_spending, CategoryTotals},
};
use crate::load::error::{Error, Result};

pub const COMBINED: &str = "Combined";
pub const BILLS_REPORT: &str = "bills.json";

pub struct Driver<'c> {
    registry: Registry,
    ctx: &'c Context,
    out: PathBuf,
}

impl<'c> Driver<'c> {
    pub fn new<P: Into<PathBuf>>(registry: Registry, ctx: &'c Context, out: P) -> Self {
        Self {
            registry,
            ctx,
            out: out.into(),
        }
    }

    /// Remove whatever a previous run left in the output directory
    fn clobber(&self) -> Result<()> {
        if self.out.exists() {
            std::fs::remove_dir_all(&self.out).map_err(Error::io(&self.out))?;
        }
        std::fs::create_dir_all(&self.out).map_err(Error::io(&self.out))
    }

    fn write_bills(&self, combined: &Dataset) -> Result<()> {
        let file = self.out.join(BILLS_REPORT);
        let report = bills::big_bills(combined);
        tracing::debug!("{} months with big bills", report.len());
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&file, json).map_err(Error::io(&file))
    }

    fn draw_all(&self, data: &Dataset, dir: &Path, scope: Scope) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(Error::io(dir))?;
        for chart in self.registry.scoped(scope) {
            chart.draw(data, self.ctx, dir)?;
        }
        Ok(())
    }

    /// Produce every output for `combined` (the monthly sheets, without the
    /// untracked ledger)
    ///
    /// Returns the category totals of each month and of the whole data,
    /// labelled for display.
    pub fn run(&self, combined: &Dataset) -> Result<Vec<(String, CategoryTotals)>> {
        tracing::info!(
            "writing {} to {}",
            self.registry.names().join(", "),
            self.out.display()
        );
        self.clobber()?;
        self.write_bills(combined)?;

        let mut rows = Vec::new();
        for month in date::by_month(combined) {
            let name = date::month_name(month.min_date());
            tracing::info!("plotting {} ({} entries)", name, month.len());
            self.draw_all(&month, &self.out.join(&name), Scope::Monthly)?;
            let totals = category_spending(&month, self.ctx.income);
            tracing::debug!(
                "{}: spent {} of {} earned",
                name,
                format_currency(totals.total_spent()),
                format_currency(totals.income())
            );
            rows.push((name, totals));
        }

        tracing::info!("plotting {} ({} entries)", COMBINED, combined.len());
        let dir = self.out.join(COMBINED);
        self.draw_all(combined, &dir, Scope::Monthly)?;
        self.draw_all(combined, &dir, Scope::Yearly)?;
        rows.push((COMBINED.to_string(), category_spending(combined, self.ctx.income)));
        Ok(rows)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cli::charts::{test::context, BY_WEEK, SANKEY, TOTAL_SAVED};
    use crate::lib::entry::{test_util::*, Entry};

    fn year() -> Dataset {
        dataset(vec![
            entry(dt!(2024-1-2), "Food", 40.0),
            Entry {
                description: "Internet".to_string(),
                ..entry(dt!(2024-1-15), "Bills", 120.0)
            },
            entry(dt!(2024-2-3), "Food", 25.0),
            entry(dt!(2024-2-20), "Car", 300.0),
        ])
    }

    #[test]
    fn full_run() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("plots");
        std::fs::create_dir_all(out.join("Stale")).unwrap();
        let ctx = context();
        let driver = Driver::new(Registry::new(Vec::new(), None).unwrap(), &ctx, &out);
        let rows = driver.run(&year()).unwrap();

        assert!(!out.join("Stale").exists());
        for month in ["January", "February"] {
            assert!(out.join(month).join(format!("{}.svg", BY_WEEK)).is_file());
            assert!(!out.join(month).join(format!("{}.svg", SANKEY)).exists());
        }
        for name in [BY_WEEK, TOTAL_SAVED, SANKEY] {
            assert!(out.join(COMBINED).join(format!("{}.svg", name)).is_file());
        }

        let bills = std::fs::read_to_string(out.join(BILLS_REPORT)).unwrap();
        let bills: serde_json::Value = serde_json::from_str(&bills).unwrap();
        assert_eq!(bills["January"]["Internet"], 120.0);
        assert!(bills.get("February").is_none());

        let labels = rows.iter().map(|(l, _)| l.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["January", "February", COMBINED]);
        assert_eq!(rows[2].1.total_spent(), 485.0);
        // the untracked ledger is left out of the totals
        assert_eq!(rows[2].1.get("Cash"), None);
    }

    #[test]
    fn narrowed_run() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("plots");
        let ctx = context();
        let only = vec![SANKEY.to_string()];
        let reg = Registry::new(Vec::new(), Some(only.as_slice())).unwrap();
        Driver::new(reg, &ctx, &out).run(&year()).unwrap();
        assert!(out.join("January").is_dir());
        assert!(std::fs::read_dir(out.join("January")).unwrap().next().is_none());
        assert!(out.join(COMBINED).join("sankey.svg").is_file());
        assert!(!out.join(COMBINED).join("by_week.svg").exists());
    }
}
