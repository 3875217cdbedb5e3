//! Implementations that are useful accross the whole project
//!
//! Entry definition, calendar windows, aggregation and the derived series
//! (projections, savings, Sankey flows)

pub mod bills;
pub mod date;
pub mod entry;
pub mod filter;
pub mod income;
pub mod projection;
pub mod sankey;
pub mod savings;
pub mod summary;
pub mod trend;
