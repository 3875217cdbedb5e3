//! Everything that ends up in front of the user: charts, tables, and the
//! driver that writes them

pub mod charts;
pub mod driver;
pub mod plot;
pub mod sankey;
pub mod table;
