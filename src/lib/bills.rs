//! Large recurring bills, listed by month

use std::collections::BTreeMap;

use crate::lib::{date, entry::Dataset};

pub const BILLS_CATEGORY: &str = "Bills";
pub const BIG_BILL: f64 = 100.0;

/// Month name to `{description: price}` of every bill of at least `BIG_BILL`
///
/// Two bills of the same month with the same description keep the later one.
pub fn big_bills(dataset: &Dataset) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut res = BTreeMap::<String, BTreeMap<String, f64>>::new();
    for bill in dataset
        .iter()
        .filter(|e| e.price >= BIG_BILL && e.category == BILLS_CATEGORY)
    {
        res.entry(date::month_name(bill.date))
            .or_default()
            .insert(bill.description.clone(), bill.price);
    }
    res
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::entry::test_util::*;
    use crate::lib::entry::Entry;

    fn bill(date: chrono::NaiveDate, description: &str, price: f64) -> Entry {
        Entry {
            description: description.to_string(),
            ..entry(date, BILLS_CATEGORY, price)
        }
    }

    #[test]
    fn only_big_bills() {
        let d = dataset(vec![
            bill(dt!(2024-1-3), "Electricity", 120.0),
            bill(dt!(2024-1-4), "Water", 40.0),
            bill(dt!(2024-2-3), "Electricity", 100.0),
            entry(dt!(2024-2-5), "Rent", 900.0),
        ]);
        let b = big_bills(&d);
        assert_eq!(b.len(), 2);
        assert_eq!(b["January"].get("Electricity"), Some(&120.0));
        assert_eq!(b["January"].get("Water"), None);
        assert_eq!(b["February"].len(), 1);
    }

    #[test]
    fn serializes_as_nested_object() {
        let d = dataset(vec![bill(dt!(2024-3-3), "Internet", 150.5)]);
        let json = serde_json::to_string(&big_bills(&d)).unwrap();
        assert_eq!(json, r#"{"March":{"Internet":150.5}}"#);
    }
}
