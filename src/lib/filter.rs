//! Predicates selecting which entries contribute to a plotted line

use serde::Deserialize;

use crate::lib::entry::Entry;

/// A single condition on an entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// category is one of these
    Category(Vec<String>),
    /// vendor is one of these
    Vendor(Vec<String>),
    /// case-insensitive substring of the description
    DescriptionContains(String),
    IsFood(bool),
    Controllable(bool),
    /// price at least this much
    MinPrice(f64),
    /// price strictly less than this
    MaxPrice(f64),
}

impl Filter {
    /// Unknown flags match neither `true` nor `false`
    pub fn accepts(&self, entry: &Entry) -> bool {
        match self {
            Filter::Category(names) => names.iter().any(|n| *n == entry.category),
            Filter::Vendor(names) => names.iter().any(|n| *n == entry.vendor),
            Filter::DescriptionContains(s) => entry
                .description
                .to_lowercase()
                .contains(&s.to_lowercase()),
            Filter::IsFood(b) => entry.is_food == Some(*b),
            Filter::Controllable(b) => entry.controllable == Some(*b),
            Filter::MinPrice(p) => entry.price >= *p,
            Filter::MaxPrice(p) => entry.price < *p,
        }
    }
}

/// How the filters of one line are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// every filter must accept
    All,
    /// at least one filter must accept
    Any,
}

/// One series of a plot
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub label: String,
    /// color/marker/dash tag understood by `cli::plot::Style`
    pub style: String,
    pub combinator: Combinator,
    pub filters: Vec<Filter>,
}

impl Line {
    /// A line with no filters sums every entry
    pub fn accepts(&self, entry: &Entry) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        match self.combinator {
            Combinator::All => self.filters.iter().all(|f| f.accepts(entry)),
            Combinator::Any => self.filters.iter().any(|f| f.accepts(entry)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::entry::test_util::*;

    fn line(combinator: Combinator, filters: Vec<Filter>) -> Line {
        Line {
            label: String::from("l"),
            style: String::from("b"),
            combinator,
            filters,
        }
    }

    #[test]
    fn conjunction_and_disjunction() {
        let food = flagged(dt!(2024-1-1), "Groceries", 40.0, Some(true), Some(false));
        let fun = flagged(dt!(2024-1-1), "Games", 60.0, Some(false), Some(true));
        let filters = vec![Filter::IsFood(true), Filter::MinPrice(50.0)];
        let and = line(Combinator::All, filters.clone());
        let or = line(Combinator::Any, filters);
        assert!(!and.accepts(&food) && !and.accepts(&fun));
        assert!(or.accepts(&food) && or.accepts(&fun));
    }

    #[test]
    fn no_filter_accepts_everything() {
        let e = entry(dt!(2024-1-1), "Anything", -3.0);
        assert!(line(Combinator::All, Vec::new()).accepts(&e));
        assert!(line(Combinator::Any, Vec::new()).accepts(&e));
    }

    #[test]
    fn unknown_flag_matches_nothing() {
        let e = flagged(dt!(2024-1-1), "Misc", 5.0, None, None);
        assert!(!Filter::IsFood(true).accepts(&e));
        assert!(!Filter::IsFood(false).accepts(&e));
        assert!(!Filter::Controllable(false).accepts(&e));
    }

    #[test]
    fn text_filters() {
        let e = entry(dt!(2024-1-1), "Bills", 120.0);
        assert!(Filter::Category(vec!["Rent".into(), "Bills".into()]).accepts(&e));
        assert!(Filter::Vendor(vec!["Shop".into()]).accepts(&e));
        assert!(Filter::DescriptionContains("BILLS PUR".into()).accepts(&e));
        assert!(!Filter::MaxPrice(120.0).accepts(&e));
    }

    #[test]
    fn from_yaml() {
        let f: Vec<Filter> = serde_yaml::with::singleton_map_recursive::deserialize(
            serde_yaml::Deserializer::from_str(
                "- category: [Food, Groceries]\n- is_food: true\n- min_price: 10.5\n",
            ),
        )
        .unwrap();
        assert_eq!(
            f,
            vec![
                Filter::Category(vec!["Food".into(), "Groceries".into()]),
                Filter::IsFood(true),
                Filter::MinPrice(10.5),
            ]
        );
    }
}
