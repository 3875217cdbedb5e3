//! Where the income went: a tree of spending buckets and its flattening
//! into the nodes and flows of a Sankey diagram
//!
//! ```txt
//! Income ─┬─ Saved
//!         ├─ Controllable ───┬─ Other
//!         │                  └─ <Category>...
//!         └─ Not Controllable ┬─ Food ─── <Category>...
//!                             ├─ Other
//!                             └─ <Category>...
//! ```

use std::collections::BTreeMap;

use crate::lib::{
    entry::Dataset,
    income::{self, Income},
};

pub const SAVED: &str = "Saved";
pub const CONTROLLABLE: &str = "Controllable";
pub const NOT_CONTROLLABLE: &str = "Not Controllable";
pub const FOOD: &str = "Food";
pub const OTHER: &str = "Other";
pub const INCOME: &str = "Income";

/// A bucket of money, either final or split further
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Leaf(f64),
    /// children in insertion order
    Branch(Vec<(String, Flow)>),
}

impl Flow {
    /// Total of all leaves below
    pub fn amount(&self) -> f64 {
        match self {
            Flow::Leaf(x) => *x,
            Flow::Branch(children) => children.iter().map(|(_, c)| c.amount()).sum(),
        }
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut Flow> {
        match self {
            Flow::Leaf(_) => None,
            Flow::Branch(children) => children
                .iter_mut()
                .find(|(n, _)| n == name)
                .map(|(_, c)| c),
        }
    }

    /// Add `amount` to the leaf `name`, creating it at the end if missing
    fn credit(&mut self, name: &str, amount: f64) {
        if let Some(Flow::Leaf(x)) = self.child_mut(name) {
            *x += amount;
        } else if let Flow::Branch(children) = self {
            children.push((name.to_string(), Flow::Leaf(amount)));
        }
    }
}

#[cfg(test)]
impl Flow {
    pub fn child(&self, name: &str) -> Option<&Flow> {
        match self {
            Flow::Leaf(_) => None,
            Flow::Branch(children) => children.iter().find(|(n, _)| n == name).map(|(_, c)| c),
        }
    }

    /// Every leaf amount, depth first
    pub fn leaves(&self) -> Vec<f64> {
        match self {
            Flow::Leaf(x) => vec![*x],
            Flow::Branch(children) => children.iter().flat_map(|(_, c)| c.leaves()).collect(),
        }
    }
}

/// Classification of a category from the average of its entries' flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kind {
    pub controllable: bool,
    pub food: bool,
}

/// Mean of the known flags rounded half to even, unknown-only counts as `false`
fn majority<I>(flags: I) -> bool
where
    I: Iterator<Item = Option<bool>>,
{
    let (sum, count) = flags
        .flatten()
        .fold((0.0, 0usize), |(s, c), b| (s + if b { 1.0 } else { 0.0 }, c + 1));
    if count == 0 {
        return false;
    }
    (sum / count as f64).round_ties_even() >= 1.0
}

/// Capitalize the first letter of every word, lowercase the rest
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Spending per category with its classification
pub fn classify(combined: &Dataset) -> BTreeMap<String, (f64, Kind)> {
    let mut by_cat = BTreeMap::<&str, Vec<_>>::new();
    for e in combined {
        by_cat.entry(e.category.as_str()).or_default().push(e);
    }
    by_cat
        .into_iter()
        .map(|(cat, entries)| {
            let spent = entries.iter().map(|e| e.price).sum::<f64>();
            let kind = Kind {
                controllable: majority(entries.iter().map(|e| e.controllable)),
                food: majority(entries.iter().map(|e| e.is_food)),
            };
            (cat.to_string(), (spent, kind))
        })
        .collect()
}

/// The spending tree of `combined` (tracked and untracked entries)
///
/// Categories whose spending is not strictly above `threshold` times the
/// overall spending are merged into the `Other` of their bucket.
pub fn flow_tree(combined: &Dataset, year: i32, income: Income, threshold: f64) -> Flow {
    let total_spent = combined.total();
    let earned = income::estimated_income_after_tax(combined, year, income);
    let mut controllable = Flow::Branch(vec![(OTHER.to_string(), Flow::Leaf(0.0))]);
    let mut food = Flow::Branch(Vec::new());
    let mut fixed = Flow::Branch(vec![(OTHER.to_string(), Flow::Leaf(0.0))]);

    for (cat, (spent, kind)) in classify(combined) {
        let label = if spent > total_spent * threshold {
            title_case(&cat)
        } else {
            OTHER.to_string()
        };
        // `Food` is taken by the food branch under Not Controllable
        let bucket = if kind.food || (!kind.controllable && label == FOOD) {
            &mut food
        } else if kind.controllable {
            &mut controllable
        } else {
            &mut fixed
        };
        bucket.credit(&label, spent);
    }

    if let Flow::Branch(children) = &mut fixed {
        children.insert(0, (FOOD.to_string(), food));
    }
    Flow::Branch(vec![
        (SAVED.to_string(), Flow::Leaf(earned - total_spent)),
        (CONTROLLABLE.to_string(), controllable),
        (NOT_CONTROLLABLE.to_string(), fixed),
    ])
}

/// A box of the diagram
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub label: String,
    pub amount: f64,
}

/// Money moving from one node to another, both given by index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub amount: f64,
}

/// Nodes and links of a Sankey diagram
///
/// Labels are not unique (every bucket has its own `Other`), so links refer
/// to nodes by index into `nodes`.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub nodes: Vec<Node>,
    /// node indices by depth, `Income` alone in the first column
    pub columns: Vec<Vec<usize>>,
    /// parent-to-child, starting with `Income` to the top-level buckets
    pub links: Vec<Link>,
}

#[cfg(test)]
impl Diagram {
    /// `(source label, target label, amount)` of every link
    pub fn flows(&self) -> Vec<(&str, &str, f64)> {
        self.links
            .iter()
            .map(|l| {
                (
                    self.nodes[l.source].label.as_str(),
                    self.nodes[l.target].label.as_str(),
                    l.amount,
                )
            })
            .collect()
    }
}

/// Breadth-first flattening of `tree` under an `Income` root
///
/// The income node carries the amount of the whole tree, i.e. the
/// estimated income including a possibly negative `Saved`.
pub fn flatten(tree: &Flow) -> Diagram {
    let mut nodes = vec![Node {
        label: INCOME.to_string(),
        amount: tree.amount(),
    }];
    let mut columns = vec![vec![0]];
    let mut links = Vec::new();
    let mut layer = vec![(0, tree)];
    while !layer.is_empty() {
        let mut next = Vec::new();
        let mut column = Vec::new();
        for (parent, node) in layer {
            if let Flow::Branch(children) = node {
                for (name, child) in children {
                    let id = nodes.len();
                    nodes.push(Node {
                        label: name.clone(),
                        amount: child.amount(),
                    });
                    links.push(Link {
                        source: parent,
                        target: id,
                        amount: child.amount(),
                    });
                    column.push(id);
                    next.push((id, child));
                }
            }
        }
        if !column.is_empty() {
            columns.push(column);
        }
        layer = next;
    }
    Diagram {
        nodes,
        columns,
        links,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::entry::test_util::*;

    fn sample() -> Dataset {
        dataset(vec![
            flagged(dt!(2024-1-1), "groceries", 300.0, Some(true), Some(true)),
            flagged(dt!(2024-1-5), "rent", 1000.0, Some(false), Some(false)),
            flagged(dt!(2024-2-5), "eating out", 200.0, Some(true), Some(true)),
            flagged(dt!(2024-2-9), "games", 150.0, Some(false), Some(true)),
            flagged(dt!(2024-2-9), "games", 50.0, Some(false), None),
            flagged(dt!(2024-3-1), "gum", 3.0, Some(false), Some(true)),
            flagged(dt!(2024-3-9), "parking", 4.0, None, Some(false)),
        ])
    }

    #[test]
    fn tree_shape() {
        let income = Income::from_annual(12000.0);
        let t = flow_tree(&sample(), 2024, income, 0.01);
        let fixed = t.child(NOT_CONTROLLABLE).unwrap();
        let food = fixed.child(FOOD).unwrap();
        assert_eq!(food.child("Groceries"), Some(&Flow::Leaf(300.0)));
        assert_eq!(food.child("Eating Out"), Some(&Flow::Leaf(200.0)));
        assert_eq!(fixed.child("Rent"), Some(&Flow::Leaf(1000.0)));
        assert_eq!(fixed.child(OTHER), Some(&Flow::Leaf(4.0)));
        let ctrl = t.child(CONTROLLABLE).unwrap();
        assert_eq!(ctrl.child("Games"), Some(&Flow::Leaf(200.0)));
        assert_eq!(ctrl.child(OTHER), Some(&Flow::Leaf(3.0)));
    }

    #[test]
    fn fixed_category_named_food_joins_food_branch() {
        let data = dataset(vec![
            flagged(dt!(2024-1-1), "food", 300.0, Some(false), Some(false)),
            flagged(dt!(2024-1-2), "groceries", 100.0, Some(true), Some(false)),
        ]);
        let t = flow_tree(&data, 2024, Income::from_annual(12000.0), 0.02);
        let Some(Flow::Branch(fixed)) = t.child(NOT_CONTROLLABLE) else {
            panic!("Not Controllable is a branch");
        };
        let names = fixed.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec![FOOD, OTHER]);
        let food = &fixed[0].1;
        assert_eq!(food.child(FOOD), Some(&Flow::Leaf(300.0)));
        assert_eq!(food.child("Groceries"), Some(&Flow::Leaf(100.0)));
        // a controllable `Food` has no sibling to collide with
        let data = dataset(vec![flagged(dt!(2024-1-1), "food", 300.0, Some(false), Some(true))]);
        let t = flow_tree(&data, 2024, Income::from_annual(12000.0), 0.02);
        assert_eq!(t.child(CONTROLLABLE).unwrap().child(FOOD), Some(&Flow::Leaf(300.0)));
    }

    #[test]
    fn leaves_and_saved_make_income() {
        let d = sample();
        let income = Income::from_annual(6000.0);
        let t = flow_tree(&d, 2024, income, 0.01);
        let earned = income::estimated_income_after_tax(&d, 2024, income);
        assert!((t.leaves().iter().sum::<f64>() - earned).abs() < 1e-6);
        assert!((t.amount() - earned).abs() < 1e-6);
        let saved = t.child(SAVED).unwrap().amount();
        assert!((saved - (earned - d.total())).abs() < 1e-6);
        assert!(saved < 0.0);
    }

    #[test]
    fn ties_round_to_even() {
        assert!(!majority([Some(true), Some(false)].into_iter()));
        assert!(majority([Some(true), Some(true), Some(false)].into_iter()));
        assert!(!majority([None, None].into_iter()));
        assert!(majority([None, Some(true)].into_iter()));
    }

    #[test]
    fn titles() {
        assert_eq!(title_case("eating out"), "Eating Out");
        assert_eq!(title_case("BILLS"), "Bills");
        assert_eq!(title_case("kid's stuff"), "Kid'S Stuff");
    }

    #[test]
    fn flattened() {
        let t = flow_tree(&sample(), 2024, Income::from_annual(12000.0), 0.01);
        let d = flatten(&t);
        assert_eq!(d.columns[0], vec![0]);
        assert_eq!(d.nodes[0], Node { label: INCOME.to_string(), amount: t.amount() });
        let top = d.columns[1]
            .iter()
            .map(|&i| d.nodes[i].label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(top, vec![SAVED, CONTROLLABLE, NOT_CONTROLLABLE]);
        assert_eq!(d.columns.len(), 4);
        // one `Other` per bucket
        let others = d.columns[2].iter().filter(|&&i| d.nodes[i].label == OTHER).count();
        assert_eq!(others, 2);
        let flows = d.flows();
        assert_eq!(flows[0].0, INCOME);
        assert_eq!(flows.iter().filter(|(_, t, _)| *t == FOOD).count(), 1);
        let food = flows.iter().find(|(_, t, _)| *t == FOOD).unwrap();
        assert_eq!((food.0, food.2), (NOT_CONTROLLABLE, 500.0));
        assert_eq!(d.links.len(), d.nodes.len() - 1);
    }
}
