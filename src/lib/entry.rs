//! One row of an expense sheet, and immutable collections of them

use chrono::NaiveDate;

/// A single transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub date: NaiveDate,
    pub description: String,
    pub vendor: String,
    /// group key for every per-category aggregation
    pub category: String,
    /// positive for money spent, negative for refunds
    pub price: f64,
    /// `None` when the sheet leaves the cell empty
    pub is_food: Option<bool>,
    pub controllable: Option<bool>,
}

impl Entry {
    /// The zero-value stand-in for a sheet with no rows
    pub fn placeholder(year: i32) -> Self {
        Self {
            date: NaiveDate::from_ymd_opt(year, 1, 1)
                .unwrap_or(NaiveDate::MIN),
            description: String::new(),
            vendor: String::new(),
            category: String::new(),
            price: 0.0,
            is_food: Some(false),
            controllable: Some(false),
        }
    }
}

/// A non-empty, read-only sequence of entries
///
/// Every constructor guarantees at least one entry, which is what lets
/// `min_date`, `max_date` and the day counts be total functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    entries: Vec<Entry>,
}

impl Dataset {
    /// Wrap `entries`, substituting `Entry::placeholder(year)` if there are none
    pub fn new(entries: Vec<Entry>, year: i32) -> Self {
        if entries.is_empty() {
            Self { entries: vec![Entry::placeholder(year)] }
        } else {
            Self { entries }
        }
    }

    /// Concatenate, keeping the order of `parts`
    ///
    /// Each part is already non-empty so the result is too.
    pub fn concat<'d, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'d Dataset>,
    {
        let entries = parts
            .into_iter()
            .flat_map(|d| d.entries.iter().cloned())
            .collect::<Vec<_>>();
        assert!(!entries.is_empty(), "concatenation of no datasets");
        Self { entries }
    }

    /// Keep only the entries satisfying `pred`
    ///
    /// Returns `None` instead of an empty dataset: callers decide
    /// whether an empty selection is an error, a zero, or a placeholder.
    pub fn select<F>(&self, pred: F) -> Option<Self>
    where
        F: Fn(&Entry) -> bool,
    {
        let entries = self
            .entries
            .iter()
            .filter(|e| pred(e))
            .cloned()
            .collect::<Vec<_>>();
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn min_date(&self) -> NaiveDate {
        self.entries
            .iter()
            .map(|e| e.date)
            .min()
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn max_date(&self) -> NaiveDate {
        self.entries
            .iter()
            .map(|e| e.date)
            .max()
            .unwrap_or(NaiveDate::MIN)
    }

    /// Days between first and last entry, both ends included
    pub fn inclusive_days(&self) -> i64 {
        self.exclusive_days() + 1
    }

    /// Days between first and last entry, last one excluded
    pub fn exclusive_days(&self) -> i64 {
        (self.max_date() - self.min_date()).num_days()
    }

    /// Sum of all prices
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.price).sum()
    }
}

impl<'d> IntoIterator for &'d Dataset {
    type Item = &'d Entry;
    type IntoIter = std::slice::Iter<'d, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
