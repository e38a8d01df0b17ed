use crate::error::{DashboardError, Result};
use crate::temporal::DateKey;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Per-region rows keyed by exact region name.
/// Built once at load time; names are matched byte-for-byte, so
/// "New York" and "new york" are different regions.
#[derive(Clone, Debug)]
pub struct LookupTable<R> {
    rows: HashMap<String, R>,
}

impl<R> LookupTable<R> {
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    /// Insert a row. The first row for a region wins; returns false on a duplicate.
    pub fn insert(&mut self, region: String, record: R) -> bool {
        match self.rows.entry(region) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Tolerant lookup used by the map
    pub fn find(&self, region: &str) -> Option<&R> {
        self.rows.get(region)
    }

    /// Strict lookup used by the detail panel
    pub fn require(&self, region: &str, table: &str) -> Result<&R> {
        self.rows
            .get(region)
            .ok_or_else(|| DashboardError::missing(region, format!("no row in {table}")))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R> Default for LookupTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FromIterator<(String, R)> for LookupTable<R> {
    fn from_iter<I: IntoIterator<Item = (String, R)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (region, record) in iter {
            table.insert(region, record);
        }
        table
    }
}

/// One region's values by day
#[derive(Clone, Debug)]
pub struct Series<T> {
    values: HashMap<DateKey, T>,
}

impl<T: Copy> Series<T> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn insert(&mut self, date: DateKey, value: T) {
        self.values.insert(date, value);
    }

    pub fn get(&self, date: &DateKey) -> Option<T> {
        self.values.get(date).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Copy> Default for Series<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> FromIterator<(DateKey, T)> for Series<T> {
    fn from_iter<I: IntoIterator<Item = (DateKey, T)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Percentage of population testing positive, per region per day (0-100, not clamped)
pub type PercentTable = LookupTable<Series<f64>>;

/// Raw case counts per region per day
pub type CountTable = LookupTable<Series<u64>>;

/// Population per region
pub type PopulationTable = LookupTable<u64>;

/// Health-system covariates for one state
#[derive(Clone, Debug, PartialEq)]
pub struct HealthRecord {
    pub state: String,
    pub beds_per_1000: f64,
    pub physicians_per_1000: f64,
    pub expenditure_per_capita: f64,
    pub deaths_per_100k: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_find_is_exact_match() {
        let table: PopulationTable = [("New York".to_string(), 19_450_000u64)]
            .into_iter()
            .collect();
        assert_eq!(table.find("New York"), Some(&19_450_000));
        assert_eq!(table.find("new york"), None);
        assert_eq!(table.find("New York "), None);
    }

    #[test]
    fn test_require_reports_missing_region() {
        let table: CountTable = LookupTable::new();
        let err = table.require("Guam", "Positive.csv").unwrap_err();
        match err {
            DashboardError::MissingData { region, what } => {
                assert_eq!(region, "Guam");
                assert!(what.contains("Positive.csv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_duplicate_wins() {
        let mut table = PopulationTable::new();
        assert!(table.insert("Ohio".into(), 1));
        assert!(!table.insert("Ohio".into(), 2));
        assert_eq!(table.find("Ohio"), Some(&1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_series_lookup_by_day() {
        let series: Series<f64> = [(day("2020-04-01"), 2.5), (day("2020-04-02"), 3.0)]
            .into_iter()
            .collect();
        assert_eq!(series.get(&day("2020-04-02")), Some(3.0));
        assert_eq!(series.get(&day("2020-04-03")), None);
    }
}
