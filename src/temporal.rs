//! Temporal index: the ordered, gap-free run of days behind the time slider.

use crate::error::{DashboardError, Result};
use chrono::{Days, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Canonical `YYYY-MM-DD` format used for every date column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A calendar day used as a lookup key across all tables
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Whole days from `self` to `other` (negative when `other` is earlier)
    pub fn days_until(&self, other: &DateKey) -> i64 {
        (other.0 - self.0).num_days()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map(Self)
    }
}

/// Every day from `start` to `end` inclusive, built once at load time
#[derive(Clone, Debug)]
pub struct TemporalIndex {
    dates: Vec<DateKey>,
}

impl TemporalIndex {
    /// Build the index; fails with `InvalidRange` when `end < start`
    pub fn build(start: DateKey, end: DateKey) -> Result<Self> {
        if end < start {
            return Err(DashboardError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let span = start.days_until(&end) as usize;
        let mut dates = Vec::with_capacity(span + 1);
        let mut day = start.0;
        for _ in 0..=span {
            dates.push(DateKey(day));
            match day.checked_add_days(Days::new(1)) {
                Some(next) => day = next,
                None => break,
            }
        }

        Ok(Self { dates })
    }

    /// Position of `date` in the index
    pub fn index_of(&self, date: &DateKey) -> Result<usize> {
        let offset = self.first().days_until(date);
        if offset < 0 || offset as usize >= self.dates.len() {
            return Err(DashboardError::OutOfRange {
                index: offset,
                len: self.dates.len(),
            });
        }
        Ok(offset as usize)
    }

    /// Date at `index`
    pub fn at(&self, index: usize) -> Result<DateKey> {
        self.dates
            .get(index)
            .copied()
            .ok_or(DashboardError::OutOfRange {
                index: index as i64,
                len: self.dates.len(),
            })
    }

    pub fn first(&self) -> DateKey {
        self.dates[0]
    }

    pub fn last(&self) -> DateKey {
        self.dates[self.dates.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Never true: a built index holds at least one day
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateKey> {
        self.dates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_build_spans_inclusive_range() {
        let index = TemporalIndex::build(key("2020-01-13"), key("2021-03-07")).unwrap();
        let expected = key("2020-01-13").days_until(&key("2021-03-07")) + 1;
        assert_eq!(index.len() as i64, expected);
        assert_eq!(index.first(), key("2020-01-13"));
        assert_eq!(index.last(), key("2021-03-07"));
        assert!(index.iter().zip(index.iter().skip(1)).all(|(a, b)| a < b));
    }

    #[test]
    fn test_build_crosses_leap_day() {
        let index = TemporalIndex::build(key("2020-02-27"), key("2020-03-01")).unwrap();
        let days: Vec<String> = index.iter().map(|d| d.to_string()).collect();
        assert_eq!(days, ["2020-02-27", "2020-02-28", "2020-02-29", "2020-03-01"]);
    }

    #[test]
    fn test_single_day_range() {
        let index = TemporalIndex::build(key("2020-05-01"), key("2020-05-01")).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.at(0).unwrap(), key("2020-05-01"));
    }

    #[test]
    fn test_reversed_range_is_invalid() {
        let err = TemporalIndex::build(key("2020-05-02"), key("2020-05-01")).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidRange { .. }));
    }

    #[test]
    fn test_index_round_trip() {
        let index = TemporalIndex::build(key("2020-12-25"), key("2021-01-10")).unwrap();
        for i in 0..index.len() {
            assert_eq!(index.index_of(&index.at(i).unwrap()).unwrap(), i);
        }
    }

    #[test]
    fn test_lookups_out_of_range() {
        let index = TemporalIndex::build(key("2020-06-01"), key("2020-06-30")).unwrap();
        assert!(matches!(
            index.at(30),
            Err(DashboardError::OutOfRange { index: 30, len: 30 })
        ));
        assert!(matches!(
            index.index_of(&key("2020-05-31")),
            Err(DashboardError::OutOfRange { index: -1, .. })
        ));
        assert!(index.index_of(&key("2020-07-01")).is_err());
    }

    #[test]
    fn test_date_key_format() {
        let d = DateKey::from_ymd(2020, 3, 7).unwrap();
        assert_eq!(d.to_string(), "2020-03-07");
        assert!("3/7/2020".parse::<DateKey>().is_err());
    }
}
