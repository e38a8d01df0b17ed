use crate::data::table::{
    CountTable, HealthRecord, LookupTable, PercentTable, PopulationTable, Series,
};
use crate::error::{DashboardError, Result};
use crate::temporal::DateKey;
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Header naming the region column in every per-state table
const REGION_HEADER: &str = "state";
const POPULATION_HEADER: &str = "population";

fn column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Parse a wide `state,<date>,<date>...` table, skipping cells `parse` rejects
fn parse_series_table<R, T, F>(reader: R, source: &Path, parse: F) -> Result<LookupTable<Series<T>>>
where
    R: Read,
    T: Copy,
    F: Fn(&str) -> Option<T>,
{
    let mut csv = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv
        .headers()
        .map_err(|e| DashboardError::load(source, e))?
        .clone();

    let region_col = column(&headers, REGION_HEADER)
        .ok_or_else(|| DashboardError::load(source, "missing `state` column"))?;

    let date_cols: Vec<(usize, DateKey)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != region_col)
        .filter_map(|(idx, h)| h.parse::<DateKey>().ok().map(|d| (idx, d)))
        .collect();

    if date_cols.is_empty() {
        return Err(DashboardError::load(source, "no YYYY-MM-DD columns"));
    }

    let mut table = LookupTable::new();
    for record in csv.records() {
        let record = record.map_err(|e| DashboardError::load(source, e))?;
        let Some(region) = record.get(region_col) else {
            continue;
        };

        let series: Series<T> = date_cols
            .iter()
            .filter_map(|(idx, date)| record.get(*idx).and_then(&parse).map(|v| (*date, v)))
            .collect();

        if !table.insert(region.to_string(), series) {
            tracing::warn!("{}: duplicate row for {:?} ignored", source.display(), region);
        }
    }

    Ok(table)
}

fn parse_fraction_as_percent(cell: &str) -> Option<f64> {
    let value: f64 = cell.trim().parse().ok()?;
    value.is_finite().then_some(value * 100.0)
}

/// Counts are usually integers but some exports write `123.0`
fn parse_count(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    if let Ok(n) = cell.parse::<u64>() {
        return Some(n);
    }
    let value: f64 = cell.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value.round() as u64)
}

/// Positive-percentage table; source values are fractions and are scaled to percent
pub fn parse_percent_table<R: Read>(reader: R, source: &Path) -> Result<PercentTable> {
    parse_series_table(reader, source, parse_fraction_as_percent)
}

/// Positive or death case counts
pub fn parse_count_table<R: Read>(reader: R, source: &Path) -> Result<CountTable> {
    parse_series_table(reader, source, parse_count)
}

/// `State,Population` table
pub fn parse_population_table<R: Read>(reader: R, source: &Path) -> Result<PopulationTable> {
    let mut csv = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv
        .headers()
        .map_err(|e| DashboardError::load(source, e))?
        .clone();

    let region_col = column(&headers, REGION_HEADER)
        .ok_or_else(|| DashboardError::load(source, "missing `State` column"))?;
    let population_col = column(&headers, POPULATION_HEADER)
        .ok_or_else(|| DashboardError::load(source, "missing `Population` column"))?;

    let mut table = PopulationTable::new();
    for record in csv.records() {
        let record = record.map_err(|e| DashboardError::load(source, e))?;
        let (Some(region), Some(population)) = (
            record.get(region_col),
            record.get(population_col).and_then(parse_count),
        ) else {
            continue;
        };
        table.insert(region.to_string(), population);
    }

    Ok(table)
}

#[derive(Deserialize)]
struct HealthRow {
    #[serde(alias = "State", default)]
    state: String,
    #[serde(rename = "beds per 1000", deserialize_with = "csv::invalid_option", default)]
    beds: Option<f64>,
    #[serde(rename = "physicians per 1000", deserialize_with = "csv::invalid_option", default)]
    physicians: Option<f64>,
    #[serde(rename = "health expenditure per capita", deserialize_with = "csv::invalid_option", default)]
    expenditure: Option<f64>,
    #[serde(rename = "death per 100000", deserialize_with = "csv::invalid_option", default)]
    deaths: Option<f64>,
}

/// Merged health-system covariates; rows with a missing number are skipped
pub fn parse_health_data<R: Read>(reader: R, source: &Path) -> Result<Vec<HealthRecord>> {
    let mut csv = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv.deserialize::<HealthRow>() {
        let row = row.map_err(|e| DashboardError::load(source, e))?;
        match (row.beds, row.physicians, row.expenditure, row.deaths) {
            (Some(beds), Some(physicians), Some(expenditure), Some(deaths)) => {
                records.push(HealthRecord {
                    state: row.state,
                    beds_per_1000: beds,
                    physicians_per_1000: physicians,
                    expenditure_per_capita: expenditure,
                    deaths_per_100k: deaths,
                });
            }
            _ => tracing::debug!("{}: skipping incomplete row {:?}", source.display(), row.state),
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_percent_table_scales_fractions() {
        let csv = "state,2020-04-01,2020-04-02\nNew York,0.05,0.125\nTexas,0.01,\n";
        let table = parse_percent_table(csv.as_bytes(), Path::new("pct.csv")).unwrap();

        let ny = table.find("New York").unwrap();
        assert!((ny.get(&day("2020-04-01")).unwrap() - 5.0).abs() < 1e-9);
        assert!((ny.get(&day("2020-04-02")).unwrap() - 12.5).abs() < 1e-9);

        // Empty cell is absent, not zero
        let tx = table.find("Texas").unwrap();
        assert_eq!(tx.get(&day("2020-04-02")), None);
    }

    #[test]
    fn test_count_table_accepts_float_counts() {
        let csv = "state,2020-04-01\nOhio,120.0\nUtah,n/a\n";
        let table = parse_count_table(csv.as_bytes(), Path::new("pos.csv")).unwrap();
        assert_eq!(table.find("Ohio").unwrap().get(&day("2020-04-01")), Some(120));
        assert!(table.find("Utah").unwrap().is_empty());
    }

    #[test]
    fn test_region_names_are_not_normalized() {
        let csv = "State,2020-04-01\n new york ,3\n";
        let table = parse_count_table(csv.as_bytes(), Path::new("pos.csv")).unwrap();
        assert!(table.find(" new york ").is_some());
        assert!(table.find("New York").is_none());
    }

    #[test]
    fn test_missing_state_column_is_load_error() {
        let csv = "region,2020-04-01\nOhio,1\n";
        let err = parse_count_table(csv.as_bytes(), Path::new("pos.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::Load { .. }));
    }

    #[test]
    fn test_population_table() {
        let csv = "State,Population\nTest,1000\nBroken,\n";
        let table = parse_population_table(csv.as_bytes(), Path::new("pop.csv")).unwrap();
        assert_eq!(table.find("Test"), Some(&1000));
        assert_eq!(table.find("Broken"), None);
    }

    #[test]
    fn test_health_data_skips_incomplete_rows() {
        let csv = "State,beds per 1000,physicians per 1000,health expenditure per capita,death per 100000\n\
                   Ohio,2.8,30.1,8000,95.2\n\
                   Utah,1.8,,7000,40.0\n";
        let rows = parse_health_data(csv.as_bytes(), Path::new("health.csv")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].state, "Ohio");
        assert_eq!(rows[0].deaths_per_100k, 95.2);
    }

    #[test]
    fn test_health_data_treats_bad_numbers_as_missing() {
        let csv = "State,beds per 1000,physicians per 1000,health expenditure per capita,death per 100000\n\
                   Ohio,2.8,30.1,8000,95.2\n\
                   Utah,N/A,25.0,7000,40.0\n\
                   Iowa,3.1,22.4,,n/a\n";
        let rows = parse_health_data(csv.as_bytes(), Path::new("health.csv")).unwrap();
        let states: Vec<_> = rows.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, ["Ohio"]);
    }
}
