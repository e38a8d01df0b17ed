//! Dashboard error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the data pipeline and the selection controller
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Date range boundaries are reversed
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange { start: String, end: String },

    /// Date or date index outside the temporal index
    #[error("Date index {index} out of range (0..{len})")]
    OutOfRange { index: i64, len: usize },

    /// Region expected to have complete case/population data but doesn't
    #[error("Missing data for {region}: {what}")]
    MissingData { region: String, what: String },

    /// A dataset could not be read or parsed
    #[error("Failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DashboardError::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn missing(region: &str, what: impl Into<String>) -> Self {
        DashboardError::MissingData {
            region: region.to_string(),
            what: what.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::OutOfRange { index: -1, len: 420 };
        assert_eq!(err.to_string(), "Date index -1 out of range (0..420)");

        let err = DashboardError::missing("Guam", "no positive case row");
        assert_eq!(err.to_string(), "Missing data for Guam: no positive case row");
    }

    #[test]
    fn test_load_error_names_file() {
        let err = DashboardError::load("data/Positive.csv", "No such file");
        assert!(err.to_string().contains("data/Positive.csv"));
    }
}
