//! Configuration
//!
//! Loaded from a TOML file with environment variable overrides.
//! Every field has a default, so an empty file (or none at all) works.

use crate::error::{DashboardError, Result};
use crate::map::ColorScale;
use crate::temporal::DateKey;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub dates: DateConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input file locations
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: String,

    #[serde(default = "default_boundaries")]
    pub boundaries: String,

    /// GeoJSON feature property holding the region name
    #[serde(default = "default_name_property")]
    pub name_property: String,

    #[serde(default = "default_positive_percentage")]
    pub positive_percentage: String,

    #[serde(default = "default_positive_cases")]
    pub positive_cases: String,

    #[serde(default = "default_death_cases")]
    pub death_cases: String,

    #[serde(default = "default_population")]
    pub population: String,

    #[serde(default = "default_health")]
    pub health: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_boundaries() -> String {
    "gz_2010_us_040_00_500k.json".to_string()
}

fn default_name_property() -> String {
    "NAME".to_string()
}

fn default_positive_percentage() -> String {
    "Positive_Percentage.csv".to_string()
}

fn default_positive_cases() -> String {
    "Positive.csv".to_string()
}

fn default_death_cases() -> String {
    "Death.csv".to_string()
}

fn default_population() -> String {
    "Population.csv".to_string()
}

fn default_health() -> String {
    "Merged Health Data.csv".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            boundaries: default_boundaries(),
            name_property: default_name_property(),
            positive_percentage: default_positive_percentage(),
            positive_cases: default_positive_cases(),
            death_cases: default_death_cases(),
            population: default_population(),
            health: default_health(),
        }
    }
}

impl DataConfig {
    /// Resolve a file name against the data directory
    pub fn path(&self, file: &str) -> PathBuf {
        Path::new(&self.dir).join(file)
    }
}

/// Time slider bounds, inclusive
#[derive(Debug, Clone, Deserialize)]
pub struct DateConfig {
    #[serde(default = "default_start")]
    pub start: String,

    #[serde(default = "default_end")]
    pub end: String,
}

fn default_start() -> String {
    "2020-01-13".to_string()
}

fn default_end() -> String {
    "2021-03-07".to_string()
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
        }
    }
}

impl DateConfig {
    pub fn range(&self) -> Result<(DateKey, DateKey)> {
        let parse = |s: &str| {
            s.parse::<DateKey>()
                .map_err(|e| DashboardError::Config(format!("bad date {s:?}: {e}")))
        };
        Ok((parse(&self.start)?, parse(&self.end)?))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    /// Percent values mapped to the light and dark ends of the ramp
    #[serde(default = "default_color_domain")]
    pub color_domain: [f64; 2],
}

fn default_color_domain() -> [f64; 2] {
    [0.0, 10.0]
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            color_domain: default_color_domain(),
        }
    }
}

impl MapConfig {
    pub fn color_scale(&self) -> ColorScale {
        ColorScale::new(self.color_domain[0], self.color_domain[1])
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file; logging is discarded when unset since the terminal belongs to the UI
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> Option<String> {
    Some("covid-map.log".to_string())
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("{}: {e}", path.display())))?;
        Self::parse(&content).map_err(|e| match e {
            DashboardError::Config(msg) => DashboardError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DashboardError::Config(e.to_string()))
    }

    /// Load a file when given, otherwise `./covid-map.toml` if present, then apply env overrides
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => {
                let local = Path::new("covid-map.toml");
                if local.exists() {
                    Self::load(local)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("COVID_MAP_DATA_DIR") {
            self.data.dir = dir;
        }
        if let Ok(level) = std::env::var("COVID_MAP_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(file) = std::env::var("COVID_MAP_LOG_FILE") {
            self.logging.file = if file.is_empty() { None } else { Some(file) };
        }
    }
}
