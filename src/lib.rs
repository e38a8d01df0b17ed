//! Terminal COVID-19 dashboard
//!
//! Loads per-state case tables and boundaries once, then drives a
//! choropleth of the positive rate over a day-by-day time slider, with a
//! per-state breakdown on hover and two health-system analysis views.

pub mod analysis;
pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod detail;
pub mod error;
pub mod map;
pub mod selection;
pub mod temporal;
pub mod ui;

pub use error::{DashboardError, Result};
