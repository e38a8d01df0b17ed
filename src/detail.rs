//! Per-state breakdown shown in the hover tooltip

use crate::data::table::{CountTable, PopulationTable};
use crate::error::{DashboardError, Result};
use crate::temporal::DateKey;
use ratatui::style::Color;
use std::f64::consts::TAU;

pub const NON_POSITIVE_COLOR: Color = Color::Rgb(0xd3, 0xd3, 0xd3);
pub const POSITIVE_COLOR: Color = Color::Rgb(0x1f, 0x77, 0xb4);
pub const DEATH_COLOR: Color = Color::Rgb(0xff, 0x7f, 0x0e);

/// Tooltip offset from the pointer, in cells
const POINTER_OFFSET: u16 = 1;

/// Shares of the population, in percent.
/// Death is a subset of positive but is kept as its own slice, so the three
/// values can add up to more than 100.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Breakdown {
    pub positive_pct: f64,
    pub death_pct: f64,
    pub non_positive_pct: f64,
}

impl Breakdown {
    /// `population` must be non-zero
    pub fn from_counts(positive: u64, death: u64, population: u64) -> Self {
        let population = population as f64;
        let positive_pct = positive as f64 / population * 100.0;
        let death_pct = death as f64 / population * 100.0;
        Self {
            positive_pct,
            death_pct,
            non_positive_pct: 100.0 - positive_pct,
        }
    }

    /// Pie slices in display order, angles clockwise from 12 o'clock.
    /// Negative values get an empty slice.
    pub fn slices(&self) -> [Slice; 3] {
        let values = [
            ("Non-Positive", self.non_positive_pct, NON_POSITIVE_COLOR),
            ("Positive", self.positive_pct, POSITIVE_COLOR),
            ("Death", self.death_pct, DEATH_COLOR),
        ];
        let total: f64 = values.iter().map(|(_, v, _)| v.max(0.0)).sum();
        let k = if total > 0.0 { TAU / total } else { 0.0 };

        let mut angle = 0.0;
        values.map(|(label, value, color)| {
            let start = angle;
            angle += value.max(0.0) * k;
            Slice {
                label,
                value,
                color,
                start_angle: start,
                end_angle: angle,
            }
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slice {
    pub label: &'static str,
    pub value: f64,
    pub color: Color,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Tables the breakdown is computed from
#[derive(Clone, Copy)]
pub struct CaseTables<'a> {
    pub positive: &'a CountTable,
    pub death: &'a CountTable,
    pub population: &'a PopulationTable,
}

/// What the tooltip shows for one state on one day
#[derive(Clone, Debug, PartialEq)]
pub struct DetailView {
    pub region: String,
    pub date: DateKey,
    pub population: u64,
    pub positive_cases: u64,
    pub death_cases: u64,
    pub breakdown: Breakdown,
    /// Top-left of the tooltip before clamping to the screen
    pub anchor: (u16, u16),
}

#[derive(Default)]
pub struct DetailPanel {
    view: Option<DetailView>,
}

impl DetailPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the breakdown for `region` on `date` and show it next to the pointer.
    /// Any missing input hides the panel and returns `MissingData`.
    pub fn render(
        &mut self,
        region: &str,
        date: DateKey,
        tables: CaseTables<'_>,
        pointer: (u16, u16),
    ) -> Result<&DetailView> {
        self.view = None;

        let count_on = |table: &CountTable, name: &str| -> Result<u64> {
            table
                .require(region, name)?
                .get(&date)
                .ok_or_else(|| DashboardError::missing(region, format!("no {name} count on {date}")))
        };

        let positive_cases = count_on(tables.positive, "positive case")?;
        let death_cases = count_on(tables.death, "death case")?;
        let population = *tables.population.require(region, "population")?;
        if population == 0 {
            return Err(DashboardError::missing(region, "population is zero"));
        }

        let view = self.view.insert(DetailView {
            region: region.to_string(),
            date,
            population,
            positive_cases,
            death_cases,
            breakdown: Breakdown::from_counts(positive_cases, death_cases, population),
            anchor: (
                pointer.0.saturating_add(POINTER_OFFSET),
                pointer.1.saturating_add(POINTER_OFFSET),
            ),
        });
        Ok(view)
    }

    pub fn dismiss(&mut self) {
        self.view = None;
    }

    pub fn view(&self) -> Option<&DetailView> {
        self.view.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.view.is_some()
    }
}

/// Place a `size` box at `anchor`, flipped or shifted to stay inside `bounds`.
/// `bounds` is (x, y, width, height).
pub fn tooltip_origin(anchor: (u16, u16), size: (u16, u16), bounds: (u16, u16, u16, u16)) -> (u16, u16) {
    let (bx, by, bw, bh) = bounds;
    let place = |pos: u16, len: u16, start: u16, span: u16| -> u16 {
        let end = start.saturating_add(span);
        if pos.saturating_add(len) <= end {
            pos.max(start)
        } else {
            // Flip to the other side of the pointer, then clamp
            let flipped = pos.saturating_sub(len.saturating_add(2 * POINTER_OFFSET));
            flipped.clamp(start, end.saturating_sub(len).max(start))
        }
    };
    (place(anchor.0, size.0, bx, bw), place(anchor.1, size.1, by, bh))
}
