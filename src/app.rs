use crate::analysis::whatif::WhatIf;
use crate::analysis::{Covariate, ScatterPlot};
use crate::data::Dataset;
use crate::detail::{CaseTables, DetailPanel};
use crate::error::Result;
use crate::map::{rasterize, ChoroplethRenderer, ColorScale, Viewport};
use crate::selection::{Redraw, SelectionController, SelectionEvent};
use crate::temporal::{DateKey, TemporalIndex};
use crate::ui;
use ratatui::layout::Rect;

/// Slider jump for PgUp/PgDn
pub const WEEK: i64 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Map,
    Exploratory,
    WhatIf,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Map, Tab::Exploratory, Tab::WhatIf];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Map => "Map",
            Tab::Exploratory => "Exploratory Analysis",
            Tab::WhatIf => "What-if",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Map => 0,
            Tab::Exploratory => 1,
            Tab::WhatIf => 2,
        }
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }
}

/// Application state
pub struct App {
    pub dataset: Dataset,
    pub dates: TemporalIndex,
    pub selection: SelectionController,
    pub choropleth: ChoroplethRenderer,
    pub detail: DetailPanel,
    pub viewport: Viewport,
    /// Screen cells the map is drawn into
    pub map_area: Rect,
    /// Region under each map cell, rebuilt when the view changes
    pub raster: Vec<Vec<Option<usize>>>,
    pub tab: Tab,
    pub whatif: WhatIf,
    pub scatter: [ScatterPlot; 3],
    /// Last error surfaced to the user, cleared by the next successful event
    pub last_error: Option<String>,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position, the tooltip anchor
    pub mouse_pos: Option<(u16, u16)>,
}

impl App {
    /// Build the session and draw the first date
    pub fn new(dataset: Dataset, dates: TemporalIndex, scale: ColorScale, width: u16, height: u16) -> Self {
        let map_area = ui::map_area(Rect::new(0, 0, width, height));
        // Braille gives 2x4 resolution per character
        let viewport = Viewport::contiguous_us(map_area.width as usize * 2, map_area.height as usize * 4);
        let scatter = Covariate::ALL.map(|c| ScatterPlot::build(&dataset.health, c));

        let mut app = Self {
            selection: SelectionController::new(dates.len()),
            dataset,
            dates,
            choropleth: ChoroplethRenderer::new(scale),
            detail: DetailPanel::new(),
            viewport,
            map_area,
            raster: Vec::new(),
            tab: Tab::Map,
            whatif: WhatIf::new(),
            scatter,
            last_error: None,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
        };
        app.refresh_raster();
        app.dispatch(SelectionEvent::SetDate(0));
        app
    }

    /// Run an event through the controller and apply the redraws it asks for
    pub fn dispatch(&mut self, event: SelectionEvent) {
        match self.selection.dispatch(event) {
            Ok(redraws) => {
                self.last_error = None;
                for redraw in redraws {
                    if let Err(e) = self.apply(redraw) {
                        tracing::debug!("{e}");
                        self.last_error = Some(e.to_string());
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Rejected selection event: {e}");
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn apply(&mut self, redraw: Redraw) -> Result<()> {
        let date = self.current_date()?;
        match redraw {
            Redraw::Map => {
                self.choropleth
                    .render(self.dataset.boundaries.regions(), date, &self.dataset.positive_pct);
            }
            Redraw::Highlight(name) => {
                if let Some(idx) = self.dataset.boundaries.index_of(&name) {
                    self.choropleth.highlight(idx);
                }
            }
            Redraw::Detail(name) => {
                let tables = CaseTables {
                    positive: &self.dataset.positive_cases,
                    death: &self.dataset.death_cases,
                    population: &self.dataset.population,
                };
                let pointer = self.mouse_pos.unwrap_or((self.map_area.x, self.map_area.y));
                self.detail.render(&name, date, tables, pointer)?;
            }
            Redraw::DismissDetail => self.detail.dismiss(),
        }
        Ok(())
    }

    pub fn current_date(&self) -> Result<DateKey> {
        self.dates.at(self.selection.date_index())
    }

    pub fn hovered(&self) -> Option<&str> {
        self.selection.hovered()
    }

    /// Move the slider by `delta` days, stopping at either end
    pub fn step_date(&mut self, delta: i64) {
        let current = self.selection.date_index() as i64;
        let last = self.dates.len().saturating_sub(1) as i64;
        let clamped = (current + delta).clamp(0, last) - current;
        if clamped != 0 {
            self.dispatch(SelectionEvent::StepDate(clamped));
        }
    }

    pub fn first_date(&mut self) {
        self.dispatch(SelectionEvent::SetDate(0));
    }

    pub fn last_date(&mut self) {
        self.dispatch(SelectionEvent::SetDate(self.dates.len().saturating_sub(1)));
    }

    /// Hover whatever region is under a screen cell
    pub fn hover_at(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        if self.tab != Tab::Map {
            return;
        }

        let region = self
            .region_at_cell(col, row)
            .map(|idx| self.dataset.boundaries.regions()[idx].name.clone());

        // Re-dispatch on every move inside a region so the tooltip follows the pointer
        if region.is_some() || self.hovered().is_some() {
            self.dispatch(SelectionEvent::SetHover(region));
        }
    }

    fn region_at_cell(&self, col: u16, row: u16) -> Option<usize> {
        let area = self.map_area;
        if col < area.x || row < area.y || col >= area.right() || row >= area.bottom() {
            return None;
        }
        let (c, r) = ((col - area.x) as usize, (row - area.y) as usize);
        self.raster.get(r).and_then(|cells| cells.get(c)).copied().flatten()
    }

    /// Re-run the hover test after the map moved under a still pointer
    fn rehover(&mut self) {
        if let Some((col, row)) = self.mouse_pos {
            self.hover_at(col, row);
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if tab == self.tab {
            return;
        }
        if self.hovered().is_some() {
            self.dispatch(SelectionEvent::SetHover(None));
        }
        self.tab = tab;
    }

    pub fn next_tab(&mut self) {
        self.select_tab(self.tab.next());
    }

    /// Update map size when terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.map_area = ui::map_area(Rect::new(0, 0, width, height));
        self.viewport.width = self.map_area.width as usize * 2;
        self.viewport.height = self.map_area.height as usize * 4;
        self.view_changed();
    }

    fn refresh_raster(&mut self) {
        self.raster = rasterize(
            &self.dataset.boundaries,
            &self.viewport,
            self.map_area.width as usize,
            self.map_area.height as usize,
        );
    }

    /// Pan the map by braille pixels
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
        self.view_changed();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.view_changed();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.view_changed();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = self.cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
        self.view_changed();
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = self.cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
        self.view_changed();
    }

    /// Back to the initial framing
    pub fn reset_view(&mut self) {
        self.viewport = Viewport::contiguous_us(self.viewport.width, self.viewport.height);
        self.view_changed();
    }

    fn view_changed(&mut self) {
        self.refresh_raster();
        self.rehover();
    }

    fn cell_to_pixel(&self, col: u16, row: u16) -> (i32, i32) {
        let px = col.saturating_sub(self.map_area.x) as i32 * 2;
        let py = row.saturating_sub(self.map_area.y) as i32 * 4;
        (px, py)
    }

    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            let dx = last_col as i32 - col as i32;
            let dy = last_row as i32 - row as i32;
            // One cell is 2x4 braille pixels
            self.pan(dx * 2, dy * 4);
        }
        self.last_mouse = Some((col, row));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::{HealthRecord, Series};
    use crate::map::{Boundaries, Region, HIGHLIGHT_FILL, NO_DATA_FILL};

    fn day(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn square(name: &str, x0: f64, y0: f64, size: f64) -> Region {
        let ring = vec![(x0, y0), (x0 + size, y0), (x0 + size, y0 + size), (x0, y0 + size), (x0, y0)];
        Region::new(name, vec![vec![ring]])
    }

    fn dataset() -> Dataset {
        let d1 = day("2020-04-01");
        let d2 = day("2020-04-02");
        Dataset {
            boundaries: Boundaries::new(vec![
                square("West", -125.0, 25.0, 29.0),
                square("East", -96.0, 25.0, 29.0),
            ]),
            positive_pct: [
                ("West".to_string(), [(d1, 2.0), (d2, 4.0)].into_iter().collect::<Series<f64>>()),
                ("East".to_string(), [(d1, 8.0)].into_iter().collect()),
            ]
            .into_iter()
            .collect(),
            positive_cases: [("West".to_string(), [(d1, 20), (d2, 40)].into_iter().collect::<Series<u64>>())]
                .into_iter()
                .collect(),
            death_cases: [("West".to_string(), [(d1, 1), (d2, 2)].into_iter().collect::<Series<u64>>())]
                .into_iter()
                .collect(),
            population: [("West".to_string(), 1000), ("East".to_string(), 2000)].into_iter().collect(),
            health: vec![HealthRecord {
                state: "West".to_string(),
                beds_per_1000: 2.5,
                physicians_per_1000: 30.0,
                expenditure_per_capita: 8000.0,
                deaths_per_100k: 90.0,
            }],
        }
    }

    fn app() -> App {
        let dates = TemporalIndex::build(day("2020-04-01"), day("2020-04-03")).unwrap();
        App::new(dataset(), dates, ColorScale::default(), 120, 40)
    }

    /// Screen cell over the middle of a region
    fn cell_over(app: &App, name: &str) -> (u16, u16) {
        let idx = app.dataset.boundaries.index_of(name).unwrap();
        for (row, cells) in app.raster.iter().enumerate() {
            if let Some(col) = cells.iter().position(|&c| c == Some(idx)) {
                return (app.map_area.x + col as u16 + 2, app.map_area.y + row as u16 + 2);
            }
        }
        panic!("{name} not on screen");
    }

    #[test]
    fn test_initial_render_uses_first_date() {
        let app = app();
        assert_eq!(app.current_date().unwrap(), day("2020-04-01"));
        assert_eq!(app.choropleth.date(), Some(day("2020-04-01")));
        assert_eq!(app.choropleth.fill(0), Some(ColorScale::default().color(2.0)));
        assert!(app.last_error.is_none());
    }

    #[test]
    fn test_step_date_stops_at_ends() {
        let mut app = app();
        app.step_date(-1);
        assert_eq!(app.selection.date_index(), 0);
        assert!(app.last_error.is_none());

        app.step_date(WEEK);
        assert_eq!(app.selection.date_index(), 2);
        // No row for the third day anywhere
        assert_eq!(app.choropleth.fill(0), Some(NO_DATA_FILL));

        app.first_date();
        assert_eq!(app.selection.date_index(), 0);
        app.last_date();
        assert_eq!(app.selection.date_index(), 2);
    }

    #[test]
    fn test_hover_highlights_and_shows_detail() {
        let mut app = app();
        let (col, row) = cell_over(&app, "West");
        app.hover_at(col, row);

        assert_eq!(app.hovered(), Some("West"));
        assert_eq!(app.choropleth.fill(0), Some(HIGHLIGHT_FILL));
        let view = app.detail.view().unwrap();
        assert_eq!(view.positive_cases, 20);
        assert_eq!(view.anchor, (col + 1, row + 1));

        // Leaving the map un-hovers
        app.hover_at(0, 0);
        assert_eq!(app.hovered(), None);
        assert!(!app.detail.is_visible());
        assert_ne!(app.choropleth.fill(0), Some(HIGHLIGHT_FILL));
    }

    #[test]
    fn test_date_change_refreshes_hovered_detail() {
        let mut app = app();
        let (col, row) = cell_over(&app, "West");
        app.hover_at(col, row);
        app.step_date(1);

        assert_eq!(app.choropleth.fill(0), Some(HIGHLIGHT_FILL));
        assert_eq!(app.detail.view().unwrap().positive_cases, 40);
    }

    #[test]
    fn test_missing_case_data_surfaces_error() {
        let mut app = app();
        let (col, row) = cell_over(&app, "East");
        app.hover_at(col, row);

        assert_eq!(app.hovered(), Some("East"));
        assert!(!app.detail.is_visible());
        let err = app.last_error.as_deref().unwrap();
        assert!(err.contains("Missing data for East"), "{err}");
    }

    #[test]
    fn test_switching_tab_drops_hover() {
        let mut app = app();
        let (col, row) = cell_over(&app, "West");
        app.hover_at(col, row);
        app.next_tab();
        assert_eq!(app.tab, Tab::Exploratory);
        assert_eq!(app.hovered(), None);

        // Hover is ignored off the map tab
        app.hover_at(col, row);
        assert_eq!(app.hovered(), None);
    }

    #[test]
    fn test_zoom_rebuilds_raster() {
        let mut app = app();
        let before = app.raster.clone();
        app.zoom_in();
        assert_ne!(app.raster, before);
        app.reset_view();
        assert_eq!(app.raster, before);
    }

    #[test]
    fn test_resize_rehovers_under_pointer() {
        let mut app = app();
        let (col, row) = cell_over(&app, "West");
        app.hover_at(col, row);

        // Too short for any map rows
        app.resize(120, 2);
        assert_eq!(app.map_area.height, 0);
        assert_eq!(app.hovered(), None);
        assert!(!app.detail.is_visible());

        app.resize(120, 40);
        assert_eq!(app.hovered(), Some("West"));
        assert!(app.detail.is_visible());
    }
}
