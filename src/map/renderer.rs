use crate::braille::BrailleCanvas;
use crate::data::table::PercentTable;
use crate::map::geometry::{self, draw_line, BBox, Polygon};
use crate::map::projection::Viewport;
use crate::map::scale::{ColorScale, HIGHLIGHT_FILL, NO_DATA_FILL};
use crate::map::spatial::RegionGrid;
use crate::temporal::DateKey;
use ratatui::style::Color;
use rayon::prelude::*;

/// Hit-test grid cell size in degrees
const GRID_CELL_DEGREES: f64 = 2.0;

/// A named region (state) with its boundary polygons
#[derive(Clone, Debug)]
pub struct Region {
    pub name: String,
    pub polygons: Vec<Polygon>,
    pub bbox: BBox,
}

impl Region {
    pub fn new(name: impl Into<String>, polygons: Vec<Polygon>) -> Self {
        let bbox = geometry::bbox(&polygons).unwrap_or((0.0, 0.0, 0.0, 0.0));
        Self {
            name: name.into(),
            polygons,
            bbox,
        }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let (min_lon, min_lat, max_lon, max_lat) = self.bbox;
        if lon < min_lon || lon > max_lon || lat < min_lat || lat > max_lat {
            return false;
        }
        self.polygons
            .iter()
            .any(|polygon| geometry::point_in_polygon(lon, lat, polygon))
    }
}

/// The geographic boundary collection with a point lookup
pub struct Boundaries {
    regions: Vec<Region>,
    grid: RegionGrid,
}

impl Boundaries {
    pub fn new(regions: Vec<Region>) -> Self {
        let grid = RegionGrid::build(regions.iter().map(|r| r.bbox), GRID_CELL_DEGREES);
        Self { regions, grid }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.regions.iter().position(|r| r.name == name)
    }

    /// Region containing (lon, lat); the first match wins where shapes overlap
    pub fn region_at(&self, lon: f64, lat: f64) -> Option<usize> {
        self.grid
            .candidates(lon, lat)
            .iter()
            .copied()
            .find(|&idx| self.regions[idx].contains(lon, lat))
    }
}

/// Resolves one fill color per region for a date
pub struct ChoroplethRenderer {
    scale: ColorScale,
    fills: Vec<Color>,
    highlighted: Option<usize>,
    date: Option<DateKey>,
}

impl ChoroplethRenderer {
    pub fn new(scale: ColorScale) -> Self {
        Self {
            scale,
            fills: Vec::new(),
            highlighted: None,
            date: None,
        }
    }

    pub fn scale(&self) -> &ColorScale {
        &self.scale
    }

    /// Recolor every region for `date`. Regions without a row or a value for
    /// that day get the no-data fill. Clears any hover highlight.
    pub fn render(&mut self, regions: &[Region], date: DateKey, values: &PercentTable) {
        self.fills.clear();
        self.fills.extend(regions.iter().map(|region| {
            values
                .find(&region.name)
                .and_then(|series| series.get(&date))
                .map_or(NO_DATA_FILL, |pct| self.scale.color(pct))
        }));
        self.highlighted = None;
        self.date = Some(date);
    }

    /// Paint one region with the hover color until the next `render`
    pub fn highlight(&mut self, region: usize) {
        if region < self.fills.len() {
            self.highlighted = Some(region);
        }
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Date of the last render
    pub fn date(&self) -> Option<DateKey> {
        self.date
    }

    /// Effective fill of a region, including the hover override
    pub fn fill(&self, region: usize) -> Option<Color> {
        if self.highlighted == Some(region) {
            return Some(HIGHLIGHT_FILL);
        }
        self.fills.get(region).copied()
    }

    /// Base fills in region order, without the hover override
    pub fn fills(&self) -> &[Color] {
        &self.fills
    }
}

/// Region index under the center of every terminal cell, row by row.
/// Braille gives 2x4 pixels per cell, so the viewport is in those units.
pub fn rasterize(boundaries: &Boundaries, viewport: &Viewport, cols: usize, rows: usize) -> Vec<Vec<Option<usize>>> {
    (0..rows)
        .into_par_iter()
        .map(|row| {
            (0..cols)
                .map(|col| {
                    let px = col as f64 * 2.0 + 1.0;
                    let py = row as f64 * 4.0 + 2.0;
                    let (lon, lat) = viewport.unproject_f(px, py);
                    boundaries.region_at(lon, lat)
                })
                .collect()
        })
        .collect()
}

/// Draw every region outline as braille lines
pub fn draw_borders(canvas: &mut BrailleCanvas, boundaries: &Boundaries, viewport: &Viewport) {
    for region in boundaries.regions() {
        for ring in region.polygons.iter().flatten() {
            draw_ring(canvas, ring, viewport);
        }
    }
}

fn draw_ring(canvas: &mut BrailleCanvas, ring: &[(f64, f64)], viewport: &Viewport) {
    let mut prev: Option<(i32, i32)> = None;

    for &(lon, lat) in ring {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            // Skip segments that wrap the antimeridian
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }

        prev = Some((px, py));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::Series;

    fn square(name: &str, x0: f64, y0: f64) -> Region {
        let ring = vec![(x0, y0), (x0 + 4.0, y0), (x0 + 4.0, y0 + 4.0), (x0, y0 + 4.0), (x0, y0)];
        Region::new(name, vec![vec![ring]])
    }

    fn day(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn fixture() -> (Boundaries, PercentTable) {
        let boundaries = Boundaries::new(vec![
            square("Alpha", -100.0, 30.0),
            square("Beta", -90.0, 30.0),
            square("Puerto Rico", -70.0, 18.0),
        ]);
        let values: PercentTable = [
            ("Alpha".to_string(), [(day("2020-04-01"), 0.0), (day("2020-04-02"), 50.0)].into_iter().collect::<Series<f64>>()),
            ("Beta".to_string(), [(day("2020-04-01"), 10.0)].into_iter().collect()),
        ]
        .into_iter()
        .collect();
        (boundaries, values)
    }

    #[test]
    fn test_render_maps_values_through_scale() {
        let (boundaries, values) = fixture();
        let mut choropleth = ChoroplethRenderer::new(ColorScale::default());
        choropleth.render(boundaries.regions(), day("2020-04-01"), &values);

        let scale = ColorScale::default();
        assert_eq!(choropleth.fill(0), Some(scale.color(0.0)));
        assert_eq!(choropleth.fill(1), Some(scale.color(10.0)));
    }

    #[test]
    fn test_region_without_row_gets_no_data_fill() {
        let (boundaries, values) = fixture();
        let mut choropleth = ChoroplethRenderer::new(ColorScale::default());
        choropleth.render(boundaries.regions(), day("2020-04-01"), &values);
        assert_eq!(choropleth.fill(2), Some(NO_DATA_FILL));
    }

    #[test]
    fn test_missing_day_gets_no_data_fill() {
        let (boundaries, values) = fixture();
        let mut choropleth = ChoroplethRenderer::new(ColorScale::default());
        choropleth.render(boundaries.regions(), day("2020-04-02"), &values);
        assert_eq!(choropleth.fill(1), Some(NO_DATA_FILL));
        // 50% saturates at the top of the ramp
        assert_eq!(choropleth.fill(0), Some(ColorScale::default().color(10.0)));
    }

    #[test]
    fn test_render_is_idempotent() {
        let (boundaries, values) = fixture();
        let mut choropleth = ChoroplethRenderer::new(ColorScale::default());
        choropleth.render(boundaries.regions(), day("2020-04-01"), &values);
        let first = choropleth.fills().to_vec();
        choropleth.render(boundaries.regions(), day("2020-04-01"), &values);
        assert_eq!(choropleth.fills(), first.as_slice());
    }

    #[test]
    fn test_highlight_overrides_until_next_render() {
        let (boundaries, values) = fixture();
        let mut choropleth = ChoroplethRenderer::new(ColorScale::default());
        choropleth.render(boundaries.regions(), day("2020-04-01"), &values);
        let base = choropleth.fill(1);

        choropleth.highlight(1);
        assert_eq!(choropleth.fill(1), Some(HIGHLIGHT_FILL));
        assert_ne!(choropleth.fills()[1], HIGHLIGHT_FILL);

        choropleth.render(boundaries.regions(), day("2020-04-01"), &values);
        assert_eq!(choropleth.fill(1), base);
        assert_eq!(choropleth.highlighted(), None);
    }

    #[test]
    fn test_region_at() {
        let (boundaries, _) = fixture();
        assert_eq!(boundaries.region_at(-98.0, 32.0), Some(0));
        assert_eq!(boundaries.region_at(-88.0, 32.0), Some(1));
        assert_eq!(boundaries.region_at(-93.0, 32.0), None);
        assert_eq!(boundaries.index_of("Beta"), Some(1));
    }

    #[test]
    fn test_rasterize_finds_regions() {
        let (boundaries, _) = fixture();
        let viewport = Viewport::fit_bounds((-100.0, 30.0, -86.0, 34.0), 80, 40);
        let raster = rasterize(&boundaries, &viewport, 40, 10);
        assert_eq!(raster.len(), 10);
        let seen: Vec<usize> = raster.iter().flatten().flatten().copied().collect();
        assert!(seen.contains(&0));
        assert!(seen.contains(&1));
    }
}
