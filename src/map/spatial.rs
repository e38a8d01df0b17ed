use crate::map::geometry::BBox;
use std::collections::HashMap;

/// Bounding-box grid for point-to-region hit testing.
/// Each region is indexed into every cell its bbox overlaps, so a query
/// never misses a region; false positives are removed by the caller's
/// point-in-polygon test.
pub struct RegionGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl RegionGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from region bounding boxes, in region order
    pub fn build(bboxes: impl Iterator<Item = BBox>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, (min_lon, min_lat, max_lon, max_lat)) in bboxes.enumerate() {
            let min_cell = grid.to_cell(min_lon, min_lat);
            let max_cell = grid.to_cell(max_lon, max_lat);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Regions whose bbox overlaps the cell containing the point
    pub fn candidates(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_cover_bbox() {
        let grid = RegionGrid::build(
            [(-10.0, -10.0, 10.0, 10.0), (20.0, 20.0, 21.0, 21.0)].into_iter(),
            5.0,
        );
        assert_eq!(grid.candidates(0.0, 0.0), &[0]);
        assert_eq!(grid.candidates(-9.9, 9.9), &[0]);
        assert_eq!(grid.candidates(20.5, 20.5), &[1]);
        assert!(grid.candidates(50.0, 50.0).is_empty());
    }
}
