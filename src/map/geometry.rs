use crate::braille::BrailleCanvas;
use glam::DVec2;
use std::f64::consts::TAU;

/// A closed ring of (lon, lat) coordinates
pub type Ring = Vec<(f64, f64)>;

/// Exterior ring followed by any holes
pub type Polygon = Vec<Ring>;

/// (min_lon, min_lat, max_lon, max_lat)
pub type BBox = (f64, f64, f64, f64);

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Fill the part of a disc between two angles.
/// Angles are in radians, clockwise from 12 o'clock, like a d3 pie.
pub fn fill_wedge(canvas: &mut BrailleCanvas, center: (i32, i32), radius: i32, start: f64, end: f64) {
    if end <= start {
        return;
    }
    let r2 = (radius * radius) as f64;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let offset = DVec2::new(dx as f64, dy as f64);
            if offset.length_squared() > r2 {
                continue;
            }
            let angle = wedge_angle(offset);
            if angle >= start && angle < end {
                canvas.set_pixel_signed(center.0 + dx, center.1 + dy);
            }
        }
    }
}

/// Clockwise angle from "up" on screen (y grows downward), in [0, TAU)
pub fn wedge_angle(offset: DVec2) -> f64 {
    offset.x.atan2(-offset.y).rem_euclid(TAU)
}

/// Even-odd test against a single ring
pub fn point_in_ring(lon: f64, lat: f64, ring: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Even-odd test across every ring, so holes punch out of the exterior
pub fn point_in_polygon(lon: f64, lat: f64, polygon: &[Ring]) -> bool {
    polygon
        .iter()
        .filter(|ring| point_in_ring(lon, lat, ring))
        .count()
        % 2
        == 1
}

/// Bounding box of every coordinate in the polygons
pub fn bbox<'a>(polygons: impl IntoIterator<Item = &'a Polygon>) -> Option<BBox> {
    polygons
        .into_iter()
        .flatten()
        .flatten()
        .fold(None, |acc, &(lon, lat)| match acc {
            None => Some((lon, lat, lon, lat)),
            Some((a, b, c, d)) => Some((a.min(lon), b.min(lat), c.max(lon), d.max(lat))),
        })
}
