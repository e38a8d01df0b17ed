/// First code point of the Unicode braille block; the low byte is the dot mask
const BRAILLE_BASE: u32 = 0x2800;

/// Dot bit for pixel (x % 2, y % 4) within a cell:
/// ```text
/// 0x01 0x08
/// 0x02 0x10
/// 0x04 0x20
/// 0x40 0x80
/// ```
const DOT_BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

/// Off-screen layer of braille dots, 2x4 pixels per terminal cell
pub struct BrailleCanvas {
    cols: usize,
    rows: usize,
    masks: Vec<u8>,
}

impl BrailleCanvas {
    /// Canvas of `cols` x `rows` cells, i.e. `cols*2` x `rows*4` pixels
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            masks: vec![0; cols * rows],
        }
    }

    fn locate(&self, x: usize, y: usize) -> Option<(usize, u8)> {
        let (col, row) = (x / 2, y / 4);
        (col < self.cols && row < self.rows).then(|| (row * self.cols + col, DOT_BITS[x % 2][y % 4]))
    }

    /// Set a dot; points off the canvas are dropped
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        if let Some((idx, bit)) = self.locate(x, y) {
            self.masks[idx] |= bit;
        }
    }

    /// Line and wedge rasterizers work in signed space and may overshoot
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
            self.set_pixel(x, y);
        }
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.locate(x, y)
            .is_some_and(|(idx, bit)| self.masks[idx] & bit != 0)
    }

    pub fn dot_count(&self) -> u32 {
        self.masks.iter().map(|m| m.count_ones()).sum()
    }

    /// (column, row, glyph) for every cell with at least one dot
    pub fn glyphs(&self) -> impl Iterator<Item = (u16, u16, char)> + '_ {
        let cols = self.cols.max(1);
        self.masks
            .iter()
            .enumerate()
            .filter(|(_, &mask)| mask != 0)
            .filter_map(move |(idx, &mask)| {
                let ch = char::from_u32(BRAILLE_BASE + mask as u32)?;
                Some(((idx % cols) as u16, (idx / cols) as u16, ch))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph_rows(canvas: &BrailleCanvas) -> Vec<String> {
        canvas
            .masks
            .chunks(canvas.cols)
            .map(|row| row.iter().map(|&m| char::from_u32(BRAILLE_BASE + m as u32).unwrap()).collect())
            .collect()
    }

    #[test]
    fn test_dot_layout() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pixel(0, 0);
        canvas.set_pixel(3, 3);
        assert_eq!(glyph_rows(&canvas), ["⠁⢀"]);
        assert!(canvas.is_set(3, 3));
        assert!(!canvas.is_set(2, 3));
    }

    #[test]
    fn test_full_cell() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(glyph_rows(&canvas), ["⣿"]);
        assert_eq!(canvas.dot_count(), 8);
    }

    #[test]
    fn test_glyphs_skip_blank_cells() {
        let mut canvas = BrailleCanvas::new(3, 2);
        canvas.set_pixel(4, 5); // col 2, row 1
        canvas.set_pixel_signed(-1, 0);
        canvas.set_pixel(6, 0); // off the right edge
        let glyphs: Vec<_> = canvas.glyphs().collect();
        assert_eq!(glyphs, vec![(2, 1, '⠂')]);
    }
}
