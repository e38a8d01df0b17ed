use ratatui::style::Color;

/// Fill for regions with no value on the selected date
pub const NO_DATA_FILL: Color = Color::Rgb(0xcc, 0xcc, 0xcc);

/// Fill for the region under the pointer
pub const HIGHLIGHT_FILL: Color = Color::Rgb(0xff, 0xa5, 0x00);

/// ColorBrewer "Blues" (9 classes), light to dark
const BLUES: [(u8, u8, u8); 9] = [
    (0xf7, 0xfb, 0xff),
    (0xde, 0xeb, 0xf7),
    (0xc6, 0xdb, 0xef),
    (0x9e, 0xca, 0xe1),
    (0x6b, 0xae, 0xd6),
    (0x42, 0x92, 0xc6),
    (0x21, 0x71, 0xb5),
    (0x08, 0x51, 0x9c),
    (0x08, 0x30, 0x6b),
];

/// Sequential color scale over a fixed numeric domain.
/// Values outside the domain saturate at the end colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScale {
    lo: f64,
    hi: f64,
}

impl ColorScale {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    /// Normalized position of `value` in the domain, clamped to [0, 1]
    pub fn position(&self, value: f64) -> f64 {
        let span = self.hi - self.lo;
        if span == 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.lo) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> Color {
        blues(self.position(value))
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::new(0.0, 10.0)
    }
}

/// Interpolate the Blues ramp with a uniform cubic B-spline, `t` in [0, 1]
pub fn blues(t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let channel = |pick: fn(&(u8, u8, u8)) -> u8| {
        let values: [f64; 9] = std::array::from_fn(|i| pick(&BLUES[i]) as f64);
        basis_spline(&values, t).round().clamp(0.0, 255.0) as u8
    };
    Color::Rgb(channel(|c| c.0), channel(|c| c.1), channel(|c| c.2))
}

fn basis(t1: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

fn basis_spline(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let i = ((t * n as f64).floor() as usize).min(n - 1);
    let v1 = values[i];
    let v2 = values[i + 1];
    // Mirror the end segments so the curve passes through the first and last colors
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 { values[i + 2] } else { 2.0 * v2 - v1 };
    basis((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_ends_map_to_ramp_ends() {
        let scale = ColorScale::default();
        assert_eq!(scale.color(0.0), Color::Rgb(0xf7, 0xfb, 0xff));
        assert_eq!(scale.color(10.0), Color::Rgb(0x08, 0x30, 0x6b));
    }

    #[test]
    fn test_values_above_domain_saturate() {
        let scale = ColorScale::default();
        assert_eq!(scale.color(50.0), scale.color(10.0));
        assert_eq!(scale.color(-3.0), scale.color(0.0));
    }

    #[test]
    fn test_ramp_darkens_monotonically() {
        let scale = ColorScale::default();
        let lightness = |c: Color| match c {
            Color::Rgb(r, g, b) => r as u32 + g as u32 + b as u32,
            _ => unreachable!(),
        };
        let samples: Vec<u32> = (0..=20).map(|i| lightness(scale.color(i as f64 * 0.5))).collect();
        assert!(samples.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_sentinels_are_outside_ramp() {
        let scale = ColorScale::default();
        for i in 0..=100 {
            let c = scale.color(i as f64 / 10.0);
            assert_ne!(c, NO_DATA_FILL);
            assert_ne!(c, HIGHLIGHT_FILL);
        }
    }
}
