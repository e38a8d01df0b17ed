//! Exploratory analysis: health-system covariates against COVID mortality

pub mod whatif;

use crate::data::table::HealthRecord;

/// Static OLS results for beds, expenditure and physicians
pub const REGRESSION_ALL_THREE: &str = "\
OLS Regression Results for All Three Variables:
R-squared: 0.381
Adj. R-squared: 0.340
F-statistic: 9.423
Prob (F-statistic): 5.75e-05
----------------------------------------------------------------------------
                        coef    std err          t      P>|t|      [0.025      0.975]
----------------------------------------------------------------------------
const                  73.7242     12.293      5.997      0.000      48.979      98.470
beds per 1000           1.1218      2.888      0.388      0.700      -4.692       6.935
health expenditure      0.0017      0.001      1.341      0.186      -0.001       0.004
per capita
physicians per 1000    -0.6046      0.144     -4.186      0.000      -0.895      -0.314
==============================================================================";

/// Static OLS results for expenditure and physicians; the what-if calculator uses this model
pub const REGRESSION_TWO: &str = "\
OLS Regression Results for Two Variables:
R-squared: 0.379
Adj. R-squared: 0.352
F-statistic: 14.32
Prob (F-statistic): 1.39e-05
----------------------------------------------------------------------------
                        coef    std err          t      P>|t|      [0.025      0.975]
----------------------------------------------------------------------------
const                  76.5784      9.766      7.841      0.000      56.932      96.225
health expenditure      0.0019      0.001      1.629      0.110      -0.000       0.004
per capita
physicians per 1000    -0.6299      0.128     -4.933      0.000      -0.887      -0.373
==============================================================================";

pub const DEATHS_LABEL: &str = "death per 100000";

/// Explanatory variable on a scatter plot's x axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Covariate {
    Beds,
    Physicians,
    Expenditure,
}

impl Covariate {
    pub const ALL: [Covariate; 3] = [Covariate::Beds, Covariate::Physicians, Covariate::Expenditure];

    pub fn label(self) -> &'static str {
        match self {
            Covariate::Beds => "beds per 1000",
            Covariate::Physicians => "physicians per 1000",
            Covariate::Expenditure => "health expenditure per capita",
        }
    }

    fn value(self, record: &HealthRecord) -> f64 {
        match self {
            Covariate::Beds => record.beds_per_1000,
            Covariate::Physicians => record.physicians_per_1000,
            Covariate::Expenditure => record.expenditure_per_capita,
        }
    }
}

/// Points and rounded axis bounds for one covariate
#[derive(Clone, Debug)]
pub struct ScatterPlot {
    pub covariate: Covariate,
    pub points: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ScatterPlot {
    pub fn build(records: &[HealthRecord], covariate: Covariate) -> Self {
        let points: Vec<(f64, f64)> = records
            .iter()
            .map(|r| (covariate.value(r), r.deaths_per_100k))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();

        let x_bounds = nice_extent(points.iter().map(|p| p.0));
        let y_bounds = nice_extent(points.iter().map(|p| p.1));
        Self {
            covariate,
            points,
            x_bounds,
            y_bounds,
        }
    }

    /// Axis tick labels at both ends and the midpoint
    pub fn x_labels(&self) -> [String; 3] {
        tick_labels(self.x_bounds)
    }

    pub fn y_labels(&self) -> [String; 3] {
        tick_labels(self.y_bounds)
    }
}

fn tick_labels(bounds: [f64; 2]) -> [String; 3] {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]].map(|v| {
        if v.fract() == 0.0 {
            format!("{v:.0}")
        } else {
            format!("{v:.1}")
        }
    })
}

/// Tick spacing of 1, 2 or 5 times a power of ten giving about `count` ticks
pub fn tick_step(start: f64, stop: f64, count: f64) -> f64 {
    let raw = (stop - start).abs() / count;
    let mut step = 10f64.powf(raw.log10().floor());
    let error = raw / step;
    if error >= 50f64.sqrt() {
        step *= 10.0;
    } else if error >= 10f64.sqrt() {
        step *= 5.0;
    } else if error >= 2f64.sqrt() {
        step *= 2.0;
    }
    step
}

/// Extent of `values` widened outward to round tick values
pub fn nice_extent(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if lo == hi {
        return [lo - 1.0, hi + 1.0];
    }

    let (mut lo, mut hi) = (lo, hi);
    let mut prev_step = f64::NAN;
    for _ in 0..10 {
        let step = tick_step(lo, hi, 10.0);
        if step == prev_step {
            break;
        }
        lo = (lo / step).floor() * step;
        hi = (hi / step).ceil() * step;
        prev_step = step;
    }
    [lo, hi]
}
