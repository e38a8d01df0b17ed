//! What-if calculator over the two-variable death-rate model

/// Deaths per 100000 at zero physicians and zero expenditure
pub const INTERCEPT: f64 = 76.5784;
/// Per dollar of health expenditure per capita
pub const EXPENDITURE_COEF: f64 = 0.0019;
/// Per physician per 1000 residents
pub const PHYSICIANS_COEF: f64 = -0.6299;

/// Lowest allowed change; resources cannot drop below zero
const MIN_CHANGE_PCT: f64 = -100.0;
const MAX_CHANGE_PCT: f64 = 500.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    pub state: &'static str,
    pub physicians_per_1000: f64,
    pub expenditure_per_capita: f64,
}

pub const BASELINES: [Baseline; 4] = [
    Baseline {
        state: "New York",
        physicians_per_1000: 3.5,
        expenditure_per_capita: 9500.0,
    },
    Baseline {
        state: "California",
        physicians_per_1000: 2.9,
        expenditure_per_capita: 7500.0,
    },
    Baseline {
        state: "Washington",
        physicians_per_1000: 4.1,
        expenditure_per_capita: 8500.0,
    },
    Baseline {
        state: "Florida",
        physicians_per_1000: 2.8,
        expenditure_per_capita: 7000.0,
    },
];

/// Predicted deaths per 100000
pub fn death_rate(physicians_per_1000: f64, expenditure_per_capita: f64) -> f64 {
    INTERCEPT + EXPENDITURE_COEF * expenditure_per_capita + PHYSICIANS_COEF * physicians_per_1000
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Physicians,
    Expenditure,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    pub state: &'static str,
    pub old_rate: f64,
    pub new_rate: f64,
}

/// Percentage changes applied to every baseline state
#[derive(Clone, Debug, Default)]
pub struct WhatIf {
    pub physicians_change_pct: f64,
    pub expenditure_change_pct: f64,
    pub focus: Option<Input>,
}

impl WhatIf {
    pub fn new() -> Self {
        Self {
            focus: Some(Input::Physicians),
            ..Self::default()
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Some(Input::Physicians) => Some(Input::Expenditure),
            _ => Some(Input::Physicians),
        };
    }

    /// Nudge the focused input by `delta` percentage points
    pub fn adjust(&mut self, delta: f64) {
        let field = match self.focus {
            Some(Input::Physicians) => &mut self.physicians_change_pct,
            Some(Input::Expenditure) => &mut self.expenditure_change_pct,
            None => return,
        };
        *field = (*field + delta).clamp(MIN_CHANGE_PCT, MAX_CHANGE_PCT);
    }

    pub fn reset(&mut self) {
        self.physicians_change_pct = 0.0;
        self.expenditure_change_pct = 0.0;
    }

    pub fn project(&self) -> Vec<Projection> {
        BASELINES
            .iter()
            .map(|b| {
                let physicians = b.physicians_per_1000 * (1.0 + self.physicians_change_pct / 100.0);
                let expenditure = b.expenditure_per_capita * (1.0 + self.expenditure_change_pct / 100.0);
                Projection {
                    state: b.state,
                    old_rate: death_rate(b.physicians_per_1000, b.expenditure_per_capita),
                    new_rate: death_rate(physicians, expenditure),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_rates() {
        let projections = WhatIf::new().project();
        assert_eq!(projections.len(), 4);
        let ny = &projections[0];
        assert_eq!(ny.state, "New York");
        assert_eq!(format!("{:.2}", ny.old_rate), "92.42");
        assert_eq!(ny.old_rate, ny.new_rate);
    }

    #[test]
    fn test_more_physicians_lowers_rate() {
        let mut whatif = WhatIf::new();
        whatif.adjust(10.0);
        assert_eq!(whatif.physicians_change_pct, 10.0);
        let ny = &whatif.project()[0];
        assert_eq!(format!("{:.2}", ny.new_rate), "92.20");
        assert!(ny.new_rate < ny.old_rate);
    }

    #[test]
    fn test_more_expenditure_raises_rate() {
        let mut whatif = WhatIf::new();
        whatif.toggle_focus();
        whatif.adjust(20.0);
        assert_eq!(whatif.expenditure_change_pct, 20.0);
        // Florida: +1400 dollars -> +2.66
        let fl = &whatif.project()[3];
        assert!((fl.new_rate - fl.old_rate - 2.66).abs() < 1e-9);
    }

    #[test]
    fn test_change_is_clamped() {
        let mut whatif = WhatIf::new();
        whatif.adjust(-250.0);
        assert_eq!(whatif.physicians_change_pct, -100.0);
        whatif.reset();
        assert_eq!(whatif.physicians_change_pct, 0.0);
    }
}
