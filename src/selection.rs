//! Selection controller
//!
//! Holds the two independent pieces of interactive state, the slider date
//! and the hovered region, and turns input events into redraw requests.
//! The controller never touches a renderer itself; the session applies the
//! returned [`Redraw`]s, so transitions can be tested without a terminal.

use crate::error::{DashboardError, Result};

/// User input, already decoded from whatever produced it
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionEvent {
    /// Move the slider to an absolute position
    SetDate(usize),
    /// Move the slider relative to its current position
    StepDate(i64),
    /// Pointer entered a region (`Some`) or left every region (`None`)
    SetHover(Option<String>),
}

/// Work the session must do after a transition
#[derive(Clone, Debug, PartialEq)]
pub enum Redraw {
    /// Recolor the choropleth for the current date
    Map,
    /// Paint the hovered region with the highlight fill
    Highlight(String),
    /// Show the detail panel for a region at the current date
    Detail(String),
    /// Hide the detail panel
    DismissDetail,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
    pub current_date_index: usize,
    pub hovered_region: Option<String>,
}

pub struct SelectionController {
    state: SelectionState,
    date_count: usize,
}

impl SelectionController {
    /// Start at the first date with nothing hovered
    pub fn new(date_count: usize) -> Self {
        Self {
            state: SelectionState::default(),
            date_count,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn date_index(&self) -> usize {
        self.state.current_date_index
    }

    pub fn hovered(&self) -> Option<&str> {
        self.state.hovered_region.as_deref()
    }

    pub fn dispatch(&mut self, event: SelectionEvent) -> Result<Vec<Redraw>> {
        match event {
            SelectionEvent::SetDate(index) => self.set_date(index as i64),
            SelectionEvent::StepDate(delta) => {
                let target = (self.state.current_date_index as i64).saturating_add(delta);
                self.set_date(target)
            }
            SelectionEvent::SetHover(region) => Ok(self.set_hover(region)),
        }
    }

    /// Out-of-range indices leave the state untouched
    fn set_date(&mut self, index: i64) -> Result<Vec<Redraw>> {
        if index < 0 || index as u64 >= self.date_count as u64 {
            return Err(DashboardError::OutOfRange {
                index,
                len: self.date_count,
            });
        }
        self.state.current_date_index = index as usize;
        let mut redraws = vec![Redraw::Map];
        // Hover survives a date change; refresh its highlight and breakdown
        if let Some(name) = &self.state.hovered_region {
            redraws.push(Redraw::Highlight(name.clone()));
            redraws.push(Redraw::Detail(name.clone()));
        }
        Ok(redraws)
    }

    fn set_hover(&mut self, region: Option<String>) -> Vec<Redraw> {
        self.state.hovered_region = region.clone();
        match region {
            Some(name) => vec![Redraw::Highlight(name.clone()), Redraw::Detail(name)],
            None => vec![Redraw::DismissDetail, Redraw::Map],
        }
    }
}
