pub mod geometry;
mod projection;
mod renderer;
pub mod scale;
mod spatial;

pub use projection::{Viewport, CONTIGUOUS_US};
pub use renderer::{draw_borders, rasterize, Boundaries, ChoroplethRenderer, Region};
pub use scale::{ColorScale, HIGHLIGHT_FILL, NO_DATA_FILL};
