//! mx2display-render: Figure composition for the Mx2 event display.
//!
//! Draws the arrival-time panel, the three view heat maps and the pe
//! color bar with plotters into an owned RGB canvas, and exports the
//! result as PNG.
//!

mod colormap;
mod error;
mod figure;
mod raster;
mod renderer;
mod slices;

pub use colormap::{slice_color, Colormap, HIGHLIGHT_COLOR, MIN_PAINTED_WEIGHT, SLICE_PALETTE};
pub use error::{Error, Result};
pub use figure::{
    Background, DisplayOptions, FigureConfig, FigureLayout, PanelRect, ROW_HEIGHT_RATIOS,
};
pub use raster::RasterImage;
pub use renderer::{ColorBarLegend, EventDisplayRenderer, RenderedDisplay};
pub use slices::{render_slices, SliceDisplay};
