//! Parallel per-slice rendering.

use crate::figure::{DisplayOptions, FigureConfig};
use crate::raster::RasterImage;
use crate::renderer::{ColorBarLegend, EventDisplayRenderer};
use crate::Result;
use mx2display_core::{trigger_hits, HitBatch};
use rayon::prelude::*;

/// Highlight display of one slice.
#[derive(Debug, Clone)]
pub struct SliceDisplay {
    pub slice: u32,
    pub image: RasterImage,
}

/// Renders one highlight display per slice `1..=n_slices` of `trigger`.
///
/// Slices are rendered in parallel, each on its own renderer with its own
/// copy of `legend`. Results are ordered by slice number.
///
/// # Errors
/// Returns the first error encountered if any render fails.
pub fn render_slices(
    batch: &HitBatch,
    trigger: usize,
    run_label: &str,
    min_pe: f64,
    config: &FigureConfig,
    legend: &ColorBarLegend,
) -> Result<Vec<SliceDisplay>> {
    let n_slices = trigger_hits(batch, trigger)?.n_slices();
    log::debug!("rendering {n_slices} slices of trigger {trigger}");

    (1..=n_slices)
        .into_par_iter()
        .map(|slice| {
            let mut renderer = EventDisplayRenderer::new(config.clone());
            let options = DisplayOptions::default()
                .with_min_pe(min_pe)
                .with_highlight_slice(slice);
            let rendered = renderer.render(batch, trigger, run_label, &options, Some(legend))?;
            Ok(SliceDisplay {
                slice,
                image: rendered.image,
            })
        })
        .collect()
}
