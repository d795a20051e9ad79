//! Event display composition.
//!
//! The figure has four rows in the left column (the arrival-time panel
//! on top, then the X, U and V view heat maps) and one pe color bar for
//! the view panels on the right. See [`FigureLayout`] for the geometry.

use crate::colormap::{slice_color, Colormap, HIGHLIGHT_COLOR, MIN_PAINTED_WEIGHT};
use crate::figure::{DisplayOptions, FigureConfig, FigureLayout, PanelRect};
use crate::raster::RasterImage;
use crate::Result;
use mx2display_core::profile::{TIME_WINDOW_END_US, TIME_WINDOW_START_US};
use mx2display_core::{
    trigger_hits, ColorScale, HitBatch, LayerKind, ProfileLayer, ProfileMode, TimeProfile,
    View, ViewFilter, ViewImage, PE_COLOR_RANGE,
};
use plotters::coord::Shift;
use plotters::prelude::*;

const FONT: &str = "sans-serif";

/// Lower end of the log-scaled time axis, below a single count.
const LOG_FLOOR: f64 = 0.5;

/// Upper end of the time axis as a multiple of the annotation anchor.
const LOG_HEADROOM: f64 = 40.0;

const COLOR_BAR_STEPS: u32 = 70;

/// Color bar for the view panels.
///
/// Created on the first render of a session and handed back to later
/// renders so every figure shares one scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBarLegend {
    label: String,
    scale: ColorScale,
    colormap: Colormap,
}

impl Default for ColorBarLegend {
    fn default() -> Self {
        Self::pe()
    }
}

impl ColorBarLegend {
    /// The standard `Mx2 pe` bar: reversed magma over `[0, 35]` pe.
    #[must_use]
    pub fn pe() -> Self {
        Self::new("Mx2 pe", PE_COLOR_RANGE, Colormap::MagmaReversed)
    }

    #[must_use]
    pub fn new(label: impl Into<String>, scale: ColorScale, colormap: Colormap) -> Self {
        Self {
            label: label.into(),
            scale,
            colormap,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn scale(&self) -> ColorScale {
        self.scale
    }

    #[must_use]
    pub fn colormap(&self) -> Colormap {
        self.colormap
    }

    /// Fill color of a bin with `weight` pe, or `None` if the bin stays
    /// unpainted.
    #[must_use]
    pub fn color(&self, weight: f64) -> Option<RGBColor> {
        if weight < MIN_PAINTED_WEIGHT {
            return None;
        }
        Some(self.colormap.color(self.scale.normalize(weight)))
    }

    /// Evenly spaced `(lo, hi, color)` bands covering the scale.
    fn bands(&self) -> impl Iterator<Item = (f64, f64, RGBColor)> + '_ {
        let span = self.scale.max - self.scale.min;
        let steps = f64::from(COLOR_BAR_STEPS);
        (0..COLOR_BAR_STEPS).map(move |i| {
            let lo = self.scale.min + span * f64::from(i) / steps;
            let hi = self.scale.min + span * f64::from(i + 1) / steps;
            let mid = (f64::from(i) + 0.5) / steps;
            (lo, hi, self.colormap.color(mid))
        })
    }
}

/// Output of one render.
#[derive(Debug, Clone)]
pub struct RenderedDisplay {
    pub image: RasterImage,
    /// The color bar used, to pass to the next render.
    pub legend: ColorBarLegend,
}

/// Renders event displays into an owned RGB canvas.
///
/// The canvas is reused across renders and cleared before each one.
/// Concurrent renders need one renderer each.
#[derive(Debug)]
pub struct EventDisplayRenderer {
    config: FigureConfig,
    canvas: Vec<u8>,
}

impl EventDisplayRenderer {
    #[must_use]
    pub fn new(config: FigureConfig) -> Self {
        Self {
            config,
            canvas: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &FigureConfig {
        &self.config
    }

    /// Renders trigger `trigger` of `batch`.
    ///
    /// A `legend` from a previous render is reused; without one the
    /// standard pe color bar is created.
    ///
    /// # Errors
    /// Returns an error if the trigger does not exist, the figure size is
    /// invalid, or drawing fails.
    pub fn render(
        &mut self,
        batch: &HitBatch,
        trigger: usize,
        run_label: &str,
        options: &DisplayOptions,
        legend: Option<&ColorBarLegend>,
    ) -> Result<RenderedDisplay> {
        let record = trigger_hits(batch, trigger)?;
        let (width, height) = self.config.pixel_size()?;
        let legend = legend.cloned().unwrap_or_else(|| {
            log::debug!("creating color bar");
            ColorBarLegend::pe()
        });

        let profile = TimeProfile::from_record(record, options.min_pe, options.highlight_slice);
        let filter = ViewFilter::default()
            .with_min_pe(options.min_pe)
            .with_time_slice(options.highlight_slice);
        let views = View::ALL.map(|view| ViewImage::from_record(record, view, &filter));

        let scene = Scene {
            config: &self.config,
            layout: FigureLayout::new(width, height),
            profile: &profile,
            views: &views,
            legend: &legend,
            trigger,
            run_label,
        };

        self.canvas.clear();
        self.canvas.resize(canvas_len(width, height), 0);
        {
            let root = BitMapBackend::with_buffer(&mut self.canvas, (width, height))
                .into_drawing_area();
            scene.draw(&root)?;
            root.present()?;
        }

        log::debug!(
            "rendered trigger {trigger} slice {} at {width}x{height}",
            options.highlight_slice
        );
        Ok(RenderedDisplay {
            image: RasterImage::from_rgb(width, height, self.canvas.clone())?,
            legend,
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn canvas_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

#[allow(clippy::cast_precision_loss)]
fn u64_to_f64(value: u64) -> f64 {
    value as f64
}

fn axis_range(edges: &[f64]) -> std::ops::Range<f64> {
    match (edges.first(), edges.last()) {
        (Some(&lo), Some(&hi)) if hi > lo => lo..hi,
        _ => 0.0..1.0,
    }
}

fn sub_area<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    rect: PanelRect,
) -> DrawingArea<DB, Shift> {
    root.clone().shrink((rect.x, rect.y), (rect.width, rect.height))
}

fn base_layer_color(mode: ProfileMode, fg: RGBColor) -> RGBAColor {
    match mode {
        ProfileMode::Overview => fg.mix(0.9),
        // faded so the red slice overlay reads against the full event
        ProfileMode::Highlight(_) => fg.mix(0.35),
    }
}

fn layer_bars(
    edges: &[f64],
    layer: &ProfileLayer,
    color: RGBAColor,
) -> Vec<Rectangle<(f64, f64)>> {
    layer
        .counts()
        .iter()
        .zip(edges.windows(2))
        .filter(|&(&count, _)| count > 0)
        .map(|(&count, bin)| {
            Rectangle::new(
                [(bin[0], LOG_FLOOR), (bin[1], u64_to_f64(count))],
                color.filled(),
            )
        })
        .collect()
}

/// Everything one figure is drawn from.
struct Scene<'a> {
    config: &'a FigureConfig,
    layout: FigureLayout,
    profile: &'a TimeProfile,
    views: &'a [ViewImage; 3],
    legend: &'a ColorBarLegend,
    trigger: usize,
    run_label: &'a str,
}

impl Scene<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&self.config.background.color())?;

        self.draw_time_panel(&sub_area(root, self.layout.time_panel))?;
        for (i, (image, rect)) in self.views.iter().zip(self.layout.view_panels).enumerate() {
            // only the bottom panel carries the shared z axis label
            let show_z_label = i + 1 == self.views.len();
            self.draw_view_panel(&sub_area(root, rect), image, show_z_label)?;
        }
        self.draw_color_bar(&sub_area(root, self.layout.color_bar))?;
        Ok(())
    }

    fn title_style(&self) -> TextStyle<'static> {
        (FONT, self.config.font_px(self.config.title_font_pt))
            .into_font()
            .color(&self.config.background.foreground())
    }

    fn label_style(&self) -> TextStyle<'static> {
        (FONT, self.config.font_px(self.config.label_font_pt))
            .into_font()
            .color(&self.config.background.foreground())
    }

    fn margin(&self) -> i32 {
        self.config.font_px(6.0)
    }

    fn draw_time_panel<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<()> {
        let labels = self.config.draw_labels;
        let label_px = self.config.font_px(self.config.label_font_pt);
        let top = self.profile.annotation_anchor() * LOG_HEADROOM;

        let mut builder = ChartBuilder::on(area);
        builder.margin(self.margin());
        if labels {
            builder
                .caption("Mx2 hit times", self.title_style())
                .x_label_area_size(label_px * 2)
                .y_label_area_size(label_px * 4);
        }
        let mut chart = builder.build_cartesian_2d(
            TIME_WINDOW_START_US..TIME_WINDOW_END_US,
            (LOG_FLOOR..top).log_scale(),
        )?;

        if labels {
            chart
                .configure_mesh()
                .disable_mesh()
                .axis_style(&self.config.background.foreground())
                .x_desc("time [µs]")
                .y_desc("hits")
                .label_style(self.label_style())
                .axis_desc_style(self.label_style())
                .draw()?;
        }

        let fg = self.config.background.foreground();
        let edges = self.profile.edges();
        let base_color = base_layer_color(self.profile.mode(), fg);
        chart.draw_series(layer_bars(edges, self.profile.base(), base_color))?;

        for (i, layer) in self.profile.overlays().iter().enumerate() {
            let color = match layer.kind() {
                LayerKind::Highlight(_) => HIGHLIGHT_COLOR.mix(0.85),
                _ => slice_color(i).mix(0.8),
            };
            chart.draw_series(layer_bars(edges, layer, color))?;
        }

        if labels {
            let style = self.label_style();
            chart.draw_series(
                self.profile
                    .annotations(self.trigger, self.run_label)
                    .into_iter()
                    .map(|note| Text::new(note.text, (note.x_us, note.y), style.clone())),
            )?;
        }
        Ok(())
    }

    fn draw_view_panel<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        image: &ViewImage,
        show_z_label: bool,
    ) -> Result<()> {
        let labels = self.config.draw_labels;
        let label_px = self.config.font_px(self.config.label_font_pt);
        let view = image.view();

        let mut builder = ChartBuilder::on(area);
        builder.margin(self.margin());
        if labels {
            builder
                .caption(view.title(), self.title_style())
                .x_label_area_size(label_px * 2)
                .y_label_area_size(label_px * 4);
        }
        let mut chart = builder.build_cartesian_2d(
            axis_range(image.z_edges()),
            axis_range(image.transverse_edges()),
        )?;

        if labels {
            let mut mesh = chart.configure_mesh();
            mesh.disable_mesh()
                .axis_style(&self.config.background.foreground())
                .y_desc(view.axis_label())
                .label_style(self.label_style())
                .axis_desc_style(self.label_style());
            if show_z_label {
                mesh.x_desc("z [mm]");
            }
            mesh.draw()?;
        }

        let cells: Vec<Rectangle<(f64, f64)>> = image
            .cells()
            .filter_map(|cell| {
                let color = self.legend.color(cell.weight)?;
                Some(Rectangle::new(
                    [
                        (cell.z_lo, cell.transverse_lo),
                        (cell.z_hi, cell.transverse_hi),
                    ],
                    color.filled(),
                ))
            })
            .collect();
        log::debug!(
            "{}: {} hits, {} painted bins, {:.1} pe",
            view.title(),
            image.selected_hits(),
            cells.len(),
            image.total_weight()
        );
        chart.draw_series(cells)?;
        Ok(())
    }

    fn draw_color_bar<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<()> {
        let scale = self.legend.scale();
        let label_px = self.config.font_px(self.config.label_font_pt);

        let mut builder = ChartBuilder::on(area);
        builder.margin(self.margin());
        if self.config.draw_labels {
            builder.right_y_label_area_size(label_px * 3);
        }
        let mut chart = builder.build_cartesian_2d(0.0..1.0, scale.min..scale.max)?;

        if self.config.draw_labels {
            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(0)
                .axis_style(&self.config.background.foreground())
                .y_desc(self.legend.label())
                .label_style(self.label_style())
                .axis_desc_style(self.label_style())
                .draw()?;
        }

        chart.draw_series(
            self.legend
                .bands()
                .map(|(lo, hi, color)| Rectangle::new([(0.0, lo), (1.0, hi)], color.filled())),
        )?;
        Ok(())
    }
}
