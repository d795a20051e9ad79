//! mx2display CLI.
//!
//! Renders the event display of one trigger from a hit batch file to PNG.
#![allow(clippy::uninlined_format_args)]

use clap::Parser;
use mx2display_core::{select_trigger, trigger_hits, SelectionPolicy};
use mx2display_io::{read_batch, RunLabel};
use mx2display_render::{
    render_slices, Background, DisplayOptions, EventDisplayRenderer, FigureConfig,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input error: {0}")]
    Input(#[from] mx2display_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] mx2display_core::Error),

    #[error("Render error: {0}")]
    Render(#[from] mx2display_render::Error),
}

/// Event display for the Mx2 tracker.
///
/// Reads a hit batch (`.json`, or `.h5` with the `hdf5` feature), picks a
/// trigger and writes its display as PNG.
#[derive(Parser, Debug)]
#[command(name = "mx2display")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input hit batch file
    input: PathBuf,

    /// Output PNG path
    output: PathBuf,

    /// Trigger to display (default: the one with the most clusters)
    #[arg(short, long)]
    trigger: Option<usize>,

    /// Keep only hits with more pe than this
    #[arg(long, default_value = "0.0")]
    min_pe: f64,

    /// Slice to highlight (0 draws the overview)
    #[arg(short, long, default_value = "0")]
    slice: u32,

    /// Also render one highlight display per slice into this directory
    #[arg(long)]
    per_slice_dir: Option<PathBuf>,

    /// Output resolution in pixels per inch
    #[arg(long, default_value = "60")]
    dpi: u32,

    /// Figure width in inches
    #[arg(long, default_value = "15.0")]
    width: f64,

    /// Figure height in inches
    #[arg(long, default_value = "10.0")]
    height: f64,

    /// Background color: white, black or #rrggbb
    #[arg(long, default_value = "white")]
    background: Background,

    /// Skip titles, axes and annotations (no fonts needed)
    #[arg(long)]
    no_labels: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn figure_config(&self) -> FigureConfig {
        FigureConfig::default()
            .with_size(self.width, self.height)
            .with_dpi(self.dpi)
            .with_background(self.background)
            .with_labels(!self.no_labels)
    }

    fn selection_policy(&self) -> SelectionPolicy {
        self.trigger
            .map_or(SelectionPolicy::MostClusters, SelectionPolicy::Index)
    }
}

fn slice_file_name(trigger: usize, slice: u32) -> String {
    format!("trigger{}_slice{}.png", trigger, slice)
}

fn run(cli: &Cli) -> Result<()> {
    let start = Instant::now();

    let batch = read_batch(&cli.input)?;
    let trigger = select_trigger(&batch, cli.selection_policy())?;
    let record = trigger_hits(&batch, trigger)?;
    let run_label = RunLabel::from_path(&cli.input).to_string();
    log::info!(
        "trigger {} of {}: {} hits, {} slices, {} clusters",
        trigger,
        batch.len(),
        record.len(),
        record.n_slices(),
        record.n_clusters_id()
    );

    let config = cli.figure_config();
    let options = DisplayOptions::default()
        .with_min_pe(cli.min_pe)
        .with_highlight_slice(cli.slice);

    let mut renderer = EventDisplayRenderer::new(config.clone());
    let rendered = renderer.render(&batch, trigger, &run_label, &options, None)?;
    rendered.image.save_png(&cli.output)?;

    if let Some(dir) = &cli.per_slice_dir {
        write_slices(dir, &batch, trigger, &run_label, cli.min_pe, &config, &rendered)?;
    }

    println!(
        "Rendered trigger {} (run {}) to {} in {:.2}s",
        trigger,
        run_label,
        cli.output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn write_slices(
    dir: &Path,
    batch: &mx2display_core::HitBatch,
    trigger: usize,
    run_label: &str,
    min_pe: f64,
    config: &FigureConfig,
    overview: &mx2display_render::RenderedDisplay,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let displays = render_slices(batch, trigger, run_label, min_pe, config, &overview.legend)?;
    for display in &displays {
        display
            .image
            .save_png(dir.join(slice_file_name(trigger, display.slice)))?;
    }
    log::info!("wrote {} slice displays to {}", displays.len(), dir.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    run(&cli)
}
