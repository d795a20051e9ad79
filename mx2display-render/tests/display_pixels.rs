//! Pixel-level checks of rendered displays.
//!
//! These renders run with labels disabled so no system font is needed.

use mx2display_core::{Hit, HitBatch, Offsets, TriggerRecord, View};
use mx2display_render::{
    Background, ColorBarLegend, DisplayOptions, EventDisplayRenderer, FigureConfig,
    FigureLayout, PanelRect, RasterImage,
};

/// One X hit and a 500 ns burst of U hits, all in slice 1.
fn burst_batch() -> HitBatch {
    let mut record = TriggerRecord::new(Offsets::default()).with_counts(1, 2);
    record
        .push(Hit::new(5, 10, View::X, 2.0, 1000.0).with_time_slice(1))
        .unwrap();
    for k in 0..50 {
        let time = 2000.0 + 10.0 * f64::from(k) + 5.0;
        record
            .push(Hit::new(20, 60, View::U, 1.0, time).with_time_slice(1))
            .unwrap();
    }
    HitBatch::new(vec![record])
}

fn config() -> FigureConfig {
    FigureConfig::default()
        .with_size(10.0, 7.0)
        .with_dpi(100)
        .with_labels(false)
}

fn painted_pixels(image: &RasterImage, rect: PanelRect, background: Background) -> usize {
    let mut count = 0;
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            let pixel = image.pixel(x.unsigned_abs(), y.unsigned_abs());
            if pixel.is_some_and(|p| p != background.0) {
                count += 1;
            }
        }
    }
    count
}

fn render(config: FigureConfig, options: &DisplayOptions) -> (RasterImage, FigureLayout) {
    let layout_size = config.pixel_size().unwrap();
    let mut renderer = EventDisplayRenderer::new(config);
    let rendered = renderer
        .render(&burst_batch(), 0, "001234_0005", options, None)
        .unwrap();
    (rendered.image, FigureLayout::new(layout_size.0, layout_size.1))
}

#[test]
fn test_overview_paints_only_populated_views() {
    let (image, layout) = render(config(), &DisplayOptions::default());
    assert_eq!((image.width(), image.height()), (1000, 700));

    let bg = Background::WHITE;
    let [x, u, v] = layout.view_panels;
    assert!(painted_pixels(&image, x, bg) > 0);
    assert!(painted_pixels(&image, u, bg) > 0);
    assert_eq!(painted_pixels(&image, v, bg), 0);
    assert!(painted_pixels(&image, layout.time_panel, bg) > 0);
    assert!(painted_pixels(&image, layout.color_bar, bg) > 0);
}

#[test]
fn test_slice_without_hits_leaves_views_blank() {
    let options = DisplayOptions::default().with_highlight_slice(2);
    let (image, layout) = render(config(), &options);

    let bg = Background::WHITE;
    for panel in layout.view_panels {
        assert_eq!(painted_pixels(&image, panel, bg), 0);
    }
    // the base layer still shows every hit
    assert!(painted_pixels(&image, layout.time_panel, bg) > 0);
}

#[test]
fn test_threshold_removes_low_pe_hits() {
    let options = DisplayOptions::default().with_min_pe(1.5);
    let (image, layout) = render(config(), &options);

    let bg = Background::WHITE;
    let [x, u, _] = layout.view_panels;
    assert!(painted_pixels(&image, x, bg) > 0);
    assert_eq!(painted_pixels(&image, u, bg), 0);
}

#[test]
fn test_background_color() {
    let bg = Background([20, 30, 40]);
    let (image, layout) = render(config().with_background(bg), &DisplayOptions::default());

    assert_eq!(image.pixel(0, 0), Some(bg.0));
    assert_eq!(painted_pixels(&image, layout.view_panels[2], bg), 0);
}

#[test]
fn test_renderer_reuse_is_stateless() {
    let batch = burst_batch();
    let mut renderer = EventDisplayRenderer::new(config());
    let overview = DisplayOptions::default();
    let highlight = DisplayOptions::default().with_highlight_slice(1);

    let first = renderer.render(&batch, 0, "unknown", &overview, None).unwrap();
    let other = renderer
        .render(&batch, 0, "unknown", &highlight, Some(&first.legend))
        .unwrap();
    let again = renderer
        .render(&batch, 0, "unknown", &overview, Some(&other.legend))
        .unwrap();

    assert_ne!(first.image, other.image);
    assert_eq!(first.image, again.image);
    assert_eq!(again.legend, ColorBarLegend::pe());
}

#[test]
#[ignore = "requires system fonts"]
fn test_labelled_render_exports_png() {
    let config = FigureConfig::default();
    let mut renderer = EventDisplayRenderer::new(config);
    let rendered = renderer
        .render(&burst_batch(), 0, "001234_0005", &DisplayOptions::default(), None)
        .unwrap();
    assert_eq!((rendered.image.width(), rendered.image.height()), (900, 600));

    let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    rendered.image.save_png(file.path()).unwrap();
    let decoded = image::open(file.path()).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (900, 600));
}
