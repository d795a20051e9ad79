//! Figure configuration and panel layout.

use crate::{Error, Result};
use plotters::style::RGBColor;
use std::fmt;
use std::str::FromStr;

/// Height ratios of the time panel and the three view panels.
pub const ROW_HEIGHT_RATIOS: [f64; 4] = [0.5, 1.0, 1.0, 1.0];

/// Points per inch, used to scale font sizes with the DPI.
const POINTS_PER_INCH: f64 = 72.0;

/// Canvas background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub [u8; 3]);

impl Background {
    pub const WHITE: Background = Background([255, 255, 255]);
    pub const BLACK: Background = Background([0, 0, 0]);

    /// The color as a plotters color.
    #[must_use]
    pub fn color(self) -> RGBColor {
        RGBColor(self.0[0], self.0[1], self.0[2])
    }

    /// Text and axis color readable on this background.
    #[must_use]
    pub fn foreground(self) -> RGBColor {
        let [r, g, b] = self.0.map(u32::from);
        // Rec. 601 luma, scaled by 1000
        if 299 * r + 587 * g + 114 * b >= 128_000 {
            RGBColor(0, 0, 0)
        } else {
            RGBColor(255, 255, 255)
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::WHITE
    }
}

impl FromStr for Background {
    type Err = String;

    /// Parses `white`, `black` or a `#rrggbb` hex color.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" => Ok(Background::WHITE),
            "black" => Ok(Background::BLACK),
            hex => {
                let digits = hex
                    .strip_prefix('#')
                    .filter(|d| d.len() == 6 && d.is_ascii())
                    .ok_or_else(|| format!("expected white, black or #rrggbb, got '{s}'"))?;
                let channel = |i: usize| {
                    u8::from_str_radix(&digits[i..i + 2], 16)
                        .map_err(|_| format!("invalid hex color '{s}'"))
                };
                Ok(Background([channel(0)?, channel(2)?, channel(4)?]))
            }
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Figure size, resolution and text settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureConfig {
    /// Figure width in inches.
    pub width_in: f64,
    /// Figure height in inches.
    pub height_in: f64,
    /// Pixels per inch.
    pub dpi: u32,
    /// Canvas fill color.
    pub background: Background,
    /// Panel title size in points.
    pub title_font_pt: f64,
    /// Axis label and annotation size in points.
    pub label_font_pt: f64,
    /// Draw titles, axes and annotations. Without them no font is loaded.
    pub draw_labels: bool,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width_in: 15.0,
            height_in: 10.0,
            dpi: 60,
            background: Background::WHITE,
            title_font_pt: 20.0,
            label_font_pt: 15.0,
            draw_labels: true,
        }
    }
}

impl FigureConfig {
    /// Set the figure size in inches.
    #[must_use]
    pub fn with_size(mut self, width_in: f64, height_in: f64) -> Self {
        self.width_in = width_in;
        self.height_in = height_in;
        self
    }

    /// Set the resolution.
    #[must_use]
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    /// Enable or disable text rendering.
    #[must_use]
    pub fn with_labels(mut self, draw_labels: bool) -> Self {
        self.draw_labels = draw_labels;
        self
    }

    /// Canvas size in pixels (inches × DPI).
    ///
    /// # Errors
    /// Returns [`Error::InvalidFigureSize`] if either side rounds to zero
    /// or the size is not finite.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_size(&self) -> Result<(u32, u32)> {
        let dpi = f64::from(self.dpi);
        let to_px = |inches: f64| {
            let px = (inches * dpi).round();
            if px.is_finite() && px >= 1.0 && px <= f64::from(u16::MAX) {
                px as u32
            } else {
                0
            }
        };
        let (width, height) = (to_px(self.width_in), to_px(self.height_in));
        if width == 0 || height == 0 {
            return Err(Error::InvalidFigureSize { width, height });
        }
        Ok((width, height))
    }

    /// Converts a font size in points to pixels at this DPI.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn font_px(&self, points: f64) -> i32 {
        ((points * f64::from(self.dpi) / POINTS_PER_INCH).round() as i32).max(6)
    }
}

/// Pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PanelRect {
    /// Returns true if the pixel lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Where each panel goes on the canvas.
///
/// The view panels share the left column with the time panel on top;
/// the pe color bar sits to their right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureLayout {
    pub time_panel: PanelRect,
    /// X, U and V panels from top to bottom.
    pub view_panels: [PanelRect; 3],
    pub color_bar: PanelRect,
}

impl FigureLayout {
    /// Lays out a canvas of `width` × `height` pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as i32, height as i32);
        let bar_width = (f64::from(width) * 0.08).round() as i32;
        let bar_width = bar_width.clamp(1, (width - 1).max(1));
        let main_width = (width - bar_width).max(1);

        let total: f64 = ROW_HEIGHT_RATIOS.iter().sum();
        let unit = f64::from(height) / total;
        let time_height = (unit * ROW_HEIGHT_RATIOS[0]).round() as i32;
        let view_height = (height - time_height) / 3;

        let mut view_panels = [PanelRect {
            x: 0,
            y: 0,
            width: main_width,
            height: view_height,
        }; 3];
        for (i, panel) in (0i32..).zip(view_panels.iter_mut()) {
            panel.y = time_height + i * view_height;
        }
        // last row takes the rounding remainder
        view_panels[2].height = height - view_panels[2].y;

        Self {
            time_panel: PanelRect {
                x: 0,
                y: 0,
                width: main_width,
                height: time_height,
            },
            view_panels,
            color_bar: PanelRect {
                x: main_width,
                y: time_height,
                width: bar_width,
                height: height - time_height,
            },
        }
    }
}

/// Per-render selection settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayOptions {
    /// Hits need strictly more pe than this.
    pub min_pe: f64,
    /// Slice to highlight; 0 draws the overview.
    pub highlight_slice: u32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            min_pe: 0.0,
            highlight_slice: 0,
        }
    }
}

impl DisplayOptions {
    #[must_use]
    pub fn with_min_pe(mut self, min_pe: f64) -> Self {
        self.min_pe = min_pe;
        self
    }

    #[must_use]
    pub fn with_highlight_slice(mut self, highlight_slice: u32) -> Self {
        self.highlight_slice = highlight_slice;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pixel_size() {
        assert_eq!(FigureConfig::default().pixel_size().unwrap(), (900, 600));
        let hires = FigureConfig::default().with_dpi(100);
        assert_eq!(hires.pixel_size().unwrap(), (1500, 1000));
    }

    #[test]
    fn test_invalid_pixel_size() {
        let config = FigureConfig::default().with_size(0.0, 10.0);
        assert!(matches!(
            config.pixel_size(),
            Err(Error::InvalidFigureSize { width: 0, .. })
        ));
        let config = FigureConfig::default().with_size(f64::NAN, 10.0);
        assert!(config.pixel_size().is_err());
    }

    #[test]
    fn test_background_parse() {
        assert_eq!("white".parse::<Background>().unwrap(), Background::WHITE);
        assert_eq!("BLACK".parse::<Background>().unwrap(), Background::BLACK);
        assert_eq!(
            "#1f77b4".parse::<Background>().unwrap(),
            Background([31, 119, 180])
        );
        assert!("#12345".parse::<Background>().is_err());
        assert!("#gg0000".parse::<Background>().is_err());
        assert!("teal".parse::<Background>().is_err());
        assert_eq!(Background([31, 119, 180]).to_string(), "#1f77b4");
    }

    #[test]
    fn test_foreground_contrast() {
        assert_eq!(Background::WHITE.foreground(), RGBColor(0, 0, 0));
        assert_eq!(Background::BLACK.foreground(), RGBColor(255, 255, 255));
        assert_eq!(Background([20, 20, 80]).foreground(), RGBColor(255, 255, 255));
    }

    #[test]
    fn test_layout_rows_follow_ratios() {
        let layout = FigureLayout::new(900, 700);
        assert_eq!(layout.time_panel.height, 100);
        assert_eq!(layout.view_panels[0].y, 100);
        assert_eq!(layout.view_panels[0].height, 200);
        assert_eq!(layout.view_panels[2].y + layout.view_panels[2].height, 700);
        assert_eq!(layout.color_bar.x, layout.time_panel.width);
        assert_eq!(layout.color_bar.x + layout.color_bar.width, 900);
    }

    #[test]
    fn test_layout_panels_do_not_overlap() {
        let layout = FigureLayout::new(901, 601);
        let [x, u, v] = layout.view_panels;
        assert_eq!(x.y + x.height, u.y);
        assert_eq!(u.y + u.height, v.y);
        assert!(!layout.time_panel.contains(0, x.y));
        assert!(layout.color_bar.contains(layout.color_bar.x, x.y));
        assert!(!x.contains(layout.color_bar.x, x.y));
    }

    #[test]
    fn test_font_scales_with_dpi() {
        let config = FigureConfig::default();
        assert_eq!(config.font_px(20.0), 17);
        assert_eq!(config.with_dpi(144).font_px(20.0), 40);
    }
}
