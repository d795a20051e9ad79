//! Colormaps for the view panels and the time-panel layers.

use plotters::style::RGBColor;

/// Anchor colors of matplotlib's "magma", evenly spaced on `[0, 1]`.
const MAGMA_ANCHORS: [[u8; 3]; 9] = [
    [0, 0, 4],
    [28, 16, 68],
    [79, 18, 123],
    [129, 37, 129],
    [181, 54, 122],
    [229, 80, 100],
    [251, 135, 97],
    [254, 194, 135],
    [252, 253, 191],
];

/// Qualitative cycle for slice overlays ("tab10").
pub const SLICE_PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Color of the highlighted slice layer.
pub const HIGHLIGHT_COLOR: RGBColor = RGBColor(255, 0, 0);

/// Bins with less pe than this are left unpainted.
pub const MIN_PAINTED_WEIGHT: f64 = 1e-4;

/// Overlay color for the `index`-th drawn slice layer.
#[must_use]
pub fn slice_color(index: usize) -> RGBColor {
    SLICE_PALETTE[index % SLICE_PALETTE.len()]
}

/// Available colormaps for the view heat maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    /// Magma reversed - pale yellow at zero to near-black at saturation.
    #[default]
    MagmaReversed,
    /// Grayscale reversed - white to black.
    Grayscale,
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colormap::MagmaReversed => write!(f, "magma_r"),
            Colormap::Grayscale => write!(f, "gray_r"),
        }
    }
}

impl Colormap {
    /// Apply the colormap to a normalized value in `[0, 1]`.
    ///
    /// Values outside the range are clamped.
    #[must_use]
    pub fn apply(self, val: f64) -> [u8; 3] {
        let val = if val.is_nan() { 0.0 } else { val.clamp(0.0, 1.0) };
        match self {
            Colormap::MagmaReversed => magma(1.0 - val),
            Colormap::Grayscale => {
                let v = f64_to_u8(255.0 * (1.0 - val));
                [v, v, v]
            }
        }
    }

    /// [`Colormap::apply`] as a plotters color.
    #[must_use]
    pub fn color(self, val: f64) -> RGBColor {
        let [r, g, b] = self.apply(val);
        RGBColor(r, g, b)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn magma(val: f64) -> [u8; 3] {
    let segments = (MAGMA_ANCHORS.len() - 1) as f64;
    let pos = val * segments;
    let lo = (pos.floor() as usize).min(MAGMA_ANCHORS.len() - 2);
    let frac = pos - lo as f64;
    let (a, b) = (MAGMA_ANCHORS[lo], MAGMA_ANCHORS[lo + 1]);
    let mix = |i: usize| f64_to_u8(f64::from(a[i]) + (f64::from(b[i]) - f64::from(a[i])) * frac);
    [mix(0), mix(1), mix(2)]
}

/// Convert f64 to u8 with clamping to [0, 255].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn f64_to_u8(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}
