//! Rendered raster images and PNG export.

use crate::{Error, Result};
use image::{ImageFormat, RgbImage};
use std::path::Path;

/// An RGB8 image produced by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbImage,
}

impl RasterImage {
    /// Wraps a row-major RGB8 buffer.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFigureSize`] if `data` does not hold
    /// `width * height * 3` bytes.
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let pixels =
            RgbImage::from_raw(width, height, data).ok_or(Error::InvalidFigureSize { width, height })?;
        Ok(Self { pixels })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Color at `(x, y)`, or `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Raw row-major RGB8 bytes.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Writes the image as PNG.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or encoded.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.pixels.save_with_format(path, ImageFormat::Png)?;
        log::info!(
            "wrote {}x{} display to {}",
            self.width(),
            self.height(),
            path.display()
        );
        Ok(())
    }
}
