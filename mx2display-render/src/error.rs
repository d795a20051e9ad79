//! Error types for mx2display-render.

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Errors that can occur while composing or exporting a display.
#[derive(Error, Debug)]
pub enum Error {
    /// The plotting backend failed to draw.
    #[error("drawing error: {0}")]
    Drawing(String),

    /// The canvas size derived from the figure config is unusable.
    #[error("invalid figure size: {width}x{height} pixels")]
    InvalidFigureSize { width: u32, height: u32 },

    /// Image encoding or file output failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error while exporting.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the histogram layer.
    #[error("core error: {0}")]
    CoreError(#[from] mx2display_core::Error),
}

impl<E> From<DrawingAreaErrorKind<E>> for Error
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Error::Drawing(err.to_string())
    }
}

/// Result type for mx2display-render operations.
pub type Result<T> = std::result::Result<T, Error>;
