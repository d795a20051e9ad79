//! Error types for mx2display-core.

use thiserror::Error;

/// Result type alias for mx2display operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the event display.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The hit batch holds no triggers to select from.
    #[error("hit batch contains no triggers")]
    EmptyBatch,

    /// Requested trigger index is past the end of the batch.
    #[error("trigger {index} not found (batch has {len} triggers)")]
    TriggerNotFound { index: usize, len: usize },

    /// Per-hit columns of one trigger have different lengths.
    #[error("per-hit column `{column}` has {found} entries, expected {expected}")]
    ShapeMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
    },

    /// View code outside `{1, 2, 3}`.
    #[error("invalid view code: {0}")]
    InvalidView(i32),

    /// A hit violates a value invariant (negative pe, negative slice id, ...).
    #[error("invalid hit {index}: {reason}")]
    InvalidHit { index: usize, reason: String },
}
