//! mx2display-io: Hit batch file I/O for the Mx2 event display.
//!
//! This crate reads and writes [`mx2display_core::HitBatch`] files (JSON
//! through memory-mapped files, HDF5 behind the `hdf5` feature) and
//! extracts run labels from DST file names.
//!

mod error;
#[cfg(feature = "hdf5")]
pub mod hdf5;
mod reader;
pub mod run_label;
mod writer;

pub use error::{Error, Result};
#[cfg(feature = "hdf5")]
pub use hdf5::{read_batch_hdf5, write_batch_hdf5};
pub use reader::{parse_batch_json, read_batch, BatchDocument, BatchFormat, MappedFileReader};
pub use run_label::RunLabel;
pub use writer::write_batch_json;
