//! Memory-mapped hit batch readers.
//!

use crate::{Error, Result};
use memmap2::Mmap;
use mx2display_core::{HitBatch, TriggerColumns};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// A memory-mapped file reader.
///
/// Uses memmap2 to access file contents without copying the whole file
/// into a heap buffer first.
pub struct MappedFileReader {
    mmap: Mmap,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

/// On-disk JSON layout of a hit batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchDocument {
    /// Triggers in trigger-number order.
    pub triggers: Vec<TriggerColumns>,
}

impl From<&HitBatch> for BatchDocument {
    fn from(batch: &HitBatch) -> Self {
        Self {
            triggers: batch
                .triggers()
                .iter()
                .map(mx2display_core::TriggerRecord::to_columns)
                .collect(),
        }
    }
}

/// Decodes a JSON batch document from bytes and validates it.
///
/// # Errors
/// Returns an error if the JSON is malformed or a trigger violates the
/// hit invariants.
pub fn parse_batch_json(bytes: &[u8]) -> Result<HitBatch> {
    let document: BatchDocument = serde_json::from_slice(bytes)?;
    Ok(HitBatch::from_columns(document.triggers)?)
}

/// Supported hit batch file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFormat {
    Json,
    #[cfg(feature = "hdf5")]
    Hdf5,
}

impl BatchFormat {
    /// Picks the format from the file extension.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] for unknown extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(BatchFormat::Json),
            #[cfg(feature = "hdf5")]
            "h5" | "hdf5" => Ok(BatchFormat::Hdf5),
            other => Err(Error::InvalidFormat(format!(
                "unsupported hit batch extension '{other}' for {}",
                path.display()
            ))),
        }
    }
}

/// Reads the hit batch stored at `path`, dispatching on its extension.
///
/// # Errors
/// Returns an error if the file cannot be read, has an unsupported
/// format, or contains an invalid trigger.
pub fn read_batch<P: AsRef<Path>>(path: P) -> Result<HitBatch> {
    let path = path.as_ref();
    let batch = match BatchFormat::from_path(path)? {
        BatchFormat::Json => {
            if std::fs::metadata(path)?.len() == 0 {
                return Err(Error::InvalidFormat(format!("{} is empty", path.display())));
            }
            let reader = MappedFileReader::open(path)?;
            parse_batch_json(reader.as_bytes())?
        }
        #[cfg(feature = "hdf5")]
        BatchFormat::Hdf5 => crate::hdf5::read_batch_hdf5(path)?,
    };
    log::info!("read {} triggers from {}", batch.len(), path.display());
    Ok(batch)
}
