//! Hit batch writers.

use crate::reader::BatchDocument;
use crate::Result;
use mx2display_core::HitBatch;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `batch` as a JSON batch document readable by [`crate::read_batch`].
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_batch_json<P: AsRef<Path>>(path: P, batch: &HitBatch) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &BatchDocument::from(batch))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mx2display_core::{Hit, Offsets, TriggerRecord, View};
    use tempfile::Builder;

    #[test]
    fn test_write_then_read() {
        let mut record = TriggerRecord::new(Offsets::new(1.5, -2.0, 30.0)).with_counts(2, 6);
        record
            .push(Hit::new(7, 40, View::U, 3.25, 2500.0).with_time_slice(2))
            .unwrap();
        record
            .push(Hit::new(30, 90, View::V, 0.75, 8100.0).with_plane(2))
            .unwrap();
        let batch = HitBatch::new(vec![record, TriggerRecord::default()]);

        let file = Builder::new().suffix(".json").tempfile().unwrap();
        write_batch_json(file.path(), &batch).unwrap();

        let restored = crate::read_batch(file.path()).unwrap();
        assert_eq!(restored, batch);
    }
}
