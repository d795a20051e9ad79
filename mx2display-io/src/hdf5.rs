//! HDF5 hit batch I/O.
//!
//! The `minerva` group mirrors the branch names of the detector DST tree.
//! Per-hit branches are ragged (one variable-length list per trigger), so
//! they are stored flattened with a `hit_offsets` index of length
//! `n_triggers + 1`: the hits of trigger `i` are
//! `hit_offsets[i]..hit_offsets[i + 1]`.

use crate::{Error, Result};
use hdf5::types::H5Type;
use hdf5::{File, Group};
use mx2display_core::{HitBatch, TriggerColumns};
use ndarray::ArrayView1;
use std::path::Path;

const GROUP: &str = "minerva";

/// Reads a hit batch from the `minerva` group of an HDF5 file.
///
/// # Errors
/// Returns an error if HDF5 I/O fails, a dataset is missing, the offset
/// index is inconsistent, or a trigger violates the hit invariants.
pub fn read_batch_hdf5<P: AsRef<Path>>(path: P) -> Result<HitBatch> {
    let file = File::open(path)?;
    let group = file.group(GROUP)?;

    let offsets = read_dataset_vec::<u64>(&group, "hit_offsets")?;
    let strip = read_dataset_vec::<i32>(&group, "hit_strip")?;
    let module = read_dataset_vec::<i32>(&group, "hit_module")?;
    let plane = read_dataset_vec::<i32>(&group, "hit_plane")?;
    let view = read_dataset_vec::<i32>(&group, "hit_view")?;
    let pe = read_dataset_vec::<f64>(&group, "hit_pe")?;
    let time = read_dataset_vec::<f64>(&group, "hit_time")?;
    let time_slice = read_dataset_vec::<i64>(&group, "hit_time_slice")?;

    let offset_x = read_dataset_vec::<f64>(&group, "offsetX")?;
    let offset_y = read_dataset_vec::<f64>(&group, "offsetY")?;
    let offset_z = read_dataset_vec::<f64>(&group, "offsetZ")?;
    let n_slices = read_dataset_vec::<u32>(&group, "n_slices")?;
    let n_clusters_id = read_dataset_vec::<u32>(&group, "n_clusters_id")?;

    let n_triggers = offsets.len().saturating_sub(1);
    validate_offsets(&offsets, strip.len())?;
    for (column, found) in [
        ("hit_module", module.len()),
        ("hit_plane", plane.len()),
        ("hit_view", view.len()),
        ("hit_pe", pe.len()),
        ("hit_time", time.len()),
        ("hit_time_slice", time_slice.len()),
    ] {
        check_hit_column(column, strip.len(), found)?;
    }
    for (name, len) in [
        ("offsetX", offset_x.len()),
        ("offsetY", offset_y.len()),
        ("offsetZ", offset_z.len()),
        ("n_slices", n_slices.len()),
        ("n_clusters_id", n_clusters_id.len()),
    ] {
        if len != n_triggers {
            return Err(Error::InvalidFormat(format!(
                "dataset '{name}' has {len} entries for {n_triggers} triggers"
            )));
        }
    }

    let columns = (0..n_triggers).map(|i| {
        // lengths checked above, so every range is in bounds
        let range = to_index(offsets[i])..to_index(offsets[i + 1]);
        TriggerColumns {
            strip: strip[range.clone()].to_vec(),
            module: module[range.clone()].to_vec(),
            plane: plane[range.clone()].to_vec(),
            view: view[range.clone()].to_vec(),
            pe: pe[range.clone()].to_vec(),
            time: time[range.clone()].to_vec(),
            time_slice: time_slice[range].to_vec(),
            offset_x: offset_x[i],
            offset_y: offset_y[i],
            offset_z: offset_z[i],
            n_slices: n_slices[i],
            n_clusters_id: n_clusters_id[i],
        }
    });

    Ok(HitBatch::from_columns(columns)?)
}

/// Writes a hit batch into the `minerva` group of a new HDF5 file.
///
/// # Errors
/// Returns an error if HDF5 I/O fails.
pub fn write_batch_hdf5<P: AsRef<Path>>(path: P, batch: &HitBatch) -> Result<()> {
    let file = File::create(path)?;
    let group = file.create_group(GROUP)?;

    let columns: Vec<TriggerColumns> = batch
        .triggers()
        .iter()
        .map(mx2display_core::TriggerRecord::to_columns)
        .collect();

    let mut offsets = Vec::with_capacity(columns.len() + 1);
    let mut total = 0u64;
    offsets.push(total);
    for c in &columns {
        total += c.strip.len() as u64;
        offsets.push(total);
    }

    write_dataset(&group, "hit_offsets", &offsets)?;
    write_dataset(&group, "hit_strip", &flatten(&columns, |c| &c.strip))?;
    write_dataset(&group, "hit_module", &flatten(&columns, |c| &c.module))?;
    write_dataset(&group, "hit_plane", &flatten(&columns, |c| &c.plane))?;
    write_dataset(&group, "hit_view", &flatten(&columns, |c| &c.view))?;
    write_dataset(&group, "hit_pe", &flatten(&columns, |c| &c.pe))?;
    write_dataset(&group, "hit_time", &flatten(&columns, |c| &c.time))?;
    write_dataset(
        &group,
        "hit_time_slice",
        &flatten(&columns, |c| &c.time_slice),
    )?;

    let scalar = |f: fn(&TriggerColumns) -> f64| columns.iter().map(f).collect::<Vec<_>>();
    write_dataset(&group, "offsetX", &scalar(|c| c.offset_x))?;
    write_dataset(&group, "offsetY", &scalar(|c| c.offset_y))?;
    write_dataset(&group, "offsetZ", &scalar(|c| c.offset_z))?;
    let n_slices: Vec<u32> = columns.iter().map(|c| c.n_slices).collect();
    let n_clusters: Vec<u32> = columns.iter().map(|c| c.n_clusters_id).collect();
    write_dataset(&group, "n_slices", &n_slices)?;
    write_dataset(&group, "n_clusters_id", &n_clusters)?;

    Ok(())
}

fn validate_offsets(offsets: &[u64], n_hits: usize) -> Result<()> {
    if offsets.is_empty() {
        return Err(Error::InvalidFormat("'hit_offsets' is empty".to_string()));
    }
    if offsets[0] != 0 || offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(Error::InvalidFormat(
            "'hit_offsets' must start at 0 and be non-decreasing".to_string(),
        ));
    }
    let last = offsets[offsets.len() - 1];
    if to_index(last) != n_hits {
        return Err(Error::InvalidFormat(format!(
            "'hit_offsets' ends at {last} but 'hit_strip' has {n_hits} entries"
        )));
    }
    Ok(())
}

fn check_hit_column(column: &'static str, expected: usize, found: usize) -> Result<()> {
    if found != expected {
        return Err(mx2display_core::Error::ShapeMismatch {
            column,
            expected,
            found,
        }
        .into());
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn to_index(offset: u64) -> usize {
    offset as usize
}

fn flatten<T: Copy>(
    columns: &[TriggerColumns],
    field: impl Fn(&TriggerColumns) -> &Vec<T>,
) -> Vec<T> {
    columns.iter().flat_map(|c| field(c).iter().copied()).collect()
}

fn write_dataset<T: H5Type>(group: &Group, name: &str, data: &[T]) -> Result<()> {
    let dataset = group.new_dataset::<T>().shape(data.len()).create(name)?;
    dataset.write(ArrayView1::from(data))?;
    Ok(())
}

fn read_dataset_vec<T: H5Type>(group: &Group, name: &str) -> Result<Vec<T>> {
    let dataset = group.dataset(name)?;
    Ok(dataset.read_raw::<T>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mx2display_core::{Hit, Offsets, TriggerRecord, View};
    use tempfile::Builder;

    fn sample_batch() -> HitBatch {
        let mut first = TriggerRecord::new(Offsets::new(0.5, 1.5, -2.0)).with_counts(1, 3);
        first
            .push(Hit::new(5, 10, View::X, 2.0, 1000.0).with_time_slice(1))
            .unwrap();
        first.push(Hit::new(14, 70, View::U, 6.5, 1200.0)).unwrap();
        let mut second = TriggerRecord::new(Offsets::default()).with_counts(0, 8);
        second.push(Hit::new(40, 2, View::V, 1.0, 15_000.0)).unwrap();
        HitBatch::new(vec![first, TriggerRecord::default(), second])
    }

    #[test]
    fn test_hdf5_batch_roundtrip() {
        let file = Builder::new().suffix(".h5").tempfile().unwrap();
        let batch = sample_batch();
        write_batch_hdf5(file.path(), &batch).unwrap();

        let restored = read_batch_hdf5(file.path()).unwrap();
        assert_eq!(restored, batch);

        let dispatched = crate::read_batch(file.path()).unwrap();
        assert_eq!(dispatched.len(), 3);
    }

    fn replace_dataset(path: &Path, name: &str, data: &[f64]) {
        let file = File::open_rw(path).unwrap();
        let group = file.group(GROUP).unwrap();
        group.unlink(name).unwrap();
        write_dataset(&group, name, data).unwrap();
    }

    #[test]
    fn test_longer_hit_column_is_rejected() {
        let file = Builder::new().suffix(".h5").tempfile().unwrap();
        let mut record = TriggerRecord::new(Offsets::default()).with_counts(0, 1);
        record.push(Hit::new(5, 10, View::X, 2.0, 1000.0)).unwrap();
        write_batch_hdf5(file.path(), &HitBatch::new(vec![record])).unwrap();

        replace_dataset(file.path(), "hit_pe", &[2.0, 5.0, 7.0]);

        let err = read_batch_hdf5(file.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::CoreError(mx2display_core::Error::ShapeMismatch {
                column: "hit_pe",
                expected: 1,
                found: 3,
            })
        ));
    }

    #[test]
    fn test_shorter_hit_column_is_rejected() {
        let file = Builder::new().suffix(".h5").tempfile().unwrap();
        write_batch_hdf5(file.path(), &sample_batch()).unwrap();

        replace_dataset(file.path(), "hit_time", &[1000.0]);

        let err = read_batch_hdf5(file.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::CoreError(mx2display_core::Error::ShapeMismatch {
                column: "hit_time",
                expected: 3,
                found: 1,
            })
        ));
    }

    #[test]
    fn test_validate_offsets() {
        assert!(validate_offsets(&[0, 2, 2, 5], 5).is_ok());
        assert!(validate_offsets(&[0, 3, 2], 2).is_err());
        assert!(validate_offsets(&[1, 3], 2).is_err());
        assert!(validate_offsets(&[0, 3], 4).is_err());
        assert!(validate_offsets(&[], 0).is_err());
    }
}
