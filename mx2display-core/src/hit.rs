//! Hit, trigger and batch types for Mx2 tracker readouts.
//!
//! A [`TriggerRecord`] stores its hits in parallel vectors (`SoA` layout),
//! one entry per hit, plus the per-trigger calibration offsets and
//! reconstruction counters. Records can only be built through validating
//! constructors, so every record in a [`HitBatch`] has equal column
//! lengths and in-range values.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Projection view of a tracker plane.
///
/// The three views share one strip-index scheme and are rotated by
/// 0°, +60° and −60° around the beam axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i32", into = "i32"))]
pub enum View {
    X = 1,
    U = 2,
    V = 3,
}

impl View {
    /// All views in display order.
    pub const ALL: [View; 3] = [View::X, View::U, View::V];

    /// Numeric view code as stored in the detector data.
    #[inline]
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Panel title, e.g. `"U view"`.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            View::X => "X view",
            View::U => "U view",
            View::V => "V view",
        }
    }

    /// Transverse axis label, e.g. `"u [mm]"`.
    #[must_use]
    pub fn axis_label(self) -> &'static str {
        match self {
            View::X => "x [mm]",
            View::U => "u [mm]",
            View::V => "v [mm]",
        }
    }
}

impl TryFrom<i32> for View {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            1 => Ok(View::X),
            2 => Ok(View::U),
            3 => Ok(View::V),
            other => Err(Error::InvalidView(other)),
        }
    }
}

impl From<View> for i32 {
    fn from(view: View) -> Self {
        view.code()
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::X => write!(f, "X"),
            View::U => write!(f, "U"),
            View::V => write!(f, "V"),
        }
    }
}

/// Per-trigger calibration offsets in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Offsets {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Offsets {
    /// Creates a new offset triple.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A single tracker hit in detector-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub strip: i32,
    pub module: i32,
    pub plane: i32,
    pub view: View,
    /// Light yield in photoelectrons.
    pub pe: f64,
    /// Arrival time within the trigger window, in nanoseconds.
    pub time_ns: f64,
    /// Reconstructed time slice; 0 means unassigned.
    pub time_slice: u32,
}

impl Hit {
    /// Creates a hit on plane 0 in slice 0.
    #[must_use]
    pub fn new(module: i32, strip: i32, view: View, pe: f64, time_ns: f64) -> Self {
        Self {
            strip,
            module,
            plane: 0,
            view,
            pe,
            time_ns,
            time_slice: 0,
        }
    }

    /// Sets the time slice.
    #[must_use]
    pub fn with_time_slice(mut self, time_slice: u32) -> Self {
        self.time_slice = time_slice;
        self
    }

    /// Sets the plane index.
    #[must_use]
    pub fn with_plane(mut self, plane: i32) -> Self {
        self.plane = plane;
        self
    }

    /// Module 0 encodes an unassigned channel; such hits are never displayed.
    #[inline]
    #[must_use]
    pub fn is_physical(&self) -> bool {
        self.module > 0
    }

    /// Arrival time in microseconds.
    #[inline]
    #[must_use]
    pub fn time_us(&self) -> f64 {
        self.time_ns / 1000.0
    }
}

/// Unvalidated column form of a trigger, as produced by readers.
///
/// Every field is required when deserializing.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriggerColumns {
    pub strip: Vec<i32>,
    pub module: Vec<i32>,
    pub plane: Vec<i32>,
    pub view: Vec<i32>,
    pub pe: Vec<f64>,
    pub time: Vec<f64>,
    pub time_slice: Vec<i64>,
    pub offset_x: f64,
    pub offset_y: f64,
    pub offset_z: f64,
    pub n_slices: u32,
    pub n_clusters_id: u32,
}

/// One recorded readout window with its hits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerRecord {
    strip: Vec<i32>,
    module: Vec<i32>,
    plane: Vec<i32>,
    view: Vec<View>,
    pe: Vec<f64>,
    time: Vec<f64>,
    time_slice: Vec<u32>,
    offsets: Offsets,
    n_slices: u32,
    n_clusters_id: u32,
}

fn check_len(column: &'static str, expected: usize, found: usize) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            column,
            expected,
            found,
        })
    }
}

fn check_pe(index: usize, pe: f64) -> Result<()> {
    if pe >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidHit {
            index,
            reason: format!("pe must be non-negative, got {pe}"),
        })
    }
}

impl TriggerRecord {
    /// Creates an empty record with the given offsets.
    #[must_use]
    pub fn new(offsets: Offsets) -> Self {
        Self {
            offsets,
            ..Self::default()
        }
    }

    /// Sets the reconstructed slice and cluster counts.
    #[must_use]
    pub fn with_counts(mut self, n_slices: u32, n_clusters_id: u32) -> Self {
        self.n_slices = n_slices;
        self.n_clusters_id = n_clusters_id;
        self
    }

    /// Validates raw columns into a record.
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] if any per-hit column differs in
    /// length from `strip`, [`Error::InvalidView`] for a view code outside
    /// `{1, 2, 3}` and [`Error::InvalidHit`] for negative pe or slice ids.
    pub fn from_columns(columns: TriggerColumns) -> Result<Self> {
        let n = columns.strip.len();
        check_len("module", n, columns.module.len())?;
        check_len("plane", n, columns.plane.len())?;
        check_len("view", n, columns.view.len())?;
        check_len("pe", n, columns.pe.len())?;
        check_len("time", n, columns.time.len())?;
        check_len("time_slice", n, columns.time_slice.len())?;

        let view = columns
            .view
            .iter()
            .map(|&code| View::try_from(code))
            .collect::<Result<Vec<_>>>()?;

        for (index, &pe) in columns.pe.iter().enumerate() {
            check_pe(index, pe)?;
        }

        let time_slice = columns
            .time_slice
            .iter()
            .enumerate()
            .map(|(index, &slice)| {
                u32::try_from(slice).map_err(|_| Error::InvalidHit {
                    index,
                    reason: format!("time slice must be non-negative, got {slice}"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            strip: columns.strip,
            module: columns.module,
            plane: columns.plane,
            view,
            pe: columns.pe,
            time: columns.time,
            time_slice,
            offsets: Offsets::new(columns.offset_x, columns.offset_y, columns.offset_z),
            n_slices: columns.n_slices,
            n_clusters_id: columns.n_clusters_id,
        })
    }

    /// Converts back into the raw column form.
    #[must_use]
    pub fn to_columns(&self) -> TriggerColumns {
        TriggerColumns {
            strip: self.strip.clone(),
            module: self.module.clone(),
            plane: self.plane.clone(),
            view: self.view.iter().map(|v| v.code()).collect(),
            pe: self.pe.clone(),
            time: self.time.clone(),
            time_slice: self.time_slice.iter().map(|&s| i64::from(s)).collect(),
            offset_x: self.offsets.x,
            offset_y: self.offsets.y,
            offset_z: self.offsets.z,
            n_slices: self.n_slices,
            n_clusters_id: self.n_clusters_id,
        }
    }

    /// Appends a hit.
    ///
    /// # Errors
    /// Returns [`Error::InvalidHit`] if the hit has negative pe.
    pub fn push(&mut self, hit: Hit) -> Result<()> {
        check_pe(self.len(), hit.pe)?;
        self.strip.push(hit.strip);
        self.module.push(hit.module);
        self.plane.push(hit.plane);
        self.view.push(hit.view);
        self.pe.push(hit.pe);
        self.time.push(hit.time_ns);
        self.time_slice.push(hit.time_slice);
        Ok(())
    }

    /// Returns the number of hits (physical or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.strip.len()
    }

    /// Returns true if the record holds no hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strip.is_empty()
    }

    /// Returns the hit at `index`, if any.
    #[must_use]
    pub fn hit(&self, index: usize) -> Option<Hit> {
        (index < self.len()).then(|| Hit {
            strip: self.strip[index],
            module: self.module[index],
            plane: self.plane[index],
            view: self.view[index],
            pe: self.pe[index],
            time_ns: self.time[index],
            time_slice: self.time_slice[index],
        })
    }

    /// Iterates over all hits in storage order.
    pub fn hits(&self) -> impl Iterator<Item = Hit> + '_ {
        (0..self.len()).filter_map(move |i| self.hit(i))
    }

    /// Iterates over hits with `module > 0`.
    pub fn physical_hits(&self) -> impl Iterator<Item = Hit> + '_ {
        self.hits().filter(Hit::is_physical)
    }

    #[must_use]
    pub fn offsets(&self) -> Offsets {
        self.offsets
    }

    /// Number of reconstructed time slices.
    #[must_use]
    pub fn n_slices(&self) -> u32 {
        self.n_slices
    }

    /// Number of reconstructed clusters, used to pick the busiest trigger.
    #[must_use]
    pub fn n_clusters_id(&self) -> u32 {
        self.n_clusters_id
    }
}

impl TryFrom<TriggerColumns> for TriggerRecord {
    type Error = Error;

    fn try_from(columns: TriggerColumns) -> Result<Self> {
        Self::from_columns(columns)
    }
}

/// All triggers of one file; the index is the trigger number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitBatch {
    triggers: Vec<TriggerRecord>,
}

impl HitBatch {
    /// Creates a batch from validated records.
    #[must_use]
    pub fn new(triggers: Vec<TriggerRecord>) -> Self {
        Self { triggers }
    }

    /// Validates raw trigger columns into a batch.
    ///
    /// # Errors
    /// Returns the first validation error of any trigger.
    pub fn from_columns<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = TriggerColumns>,
    {
        let triggers = columns
            .into_iter()
            .map(TriggerRecord::from_columns)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { triggers })
    }

    /// Appends a trigger.
    pub fn push(&mut self, record: TriggerRecord) {
        self.triggers.push(record);
    }

    /// Returns the number of triggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Returns true if the batch holds no triggers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Returns the trigger with number `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TriggerRecord> {
        self.triggers.get(index)
    }

    /// Returns all triggers in order.
    #[must_use]
    pub fn triggers(&self) -> &[TriggerRecord] {
        &self.triggers
    }
}

impl FromIterator<TriggerRecord> for HitBatch {
    fn from_iter<I: IntoIterator<Item = TriggerRecord>>(iter: I) -> Self {
        Self {
            triggers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(n: usize) -> TriggerColumns {
        TriggerColumns {
            strip: vec![10; n],
            module: vec![5; n],
            plane: vec![1; n],
            view: vec![1; n],
            pe: vec![2.0; n],
            time: vec![1000.0; n],
            time_slice: vec![0; n],
            ..TriggerColumns::default()
        }
    }

    #[test]
    fn test_view_codes() {
        assert_eq!(View::try_from(2).unwrap(), View::U);
        assert_eq!(View::V.code(), 3);
        assert_eq!(View::try_from(0), Err(Error::InvalidView(0)));
        assert_eq!(View::try_from(4), Err(Error::InvalidView(4)));
    }

    #[test]
    fn test_from_columns_shape_mismatch() {
        let mut cols = columns(3);
        cols.pe.pop();
        let err = TriggerRecord::from_columns(cols).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                column: "pe",
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_from_columns_rejects_bad_values() {
        let mut cols = columns(2);
        cols.view[1] = 7;
        assert_eq!(
            TriggerRecord::from_columns(cols),
            Err(Error::InvalidView(7))
        );

        let mut cols = columns(2);
        cols.pe[0] = -1.0;
        assert!(matches!(
            TriggerRecord::from_columns(cols),
            Err(Error::InvalidHit { index: 0, .. })
        ));

        let mut cols = columns(2);
        cols.time_slice[1] = -3;
        assert!(matches!(
            TriggerRecord::from_columns(cols),
            Err(Error::InvalidHit { index: 1, .. })
        ));
    }

    #[test]
    fn test_columns_roundtrip() {
        let mut cols = columns(2);
        cols.time_slice = vec![0, 4];
        cols.offset_y = 3.5;
        cols.n_slices = 4;
        let record = TriggerRecord::from_columns(cols.clone()).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.hit(1).unwrap().time_slice, 4);
        assert_eq!(record.to_columns(), cols);
    }

    #[test]
    fn test_push_and_physical_hits() {
        let mut record = TriggerRecord::new(Offsets::default()).with_counts(1, 3);
        record.push(Hit::new(5, 10, View::X, 2.0, 1000.0)).unwrap();
        record.push(Hit::new(0, 10, View::X, 99.0, 1000.0)).unwrap();
        assert!(record.push(Hit::new(5, 10, View::X, -0.5, 0.0)).is_err());

        assert_eq!(record.len(), 2);
        assert_eq!(record.physical_hits().count(), 1);
        assert_eq!(record.n_clusters_id(), 3);
        assert!(record.hit(2).is_none());
    }
}
