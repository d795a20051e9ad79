//! Per-view weighted 2-D histograms.
//!
//! A [`ViewImage`] is a light-yield density map of one projection view:
//! each hit adds its pe to the `(z, transverse)` bin it falls in. The grid
//! is always the canonical one from [`crate::geometry`], so an event with
//! no selected hits still yields a well-formed all-zero image.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{transverse_bin_edges, z_bin_edges, PhysicalPosition};
use crate::hit::{Hit, TriggerRecord, View};

/// Fixed pe range of the view color scale.
///
/// Colors saturate above the maximum instead of rescaling per event so
/// displays stay comparable across triggers.
pub const PE_COLOR_RANGE: ColorScale = ColorScale {
    min: 0.0,
    max: 35.0,
};

/// Linear color-scale range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    /// Maps a value to `[0, 1]`, saturating at both ends.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Hit selection for one view panel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ViewFilter {
    /// Hits need strictly more pe than this.
    pub min_pe: f64,
    /// Slice to show; 0 shows every hit regardless of slice.
    pub time_slice: u32,
}

impl Default for ViewFilter {
    fn default() -> Self {
        Self {
            min_pe: 0.0,
            time_slice: 0,
        }
    }
}

impl ViewFilter {
    /// Set the pe threshold.
    #[must_use]
    pub fn with_min_pe(mut self, min_pe: f64) -> Self {
        self.min_pe = min_pe;
        self
    }

    /// Set the time slice (0 = all slices).
    #[must_use]
    pub fn with_time_slice(mut self, time_slice: u32) -> Self {
        self.time_slice = time_slice;
        self
    }

    /// Returns true if `hit` belongs in the `view` panel.
    #[inline]
    #[must_use]
    pub fn accepts(&self, hit: &Hit, view: View) -> bool {
        hit.is_physical()
            && hit.view == view
            && hit.pe > self.min_pe
            && (self.time_slice == 0 || hit.time_slice == self.time_slice)
    }
}

/// Finds the bin of `value` in ascending `edges`.
///
/// Bins are half-open `[lo, hi)` except the last, which also includes its
/// upper edge. Values outside the edges, or NaN, have no bin.
pub(crate) fn find_bin(edges: &[f64], value: f64) -> Option<usize> {
    let (&first, &last) = (edges.first()?, edges.last()?);
    if edges.len() < 2 || !(first..=last).contains(&value) {
        return None;
    }
    if value == last {
        return Some(edges.len() - 2);
    }
    Some(edges.partition_point(|&e| e <= value) - 1)
}

/// One non-empty bin of a [`ViewImage`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCell {
    pub z_lo: f64,
    pub z_hi: f64,
    pub transverse_lo: f64,
    pub transverse_hi: f64,
    pub weight: f64,
}

/// Weighted 2-D histogram of one view.
///
/// Weights are stored row-major as `weights[z_bin * n_transverse_bins + t_bin]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewImage {
    view: View,
    z_edges: Vec<f64>,
    transverse_edges: Vec<f64>,
    weights: Vec<f64>,
    selected_hits: usize,
    outside_weight: f64,
}

impl ViewImage {
    /// Create an all-zero image over the canonical grid of `record`.
    #[must_use]
    pub fn empty(record: &TriggerRecord, view: View) -> Self {
        let offsets = record.offsets();
        let z_edges = z_bin_edges(offsets.z);
        let transverse_edges = transverse_bin_edges(&offsets, view);
        let n_bins = (z_edges.len() - 1) * (transverse_edges.len() - 1);
        Self {
            view,
            z_edges,
            transverse_edges,
            weights: vec![0.0; n_bins],
            selected_hits: 0,
            outside_weight: 0.0,
        }
    }

    /// Build the image of `view` from the hits of `record` that pass `filter`.
    ///
    /// Selected hits outside the canonical grid are not binned; their pe is
    /// reported by [`ViewImage::outside_weight`].
    #[must_use]
    pub fn from_record(record: &TriggerRecord, view: View, filter: &ViewFilter) -> Self {
        let mut image = Self::empty(record, view);
        let offsets = record.offsets();
        let n_t = image.n_transverse_bins();

        for hit in record.hits().filter(|hit| filter.accepts(hit, view)) {
            image.selected_hits += 1;
            let pos = PhysicalPosition::of_hit(&hit, &offsets);
            match (
                find_bin(&image.z_edges, pos.z),
                find_bin(&image.transverse_edges, pos.transverse),
            ) {
                (Some(zi), Some(ti)) => image.weights[zi * n_t + ti] += hit.pe,
                _ => image.outside_weight += hit.pe,
            }
        }

        if image.selected_hits == 0 {
            log::warn!(
                "{view} view: no hits pass the filter (min_pe {}, slice {}), drawing an empty panel",
                filter.min_pe,
                filter.time_slice
            );
        } else {
            log::debug!(
                "{view} view: {} hits, {:.1} pe binned",
                image.selected_hits,
                image.total_weight()
            );
        }

        image
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    /// Bin edges along z (mm), ascending.
    #[must_use]
    pub fn z_edges(&self) -> &[f64] {
        &self.z_edges
    }

    /// Bin edges along the transverse axis (mm), ascending.
    #[must_use]
    pub fn transverse_edges(&self) -> &[f64] {
        &self.transverse_edges
    }

    #[must_use]
    pub fn n_z_bins(&self) -> usize {
        self.z_edges.len() - 1
    }

    #[must_use]
    pub fn n_transverse_bins(&self) -> usize {
        self.transverse_edges.len() - 1
    }

    /// Summed pe in bin `(z_bin, transverse_bin)`.
    #[must_use]
    pub fn weight(&self, z_bin: usize, transverse_bin: usize) -> Option<f64> {
        if z_bin < self.n_z_bins() && transverse_bin < self.n_transverse_bins() {
            Some(self.weights[z_bin * self.n_transverse_bins() + transverse_bin])
        } else {
            None
        }
    }

    /// Flattened weight matrix.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of all binned weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// pe of selected hits that fell outside the grid.
    #[must_use]
    pub fn outside_weight(&self) -> f64 {
        self.outside_weight
    }

    /// Number of hits that passed the filter.
    #[must_use]
    pub fn selected_hits(&self) -> usize {
        self.selected_hits
    }

    /// True if no hit passed the filter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected_hits == 0
    }

    /// Iterates over bins with non-zero weight.
    pub fn cells(&self) -> impl Iterator<Item = ViewCell> + '_ {
        let n_t = self.n_transverse_bins();
        self.weights
            .iter()
            .enumerate()
            .filter(|(_, &w)| w > 0.0)
            .map(move |(idx, &weight)| {
                let (zi, ti) = (idx / n_t, idx % n_t);
                ViewCell {
                    z_lo: self.z_edges[zi],
                    z_hi: self.z_edges[zi + 1],
                    transverse_lo: self.transverse_edges[ti],
                    transverse_hi: self.transverse_edges[ti + 1],
                    weight,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::Offsets;

    #[test]
    fn test_find_bin_edges() {
        let edges = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(find_bin(&edges, 0.0), Some(0));
        assert_eq!(find_bin(&edges, 0.5), Some(0));
        assert_eq!(find_bin(&edges, 1.0), Some(1));
        assert_eq!(find_bin(&edges, 3.0), Some(2));
        assert_eq!(find_bin(&edges, 3.5), None);
        assert_eq!(find_bin(&edges, -0.1), None);
        assert_eq!(find_bin(&edges, f64::NAN), None);
        assert_eq!(find_bin(&[1.0], 1.0), None);
    }

    #[test]
    fn test_filter_slice_sentinel() {
        let hit = Hit::new(3, 20, View::U, 1.5, 0.0).with_time_slice(2);
        let all = ViewFilter::default();
        assert!(all.accepts(&hit, View::U));
        assert!(!all.accepts(&hit, View::V));
        assert!(all.with_time_slice(2).accepts(&hit, View::U));
        assert!(!all.with_time_slice(1).accepts(&hit, View::U));
        assert!(!all.with_min_pe(1.5).accepts(&hit, View::U));
    }

    #[test]
    fn test_color_scale_saturates() {
        assert!((PE_COLOR_RANGE.normalize(70.0) - 1.0).abs() < f64::EPSILON);
        assert!(PE_COLOR_RANGE.normalize(-1.0).abs() < f64::EPSILON);
        assert!((PE_COLOR_RANGE.normalize(17.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_same_bin_accumulates() {
        let mut record = TriggerRecord::new(Offsets::new(1.0, 2.0, 3.0));
        record.push(Hit::new(20, 64, View::V, 1.25, 0.0)).unwrap();
        record.push(Hit::new(20, 64, View::V, 2.5, 0.0)).unwrap();
        let image = ViewImage::from_record(&record, View::V, &ViewFilter::default());
        let cells: Vec<ViewCell> = image.cells().collect();
        assert_eq!(cells.len(), 1);
        assert!((cells[0].weight - 3.75).abs() < 1e-12);
        // module 20 sits at edge index 21, strip 64 at edge index 68
        assert_eq!(image.weight(21, 68), Some(3.75));
    }

    #[test]
    fn test_out_of_grid_hit() {
        let mut record = TriggerRecord::new(Offsets::default());
        record.push(Hit::new(50, 10, View::X, 4.0, 0.0)).unwrap();
        let image = ViewImage::from_record(&record, View::X, &ViewFilter::default());
        assert_eq!(image.selected_hits(), 1);
        assert!(image.total_weight().abs() < f64::EPSILON);
        assert!((image.outside_weight() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_last_edge_is_closed() {
        let mut record = TriggerRecord::new(Offsets::default());
        record.push(Hit::new(43, 129, View::X, 1.0, 0.0)).unwrap();
        let image = ViewImage::from_record(&record, View::X, &ViewFilter::default());
        assert_eq!(image.weight(43, 132), Some(1.0));
    }
}
