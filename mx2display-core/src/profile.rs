//! Hit arrival-time profiles.
//!
//! The time panel shows a 1600-bin histogram of hit times over the 16 µs
//! trigger window, drawn on a log y axis. It has two modes:
//!
//! * overview: unsliced hits form the base layer and every reconstructed
//!   slice gets its own overlay,
//! * highlight: all hits form the base layer and one slice is overlaid on
//!   top of it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::histogram::find_bin;
use crate::hit::{Hit, TriggerRecord};

/// Start of the displayed time window (µs).
pub const TIME_WINDOW_START_US: f64 = 0.0;
/// End of the displayed time window (µs).
pub const TIME_WINDOW_END_US: f64 = 16.0;
/// Number of time bins (10 ns each).
pub const N_TIME_BINS: u32 = 1600;

/// Bin edges of the time histogram in µs (`N_TIME_BINS + 1` values).
#[must_use]
pub fn time_bin_edges() -> Vec<f64> {
    let span = TIME_WINDOW_END_US - TIME_WINDOW_START_US;
    (0..=N_TIME_BINS)
        .map(|i| TIME_WINDOW_START_US + f64::from(i) * span / f64::from(N_TIME_BINS))
        .collect()
}

/// Which hits a layer was filled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LayerKind {
    /// Hits not assigned to any slice.
    Unsliced,
    /// Every hit above threshold.
    AllHits,
    /// One reconstructed slice in the overview.
    Slice(u32),
    /// The highlighted slice.
    Highlight(u32),
}

/// How the profile was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProfileMode {
    Overview,
    Highlight(u32),
}

impl ProfileMode {
    /// Mode for a requested slice; 0 selects the overview.
    #[must_use]
    pub fn for_slice(highlight_slice: u32) -> Self {
        if highlight_slice == 0 {
            ProfileMode::Overview
        } else {
            ProfileMode::Highlight(highlight_slice)
        }
    }

    /// Slice number shown in the annotation (0 for the overview).
    #[must_use]
    pub fn slice(self) -> u32 {
        match self {
            ProfileMode::Overview => 0,
            ProfileMode::Highlight(slice) => slice,
        }
    }
}

/// One filled histogram layer of the time panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileLayer {
    kind: LayerKind,
    counts: Vec<u64>,
    entries: usize,
}

impl ProfileLayer {
    fn fill<'a, I>(kind: LayerKind, edges: &[f64], hits: I) -> Self
    where
        I: IntoIterator<Item = &'a Hit>,
    {
        let mut counts = vec![0u64; edges.len().saturating_sub(1)];
        let mut entries = 0;
        for hit in hits {
            if let Some(bin) = find_bin(edges, hit.time_us()) {
                counts[bin] += 1;
                entries += 1;
            }
        }
        Self {
            kind,
            counts,
            entries,
        }
    }

    #[must_use]
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Hit count per time bin.
    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of hits binned inside the window.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Highest bin count of the layer.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Text label placed in data coordinates of the time panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub x_us: f64,
    pub y: f64,
    pub text: String,
}

/// Arrival-time histogram of one trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeProfile {
    mode: ProfileMode,
    edges: Vec<f64>,
    base: ProfileLayer,
    overlays: Vec<ProfileLayer>,
    max_count: u64,
}

impl TimeProfile {
    /// Build the profile of `record`.
    ///
    /// Only physical hits with `pe > min_pe` are counted. A
    /// `highlight_slice` of 0 builds the overview.
    #[must_use]
    pub fn from_record(record: &TriggerRecord, min_pe: f64, highlight_slice: u32) -> Self {
        let edges = time_bin_edges();
        let hits: Vec<Hit> = record
            .physical_hits()
            .filter(|hit| hit.pe > min_pe)
            .collect();
        let mode = ProfileMode::for_slice(highlight_slice);

        let (base, overlays, max_count) = match mode {
            ProfileMode::Overview => {
                let base = ProfileLayer::fill(
                    LayerKind::Unsliced,
                    &edges,
                    hits.iter().filter(|hit| hit.time_slice == 0),
                );
                let mut max_count = base.max_count();
                let mut overlays = Vec::new();
                for slice in 1..=record.n_slices() {
                    let layer = ProfileLayer::fill(
                        LayerKind::Slice(slice),
                        &edges,
                        hits.iter().filter(|hit| hit.time_slice == slice),
                    );
                    if layer.is_empty() {
                        continue;
                    }
                    max_count = max_count.max(layer.max_count());
                    overlays.push(layer);
                }
                (base, overlays, max_count)
            }
            ProfileMode::Highlight(slice) => {
                let base = ProfileLayer::fill(LayerKind::AllHits, &edges, hits.iter());
                let highlight = ProfileLayer::fill(
                    LayerKind::Highlight(slice),
                    &edges,
                    hits.iter().filter(|hit| hit.time_slice == slice),
                );
                let max_count = base.max_count();
                (base, vec![highlight], max_count)
            }
        };

        log::debug!(
            "time profile {:?}: base {} hits, {} overlays, max bin {}",
            mode,
            base.entries(),
            overlays.len(),
            max_count
        );

        Self {
            mode,
            edges,
            base,
            overlays,
            max_count,
        }
    }

    #[must_use]
    pub fn mode(&self) -> ProfileMode {
        self.mode
    }

    /// Bin edges in µs.
    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Bottom layer (black in the display).
    #[must_use]
    pub fn base(&self) -> &ProfileLayer {
        &self.base
    }

    /// Layers drawn over the base, in drawing order.
    #[must_use]
    pub fn overlays(&self) -> &[ProfileLayer] {
        &self.overlays
    }

    /// Highest bin count used to place annotations.
    ///
    /// In the overview this is the maximum over all layers, in highlight
    /// mode the maximum of the base layer.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    /// Height unit for annotations; never below one count so the labels
    /// stay on a log axis.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn annotation_anchor(&self) -> f64 {
        self.max_count.max(1) as f64
    }

    /// Labels reporting trigger, slice and run, above the histogram content.
    #[must_use]
    pub fn annotations(&self, trigger: usize, run_label: &str) -> Vec<Annotation> {
        let anchor = self.annotation_anchor();
        vec![
            Annotation {
                x_us: 13.0,
                y: 12.0 * anchor,
                text: format!("Trigger number: {trigger}"),
            },
            Annotation {
                x_us: 13.0,
                y: 2.0 * anchor,
                text: format!("Mx2 Slice number: {}", self.mode.slice()),
            },
            Annotation {
                x_us: TIME_WINDOW_START_US,
                y: 2.0 * anchor,
                text: format!("#Run: {run_label}"),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::{Offsets, View};

    fn record(hits: &[Hit], n_slices: u32) -> TriggerRecord {
        let mut record = TriggerRecord::new(Offsets::default()).with_counts(n_slices, 1);
        for hit in hits {
            record.push(*hit).unwrap();
        }
        record
    }

    #[test]
    fn test_edges() {
        let edges = time_bin_edges();
        assert_eq!(edges.len(), 1601);
        assert!((edges[1] - 0.01).abs() < 1e-12);
        assert!((edges[1600] - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_overview_layers() {
        let hits = [
            Hit::new(1, 1, View::X, 3.0, 503.0),
            Hit::new(1, 1, View::X, 3.0, 505.0),
            Hit::new(1, 1, View::X, 3.0, 2003.0).with_time_slice(1),
            Hit::new(1, 1, View::X, 3.0, 2004.0).with_time_slice(1),
            Hit::new(1, 1, View::X, 3.0, 2005.0).with_time_slice(1),
            Hit::new(1, 1, View::X, 3.0, 9000.0).with_time_slice(3),
        ];
        let profile = TimeProfile::from_record(&record(&hits, 3), 0.0, 0);

        assert_eq!(profile.mode(), ProfileMode::Overview);
        assert_eq!(profile.base().entries(), 2);
        assert_eq!(profile.base().counts()[50], 2);
        // slice 2 has no hits and is skipped
        let kinds: Vec<LayerKind> = profile.overlays().iter().map(ProfileLayer::kind).collect();
        assert_eq!(kinds, vec![LayerKind::Slice(1), LayerKind::Slice(3)]);
        assert_eq!(profile.max_count(), 3);
    }

    #[test]
    fn test_no_slices_uses_base_max() {
        let hits = [
            Hit::new(2, 7, View::U, 1.0, 100.0),
            Hit::new(2, 7, View::U, 1.0, 101.0),
            Hit::new(2, 7, View::U, 1.0, 4000.0),
        ];
        let profile = TimeProfile::from_record(&record(&hits, 0), 0.0, 0);
        assert!(profile.overlays().is_empty());
        assert_eq!(profile.max_count(), profile.base().max_count());
        assert_eq!(profile.max_count(), 2);
    }

    #[test]
    fn test_empty_profile_anchor() {
        let profile = TimeProfile::from_record(&record(&[], 2), 0.0, 0);
        assert_eq!(profile.max_count(), 0);
        assert!((profile.annotation_anchor() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_highlight_mode() {
        let hits = [
            Hit::new(4, 1, View::V, 5.0, 300.0),
            Hit::new(4, 1, View::V, 5.0, 300.0).with_time_slice(2),
            Hit::new(4, 1, View::V, 5.0, 350.0).with_time_slice(1),
            Hit::new(0, 1, View::V, 5.0, 300.0).with_time_slice(2),
            Hit::new(4, 1, View::V, 0.5, 300.0).with_time_slice(2),
        ];
        let profile = TimeProfile::from_record(&record(&hits, 2), 1.0, 2);

        assert_eq!(profile.mode(), ProfileMode::Highlight(2));
        assert_eq!(profile.base().kind(), LayerKind::AllHits);
        assert_eq!(profile.base().entries(), 3);
        let highlight = &profile.overlays()[0];
        assert_eq!(highlight.kind(), LayerKind::Highlight(2));
        assert_eq!(highlight.entries(), 1);
        assert_eq!(profile.max_count(), 2);
    }

    #[test]
    fn test_hits_outside_window_dropped() {
        let hits = [
            Hit::new(4, 1, View::V, 5.0, -5.0),
            Hit::new(4, 1, View::V, 5.0, 16_000.0),
            Hit::new(4, 1, View::V, 5.0, 16_500.0),
        ];
        let profile = TimeProfile::from_record(&record(&hits, 0), 0.0, 0);
        assert_eq!(profile.base().entries(), 1);
        assert_eq!(profile.base().counts()[1599], 1);
    }

    #[test]
    fn test_annotations() {
        let hits = [
            Hit::new(1, 1, View::X, 3.0, 500.0),
            Hit::new(1, 1, View::X, 3.0, 501.0),
        ];
        let profile = TimeProfile::from_record(&record(&hits, 0), 0.0, 0);
        let labels = profile.annotations(17, "1234_0005");
        assert_eq!(labels[0].text, "Trigger number: 17");
        assert!((labels[0].y - 24.0).abs() < f64::EPSILON);
        assert_eq!(labels[1].text, "Mx2 Slice number: 0");
        assert_eq!(labels[2].text, "#Run: 1234_0005");
        assert!((labels[2].x_us - 0.0).abs() < f64::EPSILON);
    }
}
