//! Trigger selection.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::hit::{HitBatch, TriggerRecord};
use crate::{Error, Result};

/// How to pick the trigger to display from a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SelectionPolicy {
    /// Trigger with the most reconstructed clusters; ties go to the lowest index.
    #[default]
    MostClusters,
    /// A fixed trigger number.
    Index(usize),
}

/// Picks a trigger number from `batch` according to `policy`.
///
/// # Errors
/// Returns [`Error::EmptyBatch`] if the batch has no triggers and
/// [`Error::TriggerNotFound`] if an explicit index is out of range.
pub fn select_trigger(batch: &HitBatch, policy: SelectionPolicy) -> Result<usize> {
    if batch.is_empty() {
        return Err(Error::EmptyBatch);
    }

    match policy {
        SelectionPolicy::MostClusters => {
            let mut best = 0;
            let mut best_clusters = batch.triggers()[0].n_clusters_id();
            for (index, record) in batch.triggers().iter().enumerate().skip(1) {
                // Strict comparison keeps the first occurrence of the maximum.
                if record.n_clusters_id() > best_clusters {
                    best = index;
                    best_clusters = record.n_clusters_id();
                }
            }
            log::debug!("selected trigger {best} with {best_clusters} clusters");
            Ok(best)
        }
        SelectionPolicy::Index(index) => {
            if index < batch.len() {
                Ok(index)
            } else {
                Err(Error::TriggerNotFound {
                    index,
                    len: batch.len(),
                })
            }
        }
    }
}

/// Returns the hits of trigger `trigger`.
///
/// # Errors
/// Returns [`Error::EmptyBatch`] for an empty batch and
/// [`Error::TriggerNotFound`] for an out-of-range index.
pub fn trigger_hits(batch: &HitBatch, trigger: usize) -> Result<&TriggerRecord> {
    if batch.is_empty() {
        return Err(Error::EmptyBatch);
    }
    batch.get(trigger).ok_or(Error::TriggerNotFound {
        index: trigger,
        len: batch.len(),
    })
}
