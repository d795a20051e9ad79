//! Mapping from detector-local indices to physical millimetre coordinates.
//!
//! Every function here is pure. Bin edges and hit positions go through the
//! same two functions ([`module_to_z`] and [`strip_to_transverse`]) so the
//! histogram grid and the hits placed on it cannot drift apart.

use crate::hit::{Hit, Offsets, View};

/// Strip pitch along the transverse axis (mm per strip).
pub const STRIP_PITCH_MM: f64 = 16.738_776;
/// Transverse position of strip 0 before offsets (mm).
pub const STRIP_ORIGIN_MM: f64 = -1071.277_6;

/// First module of the downstream section.
pub const SECTION_BREAK_MODULE: i32 = 13;

const UPSTREAM_Z0_MM: f64 = 4001.454_5;
const UPSTREAM_PITCH_MM: f64 = 43.545_455;
const DOWNSTREAM_Z0_MM: f64 = 8015.494_7;
const DOWNSTREAM_PITCH_MM: f64 = 44.783_333;

/// Lowest strip index covered by the transverse bin edges.
pub const FIRST_EDGE_STRIP: i32 = -4;
/// Highest strip index covered by the transverse bin edges.
pub const LAST_EDGE_STRIP: i32 = 129;
/// Highest module index covered by the z bin edges.
pub const LAST_EDGE_MODULE: i32 = 43;

/// Number of z bin edges (`0..=12`, the `12.5` gap edge, `13..=43`).
pub const N_Z_EDGES: usize = 45;
/// Number of transverse bin edges (strips `-4..=129`).
pub const N_TRANSVERSE_EDGES: usize = 134;

/// Offset component along the view's transverse axis.
///
/// U and V planes are rotated by ±60°, so the (x, y) offset is projected
/// onto the rotated axis.
#[inline]
#[must_use]
pub fn transverse_offset(offsets: &Offsets, view: View) -> f64 {
    let sqrt3 = 3.0_f64.sqrt();
    match view {
        View::X => offsets.x,
        View::U => 0.5 * (offsets.x - sqrt3 * offsets.y),
        View::V => 0.5 * (offsets.x + sqrt3 * offsets.y),
    }
}

/// Transverse coordinate (x, u or v) of a strip in mm.
///
/// Takes `f64` so half-strip positions can be mapped as well.
#[inline]
#[must_use]
pub fn strip_to_transverse(strip: f64, offsets: &Offsets, view: View) -> f64 {
    STRIP_PITCH_MM * strip + STRIP_ORIGIN_MM - transverse_offset(offsets, view)
}

/// Beam-axis coordinate of a module in mm.
///
/// Piecewise linear with a break at module 13 where the two detector
/// sections meet.
#[inline]
#[must_use]
pub fn module_to_z(module: f64, offset_z: f64) -> f64 {
    if module < f64::from(SECTION_BREAK_MODULE) {
        UPSTREAM_Z0_MM + module * UPSTREAM_PITCH_MM - offset_z
    } else {
        DOWNSTREAM_PITCH_MM * module + DOWNSTREAM_Z0_MM - offset_z
    }
}

/// Module positions of the z bin edges: `0..=12`, `12.5`, `13..=43`.
///
/// The extra `12.5` edge keeps the last upstream module and the first
/// downstream module in separate bins across the section gap.
pub fn z_edge_modules() -> impl Iterator<Item = f64> {
    let upstream = 0..SECTION_BREAK_MODULE;
    let downstream = SECTION_BREAK_MODULE..=LAST_EDGE_MODULE;
    upstream
        .map(f64::from)
        .chain(std::iter::once(f64::from(SECTION_BREAK_MODULE) - 0.5))
        .chain(downstream.map(f64::from))
}

/// Canonical z bin edges for a trigger (45 edges, 44 bins).
#[must_use]
pub fn z_bin_edges(offset_z: f64) -> Vec<f64> {
    z_edge_modules().map(|m| module_to_z(m, offset_z)).collect()
}

/// Canonical transverse bin edges for a trigger and view (134 edges, 133 bins).
#[must_use]
pub fn transverse_bin_edges(offsets: &Offsets, view: View) -> Vec<f64> {
    (FIRST_EDGE_STRIP..=LAST_EDGE_STRIP)
        .map(|strip| strip_to_transverse(f64::from(strip), offsets, view))
        .collect()
}

/// Physical position of a hit in its own view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalPosition {
    /// Beam-axis coordinate (mm).
    pub z: f64,
    /// Coordinate along the view's transverse axis (mm).
    pub transverse: f64,
}

impl PhysicalPosition {
    /// Maps a hit using the trigger's offsets.
    #[must_use]
    pub fn of_hit(hit: &Hit, offsets: &Offsets) -> Self {
        Self {
            z: module_to_z(f64::from(hit.module), offsets.z),
            transverse: strip_to_transverse(f64::from(hit.strip), offsets, hit.view),
        }
    }
}
