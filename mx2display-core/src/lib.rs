//! mx2display-core: Geometry and histogram types for the Mx2 event display.
//!
//! This crate maps detector-local hit indices to physical coordinates,
//! selects the trigger to show, and builds the per-view light-yield maps
//! and the arrival-time profile that the renderer draws.
//!

pub mod error;
pub mod geometry;
pub mod histogram;
pub mod hit;
pub mod profile;
pub mod selection;

pub use error::{Error, Result};
pub use geometry::{module_to_z, strip_to_transverse, PhysicalPosition};
pub use histogram::{ColorScale, ViewCell, ViewFilter, ViewImage, PE_COLOR_RANGE};
pub use hit::{Hit, HitBatch, Offsets, TriggerColumns, TriggerRecord, View};
pub use profile::{Annotation, LayerKind, ProfileLayer, ProfileMode, TimeProfile};
pub use selection::{select_trigger, trigger_hits, SelectionPolicy};
