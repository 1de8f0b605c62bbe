//! Shared state between the sampling and render tasks
//!
//! The stroke ring is handed out as split writer/reader halves at startup;
//! the clear flag is the only other cross-task state.

use portable_atomic::AtomicBool;
use static_cell::StaticCell;

use palimpsest_core::ring::StrokeRing;

use crate::config::STROKE_CAPACITY;

/// Full-frame clear request
///
/// Set by the touch task's button watch, and true at boot so the first
/// frame wipes the panel; cleared by the render task after the wipe. A
/// lost or duplicated set only costs one extra clear cycle.
pub static CLEAR_REQUEST: AtomicBool = AtomicBool::new(true);

/// Stroke ring storage; split into writer/reader halves in `main`
pub static STROKE_RING: StaticCell<StrokeRing<STROKE_CAPACITY>> = StaticCell::new();
