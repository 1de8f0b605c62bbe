//! Compile-time tuning constants
//!
//! The sketchpad has no runtime configuration; cadences, capacities and
//! panel geometry are fixed here.

/// Touch poll cadence (ms)
pub const SAMPLE_INTERVAL_MS: u64 = 25;

/// Render task tick (ms); redraw decisions are made at this rate
pub const RENDER_TICK_MS: u64 = 25;

/// Stroke ring capacity
///
/// Smaller values shorten the lag between stroke and ink; larger values
/// buffer more motion before overwrite sets in.
pub const STROKE_CAPACITY: usize = 40;

/// Panel resolution (pixels)
pub const PANEL_WIDTH: usize = 400;
pub const PANEL_HEIGHT: usize = 300;

/// Stack for the touch executor on core 1 (bytes)
pub const TOUCH_STACK_BYTES: usize = 4096;
