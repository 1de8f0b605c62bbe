//! Board-agnostic core logic for the Palimpsest sketchpad firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Geometry primitives (points, stroke segments)
//! - The lock-free stroke ring buffer between sampler and renderer
//! - Fixed-point line rasterization
//! - Touch contact tracking
//! - Redraw pacing and frame composition
//! - The battery gauge
//! - The display sink trait the renderer draws through

#![no_std]
#![deny(unsafe_code)]

pub mod canvas;
pub mod fixed;
pub mod gauge;
pub mod geom;
pub mod raster;
pub mod render;
pub mod ring;
pub mod sampler;
