//! Fixed-point line rasterizer
//!
//! Stamps stroke segments onto the frame with a dominant-axis Q16.16 DDA.
//! Stepping along the longer axis guarantees gap-free coverage for any
//! slope; the minor axis advances by a fixed-point ratio per step, which
//! tracks the slope with sub-pixel accuracy in pure integer math.

use crate::canvas::{Canvas, Shade};
use crate::fixed::Fixed32;
use crate::geom::Segment;

/// Stamp one rasterized point: an ink pixel plus four halo neighbours
///
/// The plus-shaped cluster softens a single-pixel line on a coarse
/// grayscale panel.
pub fn stamp<C: Canvas>(canvas: &mut C, x: i32, y: i32) {
    canvas.set_pixel(x, y, Shade::Ink);
    canvas.set_pixel(x + 1, y, Shade::Halo);
    canvas.set_pixel(x - 1, y, Shade::Halo);
    canvas.set_pixel(x, y + 1, Shade::Halo);
    canvas.set_pixel(x, y - 1, Shade::Halo);
}

/// Stamp a line segment onto the canvas
///
/// Endpoints are normalized so the loop always advances in increasing
/// coordinate along the dominant axis. The span is inclusive of both
/// endpoints; a zero-length segment stamps exactly once (the minor-axis
/// ratio degenerates to zero rather than dividing by zero).
pub fn draw_segment<C: Canvas>(canvas: &mut C, segment: Segment) {
    let Segment { mut from, mut to } = segment;
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    if dx.abs() > dy.abs() {
        // X is the dominant axis
        if dx < 0 {
            core::mem::swap(&mut from, &mut to);
        }
        let step = Fixed32::ratio(to.y - from.y, to.x - from.x);
        let mut minor = Fixed32::from_int(from.y);
        for x in from.x..=to.x {
            stamp(canvas, x, minor.to_int());
            minor += step;
        }
    } else {
        // Y is the dominant axis
        if dy < 0 {
            core::mem::swap(&mut from, &mut to);
        }
        let step = Fixed32::ratio(to.x - from.x, to.y - from.y);
        let mut minor = Fixed32::from_int(from.x);
        for y in from.y..=to.y {
            stamp(canvas, minor.to_int(), y);
            minor += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::mock::TraceCanvas;
    use crate::geom::Point;
    use proptest::prelude::*;

    fn rasterize(x0: i32, y0: i32, x1: i32, y1: i32) -> TraceCanvas {
        let mut canvas = TraceCanvas::new(400, 300);
        draw_segment(
            &mut canvas,
            Segment::new(Point::new(x0, y0), Point::new(x1, y1)),
        );
        canvas
    }

    #[test]
    fn test_degenerate_segment_stamps_once() {
        let canvas = rasterize(5, 5, 5, 5);
        assert_eq!(canvas.ink.as_slice(), &[(5, 5)]);
        assert_eq!(canvas.halos, 4);
    }

    #[test]
    fn test_horizontal_span_is_exact() {
        let canvas = rasterize(0, 0, 10, 0);
        assert_eq!(canvas.ink.len(), 11);
        for (i, &pixel) in canvas.ink.iter().enumerate() {
            assert_eq!(pixel, (i as i32, 0));
        }
    }

    #[test]
    fn test_vertical_span_is_exact() {
        let canvas = rasterize(0, 0, 0, 10);
        assert_eq!(canvas.ink.len(), 11);
        for (i, &pixel) in canvas.ink.iter().enumerate() {
            assert_eq!(pixel, (0, i as i32));
        }
    }

    #[test]
    fn test_shallow_slope_minor_axis_is_monotone() {
        let canvas = rasterize(0, 0, 10, 5);
        assert_eq!(canvas.ink.len(), 11);
        for (i, &(x, _)) in canvas.ink.iter().enumerate() {
            assert_eq!(x, i as i32);
        }
        for pair in canvas.ink.windows(2) {
            let dy = pair[1].1 - pair[0].1;
            assert!((0..=1).contains(&dy), "minor axis stepped by {}", dy);
        }
        assert_eq!(canvas.ink.last(), Some(&(10, 5)));
    }

    #[test]
    fn test_direction_is_normalized() {
        // Same pixels whichever way the segment points
        let forward = rasterize(2, 3, 12, 8);
        let backward = rasterize(12, 8, 2, 3);
        assert_eq!(forward.ink.as_slice(), backward.ink.as_slice());
    }

    proptest! {
        #[test]
        fn raster_spans_are_gap_free(
            x0 in -50i32..50,
            y0 in -50i32..50,
            x1 in -50i32..50,
            y1 in -50i32..50,
        ) {
            let canvas = rasterize(x0, y0, x1, y1);
            let major = (x1 - x0).abs().max((y1 - y0).abs());
            prop_assert_eq!(canvas.ink.len(), (major + 1) as usize);
            for pair in canvas.ink.windows(2) {
                let dx = (pair[1].0 - pair[0].0).abs();
                let dy = (pair[1].1 - pair[0].1).abs();
                // One step along the dominant axis, at most one on the minor
                prop_assert!(dx.max(dy) == 1 && dx.min(dy) <= 1);
            }
        }
    }
}
