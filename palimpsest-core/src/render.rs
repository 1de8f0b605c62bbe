//! Redraw pacing and frame composition
//!
//! E-paper refreshes are slow and leave ghosting, so the renderer batches
//! work: a pending clear redraws immediately, stroke backlog redraws after
//! a short debounce, and a long idle interval keeps the gauge current and
//! exercises the panel even when nothing is drawn.

use core::fmt::Write;

use heapless::String;

use crate::canvas::{Canvas, PanelError};
use crate::gauge::BatteryGauge;
use crate::raster;
use crate::ring::StrokeReader;

/// Minimum interval between backlog-triggered redraws (ms)
pub const DEBOUNCE_MS: u32 = 100;
/// Interval between idle redraws (ms)
pub const IDLE_REFRESH_MS: u32 = 15_000;

/// Redraw decision state
///
/// The render task advances this every tick and rearms it after a redraw.
#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    debounce_ms: u32,
    idle_ms: u32,
    since_redraw_ms: u32,
}

impl RefreshPolicy {
    pub const fn new(debounce_ms: u32, idle_ms: u32) -> Self {
        Self {
            debounce_ms,
            idle_ms,
            since_redraw_ms: 0,
        }
    }

    /// Account for elapsed time since the last tick
    pub fn advance(&mut self, delta_ms: u32) {
        self.since_redraw_ms = self.since_redraw_ms.saturating_add(delta_ms);
    }

    /// Whether this tick should redraw
    ///
    /// A pending clear always redraws. Stroke backlog redraws once the
    /// debounce interval has passed. Otherwise the idle interval applies.
    pub fn due(&self, clear_pending: bool, backlog: bool) -> bool {
        if clear_pending {
            return true;
        }
        let wait = if backlog { self.debounce_ms } else { self.idle_ms };
        self.since_redraw_ms >= wait
    }

    /// Restart the interval after a redraw
    pub fn rearm(&mut self) {
        self.since_redraw_ms = 0;
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::new(DEBOUNCE_MS, IDLE_REFRESH_MS)
    }
}

/// Outcome of one composited frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameReport {
    /// The frame was wiped instead of drawn
    pub cleared: bool,
    /// Segments drained and rasterized this cycle
    pub segments: u32,
}

/// Composites one frame: strokes, diagnostic overlay, battery gauge
pub struct Compositor {
    gauge: BatteryGauge,
    last_frame_ms: u32,
}

impl Compositor {
    pub const fn new(gauge: BatteryGauge) -> Self {
        Self {
            gauge,
            last_frame_ms: 0,
        }
    }

    /// Record how long the previous frame took, for the overlay
    pub fn note_frame_time(&mut self, ms: u32) {
        self.last_frame_ms = ms;
    }

    /// Run one display transaction
    ///
    /// A pending clear wipes the frame and skips stroke drawing for this
    /// cycle; otherwise the ring is drained and every segment stamped.
    /// The battery gauge is drawn either way.
    pub fn render_frame<C: Canvas, const N: usize>(
        &mut self,
        canvas: &mut C,
        strokes: &mut StrokeReader<'_, N>,
        clear_pending: bool,
        battery_mv: u32,
    ) -> Result<FrameReport, PanelError> {
        canvas.begin_frame()?;

        let mut report = FrameReport {
            cleared: clear_pending,
            segments: 0,
        };
        if clear_pending {
            canvas.clear_frame();
        } else {
            self.draw_diagnostics(canvas, strokes);
            while let Some(segment) = strokes.try_pop() {
                raster::draw_segment(canvas, segment);
                report.segments += 1;
            }
        }
        self.gauge.draw(canvas, battery_mv);

        canvas.end_frame()?;
        Ok(report)
    }

    /// Ring positions, overrun count and last frame duration, top-left
    fn draw_diagnostics<C: Canvas, const N: usize>(
        &self,
        canvas: &mut C,
        strokes: &StrokeReader<'_, N>,
    ) {
        let (read, write) = strokes.indices();
        let mut line: String<40> = String::new();
        let _ = write!(
            line,
            "P:{}/{} O:{} {}ms",
            read,
            write,
            strokes.overruns(),
            self.last_frame_ms
        );
        canvas.draw_text(5, 5, &line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::mock::TraceCanvas;
    use crate::geom::{Point, Segment};
    use crate::ring::StrokeRing;

    fn seg(n: i32) -> Segment {
        Segment::new(Point::new(n, n), Point::new(n + 3, n))
    }

    #[test]
    fn test_clear_always_redraws() {
        let policy = RefreshPolicy::new(100, 15_000);
        assert!(policy.due(true, false));
        assert!(policy.due(true, true));
        assert!(!policy.due(false, false));
    }

    #[test]
    fn test_backlog_waits_for_debounce() {
        let mut policy = RefreshPolicy::new(100, 15_000);
        policy.advance(50);
        assert!(!policy.due(false, true));
        policy.advance(50);
        assert!(policy.due(false, true));
        // Still short of the idle interval without backlog
        assert!(!policy.due(false, false));
    }

    #[test]
    fn test_idle_interval_redraws_without_backlog() {
        let mut policy = RefreshPolicy::new(100, 15_000);
        policy.advance(14_999);
        assert!(!policy.due(false, false));
        policy.advance(1);
        assert!(policy.due(false, false));
    }

    #[test]
    fn test_rearm_restarts_the_interval() {
        let mut policy = RefreshPolicy::new(100, 15_000);
        policy.advance(200);
        assert!(policy.due(false, true));
        policy.rearm();
        assert!(!policy.due(false, true));
    }

    #[test]
    fn test_clear_cycle_wipes_and_skips_strokes() {
        let mut ring: StrokeRing<8> = StrokeRing::new();
        let (mut writer, mut reader) = ring.split();
        writer.push(seg(1));
        writer.push(seg(2));

        let mut canvas = TraceCanvas::new(400, 300);
        let mut compositor = Compositor::new(BatteryGauge::top_right(400));

        let report = compositor
            .render_frame(&mut canvas, &mut reader, true, 4000)
            .unwrap();

        assert!(report.cleared);
        assert_eq!(report.segments, 0);
        assert_eq!(canvas.clears, 1);
        assert!(canvas.ink.is_empty());
        // No diagnostic text on a clear cycle, but the gauge still draws
        assert_eq!(canvas.texts, 0);
        assert_eq!(canvas.outlines, 1);
        assert_eq!(canvas.frames_ended, 1);

        // The backlog survives the clear cycle and drains next time
        let report = compositor
            .render_frame(&mut canvas, &mut reader, false, 4000)
            .unwrap();
        assert_eq!(report.segments, 2);
    }

    #[test]
    fn test_draw_cycle_drains_the_ring() {
        let mut ring: StrokeRing<8> = StrokeRing::new();
        let (mut writer, mut reader) = ring.split();
        writer.push(seg(10));
        writer.push(seg(20));
        writer.push(seg(30));

        let mut canvas = TraceCanvas::new(400, 300);
        let mut compositor = Compositor::new(BatteryGauge::top_right(400));

        let report = compositor
            .render_frame(&mut canvas, &mut reader, false, 4000)
            .unwrap();

        assert!(!report.cleared);
        assert_eq!(report.segments, 3);
        assert!(!reader.has_backlog());
        assert_eq!(canvas.texts, 1);
        // 3 segments, 4 inclusive stamps each
        assert_eq!(canvas.ink.len(), 12);
    }
}
