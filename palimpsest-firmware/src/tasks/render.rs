//! Render task
//!
//! Paces e-paper refreshes and composites the frame when one is due:
//! a pending clear wipes the panel, stroke backlog redraws after the
//! debounce, and the idle interval keeps the gauge current.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_time::{Duration, Instant, Ticker};
use portable_atomic::Ordering;

use palimpsest_core::canvas::Canvas;
use palimpsest_core::gauge::BatteryGauge;
use palimpsest_core::render::{Compositor, RefreshPolicy};
use palimpsest_core::ring::StrokeReader;

use crate::board::battery;
use crate::board::panel::EpdPanel;
use crate::channels::CLEAR_REQUEST;
use crate::config::{RENDER_TICK_MS, STROKE_CAPACITY};

/// Render task
#[embassy_executor::task]
pub async fn render_task(
    mut panel: EpdPanel<'static>,
    mut adc: Adc<'static, Async>,
    mut vsys: Channel<'static>,
    mut strokes: StrokeReader<'static, STROKE_CAPACITY>,
) {
    info!("Render task started");

    let mut policy = RefreshPolicy::default();
    let mut compositor = Compositor::new(BatteryGauge::top_right(panel.width()));
    let mut ticker = Ticker::every(Duration::from_millis(RENDER_TICK_MS));
    let mut last_tick = Instant::now();

    loop {
        ticker.next().await;
        let now = Instant::now();
        policy.advance(now.duration_since(last_tick).as_millis() as u32);
        last_tick = now;

        let clear_pending = CLEAR_REQUEST.load(Ordering::Acquire);
        if !policy.due(clear_pending, strokes.has_backlog()) {
            continue;
        }

        let millivolts = match adc.read(&mut vsys).await {
            Ok(raw) => battery::vsys_millivolts(raw),
            Err(_) => {
                warn!("VSYS read failed");
                0
            }
        };

        let started = Instant::now();
        match compositor.render_frame(&mut panel, &mut strokes, clear_pending, millivolts) {
            Ok(report) => {
                if report.cleared {
                    CLEAR_REQUEST.store(false, Ordering::Release);
                }
                let took = started.elapsed().as_millis() as u32;
                compositor.note_frame_time(took);
                policy.rearm();
                debug!("Frame: {} segments in {}ms", report.segments, took);
            }
            Err(e) => {
                // The panel is the only output; there is no degraded mode.
                error!("Panel fault: {}", e);
                core::panic!("panel fault");
            }
        }
    }
}
