//! Touch sampling task
//!
//! Polls the touch controller at a fixed cadence, turns primary-contact
//! motion into stroke segments, and watches the clear button. Runs on
//! core 1 so e-paper refreshes never stall sampling.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Ticker};
use portable_atomic::Ordering;

use palimpsest_core::ring::StrokeWriter;
use palimpsest_core::sampler::ContactTracker;

use crate::board::touch::TouchPanel;
use crate::channels::CLEAR_REQUEST;
use crate::config::{SAMPLE_INTERVAL_MS, STROKE_CAPACITY};

/// Touch sampling task
#[embassy_executor::task]
pub async fn touch_task(
    mut panel: TouchPanel<'static>,
    button: Input<'static>,
    mut strokes: StrokeWriter<'static, STROKE_CAPACITY>,
) {
    info!("Touch task started");

    let mut tracker = ContactTracker::new();
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));

    loop {
        match panel.poll().await {
            Ok(frame) if frame.is_empty() => tracker.finger_up(),
            Ok(frame) => {
                if let Some(segment) = tracker.track(&frame) {
                    trace!("Segment {}..{}", segment.from, segment.to);
                    strokes.push(segment);
                }
            }
            // Transient bus noise; skip the sample rather than glitch the stroke
            Err(_) => warn!("Touch controller read failed"),
        }

        if button.is_low() {
            CLEAR_REQUEST.store(true, Ordering::Release);
        }

        ticker.next().await;
    }
}
