//! Touch contact tracking
//!
//! Turns per-poll contact positions into stroke segments. The tracker
//! remembers the last position of up to two contacts; only motion of the
//! primary contact produces segments. The active-stroke gate suppresses
//! the first sample after a landing, since the previous remembered
//! position is stale and would otherwise draw a segment from wherever the
//! finger last lifted.

use heapless::Vec;

use crate::geom::{Point, Segment};

/// Maximum simultaneous contacts tracked
pub const MAX_CONTACTS: usize = 2;

/// Contact positions reported by one touch poll, primary contact first
pub type ContactFrame = Vec<Point, MAX_CONTACTS>;

/// Per-iteration contact memory for the sampling task
///
/// Owned exclusively by the sampling task; never shared.
#[derive(Debug, Clone)]
pub struct ContactTracker {
    last: [Point; MAX_CONTACTS],
    stroke_active: bool,
}

impl ContactTracker {
    pub const fn new() -> Self {
        Self {
            last: [Point::ORIGIN; MAX_CONTACTS],
            stroke_active: false,
        }
    }

    /// The panel reported no contact this cycle
    ///
    /// Drops the active stroke so the next landing starts fresh instead
    /// of connecting to the stale remembered position.
    pub fn finger_up(&mut self) {
        self.stroke_active = false;
    }

    /// Feed one poll's contact positions
    ///
    /// Returns the segment produced by the primary contact's motion, if
    /// any. The first differing sample after a landing only arms the
    /// stroke and remembers the position.
    pub fn track(&mut self, contacts: &[Point]) -> Option<Segment> {
        let mut produced = None;
        for (i, &contact) in contacts.iter().take(MAX_CONTACTS).enumerate() {
            if contact != self.last[i] {
                if self.stroke_active && i == 0 {
                    produced = Some(Segment::new(self.last[0], contact));
                }
                self.last[i] = contact;
                self.stroke_active = true;
            }
        }
        produced
    }
}

impl Default for ContactTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_after_landing_draws_nothing() {
        let mut tracker = ContactTracker::new();
        tracker.finger_up();

        assert_eq!(tracker.track(&[Point::new(5, 5)]), None);
        assert_eq!(tracker.track(&[Point::new(5, 5)]), None);
        assert_eq!(
            tracker.track(&[Point::new(6, 5)]),
            Some(Segment::new(Point::new(5, 5), Point::new(6, 5)))
        );
        assert_eq!(
            tracker.track(&[Point::new(6, 6)]),
            Some(Segment::new(Point::new(6, 5), Point::new(6, 6)))
        );
    }

    #[test]
    fn test_finger_up_breaks_the_stroke() {
        let mut tracker = ContactTracker::new();

        tracker.track(&[Point::new(10, 10)]);
        assert!(tracker.track(&[Point::new(11, 10)]).is_some());

        tracker.finger_up();

        // Landing somewhere else must not connect across the gap
        assert_eq!(tracker.track(&[Point::new(100, 100)]), None);
        assert_eq!(
            tracker.track(&[Point::new(101, 100)]),
            Some(Segment::new(Point::new(100, 100), Point::new(101, 100)))
        );
    }

    #[test]
    fn test_secondary_contact_never_draws() {
        let mut tracker = ContactTracker::new();

        tracker.track(&[Point::new(5, 5), Point::new(50, 50)]);
        // Only the second contact moves
        assert_eq!(
            tracker.track(&[Point::new(5, 5), Point::new(60, 60)]),
            None
        );
    }

    #[test]
    fn test_stationary_contact_produces_no_segments() {
        let mut tracker = ContactTracker::new();

        tracker.track(&[Point::new(8, 8)]);
        for _ in 0..5 {
            assert_eq!(tracker.track(&[Point::new(8, 8)]), None);
        }
    }
}
