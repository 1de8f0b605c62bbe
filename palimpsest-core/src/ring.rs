//! Stroke ring buffer
//!
//! Fixed-capacity single-writer/single-reader ring of line segments
//! between the touch sampling task and the render loop. The writer never
//! blocks and never fails: when the renderer falls behind, the writer
//! wraps and overwrites the oldest unread slots (counted, not treated as
//! an error). Safety comes from index separation rather than a lock: the
//! write index is only ever stored by the writer half, the read index
//! only by the reader half, and each slot publishes through its pending
//! flag.
//!
//! The pending flag is the authoritative occupancy test. Index equality
//! cannot distinguish a lapped (full) ring from an empty one, so `try_pop`
//! keys off the flag at the read index; after an overrun the reader still
//! recovers exactly the newest `N` segments. Slot coordinates live in
//! per-field atomics, and a writer reclaims a slot (flag lowered) before
//! rewriting it, so a pop racing an overwrite discards the slot instead
//! of returning mixed endpoints. A writer lapping the entire ring within
//! one pop could still slip one stale segment through; that is part of
//! the lossy-overwrite policy, not corruption.

use portable_atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicUsize, Ordering};

use crate::geom::{Point, Segment};

/// Reference capacity: enough for ~1s of sustained drawing at the 25ms
/// sampling cadence before overwrite sets in.
pub const DEFAULT_CAPACITY: usize = 40;

/// One ring slot: segment endpoints plus the published flag
struct Slot {
    x0: AtomicI32,
    y0: AtomicI32,
    x1: AtomicI32,
    y1: AtomicI32,
    pending: AtomicBool,
}

impl Slot {
    const fn new() -> Self {
        Self {
            x0: AtomicI32::new(0),
            y0: AtomicI32::new(0),
            x1: AtomicI32::new(0),
            y1: AtomicI32::new(0),
            pending: AtomicBool::new(false),
        }
    }

    fn store(&self, segment: Segment) {
        self.x0.store(segment.from.x, Ordering::Relaxed);
        self.y0.store(segment.from.y, Ordering::Relaxed);
        self.x1.store(segment.to.x, Ordering::Relaxed);
        self.y1.store(segment.to.y, Ordering::Relaxed);
    }

    fn load(&self) -> Segment {
        Segment::new(
            Point::new(self.x0.load(Ordering::Relaxed), self.y0.load(Ordering::Relaxed)),
            Point::new(self.x1.load(Ordering::Relaxed), self.y1.load(Ordering::Relaxed)),
        )
    }
}

/// Fixed-capacity stroke ring
///
/// Construct once, then [`split`](Self::split) into the writer and reader
/// halves that the two tasks own. The halves are not clonable, so the
/// single-writer/single-reader discipline is enforced by the type system.
pub struct StrokeRing<const N: usize = DEFAULT_CAPACITY> {
    slots: [Slot; N],
    write: AtomicUsize,
    read: AtomicUsize,
    overruns: AtomicU32,
}

impl<const N: usize> StrokeRing<N> {
    pub const fn new() -> Self {
        Self {
            slots: [const { Slot::new() }; N],
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
            overruns: AtomicU32::new(0),
        }
    }

    /// Hand out the writer and reader halves
    pub fn split(&mut self) -> (StrokeWriter<'_, N>, StrokeReader<'_, N>) {
        let ring = &*self;
        (StrokeWriter { ring }, StrokeReader { ring })
    }
}

impl<const N: usize> Default for StrokeRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer half, owned by the sampling task
pub struct StrokeWriter<'a, const N: usize> {
    ring: &'a StrokeRing<N>,
}

impl<const N: usize> StrokeWriter<'_, N> {
    /// Push a segment, overwriting the oldest unread slot when full
    ///
    /// Never blocks, never fails, no allocation.
    pub fn push(&mut self, segment: Segment) {
        let ring = self.ring;
        let w = ring.write.load(Ordering::Relaxed);
        debug_assert!(w < N);
        let slot = &ring.slots[w];

        // Reclaim the slot before rewriting so a concurrent pop sees it
        // as gone rather than half-written. Still pending = the reader
        // never got to it.
        if slot.pending.swap(false, Ordering::AcqRel) {
            ring.overruns.fetch_add(1, Ordering::Relaxed);
        }
        slot.store(segment);
        slot.pending.store(true, Ordering::Release);
        ring.write.store((w + 1) % N, Ordering::Release);
    }

    /// Segments lost to overwrite since construction
    pub fn overruns(&self) -> u32 {
        self.ring.overruns.load(Ordering::Relaxed)
    }
}

/// Reader half, owned by the render loop
pub struct StrokeReader<'a, const N: usize> {
    ring: &'a StrokeRing<N>,
}

impl<const N: usize> StrokeReader<'_, N> {
    /// Pop the oldest unread segment, if any
    ///
    /// Returns `None` when the slot at the read index has nothing
    /// published; a drain loop uses that as its stop signal. The read
    /// index does not advance on `None`.
    pub fn try_pop(&mut self) -> Option<Segment> {
        let ring = self.ring;
        let r = ring.read.load(Ordering::Relaxed);
        debug_assert!(r < N);
        let slot = &ring.slots[r];

        if !slot.pending.load(Ordering::Acquire) {
            return None;
        }
        let segment = slot.load();
        // Revalidate: the writer lowers the flag before overwriting, so a
        // raced slot is dropped here and picked up again once republished.
        if !slot.pending.swap(false, Ordering::AcqRel) {
            return None;
        }
        ring.read.store((r + 1) % N, Ordering::Release);
        Some(segment)
    }

    /// Whether an unread segment is waiting at the read position
    pub fn has_backlog(&self) -> bool {
        let r = self.ring.read.load(Ordering::Relaxed);
        self.ring.slots[r].pending.load(Ordering::Acquire)
    }

    /// Current (read, write) slot positions, for the diagnostic overlay
    pub fn indices(&self) -> (usize, usize) {
        (
            self.ring.read.load(Ordering::Relaxed),
            self.ring.write.load(Ordering::Relaxed),
        )
    }

    /// Segments lost to overwrite since construction
    pub fn overruns(&self) -> u32 {
        self.ring.overruns.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(n: i32) -> Segment {
        Segment::new(Point::new(n, n), Point::new(n + 1, n))
    }

    #[test]
    fn test_fifo_order_then_empty() {
        let mut ring: StrokeRing<8> = StrokeRing::new();
        let (mut writer, mut reader) = ring.split();

        for n in 0..5 {
            writer.push(seg(n));
        }
        for n in 0..5 {
            assert_eq!(reader.try_pop(), Some(seg(n)));
        }
        assert_eq!(reader.try_pop(), None);
        assert_eq!(reader.overruns(), 0);
    }

    #[test]
    fn test_pop_on_empty_does_not_advance() {
        let mut ring: StrokeRing<8> = StrokeRing::new();
        let (mut writer, mut reader) = ring.split();

        assert_eq!(reader.try_pop(), None);
        assert_eq!(reader.indices(), (0, 0));

        writer.push(seg(1));
        assert_eq!(reader.try_pop(), Some(seg(1)));
        assert_eq!(reader.try_pop(), None);
        assert_eq!(reader.indices(), (1, 1));
    }

    #[test]
    fn test_full_ring_drains_completely() {
        let mut ring: StrokeRing<4> = StrokeRing::new();
        let (mut writer, mut reader) = ring.split();

        for n in 0..4 {
            writer.push(seg(n));
        }
        for n in 0..4 {
            assert_eq!(reader.try_pop(), Some(seg(n)));
        }
        assert_eq!(reader.try_pop(), None);
        assert_eq!(reader.overruns(), 0);
    }

    #[test]
    fn test_overrun_keeps_exactly_last_n() {
        let mut ring: StrokeRing<4> = StrokeRing::new();
        let (mut writer, mut reader) = ring.split();

        for n in 0..6 {
            writer.push(seg(n));
        }
        // Slots now hold 4, 5, 2, 3; the two oldest are gone.
        let mut recovered = heapless::Vec::<Segment, 8>::new();
        while let Some(s) = reader.try_pop() {
            recovered.push(s).unwrap();
        }
        assert_eq!(recovered.len(), 4);
        for n in 2..6 {
            assert!(recovered.contains(&seg(n)));
        }
        assert_eq!(reader.overruns(), 2);
    }

    #[test]
    fn test_backlog_flag() {
        let mut ring: StrokeRing<4> = StrokeRing::new();
        let (mut writer, mut reader) = ring.split();

        assert!(!reader.has_backlog());
        writer.push(seg(0));
        assert!(reader.has_backlog());
        reader.try_pop();
        assert!(!reader.has_backlog());
    }

    #[test]
    fn test_interleaved_drains_stay_fifo() {
        let mut ring: StrokeRing<4> = StrokeRing::new();
        let (mut writer, mut reader) = ring.split();

        let mut next = 0;
        for _ in 0..10 {
            writer.push(seg(next));
            writer.push(seg(next + 1));
            assert_eq!(reader.try_pop(), Some(seg(next)));
            assert_eq!(reader.try_pop(), Some(seg(next + 1)));
            next += 2;
        }
        assert_eq!(reader.try_pop(), None);
        assert_eq!(reader.overruns(), 0);
    }
}
