use std::sync::atomic::{fence, AtomicI32, Ordering};

/// Tracks which individual sequences a multi-producer claim strategy has
/// published, independent of publish order.
///
/// With a single producer the cursor sequence alone is enough: it only ever
/// advances contiguously. With multiple producers, two producers can claim
/// sequences 10 and 11, and producer 11 can finish writing before producer
/// 10 does. If the cursor just jumped to 11, a consumer would read slot 10
/// before it's actually written. `AvailabilityBuffer` fixes this: each slot
/// carries a flag equal to `sequence >> log2(capacity)` when available, so a
/// consumer scanning forward from a known-available sequence stops at the
/// first slot whose flag doesn't match — i.e. the first gap — rather than
/// trusting a raced-ahead cursor.
///
/// Grounded in the `ryntric-channels-rs` `AvailabilityBuffer`, with the
/// padding array dropped: this ring already stores `capacity`-sized boxed
/// slices elsewhere (`RingStorage`) without edge padding, so the flag buffer
/// follows the same convention for consistency.
pub struct AvailabilityBuffer {
    mask: i64,
    flag_shift: u32,
    buffer: Box<[AtomicI32]>,
}

impl AvailabilityBuffer {
    /// `capacity` must be a power of two.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        let mut buffer = Vec::with_capacity(capacity);
        buffer.resize_with(capacity, || AtomicI32::new(-1));
        Self {
            mask: (capacity - 1) as i64,
            flag_shift: capacity.trailing_zeros(),
            buffer: buffer.into_boxed_slice(),
        }
    }

    #[inline]
    fn index(&self, sequence: i64) -> usize {
        (sequence & self.mask) as usize
    }

    #[inline]
    fn flag_for(&self, sequence: i64) -> i32 {
        (sequence >> self.flag_shift) as i32
    }

    /// Marks `sequence` as published.
    pub fn set(&self, sequence: i64) {
        let index = self.index(sequence);
        let flag = self.flag_for(sequence);
        self.buffer[index].store(flag, Ordering::Release);
    }

    /// Marks every sequence in `low..=high` as published with a single
    /// trailing fence instead of one release store per slot.
    pub fn set_range(&self, low: i64, high: i64) {
        let mut sequence = low;
        while sequence <= high {
            let index = self.index(sequence);
            let flag = self.flag_for(sequence);
            self.buffer[index].store(flag, Ordering::Relaxed);
            sequence += 1;
        }
        fence(Ordering::Release);
    }

    /// Returns the highest sequence in `low..=high` that is contiguously
    /// available starting from `low`, or `low - 1` if `low` itself isn't
    /// available yet.
    pub fn get_available(&self, low: i64, high: i64) -> i64 {
        fence(Ordering::Acquire);
        let mut sequence = low;
        while sequence <= high {
            let index = self.index(sequence);
            let flag = self.flag_for(sequence);
            if self.buffer[index].load(Ordering::Relaxed) != flag {
                return sequence - 1;
            }
            sequence += 1;
        }
        high
    }
}

// Safety: every slot is an independent AtomicI32; concurrent set/get_available
// calls only ever touch disjoint logical sequences once the claim protocol in
// crate::claim hands out non-overlapping sequence ranges.
unsafe impl Send for AvailabilityBuffer {}
unsafe impl Sync for AvailabilityBuffer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_sequence_is_not_available() {
        let buf = AvailabilityBuffer::new(8);
        assert_eq!(buf.get_available(0, 0), -1);
    }

    #[test]
    fn set_then_available() {
        let buf = AvailabilityBuffer::new(8);
        buf.set(0);
        assert_eq!(buf.get_available(0, 0), 0);
    }

    #[test]
    fn out_of_order_publish_stalls_at_gap() {
        let buf = AvailabilityBuffer::new(8);
        buf.set(1);
        // sequence 0 not yet published, so the contiguous run from 0 stops before it.
        assert_eq!(buf.get_available(0, 1), -1);
        buf.set(0);
        assert_eq!(buf.get_available(0, 1), 1);
    }

    #[test]
    fn set_range_publishes_contiguous_batch() {
        let buf = AvailabilityBuffer::new(16);
        buf.set_range(0, 7);
        assert_eq!(buf.get_available(0, 7), 7);
    }

    #[test]
    fn wraparound_flag_distinguishes_generations() {
        let buf = AvailabilityBuffer::new(4);
        buf.set_range(0, 3);
        assert_eq!(buf.get_available(0, 3), 3);
        // second lap around the same 4 slots: must not look available until re-set.
        assert_eq!(buf.get_available(4, 4), 3);
        buf.set(4);
        assert_eq!(buf.get_available(4, 4), 4);
    }
}
