use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicI64, Ordering};

/// Sentinel value meaning "no sequence has been published yet".
pub const INITIAL_VALUE: i64 = -1;

/// A monotonically non-decreasing 64-bit counter representing a position in
/// the event stream.
///
/// Wrapped in [`CachePadded`] so neighboring `Sequence`s never share a cache
/// line: the producer's cursor and a consumer's own sequence are read and
/// written by different cores at very high frequency, and without padding
/// each write would invalidate the other side's cache line (false sharing).
///
/// `get`/`set` use acquire/release ordering, which is the happens-before
/// edge the whole protocol rests on: every slot write a producer makes
/// before `set`-ing its published sequence is visible to any consumer whose
/// `get` observes that value or higher.
#[derive(Debug)]
pub struct Sequence {
    value: CachePadded<AtomicI64>,
}

impl Sequence {
    /// Creates a new sequence initialized to [`INITIAL_VALUE`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_value(INITIAL_VALUE)
    }

    /// Creates a new sequence initialized to `value`.
    #[must_use]
    pub fn with_value(value: i64) -> Self {
        Self {
            value: CachePadded::new(AtomicI64::new(value)),
        }
    }

    /// Acquire-ordered read.
    #[inline]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    /// Relaxed read, for single-writer fast paths that don't need to
    /// synchronize with anything (e.g. a claim strategy reading its own
    /// counter back).
    #[inline]
    pub fn get_relaxed(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Release-ordered write. Publishes every write that preceded this call
    /// in program order on this thread to any thread that later `get`s a
    /// value `>=` what was stored here.
    #[inline]
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::Release);
    }

    /// Relaxed write, for single-writer counters with no cross-thread
    /// publication requirement at this step.
    #[inline]
    pub fn set_relaxed(&self, value: i64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Acquire-release compare-and-swap.
    #[inline]
    pub fn compare_and_set(&self, expected: i64, new: i64) -> bool {
        self.value
            .compare_exchange(expected, new, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Atomically increments by one and returns the new value.
    #[inline]
    pub fn increment_and_get(&self) -> i64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Atomically increments by `n` and returns the new value.
    #[inline]
    pub fn add_and_get(&self, n: i64) -> i64 {
        self.value.fetch_add(n, Ordering::AcqRel) + n
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: all access goes through the inner AtomicI64.
unsafe impl Send for Sequence {}
unsafe impl Sync for Sequence {}

/// Returns the minimum of a (non-empty) set of gating sequences, or `i64::MAX`
/// if the set is empty (meaning "no gating", i.e. unbounded).
pub fn min_sequence(sequences: &[&Sequence]) -> i64 {
    sequences.iter().map(|s| s.get()).min().unwrap_or(i64::MAX)
}
