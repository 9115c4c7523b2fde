use crate::alert::AlertFlag;
use crate::availability::AvailabilityBuffer;
use crate::backoff::Backoff;
use crate::config::EmptyGatingPolicy;
use crate::error::{RingexError, Result};
use crate::gating::GatingSequences;
use crate::invariants::{
    debug_assert_claimed_before_publish, debug_assert_cursor_not_past_claim,
    debug_assert_monotonic, debug_assert_no_wrap,
};
use crate::metrics::Metrics;
use crate::sequence::Sequence;
use std::cell::Cell;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Hands out exclusive ranges of sequences to producers and serializes their
/// publication.
///
/// Two implementations, selected via [`crate::config::ProducerKind`]:
/// [`SingleProducerClaim`] assumes the caller already serializes producers
/// (typically because there is exactly one), so its claim counter is a plain
/// cell. [`MultiProducerClaim`] assumes concurrent producers and uses an
/// atomic counter plus an [`AvailabilityBuffer`] so publish order can differ
/// from claim order without consumers observing a gap.
///
/// Grounded in the `Sequencer` trait of `ryntric-channels-rs`: `next_n` there
/// is split here into a blocking `next_n` and a non-blocking `try_next_n` to
/// match this crate's `next`/`try_next` API surface (spec.md Section 4.6).
pub trait ClaimStrategy: Send + Sync {
    /// Claims `n` consecutive sequences, blocking (per the wait/backoff
    /// policy) until the gating sequences leave enough room. Returns the
    /// highest sequence claimed.
    fn next_n(
        &self,
        n: i64,
        capacity: i64,
        gating: &GatingSequences,
        policy: EmptyGatingPolicy,
        alert: &AlertFlag,
        metrics: Option<&Metrics>,
    ) -> Result<i64>;

    /// Claims `n` consecutive sequences without blocking. Returns
    /// `Err(InsufficientCapacity)` immediately if there isn't room, with no
    /// side effects (the claim counter is left untouched on failure).
    fn try_next_n(
        &self,
        n: i64,
        capacity: i64,
        gating: &GatingSequences,
        policy: EmptyGatingPolicy,
    ) -> Result<i64>;

    /// The highest sequence claimed so far (not necessarily published).
    fn current(&self) -> i64;

    /// Publishes `sequence` (single-claim path).
    fn publish(&self, sequence: i64);

    /// Publishes every sequence in `low..=high` (batch-claim path).
    fn publish_range(&self, low: i64, high: i64);

    /// Highest sequence in `low..=high` that is contiguously visible to
    /// consumers. For single-producer claims this is always `high` (publish
    /// order == claim order); for multi-producer claims it may stall at a
    /// gap left by a slower producer.
    fn highest_published(&self, low: i64, high: i64) -> i64;

    /// The sequence most recently made visible to consumers (the "cursor").
    fn cursor(&self) -> i64;

    /// A shared handle to the live cursor sequence, for building
    /// [`crate::barrier::SequenceBarrier`]s that observe updates as they
    /// happen rather than a point-in-time snapshot.
    fn cursor_handle(&self) -> Arc<Sequence>;

    /// Single-producer "force" claim: asserts capacity against `gating` and
    /// sets the claim counter to `sequence` directly, without going through
    /// the normal increment protocol. Returns `Err(RingexError::IllegalState)`
    /// for multi-producer strategies, for which there is no single owner of
    /// the claim counter to force.
    fn claim(
        &self,
        sequence: i64,
        capacity: i64,
        gating: &GatingSequences,
        policy: EmptyGatingPolicy,
    ) -> Result<()>;

    /// Single-producer-only: sets both the claim counter and the cursor to
    /// `sequence`, for resynchronizing after externally-sequenced replay.
    /// Returns `Err(RingexError::IllegalState)` for multi-producer strategies.
    fn force_publish(&self, sequence: i64) -> Result<()>;
}

/// Single-producer claim strategy: the claim counter is a plain `Cell`, safe
/// because the caller guarantees only one thread ever calls `next_n`.
pub struct SingleProducerClaim {
    claimed: Cell<i64>,
    cursor: Arc<Sequence>,
}

impl SingleProducerClaim {
    #[must_use]
    pub fn new() -> Self {
        Self {
            claimed: Cell::new(crate::sequence::INITIAL_VALUE),
            cursor: Arc::new(Sequence::new()),
        }
    }
}

impl Default for SingleProducerClaim {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: SingleProducerClaim's Cell-based counter is only ever mutated by
// the single producer thread the caller guarantees; the cursor Sequence is
// already internally synchronized for the consumer side.
unsafe impl Sync for SingleProducerClaim {}

impl ClaimStrategy for SingleProducerClaim {
    fn next_n(
        &self,
        n: i64,
        capacity: i64,
        gating: &GatingSequences,
        policy: EmptyGatingPolicy,
        alert: &AlertFlag,
        metrics: Option<&Metrics>,
    ) -> Result<i64> {
        if n > capacity {
            return Err(RingexError::illegal_argument(format!(
                "batch size {n} exceeds ring capacity {capacity}"
            )));
        }
        gating.mark_claiming_started();
        let next = self.claimed.get() + n;
        let wrap_point = next - capacity;

        let mut backoff = Backoff::new();
        loop {
            let gating_min = gating.min(policy)?;
            if wrap_point <= gating_min {
                break;
            }
            alert.check()?;
            if let Some(metrics) = metrics {
                metrics.record_claim_retry();
            }
            backoff.snooze();
        }
        debug_assert_no_wrap!(next, gating.min(policy)?, capacity);

        self.claimed.set(next);
        Ok(next)
    }

    fn try_next_n(
        &self,
        n: i64,
        capacity: i64,
        gating: &GatingSequences,
        policy: EmptyGatingPolicy,
    ) -> Result<i64> {
        if n > capacity {
            return Err(RingexError::illegal_argument(format!(
                "batch size {n} exceeds ring capacity {capacity}"
            )));
        }
        gating.mark_claiming_started();
        let next = self.claimed.get() + n;
        let wrap_point = next - capacity;
        let gating_min = gating.min(policy)?;
        if wrap_point > gating_min {
            return Err(RingexError::InsufficientCapacity);
        }
        self.claimed.set(next);
        Ok(next)
    }

    fn current(&self) -> i64 {
        self.claimed.get()
    }

    fn publish(&self, sequence: i64) {
        debug_assert_claimed_before_publish!(sequence, self.claimed.get());
        let previous = self.cursor.get();
        self.cursor.set(sequence);
        debug_assert_monotonic!("cursor", previous, sequence);
        debug_assert_cursor_not_past_claim!(sequence, self.claimed.get());
    }

    fn publish_range(&self, _low: i64, high: i64) {
        debug_assert_claimed_before_publish!(high, self.claimed.get());
        let previous = self.cursor.get();
        self.cursor.set(high);
        debug_assert_monotonic!("cursor", previous, high);
        debug_assert_cursor_not_past_claim!(high, self.claimed.get());
    }

    fn highest_published(&self, _low: i64, high: i64) -> i64 {
        high
    }

    fn cursor(&self) -> i64 {
        self.cursor.get()
    }

    fn cursor_handle(&self) -> Arc<Sequence> {
        self.cursor.clone()
    }

    fn claim(
        &self,
        sequence: i64,
        capacity: i64,
        gating: &GatingSequences,
        policy: EmptyGatingPolicy,
    ) -> Result<()> {
        gating.mark_claiming_started();
        let wrap_point = sequence - capacity;
        let gating_min = gating.min(policy)?;
        if wrap_point > gating_min {
            return Err(RingexError::InsufficientCapacity);
        }
        self.claimed.set(sequence);
        Ok(())
    }

    fn force_publish(&self, sequence: i64) -> Result<()> {
        self.claimed.set(sequence);
        self.cursor.set(sequence);
        Ok(())
    }
}

/// Multi-producer claim strategy: an atomic counter hands out disjoint
/// ranges via `fetch_add`, and an [`AvailabilityBuffer`] records publication
/// independent of claim order.
pub struct MultiProducerClaim {
    claimed: Sequence,
    cached_gating_min: AtomicI64,
    availability: AvailabilityBuffer,
    cursor: Arc<Sequence>,
}

impl MultiProducerClaim {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            claimed: Sequence::new(),
            cached_gating_min: AtomicI64::new(crate::sequence::INITIAL_VALUE),
            availability: AvailabilityBuffer::new(capacity),
            cursor: Arc::new(Sequence::new()),
        }
    }

    /// Advances the published cursor up to the highest sequence that is
    /// contiguously available starting just past its current position.
    /// Unlike the claim counter (which jumps ahead the instant a range is
    /// handed out), the cursor only ever reflects what has actually been
    /// published, per spec.md Section 3's cursor definition.
    fn advance_cursor(&self) {
        loop {
            let current = self.cursor.get();
            let claimed_high = self.claimed.get();
            if current >= claimed_high {
                return;
            }
            let new_high = self.availability.get_available(current + 1, claimed_high);
            if new_high <= current {
                return;
            }
            if self.cursor.compare_and_set(current, new_high) {
                debug_assert_monotonic!("cursor", current, new_high);
                debug_assert_cursor_not_past_claim!(new_high, claimed_high);
                return;
            }
            // another producer advanced the cursor concurrently; recheck.
        }
    }
}

impl ClaimStrategy for MultiProducerClaim {
    fn next_n(
        &self,
        n: i64,
        capacity: i64,
        gating: &GatingSequences,
        policy: EmptyGatingPolicy,
        alert: &AlertFlag,
        metrics: Option<&Metrics>,
    ) -> Result<i64> {
        if n > capacity {
            return Err(RingexError::illegal_argument(format!(
                "batch size {n} exceeds ring capacity {capacity}"
            )));
        }
        gating.mark_claiming_started();
        let next = self.claimed.add_and_get(n);
        let wrap_point = next - capacity;

        if wrap_point > self.cached_gating_min.load(Ordering::Relaxed) {
            let mut backoff = Backoff::new();
            loop {
                let gating_min = gating.min(policy)?;
                if wrap_point <= gating_min {
                    self.cached_gating_min.store(gating_min, Ordering::Relaxed);
                    break;
                }
                alert.check()?;
                if let Some(metrics) = metrics {
                    metrics.record_claim_retry();
                }
                backoff.snooze();
            }
        }
        Ok(next)
    }

    fn try_next_n(
        &self,
        n: i64,
        capacity: i64,
        gating: &GatingSequences,
        policy: EmptyGatingPolicy,
    ) -> Result<i64> {
        if n > capacity {
            return Err(RingexError::illegal_argument(format!(
                "batch size {n} exceeds ring capacity {capacity}"
            )));
        }
        gating.mark_claiming_started();
        loop {
            let current = self.claimed.get();
            let next = current + n;
            let wrap_point = next - capacity;
            let gating_min = gating.min(policy)?;
            if wrap_point > gating_min {
                return Err(RingexError::InsufficientCapacity);
            }
            if self.claimed.compare_and_set(current, next) {
                return Ok(next);
            }
            // another producer won the race; retry against the new counter value.
        }
    }

    fn current(&self) -> i64 {
        self.claimed.get()
    }

    fn publish(&self, sequence: i64) {
        debug_assert_claimed_before_publish!(sequence, self.claimed.get());
        self.availability.set(sequence);
        self.advance_cursor();
    }

    fn publish_range(&self, low: i64, high: i64) {
        debug_assert_claimed_before_publish!(high, self.claimed.get());
        self.availability.set_range(low, high);
        self.advance_cursor();
    }

    fn highest_published(&self, low: i64, high: i64) -> i64 {
        self.availability.get_available(low, high)
    }

    fn cursor(&self) -> i64 {
        self.cursor.get()
    }

    fn cursor_handle(&self) -> Arc<Sequence> {
        self.cursor.clone()
    }

    fn claim(
        &self,
        _sequence: i64,
        _capacity: i64,
        _gating: &GatingSequences,
        _policy: EmptyGatingPolicy,
    ) -> Result<()> {
        Err(RingexError::illegal_state(
            "claim(sequence) is a single-producer-only operation",
        ))
    }

    fn force_publish(&self, _sequence: i64) -> Result<()> {
        Err(RingexError::illegal_state(
            "force_publish is a single-producer-only operation",
        ))
    }
}
