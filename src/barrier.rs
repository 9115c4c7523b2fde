use crate::alert::AlertFlag;
use crate::backoff::Backoff;
use crate::claim::ClaimStrategy;
use crate::error::Result;
use crate::invariants::debug_assert_within_available;
use crate::sequence::Sequence;
use crate::wait::WaitStrategy;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A consumer's view of how far it may read.
///
/// Wraps the producer's cursor plus zero or more upstream dependency
/// sequences (other consumers this one must read behind — the "dependency
/// barrier" of spec.md Section 4.3) and a [`WaitStrategy`] for idling until
/// more of the stream becomes visible.
///
/// `SequenceBarrier` itself holds no position; callers track their own read
/// cursor and call [`SequenceBarrier::wait_for`] with the sequence they next
/// want to read.
pub struct SequenceBarrier {
    cursor: Arc<Sequence>,
    dependencies: Vec<Arc<Sequence>>,
    wait_strategy: Arc<dyn WaitStrategy>,
    alert: Arc<AlertFlag>,
    claim: Arc<dyn ClaimStrategy>,
}

impl SequenceBarrier {
    pub(crate) fn new(
        cursor: Arc<Sequence>,
        dependencies: Vec<Arc<Sequence>>,
        wait_strategy: Arc<dyn WaitStrategy>,
        alert: Arc<AlertFlag>,
        claim: Arc<dyn ClaimStrategy>,
    ) -> Self {
        Self {
            cursor,
            dependencies,
            wait_strategy,
            alert,
            claim,
        }
    }

    /// Blocks until `sequence` is available (published by the producer and,
    /// if any dependencies are configured, processed by every upstream
    /// consumer). Returns the highest available sequence, which callers
    /// should drain up to rather than looping one sequence at a time.
    ///
    /// Returns `Err(RingexError::Alert)` if [`Self::alert`] is called while
    /// waiting.
    pub fn wait_for(&self, sequence: i64) -> Result<i64> {
        let deps: Vec<&Sequence> = self.dependencies.iter().map(Arc::as_ref).collect();
        let mut backoff = Backoff::new();
        loop {
            let available = self
                .wait_strategy
                .wait_for(sequence, &self.cursor, &deps, &self.alert)?;
            let published = self.claim.highest_published(sequence, available);
            if published >= sequence {
                debug_assert_within_available!(sequence, published);
                return Ok(published);
            }
            // The claim cursor (for a multi-producer sequencer) has reached
            // `sequence`, but a slower producer hasn't finished publishing
            // an earlier slot in the batch yet. Keep spinning rather than
            // returning a sub-`sequence` result the caller didn't ask for.
            self.alert.check()?;
            backoff.snooze();
        }
    }

    /// Same as [`Self::wait_for`] but gives up after `timeout`.
    pub fn wait_for_timeout(&self, sequence: i64, timeout: Duration) -> Result<i64> {
        let deps: Vec<&Sequence> = self.dependencies.iter().map(Arc::as_ref).collect();
        let deadline = Instant::now() + timeout;
        let mut backoff = Backoff::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let available = self.wait_strategy.wait_for_timeout(
                sequence,
                &self.cursor,
                &deps,
                &self.alert,
                remaining,
            )?;
            let published = self.claim.highest_published(sequence, available);
            if published >= sequence {
                debug_assert_within_available!(sequence, published);
                return Ok(published);
            }
            self.alert.check()?;
            if Instant::now() >= deadline {
                return Err(crate::error::RingexError::Timeout);
            }
            backoff.snooze();
        }
    }

    /// Signals every thread parked on this barrier to wake and re-check
    /// [`Self::is_alerted`].
    pub fn alert(&self) {
        self.alert.alert();
        self.wait_strategy.signal();
    }

    /// Clears a prior [`Self::alert`] call, returning the barrier to the
    /// running state.
    pub fn clear_alert(&self) {
        self.alert.clear();
    }

    #[must_use]
    pub fn is_alerted(&self) -> bool {
        self.alert.is_alerted()
    }

    /// The producer's current cursor position, ignoring dependencies.
    #[must_use]
    pub fn cursor(&self) -> i64 {
        self.cursor.get()
    }
}
