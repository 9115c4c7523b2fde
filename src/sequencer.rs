use crate::alert::AlertFlag;
use crate::barrier::SequenceBarrier;
use crate::claim::{ClaimStrategy, MultiProducerClaim, SingleProducerClaim};
use crate::config::{ProducerKind, RingConfig, WaitStrategyKind};
use crate::error::Result;
use crate::gating::GatingSequences;
use crate::metrics::Metrics;
use crate::sequence::Sequence;
use crate::wait::{BlockingWait, BusySpinWait, SleepingWait, WaitStrategy, YieldingWait};
use std::sync::Arc;

/// Coordinates producers: claims sequences against configured gating
/// sequences, publishes them, and builds [`SequenceBarrier`]s for consumers.
///
/// This is the part of the ring that has state (a claim strategy and a set
/// of gating sequences); [`crate::ring::RingStorage`] is the passive slot
/// array a `Sequencer`'s claimed sequences index into. A
/// [`crate::publisher::Publisher`] wraps a `Sequencer` together with the
/// storage to give callers a single claim-write-publish entry point.
pub struct Sequencer {
    claim: Arc<dyn ClaimStrategy>,
    capacity: i64,
    gating: GatingSequences,
    policy: crate::config::EmptyGatingPolicy,
    wait_strategy: Arc<dyn WaitStrategy>,
    alert: Arc<AlertFlag>,
    metrics: Option<Metrics>,
}

fn build_wait_strategy(kind: WaitStrategyKind) -> Arc<dyn WaitStrategy> {
    match kind {
        WaitStrategyKind::Blocking => Arc::new(BlockingWait::new()),
        WaitStrategyKind::BusySpin => Arc::new(BusySpinWait::new()),
        WaitStrategyKind::Yielding => Arc::new(YieldingWait::new()),
        WaitStrategyKind::Sleeping => Arc::new(SleepingWait::new()),
    }
}

impl Sequencer {
    #[must_use]
    pub fn new(config: &RingConfig) -> Self {
        let claim: Arc<dyn ClaimStrategy> = match config.producer_kind() {
            ProducerKind::Single => Arc::new(SingleProducerClaim::new()),
            ProducerKind::Multi => Arc::new(MultiProducerClaim::new(config.capacity())),
        };
        Self {
            claim,
            capacity: config.capacity() as i64,
            gating: GatingSequences::new(),
            policy: config.empty_gating_policy(),
            wait_strategy: build_wait_strategy(config.wait_strategy_kind()),
            alert: Arc::new(AlertFlag::new()),
            metrics: config.metrics_enabled().then(Metrics::new),
        }
    }

    /// Wires in the consumer sequences producers must stay behind. May only
    /// be called once, before the first claim (see
    /// [`crate::gating::GatingSequences::set`]).
    pub fn add_gating_sequences(&self, sequences: Vec<Arc<Sequence>>) -> Result<()> {
        self.gating.set(sequences)
    }

    /// Claims the next sequence, blocking until there is room. Equivalent to
    /// `next_n(1)`.
    pub fn next(&self) -> Result<i64> {
        self.next_n(1)
    }

    /// Claims the next `n` sequences as a contiguous batch, blocking until
    /// there is room. Returns the highest sequence in the batch; the batch
    /// spans `returned - n + 1 ..= returned`.
    pub fn next_n(&self, n: i64) -> Result<i64> {
        self.claim.next_n(
            n,
            self.capacity,
            &self.gating,
            self.policy,
            &self.alert,
            self.metrics.as_ref(),
        )
    }

    /// Claims the next sequence without blocking.
    pub fn try_next(&self) -> Result<i64> {
        self.try_next_n(1)
    }

    /// Claims the next `n` sequences without blocking. Returns
    /// `Err(RingexError::InsufficientCapacity)` if there isn't room, with no
    /// side effects.
    pub fn try_next_n(&self, n: i64) -> Result<i64> {
        self.claim
            .try_next_n(n, self.capacity, &self.gating, self.policy)
    }

    /// Publishes a single previously claimed sequence, making it visible to
    /// consumers.
    pub fn publish(&self, sequence: i64) {
        self.claim.publish(sequence);
        if let Some(metrics) = &self.metrics {
            metrics.record_publish(1);
        }
        self.wait_strategy.signal();
    }

    /// Publishes a previously claimed batch `low..=high`.
    pub fn publish_range(&self, low: i64, high: i64) {
        self.claim.publish_range(low, high);
        if let Some(metrics) = &self.metrics {
            metrics.record_publish((high - low + 1) as u64);
        }
        self.wait_strategy.signal();
    }

    /// Single-producer "force" claim: asserts capacity against the gating
    /// sequences and sets the claim counter directly to `sequence`, without
    /// incrementing it through the normal `next`/`next_n` path. For
    /// resynchronizing a producer's counter against sequences assigned by
    /// something outside this sequencer. Returns `Err(RingexError::IllegalState)`
    /// if this sequencer was built with [`ProducerKind::Multi`].
    pub fn claim(&self, sequence: i64) -> Result<()> {
        self.claim
            .claim(sequence, self.capacity, &self.gating, self.policy)
    }

    /// Single-producer-only: sets both the claim counter and the cursor to
    /// `sequence`, bypassing the publish protocol entirely. Used to
    /// resynchronize after externally-sequenced replay. Returns
    /// `Err(RingexError::IllegalState)` if this sequencer was built with
    /// [`ProducerKind::Multi`].
    pub fn force_publish(&self, sequence: i64) -> Result<()> {
        self.claim.force_publish(sequence)
    }

    /// Highest sequence in `low..=high` visible to consumers right now. For
    /// a single producer this is always `high`; for multiple producers it
    /// may stall behind a slower producer's in-flight claim.
    #[must_use]
    pub fn highest_published(&self, low: i64, high: i64) -> i64 {
        self.claim.highest_published(low, high)
    }

    /// Builds a [`SequenceBarrier`] a consumer can `wait_for` against. The
    /// barrier tracks the producer cursor and must also wait behind
    /// `dependencies` (other consumers this one reads after), if any.
    #[must_use]
    pub fn new_barrier(&self, dependencies: Vec<Arc<Sequence>>) -> SequenceBarrier {
        SequenceBarrier::new(
            self.claim.cursor_handle(),
            dependencies,
            self.wait_strategy.clone(),
            self.alert.clone(),
            self.claim.clone(),
        )
    }

    /// The producer's current published cursor.
    #[must_use]
    pub fn cursor(&self) -> i64 {
        self.claim.cursor()
    }

    /// Ring capacity this sequencer was built for.
    #[must_use]
    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Signals alert (cooperative shutdown) to any thread blocked in a claim
    /// or in a barrier built from this sequencer.
    pub fn alert(&self) {
        self.alert.alert();
        self.wait_strategy.signal();
    }

    pub fn clear_alert(&self) {
        self.alert.clear();
    }

    #[must_use]
    pub fn is_alerted(&self) -> bool {
        self.alert.is_alerted()
    }

    /// `Some` if [`RingConfig::with_metrics`] was enabled.
    #[must_use]
    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmptyGatingPolicy;
    use crate::error::RingexError;

    #[test]
    fn single_producer_next_then_publish_advances_cursor() {
        let config = RingConfig::new(8).unwrap();
        let sequencer = Sequencer::new(&config);
        sequencer
            .add_gating_sequences(vec![Arc::new(Sequence::new())])
            .unwrap();

        let seq = sequencer.next().unwrap();
        assert_eq!(seq, 0);
        sequencer.publish(seq);
        assert_eq!(sequencer.cursor(), 0);
    }

    #[test]
    fn try_next_fails_without_gating_sequences_by_default() {
        let config = RingConfig::new(8).unwrap();
        let sequencer = Sequencer::new(&config);
        assert!(sequencer.try_next().is_err());
    }

    #[test]
    fn unbounded_policy_allows_claim_without_gating() {
        let config = RingConfig::new(8)
            .unwrap()
            .with_empty_gating_policy(EmptyGatingPolicy::Unbounded);
        let sequencer = Sequencer::new(&config);
        assert_eq!(sequencer.try_next().unwrap(), 0);
    }

    #[test]
    fn batch_claim_spans_requested_size() {
        let config = RingConfig::new(16).unwrap();
        let sequencer = Sequencer::new(&config);
        sequencer
            .add_gating_sequences(vec![Arc::new(Sequence::new())])
            .unwrap();
        let high = sequencer.try_next_n(4).unwrap();
        assert_eq!(high, 3);
        sequencer.publish_range(0, 3);
        assert_eq!(sequencer.cursor(), 3);
    }

    #[test]
    fn metrics_record_batches_when_enabled() {
        let config = RingConfig::new(8).unwrap().with_metrics(true);
        let sequencer = Sequencer::new(&config);
        sequencer
            .add_gating_sequences(vec![Arc::new(Sequence::new())])
            .unwrap();
        let high = sequencer.try_next_n(3).unwrap();
        sequencer.publish_range(0, high);
        let snap = sequencer.metrics().unwrap().snapshot();
        assert_eq!(snap.events_published, 3);
        assert_eq!(snap.batches_published, 1);
    }

    #[test]
    fn force_claim_sets_counter_without_publishing() {
        let config = RingConfig::new(8).unwrap();
        let sequencer = Sequencer::new(&config);
        sequencer
            .add_gating_sequences(vec![Arc::new(Sequence::new())])
            .unwrap();

        sequencer.claim(5).unwrap();
        sequencer.force_publish(5).unwrap();
        assert_eq!(sequencer.cursor(), 5);
    }

    #[test]
    fn force_path_rejected_for_multi_producer() {
        let config = RingConfig::new(8)
            .unwrap()
            .with_producer_kind(ProducerKind::Multi);
        let sequencer = Sequencer::new(&config);
        sequencer
            .add_gating_sequences(vec![Arc::new(Sequence::new())])
            .unwrap();

        assert!(sequencer.claim(5).is_err());
        assert!(sequencer.force_publish(5).is_err());
    }

    #[test]
    fn next_n_rejects_batch_larger_than_capacity() {
        let config = RingConfig::new(8).unwrap();
        let sequencer = Sequencer::new(&config);
        sequencer
            .add_gating_sequences(vec![Arc::new(Sequence::new())])
            .unwrap();
        assert!(matches!(
            sequencer.try_next_n(9),
            Err(RingexError::IllegalArgument { .. })
        ));
    }

    #[test]
    fn alert_causes_blocked_next_to_error() {
        let config = RingConfig::new(4).unwrap();
        let sequencer = Arc::new(Sequencer::new(&config));
        let gating = Arc::new(Sequence::new()); // parked at -1, never advances
        sequencer.add_gating_sequences(vec![gating]).unwrap();

        let s2 = sequencer.clone();
        let handle = std::thread::spawn(move || s2.next_n(5));

        std::thread::sleep(std::time::Duration::from_millis(20));
        sequencer.alert();
        assert!(handle.join().unwrap().is_err());
    }
}
