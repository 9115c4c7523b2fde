use crate::error::{RingexError, Result};

/// Selects which [`crate::claim::ClaimStrategy`] a [`crate::sequencer::Sequencer`]
/// uses to hand out sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerKind {
    /// Exactly one producer thread claims sequences. Claim path is a plain
    /// (non-atomic) counter increment.
    Single,
    /// Multiple producer threads may claim sequences concurrently. Claim
    /// path uses an atomic fetch-add and the sequencer serializes publish
    /// via an availability bitmap.
    Multi,
}

/// Selects which [`crate::wait::WaitStrategy`] a [`crate::barrier::SequenceBarrier`]
/// uses while waiting for the cursor to advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStrategyKind {
    /// Mutex + condvar. Lowest CPU usage, highest latency.
    Blocking,
    /// Tight spin loop. Lowest latency, burns a full core.
    BusySpin,
    /// Spin, then `thread::yield_now()`.
    Yielding,
    /// Spin, then `thread::park_timeout` with doubling backoff.
    Sleeping,
}

/// Resolves the open question in spec.md Section 9: does an empty gating set
/// mean "no consumers yet, so unbounded overwrite is fine" (the permissive
/// behavior some upstream tests relied on) or "misconfiguration, reject it"?
///
/// There is no way to infer the right answer from usage alone, so it is a
/// config knob rather than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyGatingPolicy {
    /// An empty gating set means producers never block (ring behaves as
    /// unbounded). Matches the permissive intermediate-revision behavior.
    Unbounded,
    /// Constructing a [`crate::sequencer::Sequencer`] with no gating
    /// sequences wired in is treated as a misconfiguration and returns
    /// [`RingexError::IllegalState`] on the first claim.
    Reject,
}

/// Construction parameters for a ring/sequencer pair.
///
/// Mirrors the shape of a Disruptor `RingBuffer` builder: a capacity
/// (rounded to the next power of two), a producer kind, a wait strategy, and
/// a couple of ambient knobs (metrics, empty-gating policy) that don't
/// change the coordination protocol but do change observable behavior at
/// the edges.
#[derive(Debug, Clone, Copy)]
pub struct RingConfig {
    capacity: usize,
    producer_kind: ProducerKind,
    wait_strategy: WaitStrategyKind,
    enable_metrics: bool,
    empty_gating_policy: EmptyGatingPolicy,
}

/// Upper bound on ring capacity (2^30 slots), per spec.md Section 4.2.
pub const MAX_CAPACITY: usize = 1 << 30;

impl RingConfig {
    /// Creates a config for a ring of at least `requested_capacity` slots.
    ///
    /// `requested_capacity` is rounded up to the next power of two. Returns
    /// [`RingexError::IllegalArgument`] if `requested_capacity` is zero or
    /// the rounded capacity would exceed [`MAX_CAPACITY`].
    pub fn new(requested_capacity: usize) -> Result<Self> {
        if requested_capacity == 0 {
            return Err(RingexError::illegal_argument(
                "capacity must be positive",
            ));
        }
        let capacity = requested_capacity.next_power_of_two();
        if capacity > MAX_CAPACITY {
            return Err(RingexError::illegal_argument(format!(
                "capacity {capacity} exceeds maximum of {MAX_CAPACITY}"
            )));
        }
        Ok(Self {
            capacity,
            producer_kind: ProducerKind::Single,
            wait_strategy: WaitStrategyKind::Blocking,
            enable_metrics: false,
            empty_gating_policy: EmptyGatingPolicy::Reject,
        })
    }

    /// Selects the claim strategy. Defaults to [`ProducerKind::Single`].
    #[must_use]
    pub fn with_producer_kind(mut self, kind: ProducerKind) -> Self {
        self.producer_kind = kind;
        self
    }

    /// Selects the wait strategy. Defaults to [`WaitStrategyKind::Blocking`].
    #[must_use]
    pub fn with_wait_strategy(mut self, kind: WaitStrategyKind) -> Self {
        self.wait_strategy = kind;
        self
    }

    /// Enables or disables the [`crate::metrics::Metrics`] counters.
    /// Defaults to disabled (zero-cost).
    #[must_use]
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Selects the empty-gating-set policy. Defaults to
    /// [`EmptyGatingPolicy::Reject`].
    #[must_use]
    pub fn with_empty_gating_policy(mut self, policy: EmptyGatingPolicy) -> Self {
        self.empty_gating_policy = policy;
        self
    }

    /// Ring capacity (already rounded to a power of two).
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index mask (`capacity - 1`) used to wrap a sequence into a slot index.
    #[inline]
    #[must_use]
    pub const fn mask(&self) -> usize {
        self.capacity - 1
    }

    #[inline]
    #[must_use]
    pub const fn producer_kind(&self) -> ProducerKind {
        self.producer_kind
    }

    #[inline]
    #[must_use]
    pub const fn wait_strategy_kind(&self) -> WaitStrategyKind {
        self.wait_strategy
    }

    #[inline]
    #[must_use]
    pub const fn metrics_enabled(&self) -> bool {
        self.enable_metrics
    }

    #[inline]
    #[must_use]
    pub const fn empty_gating_policy(&self) -> EmptyGatingPolicy {
        self.empty_gating_policy
    }
}

impl Default for RingConfig {
    /// 64K slots, single producer, blocking wait, metrics disabled.
    fn default() -> Self {
        Self::new(1 << 16).expect("default capacity is always valid")
    }
}
