use crate::config::EmptyGatingPolicy;
use crate::error::{RingexError, Result};
use crate::sequence::Sequence;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Holds the set of consumer sequences a [`crate::sequencer::Sequencer`] must
/// stay behind.
///
/// Per spec.md Section 4.4/Section 9, gating sequences are wired in exactly
/// once, before the first claim — the Disruptor world builds its consumer
/// graph up front and only then starts publishing. `GatingSequences` enforces
/// that with a [`OnceLock`]: `set` can only succeed once, and `mark_claiming_started`
/// latches out any later `set` call even if the slot was never filled.
#[derive(Debug, Default)]
pub struct GatingSequences {
    sequences: OnceLock<Vec<Arc<Sequence>>>,
    claiming_started: AtomicBool,
}

impl GatingSequences {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sequences: OnceLock::new(),
            claiming_started: AtomicBool::new(false),
        }
    }

    /// Wires in the gating set. May only be called once, and only before the
    /// first claim. A second call, or any call after claiming has started,
    /// returns [`RingexError::IllegalState`].
    pub fn set(&self, sequences: Vec<Arc<Sequence>>) -> Result<()> {
        if self.claiming_started.load(Ordering::Acquire) {
            return Err(RingexError::illegal_state(
                "gating sequences cannot be set after claiming has started",
            ));
        }
        self.sequences.set(sequences).map_err(|_| {
            RingexError::illegal_state("gating sequences can only be set once")
        })
    }

    /// Called by the claim strategy on the first claim; latches out any
    /// later `set` call.
    pub(crate) fn mark_claiming_started(&self) {
        self.claiming_started.store(true, Ordering::Release);
    }

    fn as_slice(&self) -> &[Arc<Sequence>] {
        self.sequences.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Minimum of the wired-in gating sequences, subject to `policy`.
    ///
    /// An empty set (no gating sequences configured) is either treated as
    /// unbounded (`i64::MAX`, [`EmptyGatingPolicy::Unbounded`]) or surfaced
    /// as a misconfiguration ([`EmptyGatingPolicy::Reject`]).
    pub(crate) fn min(&self, policy: EmptyGatingPolicy) -> Result<i64> {
        let refs: Vec<&Sequence> = self.as_slice().iter().map(Arc::as_ref).collect();
        if refs.is_empty() {
            return match policy {
                EmptyGatingPolicy::Unbounded => Ok(i64::MAX),
                EmptyGatingPolicy::Reject => Err(RingexError::illegal_state(
                    "no gating sequences configured",
                )),
            };
        }
        Ok(crate::sequence::min_sequence(&refs))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}
