use crate::error::Result;
use crate::ring::RingStorage;
use crate::sequence::Sequence;
use crate::sequencer::Sequencer;
use std::sync::Arc;

/// Writes one claimed slot in place.
///
/// Mirrors the Disruptor `EventTranslator` pattern: instead of handing
/// callers a raw slot reference to mutate (which would let a claim/publish
/// pair be split across an `await` point or forgotten entirely), the
/// translator is invoked synchronously inside [`Publisher::publish_event`]
/// between claim and publish, so there is exactly one place a slot is ever
/// written.
pub trait EventTranslator<T> {
    /// Called with `sequence` (the claimed position) and a mutable
    /// reference to its slot. Must leave the slot in a state safe to read.
    fn translate_to(&mut self, sequence: i64, slot: &mut T);
}

impl<T, F: FnMut(i64, &mut T)> EventTranslator<T> for F {
    fn translate_to(&mut self, sequence: i64, slot: &mut T) {
        self(sequence, slot)
    }
}

/// The producer-facing façade over a [`Sequencer`] and its
/// [`RingStorage`]: claim, translate, publish, in one call.
pub struct Publisher<T> {
    storage: Arc<RingStorage<T>>,
    sequencer: Arc<Sequencer>,
}

impl<T> Publisher<T> {
    #[must_use]
    pub fn new(storage: Arc<RingStorage<T>>, sequencer: Arc<Sequencer>) -> Self {
        Self { storage, sequencer }
    }

    /// Claims one sequence (blocking until there's room), runs `translator`
    /// against its slot, and publishes it.
    pub fn publish_event(&self, mut translator: impl EventTranslator<T>) -> Result<i64> {
        let sequence = self.sequencer.next()?;
        // Safety: `sequence` was just claimed by this call and not yet
        // published, so no consumer can be reading it and no other producer
        // can be writing it (single-producer) or has been handed it
        // (multi-producer claims are disjoint ranges).
        let slot = unsafe { self.storage.get_mut(sequence) };
        translator.translate_to(sequence, slot);
        self.sequencer.publish(sequence);
        Ok(sequence)
    }

    /// Claims `n` sequences as one batch, running `translator` once per
    /// slot (called with each slot's own sequence), then publishes the
    /// whole batch as a unit.
    pub fn publish_events(&self, n: i64, mut translator: impl EventTranslator<T>) -> Result<i64> {
        debug_assert!(n > 0, "batch size must be positive");
        let high = self.sequencer.next_n(n)?;
        let low = high - n + 1;
        for sequence in low..=high {
            let slot = unsafe { self.storage.get_mut(sequence) };
            translator.translate_to(sequence, slot);
        }
        self.sequencer.publish_range(low, high);
        Ok(high)
    }

    /// Non-blocking variant of [`Self::publish_event`]: returns
    /// `Err(RingexError::InsufficientCapacity)` instead of blocking.
    pub fn try_publish_event(&self, mut translator: impl EventTranslator<T>) -> Result<i64> {
        let sequence = self.sequencer.try_next()?;
        let slot = unsafe { self.storage.get_mut(sequence) };
        translator.translate_to(sequence, slot);
        self.sequencer.publish(sequence);
        Ok(sequence)
    }

    /// Non-blocking variant of [`Self::publish_events`].
    pub fn try_publish_events(
        &self,
        n: i64,
        mut translator: impl EventTranslator<T>,
    ) -> Result<i64> {
        debug_assert!(n > 0, "batch size must be positive");
        let high = self.sequencer.try_next_n(n)?;
        let low = high - n + 1;
        for sequence in low..=high {
            let slot = unsafe { self.storage.get_mut(sequence) };
            translator.translate_to(sequence, slot);
        }
        self.sequencer.publish_range(low, high);
        Ok(high)
    }

    /// Reads a published slot. Callers must only call this with a sequence
    /// already observed available via a [`crate::barrier::SequenceBarrier`].
    ///
    /// # Safety
    ///
    /// `sequence` must have been returned by a barrier's `wait_for`/
    /// `wait_for_timeout` (or be `<=` such a value) on this same ring.
    #[must_use]
    pub unsafe fn get(&self, sequence: i64) -> &T {
        self.storage.get(sequence)
    }

    /// Registers `sequences` as the set of consumer positions producers must
    /// stay behind. See [`Sequencer::add_gating_sequences`].
    pub fn add_gating_sequences(&self, sequences: Vec<Arc<Sequence>>) -> Result<()> {
        self.sequencer.add_gating_sequences(sequences)
    }

    #[must_use]
    pub fn sequencer(&self) -> &Arc<Sequencer> {
        &self.sequencer
    }

    #[must_use]
    pub fn capacity(&self) -> i64 {
        self.sequencer.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RingConfig;

    fn make_publisher(capacity: usize) -> Publisher<u64> {
        let config = RingConfig::new(capacity).unwrap();
        let storage = Arc::new(RingStorage::new(config.capacity(), || 0u64));
        let sequencer = Arc::new(Sequencer::new(&config));
        let publisher = Publisher::new(storage, sequencer);
        publisher
            .add_gating_sequences(vec![Arc::new(Sequence::new())])
            .unwrap();
        publisher
    }

    #[test]
    fn publish_event_writes_and_publishes() {
        let publisher = make_publisher(8);
        let sequence = publisher
            .publish_event(|seq: i64, slot: &mut u64| *slot = seq as u64 * 10)
            .unwrap();
        assert_eq!(sequence, 0);
        unsafe {
            assert_eq!(*publisher.get(0), 0);
        }
    }

    #[test]
    fn publish_events_batch_writes_every_slot() {
        let publisher = make_publisher(8);
        let high = publisher
            .publish_events(4, |seq: i64, slot: &mut u64| *slot = seq as u64)
            .unwrap();
        assert_eq!(high, 3);
        unsafe {
            for i in 0..4 {
                assert_eq!(*publisher.get(i), i as u64);
            }
        }
    }

    #[test]
    fn try_publish_event_fails_when_full() {
        let publisher = make_publisher(2);
        publisher
            .publish_event(|_: i64, slot: &mut u64| *slot = 1)
            .unwrap();
        publisher
            .publish_event(|_: i64, slot: &mut u64| *slot = 2)
            .unwrap();
        // capacity 2, gating sequence never advances: no room left.
        assert!(publisher
            .try_publish_event(|_: i64, slot: &mut u64| *slot = 3)
            .is_err());
    }
}
