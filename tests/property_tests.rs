//! Property-based tests for the claim/publish/gating invariants documented
//! in `SPEC_FULL.md`'s concurrency model.
//!
//! Coverage:
//! - `Sequencer` (single- and multi-producer)
//! - `AvailabilityBuffer` out-of-order publish serialization
//! - `min_sequence` over arbitrary gating sets

use proptest::prelude::*;
use ringex::{availability::AvailabilityBuffer, min_sequence, RingConfig, Sequence, Sequencer};
use std::sync::Arc;

// =============================================================================
// INV-GATE-01: Wrap safety
// "claim_cursor - min(gating) <= capacity" must hold after every claim.
// =============================================================================

proptest! {
    /// Claiming never outruns the gating sequence by more than capacity,
    /// regardless of how far behind the single gating consumer is allowed
    /// to lag (simulated by advancing it after every few claims).
    #[test]
    fn prop_single_producer_never_outruns_gating(
        capacity_log2 in 2u32..8,
        claims in prop::collection::vec(1i64..4, 1..40),
        catchup_every in 1usize..5,
    ) {
        let capacity = 1i64 << capacity_log2;
        let config = RingConfig::new(capacity as usize).unwrap();
        let sequencer = Sequencer::new(&config);
        let consumed = Arc::new(Sequence::new());
        sequencer.add_gating_sequences(vec![consumed.clone()]).unwrap();

        for (i, n) in claims.iter().enumerate() {
            let n = (*n).min(capacity);
            let high = sequencer.try_next_n(n);
            if let Ok(high) = high {
                sequencer.publish_range(high - n + 1, high);
                prop_assert!(high - consumed.get() <= capacity,
                    "claim cursor {} outran gating {} by more than capacity {}",
                    high, consumed.get(), capacity);
            }
            if i % catchup_every == 0 {
                consumed.set(sequencer.cursor());
            }
        }
    }
}

// =============================================================================
// INV-SEQ-02: Monotonic progress
// "cursor_new >= cursor_old" after every publish.
// =============================================================================

proptest! {
    #[test]
    fn prop_cursor_is_monotonic(
        claims in prop::collection::vec(1i64..4, 1..60),
    ) {
        let config = RingConfig::new(128).unwrap();
        let sequencer = Sequencer::new(&config);
        sequencer.add_gating_sequences(vec![Arc::new(Sequence::new())]).unwrap();

        let mut last_cursor = ringex::INITIAL_VALUE;
        for n in claims {
            if let Ok(high) = sequencer.try_next_n(n) {
                sequencer.publish_range(high - n + 1, high);
                let cursor = sequencer.cursor();
                prop_assert!(cursor >= last_cursor,
                    "cursor decreased from {} to {}", last_cursor, cursor);
                last_cursor = cursor;
            }
        }
    }
}

// =============================================================================
// min_sequence over arbitrary sets
// =============================================================================

proptest! {
    #[test]
    fn prop_min_sequence_matches_iterator_min(values in prop::collection::vec(-1i64..10_000, 0..20)) {
        let sequences: Vec<Sequence> = values.iter().map(|&v| Sequence::with_value(v)).collect();
        let refs: Vec<&Sequence> = sequences.iter().collect();
        let expected = values.iter().min().copied().unwrap_or(i64::MAX);
        prop_assert_eq!(min_sequence(&refs), expected);
    }
}

// =============================================================================
// AvailabilityBuffer: highest contiguous published sequence never exceeds
// the true contiguous prefix, for arbitrary publish orders.
// =============================================================================

proptest! {
    #[test]
    fn prop_availability_buffer_reports_true_contiguous_prefix(
        capacity_log2 in 2u32..6,
        perm_seed in 0u64..10_000,
    ) {
        let capacity = 1usize << capacity_log2;
        let buf = AvailabilityBuffer::new(capacity);
        let mut order: Vec<i64> = (0..capacity as i64).collect();
        // deterministic pseudo-shuffle (no rand dependency, no Math.random in scope)
        let mut seed = perm_seed;
        for i in (1..order.len()).rev() {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            let j = (seed % (i as u64 + 1)) as usize;
            order.swap(i, j);
        }

        let mut published: Vec<bool> = vec![false; capacity];
        for &seq in &order {
            buf.set(seq);
            published[seq as usize] = true;

            let mut expected_high = -1i64;
            for (idx, &is_pub) in published.iter().enumerate() {
                if is_pub {
                    expected_high = idx as i64;
                } else {
                    break;
                }
            }
            prop_assert_eq!(buf.get_available(0, capacity as i64 - 1), expected_high);
        }
    }
}
