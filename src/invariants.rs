//! Debug assertion macros for ring/sequencer invariants.
//!
//! These are only active in debug builds (`debug_assert!`), so there is zero
//! overhead in release builds. Mirrors the invariant-macro convention of the
//! original MPSC ring (`invariants.rs`), re-keyed to the invariants this
//! crate's single-ring claim/publish protocol actually has to uphold.

/// INV-SEQ-01: cursor never runs ahead of the claim cursor.
///
/// **Invariant**: `cursor <= claim_cursor`
macro_rules! debug_assert_cursor_not_past_claim {
    ($cursor:expr, $claim_cursor:expr) => {
        debug_assert!(
            $cursor <= $claim_cursor,
            "INV-SEQ-01 violated: cursor {} ahead of claim cursor {}",
            $cursor,
            $claim_cursor
        )
    };
}

/// INV-SEQ-02: a sequence counter only ever increases.
///
/// **Invariant**: `new >= old`
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "INV-SEQ-02 violated: {} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

/// INV-GATE-01: the gap between the claim cursor and the slowest gating
/// sequence never exceeds capacity (wrap safety).
///
/// **Invariant**: `claim_cursor - min(gating) <= capacity`
macro_rules! debug_assert_no_wrap {
    ($claim_cursor:expr, $gating_min:expr, $capacity:expr) => {
        debug_assert!(
            $claim_cursor - $gating_min <= $capacity as i64,
            "INV-GATE-01 violated: claim cursor {} outran gating minimum {} by more than capacity {}",
            $claim_cursor,
            $gating_min,
            $capacity
        )
    };
}

/// INV-PUB-01: a sequence cannot be published before it was claimed.
///
/// **Invariant**: `sequence <= claim_cursor` at the time of publish.
macro_rules! debug_assert_claimed_before_publish {
    ($sequence:expr, $claim_cursor:expr) => {
        debug_assert!(
            $sequence <= $claim_cursor,
            "INV-PUB-01 violated: publishing sequence {} that was never claimed (claim cursor {})",
            $sequence,
            $claim_cursor
        )
    };
}

/// INV-INIT-01: a consumer only reads slots inside its barrier's visible
/// range.
///
/// **Invariant**: `available_sequence(seq) ⟹ seq <= available`
macro_rules! debug_assert_within_available {
    ($sequence:expr, $available:expr) => {
        debug_assert!(
            $sequence <= $available,
            "INV-INIT-01 violated: reading sequence {} beyond available {}",
            $sequence,
            $available
        )
    };
}

pub(crate) use debug_assert_claimed_before_publish;
pub(crate) use debug_assert_cursor_not_past_claim;
pub(crate) use debug_assert_monotonic;
pub(crate) use debug_assert_no_wrap;
pub(crate) use debug_assert_within_available;
