use crate::error::{RingexError, Result};
use std::sync::atomic::{AtomicBool, Ordering};

/// The sole cooperative-cancellation primitive in the crate.
///
/// Shared by [`crate::barrier::SequenceBarrier`] (consumer side) and the
/// claim-path capacity spin in [`crate::claim`] (producer side), so a single
/// `alert()` call unblocks both a consumer stuck in `wait_for` and a
/// producer stuck spinning for capacity. Idempotent: `alert()`/`clear()` just
/// set/clear a flag, they don't queue or count.
///
/// Per the design note in spec.md Section 9, a tagged-variant error design
/// collapses the Java original's pre-allocated sentinel-alert-instance
/// trick to a plain unit error variant ([`RingexError::Alert`]); no sentinel
/// allocation is needed here.
#[derive(Debug, Default)]
pub struct AlertFlag {
    flag: AtomicBool,
}

impl AlertFlag {
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }

    /// Sets the alert flag. Idempotent.
    pub fn alert(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Clears the alert flag.
    pub fn clear(&self) {
        self.flag.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_alerted(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Returns `Err(RingexError::Alert)` if the flag is set, `Ok(())` otherwise.
    pub fn check(&self) -> Result<()> {
        if self.is_alerted() {
            Err(RingexError::Alert)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear() {
        let alert = AlertFlag::new();
        assert!(!alert.is_alerted());
        assert!(alert.check().is_ok());
    }

    #[test]
    fn alert_then_check_fails_then_clear_recovers() {
        let alert = AlertFlag::new();
        alert.alert();
        assert!(alert.is_alerted());
        assert!(matches!(alert.check(), Err(RingexError::Alert)));
        alert.clear();
        assert!(alert.check().is_ok());
    }

    #[test]
    fn alert_is_idempotent() {
        let alert = AlertFlag::new();
        alert.alert();
        alert.alert();
        assert!(alert.is_alerted());
    }
}
