use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters optionally maintained by a [`crate::sequencer::Sequencer`].
///
/// Disabled by default (see [`crate::config::RingConfig::with_metrics`])
/// since every increment is an extra atomic op on the publish hot path;
/// enabling it trades a little throughput for observability into batching
/// behavior and contention.
#[derive(Debug, Default)]
pub struct Metrics {
    events_published: AtomicU64,
    batches_published: AtomicU64,
    claim_retries: AtomicU64,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_publish(&self, batch_len: u64) {
        self.events_published.fetch_add(batch_len, Ordering::Relaxed);
        self.batches_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_claim_retry(&self) {
        self.claim_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// A point-in-time, internally consistent-enough snapshot of the
    /// counters (each field is read independently, so under concurrent
    /// updates the fields may not correspond to exactly the same instant).
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_published: self.events_published.load(Ordering::Relaxed),
            batches_published: self.batches_published.load(Ordering::Relaxed),
            claim_retries: self.claim_retries.load(Ordering::Relaxed),
        }
    }
}

/// An immutable copy of [`Metrics`]' counters at the moment of
/// [`Metrics::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub events_published: u64,
    pub batches_published: u64,
    pub claim_retries: u64,
}

impl MetricsSnapshot {
    /// Average batch size observed, or 0.0 if nothing has been published.
    #[must_use]
    pub fn mean_batch_size(&self) -> f64 {
        if self.batches_published == 0 {
            0.0
        } else {
            self.events_published as f64 / self.batches_published as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let metrics = Metrics::new();
        let snap = metrics.snapshot();
        assert_eq!(snap.events_published, 0);
        assert_eq!(snap.batches_published, 0);
        assert_eq!(snap.mean_batch_size(), 0.0);
    }

    #[test]
    fn records_publish_and_batch_counts() {
        let metrics = Metrics::new();
        metrics.record_publish(1);
        metrics.record_publish(4);
        let snap = metrics.snapshot();
        assert_eq!(snap.events_published, 5);
        assert_eq!(snap.batches_published, 2);
        assert_eq!(snap.mean_batch_size(), 2.5);
    }

    #[test]
    fn records_claim_retries() {
        let metrics = Metrics::new();
        metrics.record_claim_retry();
        metrics.record_claim_retry();
        assert_eq!(metrics.snapshot().claim_retries, 2);
    }
}
