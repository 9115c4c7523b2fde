use crate::alert::AlertFlag;
use crate::backoff::Backoff;
use crate::error::Result;
use crate::sequence::Sequence;
use std::sync::{Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Strategy a [`crate::barrier::SequenceBarrier`] uses while waiting for the
/// cursor (and any upstream dependency sequences) to reach a requested
/// sequence.
///
/// Every implementation re-checks `alert` on each iteration so a waiting
/// consumer always wakes promptly on shutdown rather than only after its
/// next scheduled poll. `signal_all_when_blocking` tells a publisher whether
/// it needs to do anything beyond the release-store publish to wake waiters
/// — only [`BlockingWait`] does.
pub trait WaitStrategy: Send + Sync {
    /// Blocks until `cursor` (and all of `dependencies`) reach at least
    /// `sequence`, or `alert` fires. Returns the lowest available sequence
    /// observed, which may be higher than requested.
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependencies: &[&Sequence],
        alert: &AlertFlag,
    ) -> Result<i64>;

    /// Same as `wait_for` but gives up after `timeout`, returning
    /// `Err(RingexError::Timeout)`.
    fn wait_for_timeout(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependencies: &[&Sequence],
        alert: &AlertFlag,
        timeout: Duration,
    ) -> Result<i64>;

    /// Whether a publisher must call `signal` after publishing to wake
    /// threads parked in this strategy.
    fn signal_all_when_blocking(&self) -> bool;

    /// Wakes any thread parked in `wait_for`. A no-op for pure-spin
    /// strategies.
    fn signal(&self);
}

fn available_sequence(cursor: &Sequence, dependencies: &[&Sequence]) -> i64 {
    if dependencies.is_empty() {
        cursor.get()
    } else {
        crate::sequence::min_sequence(dependencies).min(cursor.get())
    }
}

/// Mutex + condvar. Parks the waiting thread entirely between wakeups, so it
/// burns no CPU, at the cost of OS scheduling latency on wakeup.
#[derive(Default)]
pub struct BlockingWait {
    gate: Mutex<()>,
    condvar: Condvar,
}

impl BlockingWait {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl WaitStrategy for BlockingWait {
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependencies: &[&Sequence],
        alert: &AlertFlag,
    ) -> Result<i64> {
        loop {
            alert.check()?;
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }
            let guard = self.gate.lock().unwrap();
            // re-check after acquiring the lock: the signal may have fired
            // between our last read and locking the gate.
            if available_sequence(cursor, dependencies) >= sequence || alert.is_alerted() {
                continue;
            }
            let _unused = self
                .condvar
                .wait_timeout(guard, Duration::from_millis(10))
                .unwrap();
        }
    }

    fn wait_for_timeout(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependencies: &[&Sequence],
        alert: &AlertFlag,
        timeout: Duration,
    ) -> Result<i64> {
        let deadline = Instant::now() + timeout;
        loop {
            alert.check()?;
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(crate::error::RingexError::Timeout);
            }
            let guard = self.gate.lock().unwrap();
            if available_sequence(cursor, dependencies) >= sequence || alert.is_alerted() {
                continue;
            }
            let _unused = self
                .condvar
                .wait_timeout(guard, (deadline - now).min(Duration::from_millis(10)))
                .unwrap();
        }
    }

    fn signal_all_when_blocking(&self) -> bool {
        true
    }

    fn signal(&self) {
        self.condvar.notify_all();
    }
}

/// Tight spin loop on `hint::spin_loop()`. Lowest latency, burns a full core.
#[derive(Default)]
pub struct BusySpinWait;

impl BusySpinWait {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WaitStrategy for BusySpinWait {
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependencies: &[&Sequence],
        alert: &AlertFlag,
    ) -> Result<i64> {
        loop {
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }
            alert.check()?;
            std::hint::spin_loop();
        }
    }

    fn wait_for_timeout(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependencies: &[&Sequence],
        alert: &AlertFlag,
        timeout: Duration,
    ) -> Result<i64> {
        let deadline = Instant::now() + timeout;
        loop {
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }
            alert.check()?;
            if Instant::now() >= deadline {
                return Err(crate::error::RingexError::Timeout);
            }
            std::hint::spin_loop();
        }
    }

    fn signal_all_when_blocking(&self) -> bool {
        false
    }

    fn signal(&self) {}
}

/// Spin, then `thread::yield_now()`. A middle ground between [`BusySpinWait`]
/// and [`SleepingWait`].
#[derive(Default)]
pub struct YieldingWait;

impl YieldingWait {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WaitStrategy for YieldingWait {
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependencies: &[&Sequence],
        alert: &AlertFlag,
    ) -> Result<i64> {
        let mut backoff = Backoff::new();
        loop {
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }
            alert.check()?;
            backoff.snooze();
        }
    }

    fn wait_for_timeout(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependencies: &[&Sequence],
        alert: &AlertFlag,
        timeout: Duration,
    ) -> Result<i64> {
        let deadline = Instant::now() + timeout;
        let mut backoff = Backoff::new();
        loop {
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }
            alert.check()?;
            if Instant::now() >= deadline {
                return Err(crate::error::RingexError::Timeout);
            }
            backoff.snooze();
        }
    }

    fn signal_all_when_blocking(&self) -> bool {
        false
    }

    fn signal(&self) {}
}

/// Spin, then escalate to `thread::park_timeout` with doubling backoff.
/// Trades a little latency for much lower CPU usage than [`YieldingWait`]
/// under sustained idle periods.
pub struct SleepingWait {
    max_park: Duration,
}

impl SleepingWait {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_park: Duration::from_micros(500),
        }
    }
}

impl Default for SleepingWait {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitStrategy for SleepingWait {
    fn wait_for(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependencies: &[&Sequence],
        alert: &AlertFlag,
    ) -> Result<i64> {
        let mut backoff = Backoff::new();
        let mut park = Duration::from_nanos(1);
        loop {
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }
            alert.check()?;
            if backoff.is_completed() {
                thread::park_timeout(park);
                park = (park * 2).min(self.max_park);
            } else {
                backoff.snooze();
            }
        }
    }

    fn wait_for_timeout(
        &self,
        sequence: i64,
        cursor: &Sequence,
        dependencies: &[&Sequence],
        alert: &AlertFlag,
        timeout: Duration,
    ) -> Result<i64> {
        let deadline = Instant::now() + timeout;
        let mut backoff = Backoff::new();
        let mut park = Duration::from_nanos(1);
        loop {
            let available = available_sequence(cursor, dependencies);
            if available >= sequence {
                return Ok(available);
            }
            alert.check()?;
            if Instant::now() >= deadline {
                return Err(crate::error::RingexError::Timeout);
            }
            if backoff.is_completed() {
                thread::park_timeout(park);
                park = (park * 2).min(self.max_park);
            } else {
                backoff.snooze();
            }
        }
    }

    fn signal_all_when_blocking(&self) -> bool {
        false
    }

    fn signal(&self) {}
}
