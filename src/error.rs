use thiserror::Error;

/// Error surface for the ring/sequencer core.
///
/// `Alert` is a cooperative cancellation signal, not a failure: callers
/// convert it into a loop-exit and never log it as an error. `Timeout` and
/// `InsufficientCapacity` are expected outcomes of the non-blocking/timed
/// paths. `IllegalArgument`/`IllegalState` are programmer errors (bad
/// capacity, batch larger than capacity, mutating gating sequences after the
/// first claim) the library does not attempt to recover from.
#[derive(Debug, Clone, Error)]
pub enum RingexError {
    /// A [`crate::barrier::SequenceBarrier`] was alerted while a thread was
    /// waiting on it.
    #[error("barrier alerted")]
    Alert,

    /// A timed wait elapsed before the requested sequence became available.
    #[error("timed out waiting for sequence")]
    Timeout,

    /// A non-blocking claim (`try_next`/`try_publish_event`) could not find
    /// room against the gating sequences.
    #[error("insufficient capacity")]
    InsufficientCapacity,

    /// A constructor or setup call received an invalid argument.
    #[error("illegal argument: {message}")]
    IllegalArgument {
        /// Human-readable description of what was invalid.
        message: String,
    },

    /// An operation was attempted in a state that forbids it (e.g. gating
    /// sequences configured twice, or after the first claim).
    #[error("illegal state: {message}")]
    IllegalState {
        /// Human-readable description of the violated state requirement.
        message: String,
    },
}

impl RingexError {
    pub(crate) fn illegal_argument(message: impl Into<String>) -> Self {
        Self::IllegalArgument {
            message: message.into(),
        }
    }

    pub(crate) fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// True for the sole cooperative-cancellation variant.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::Alert)
    }
}

pub type Result<T> = std::result::Result<T, RingexError>;
