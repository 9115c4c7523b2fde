//! A lock-free, bounded, pre-allocated single-ring event exchange.
//!
//! `ringex` is a small coordination core in the LMAX Disruptor family: one
//! shared ring of pre-allocated slots, a [`Sequencer`] that hands out and
//! publishes positions in that ring, and [`SequenceBarrier`]s consumers use
//! to wait for positions to become visible. Producers write in place via an
//! [`EventTranslator`] instead of passing items by value, so steady-state
//! operation does no allocation.
//!
//! ```
//! use std::sync::Arc;
//! use ringex::{Publisher, RingConfig, RingStorage, Sequence, Sequencer};
//!
//! let config = RingConfig::new(1024).unwrap();
//! let storage = Arc::new(RingStorage::new(config.capacity(), || 0u64));
//! let sequencer = Arc::new(Sequencer::new(&config));
//! let publisher = Publisher::new(storage, sequencer);
//!
//! let consumed = Arc::new(Sequence::new());
//! publisher
//!     .add_gating_sequences(vec![consumed.clone()])
//!     .unwrap();
//!
//! let published = publisher
//!     .publish_event(|_seq, slot: &mut u64| *slot = 42)
//!     .unwrap();
//!
//! let barrier = publisher.sequencer().new_barrier(vec![]);
//! let available = barrier.wait_for(published).unwrap();
//! let value = unsafe { publisher.get(available) };
//! assert_eq!(*value, 42);
//! consumed.set(available);
//! ```
//!
//! See the crate's `DESIGN.md` for how each module here is grounded, and
//! `tests/` for concurrency and property coverage beyond the unit tests
//! embedded in each module.

pub mod alert;
pub mod availability;
mod backoff;
pub mod barrier;
pub mod claim;
pub mod config;
pub mod error;
pub mod gating;
mod invariants;
pub mod metrics;
pub mod publisher;
pub mod ring;
pub mod sequence;
pub mod sequencer;
pub mod wait;

pub use alert::AlertFlag;
pub use barrier::SequenceBarrier;
pub use claim::{ClaimStrategy, MultiProducerClaim, SingleProducerClaim};
pub use config::{EmptyGatingPolicy, ProducerKind, RingConfig, WaitStrategyKind, MAX_CAPACITY};
pub use error::{RingexError, Result};
pub use gating::GatingSequences;
pub use metrics::{Metrics, MetricsSnapshot};
pub use publisher::{EventTranslator, Publisher};
pub use ring::RingStorage;
pub use sequence::{min_sequence, Sequence, INITIAL_VALUE};
pub use sequencer::Sequencer;
pub use wait::{BlockingWait, BusySpinWait, SleepingWait, WaitStrategy, YieldingWait};
