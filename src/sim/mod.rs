//! Discrete-event simulation primitives.
//!
//! # Data Flow
//! ```text
//! Engine handler
//!     → events.rs (schedule at simulated time, tie-break jitter)
//!     → pop earliest event
//!     → Engine handler ...
//!
//! Engine needs a duration (service, crash, init):
//!     → sampler.rs (opaque "sample a duration")
//! ```
//!
//! # Design Decisions
//! - Time is a plain `f64` of simulated seconds; nothing reads a wall clock
//! - Equal timestamps are separated by jitter, payloads are never compared
//! - Samplers are boxed trait objects so callers can plug in any source

pub mod events;
pub mod sampler;

pub use events::{EventQueue, ScheduledEvent, TIE_BREAK_JITTER};
pub use sampler::{Constant, DistributionSampler, Sampler, Sequence};
