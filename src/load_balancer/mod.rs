//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Router matched → target group identified
//!     → target_group.rs (event loop for the group)
//!     → round_robin.rs (pick a slot: skip initializing, honour sticky sessions)
//!     → instance.rs (queue the request on the slot's single server)
//!     → Outcome scheduled: completed or timed out
//! ```
//!
//! # Design Decisions
//! - Slots are stable indices; instances behind them are replaced over time
//! - Broken instances stay eligible until a health check notices them
//! - Each group owns all of its state and can be simulated on its own worker

pub mod instance;
pub mod round_robin;
pub mod target_group;

pub use instance::{Dispatch, Instance, InstanceId, QueueChange};
pub use round_robin::{RoundRobin, StickyBinding};
pub use target_group::{
    EventKind, InstanceQueueHistory, Replacement, RequestOutcome, RequestRecord, RunSummary, TargetGroup,
    TargetGroupSettings,
};
