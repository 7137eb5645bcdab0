//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Simulated time advances
//!     → Watermark hands out due checkpoints
//!     → Engine schedules one check per slot per checkpoint
//!
//! State machine (state.rs):
//!     Healthy → Broken → (replaced) Initializing → Healthy
//! ```
//!
//! # Design Decisions
//! - Failure is detected only through health-check timeouts
//! - Health state is per-instance; slots outlive instances

pub mod active;
pub mod state;

pub use active::HealthCheckSchedule;
pub use state::InstanceState;
