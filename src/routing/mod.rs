//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming (request, arrival time)
//!     → router.rs (route lookup)
//!     → matcher.rs (path prefix match)
//!     → Matched group's batch, or counted as unrouted
//!
//! After partitioning:
//!     → each target group runs its own batch
//!     → summaries aggregated once all groups finish
//! ```
//!
//! # Design Decisions
//! - Groups are fixed at construction
//! - Deterministic: same input always matches same group
//! - First match wins (configuration order)

pub mod matcher;
pub mod router;

pub use matcher::PathPrefixMatcher;
pub use router::Router;
