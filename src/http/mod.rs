//! Simulated HTTP traffic model.
//!
//! # Data Flow
//! ```text
//! Workload generator / caller
//!     → request.rs (immutable Request: path, method, session key, sticky flag)
//!     → [router picks target group by path prefix]
//!     → [target group picks a slot]
//!     → handler.rs (look up (path, method), sample a service time)
//! ```
//!
//! # Design Decisions
//! - Requests carry no body; only routing-relevant fields are modeled
//! - Handler tables are validated once, at construction
//! - Unknown endpoints are served with a fixed default processing time

pub mod handler;
pub mod request;

pub use handler::{HandlerSet, PathHandler};
pub use request::{Method, Request};
