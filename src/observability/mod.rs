//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine, router, CLI produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr log output
//!     → Prometheus text rendered at the end of a CLI run
//! ```

pub mod logging;
pub mod metrics;
