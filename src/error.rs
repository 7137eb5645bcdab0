//! Engine error types.

use crate::http::Method;

/// Errors raised while building or driving a simulation.
///
/// Everything a simulation *models* (crashes, timeouts, replacements) is an
/// event, not an error. These variants only cover misconfiguration and worker
/// failures.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("duplicate handler for {method} {path}: paths and methods must be a unique combination")]
    DuplicateHandler { path: String, method: Method },

    #[error("target group `{prefix}` needs at least one slot")]
    NoSlots { prefix: String },

    #[error("target group `{prefix}`: {field} must be positive, got {value}")]
    NonPositive {
        prefix: String,
        field: &'static str,
        value: f64,
    },

    #[error("simulation worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type SimResult<T> = Result<T, SimError>;
