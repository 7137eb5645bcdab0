//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, slots > 0)
//! - Detect duplicate handlers and duplicate group names
//! - Check every distribution can actually be built
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ScenarioConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use crate::config::schema::{DistributionConfig, ScenarioConfig};
use crate::http::Method;

/// A single semantic problem in a scenario.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("no target groups configured")]
    NoGroups,

    #[error("duplicate group name `{0}`")]
    DuplicateGroupName(String),

    #[error("group `{group}`: duplicate handler {method} {path}")]
    DuplicateHandler {
        group: String,
        path: String,
        method: Method,
    },

    #[error("{context}: {field} must be positive, got {value}")]
    NonPositive {
        context: String,
        field: &'static str,
        value: f64,
    },

    #[error("{context}: {reason}")]
    Distribution { context: String, reason: String },
}

/// Check a scenario, collecting every problem found.
pub fn validate_config(config: &ScenarioConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.groups.is_empty() {
        errors.push(ValidationError::NoGroups);
    }

    check_positive(&mut errors, "workload", "requests", config.workload.requests as f64);
    check_positive(&mut errors, "workload", "users", config.workload.users as f64);
    check_positive(&mut errors, "workload", "horizon", config.workload.horizon);
    check_distribution(&mut errors, "workload arrival", &config.workload.arrival);

    let mut names = HashSet::new();
    for group in &config.groups {
        if !names.insert(group.name.as_str()) {
            errors.push(ValidationError::DuplicateGroupName(group.name.clone()));
        }

        let context = format!("group `{}`", group.name);
        check_positive(&mut errors, &context, "slots", group.slots as f64);
        check_positive(&mut errors, &context, "timeout", group.timeout);
        check_positive(&mut errors, &context, "health_check_interval", group.health_check_interval);
        check_distribution(&mut errors, &format!("{context} break_time"), &group.break_time);
        check_distribution(&mut errors, &format!("{context} init_time"), &group.init_time);

        let mut endpoints = HashSet::new();
        for handler in &group.handlers {
            if !endpoints.insert((handler.path.as_str(), handler.method)) {
                errors.push(ValidationError::DuplicateHandler {
                    group: group.name.clone(),
                    path: handler.path.clone(),
                    method: handler.method,
                });
            }
            check_distribution(
                &mut errors,
                &format!("{context} handler {} {}", handler.method, handler.path),
                &handler.service_time,
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, context: &str, field: &'static str, value: f64) {
    if !(value > 0.0) {
        errors.push(ValidationError::NonPositive {
            context: context.to_string(),
            field,
            value,
        });
    }
}

fn check_distribution(errors: &mut Vec<ValidationError>, context: &str, distribution: &DistributionConfig) {
    if let Err(e) = distribution.sampler(0) {
        errors.push(ValidationError::Distribution {
            context: context.to_string(),
            reason: e.to_string(),
        });
    }
}
