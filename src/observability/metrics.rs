//! Simulation metrics.
//!
//! # Metrics
//! - `balancer_sim_requests_total` (counter): finished requests by group, outcome
//! - `balancer_sim_response_wait` (histogram): response wait per group
//! - `balancer_sim_health_checks_total` (counter): health checks sent per group
//! - `balancer_sim_instance_replacements_total` (counter): replacements per group
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; a no-op unless a recorder is installed
//! - Values are in simulated seconds, not wall-clock time

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub fn record_request(group: &str, outcome: &'static str) {
    counter!("balancer_sim_requests_total", "group" => group.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_response_wait(group: &str, wait: f64) {
    histogram!("balancer_sim_response_wait", "group" => group.to_string()).record(wait);
}

pub fn record_health_check(group: &str) {
    counter!("balancer_sim_health_checks_total", "group" => group.to_string()).increment(1);
}

pub fn record_replacement(group: &str) {
    counter!("balancer_sim_instance_replacements_total", "group" => group.to_string()).increment(1);
}
