//! Configuration schema definitions.
//!
//! This module defines the complete scenario structure for a simulation run.
//! All types derive Serde traits for deserialization from config files.

use rand_distr::{Exp, Gamma, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::http::Method;
use crate::load_balancer::StickyBinding;
use crate::sim::{Constant, DistributionSampler, Sampler};

/// Root configuration of a simulation scenario.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Seed for every random source in the run.
    pub seed: u64,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Synthetic traffic settings.
    pub workload: WorkloadConfig,

    /// Target groups, in routing priority order.
    pub groups: Vec<GroupConfig>,
}

impl Default for ScenarioConfig {
    /// The reference deployment: a six-instance `v1/` group and a
    /// two-instance `v2/` group behind one router.
    fn default() -> Self {
        Self {
            seed: 42,
            observability: ObservabilityConfig::default(),
            workload: WorkloadConfig::default(),
            groups: vec![
                GroupConfig {
                    name: "v1".to_string(),
                    path_prefix: "v1/".to_string(),
                    slots: 6,
                    health_check_path: "v1/users".to_string(),
                    break_time: DistributionConfig::Uniform { low: 0.0, high: 259_200.0 },
                    init_time: DistributionConfig::Normal { mean: 100.0, std_dev: 10.0 },
                    handlers: vec![
                        HandlerConfig::normal("v1/users", Method::Get, 3.0, 0.1),
                        HandlerConfig::normal("v1/users", Method::Post, 7.0, 0.2),
                        HandlerConfig::normal("v1/auth", Method::Post, 2.0, 0.05),
                        HandlerConfig::normal("v1/report", Method::Get, 20.0, 5.0),
                    ],
                    ..GroupConfig::default()
                },
                GroupConfig {
                    name: "v2".to_string(),
                    path_prefix: "v2/".to_string(),
                    slots: 2,
                    health_check_path: "v2/users".to_string(),
                    break_time: DistributionConfig::Uniform { low: 0.0, high: 129_600.0 },
                    init_time: DistributionConfig::Normal { mean: 120.0, std_dev: 10.0 },
                    handlers: vec![
                        HandlerConfig::normal("v2/users", Method::Get, 2.0, 0.1),
                        HandlerConfig::normal("v2/users", Method::Post, 5.0, 0.2),
                        HandlerConfig::normal("v2/auth", Method::Post, 3.0, 0.5),
                        HandlerConfig::normal("v2/report", Method::Get, 25.0, 5.0),
                    ],
                    ..GroupConfig::default()
                },
            ],
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Record metrics and print them in Prometheus format after the run.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
        }
    }
}

/// Synthetic workload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Number of arrival times drawn (before clipping to the horizon).
    pub requests: usize,

    /// Number of distinct session keys.
    pub users: usize,

    /// Whether generated requests use sticky sessions.
    pub sticky: bool,

    /// Arrivals outside `[0, horizon]` are discarded.
    pub horizon: f64,

    /// Distribution of arrival times.
    pub arrival: DistributionConfig,

    /// Share of requests sent to a path no handler serves.
    pub unknown_path_ratio: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            requests: 10_000,
            users: 100,
            sticky: false,
            horizon: 86_400.0,
            arrival: DistributionConfig::Normal {
                mean: 43_200.0,
                std_dev: 4_000.0,
            },
            unknown_path_ratio: 0.05,
        }
    }
}

/// One target group behind the router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Group identifier for logging/metrics.
    pub name: String,

    /// Path prefix routed to this group.
    pub path_prefix: String,

    /// Number of instance slots.
    pub slots: usize,

    /// Request timeout in simulated seconds.
    pub timeout: f64,

    /// Health check interval in simulated seconds.
    pub health_check_interval: f64,

    /// Path probed by health checks.
    pub health_check_path: String,

    /// Method used by health checks.
    pub health_check_method: Method,

    /// Service time for requests no handler matches.
    pub default_processing_time: f64,

    /// Whether binding a sticky session consumes a round-robin turn.
    pub sticky_binding: StickyBinding,

    /// Instance lifetime until crash.
    pub break_time: DistributionConfig,

    /// Boot time of replacement instances.
    pub init_time: DistributionConfig,

    /// Endpoints served by every instance of the group.
    pub handlers: Vec<HandlerConfig>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            path_prefix: String::new(),
            slots: 1,
            timeout: 120.0,
            health_check_interval: 121.0,
            health_check_path: String::new(),
            health_check_method: Method::Get,
            default_processing_time: 3.0,
            sticky_binding: StickyBinding::default(),
            break_time: DistributionConfig::Uniform { low: 0.0, high: 259_200.0 },
            init_time: DistributionConfig::Normal { mean: 100.0, std_dev: 10.0 },
            handlers: Vec::new(),
        }
    }
}

/// One (path, method) endpoint and its service time.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HandlerConfig {
    pub path: String,

    #[serde(default = "default_method")]
    pub method: Method,

    pub service_time: DistributionConfig,
}

impl HandlerConfig {
    fn normal(path: &str, method: Method, mean: f64, std_dev: f64) -> Self {
        Self {
            path: path.to_string(),
            method,
            service_time: DistributionConfig::Normal { mean, std_dev },
        }
    }
}

fn default_method() -> Method {
    Method::Get
}

/// Error building a sampler from its configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {kind} distribution: {reason}")]
pub struct DistributionError {
    pub kind: &'static str,
    pub reason: String,
}

/// A duration distribution, tagged by `kind` in config files.
///
/// ```toml
/// break_time = { kind = "uniform", low = 0.0, high = 259200.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionConfig {
    Constant { value: f64 },
    Normal { mean: f64, std_dev: f64 },
    Uniform { low: f64, high: f64 },
    Gamma { shape: f64, scale: f64 },
    Exponential { rate: f64 },
}

impl DistributionConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            DistributionConfig::Constant { .. } => "constant",
            DistributionConfig::Normal { .. } => "normal",
            DistributionConfig::Uniform { .. } => "uniform",
            DistributionConfig::Gamma { .. } => "gamma",
            DistributionConfig::Exponential { .. } => "exponential",
        }
    }

    /// Build a seeded sampler for this distribution.
    pub fn sampler(&self, seed: u64) -> Result<Box<dyn Sampler>, DistributionError> {
        let kind = self.kind();
        let invalid = |reason: String| DistributionError { kind, reason };

        let sampler: Box<dyn Sampler> = match *self {
            DistributionConfig::Constant { value } => {
                if !value.is_finite() {
                    return Err(invalid(format!("value must be finite, got {value}")));
                }
                Box::new(Constant(value))
            }
            DistributionConfig::Normal { mean, std_dev } => {
                let normal = Normal::new(mean, std_dev).map_err(|e| invalid(e.to_string()))?;
                Box::new(DistributionSampler::new(normal, seed))
            }
            DistributionConfig::Uniform { low, high } => {
                // rand's Uniform panics on an empty range.
                if !(low < high) || !low.is_finite() || !high.is_finite() {
                    return Err(invalid(format!("need finite low < high, got [{low}, {high})")));
                }
                Box::new(DistributionSampler::new(Uniform::new(low, high), seed))
            }
            DistributionConfig::Gamma { shape, scale } => {
                let gamma = Gamma::new(shape, scale).map_err(|e| invalid(e.to_string()))?;
                Box::new(DistributionSampler::new(gamma, seed))
            }
            DistributionConfig::Exponential { rate } => {
                let exp = Exp::new(rate).map_err(|e| invalid(e.to_string()))?;
                Box::new(DistributionSampler::new(exp, seed))
            }
        };
        Ok(sampler)
    }
}
