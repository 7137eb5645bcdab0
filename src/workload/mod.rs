//! Synthetic traffic generation.
//!
//! Draws arrival times from the configured distribution and pairs each one
//! with a random endpoint of a random group. Everything comes from one
//! seeded `StdRng`, so a scenario always produces the same traffic.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::schema::{DistributionError, GroupConfig, WorkloadConfig};
use crate::http::{Method, Request};
use crate::sim::Sampler;

/// Endpoints reachable under one group prefix.
#[derive(Debug, Clone)]
struct Target {
    prefix: String,
    routes: Vec<(String, Method)>,
}

/// Seeded generator of `(request, arrival)` pairs.
pub struct WorkloadGenerator {
    requests: usize,
    users: usize,
    sticky: bool,
    horizon: f64,
    unknown_path_ratio: f64,
    arrival: Box<dyn Sampler>,
    targets: Vec<Target>,
    rng: StdRng,
}

impl WorkloadGenerator {
    pub fn new(config: &WorkloadConfig, groups: &[GroupConfig], seed: u64) -> Result<Self, DistributionError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let arrival = config.arrival.sampler(rng.gen())?;
        let targets = groups
            .iter()
            .map(|group| Target {
                prefix: group.path_prefix.clone(),
                routes: group
                    .handlers
                    .iter()
                    .map(|handler| (handler.path.clone(), handler.method))
                    .collect(),
            })
            .collect();

        Ok(Self {
            requests: config.requests,
            users: config.users.max(1),
            sticky: config.sticky,
            horizon: config.horizon,
            unknown_path_ratio: if config.unknown_path_ratio.is_nan() {
                0.0
            } else {
                config.unknown_path_ratio.clamp(0.0, 1.0)
            },
            arrival,
            targets,
            rng,
        })
    }

    /// Generate the workload, sorted by arrival time.
    ///
    /// Arrivals outside `[0, horizon]` are dropped, so the result may hold
    /// fewer than the configured number of requests.
    pub fn generate(&mut self) -> Vec<(Request, f64)> {
        if self.targets.is_empty() {
            return Vec::new();
        }

        let mut arrivals: Vec<f64> = (0..self.requests)
            .map(|_| self.arrival.sample())
            .filter(|time| (0.0..=self.horizon).contains(time))
            .collect();
        arrivals.sort_by(f64::total_cmp);

        let dropped = self.requests - arrivals.len();
        if dropped > 0 {
            debug!(dropped, horizon = self.horizon, "Arrivals outside horizon discarded");
        }

        arrivals
            .into_iter()
            .map(|time| (self.next_request(), time))
            .collect()
    }

    fn next_request(&mut self) -> Request {
        let index = self.rng.gen_range(0..self.targets.len());
        let target = &self.targets[index];

        let route = if self.rng.gen_bool(self.unknown_path_ratio) {
            None
        } else {
            target.routes.choose(&mut self.rng)
        };
        let mut request = match route {
            Some((path, method)) => Request::new(path.clone(), *method),
            None => Request::new(format!("{}unknown", target.prefix), Method::Get),
        };

        let user = format!("user-{}", self.rng.gen_range(0..self.users));
        request = if self.sticky {
            request.sticky(user)
        } else {
            request.with_session(user)
        };
        request
    }
}

impl std::fmt::Debug for WorkloadGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkloadGenerator")
            .field("requests", &self.requests)
            .field("users", &self.users)
            .field("sticky", &self.sticky)
            .field("horizon", &self.horizon)
            .field("targets", &self.targets)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DistributionConfig, ScenarioConfig};

    fn generate(config: &ScenarioConfig, seed: u64) -> Vec<(Request, f64)> {
        WorkloadGenerator::new(&config.workload, &config.groups, seed)
            .unwrap()
            .generate()
    }

    #[test]
    fn test_sorted_and_within_horizon() {
        let mut config = ScenarioConfig::default();
        config.workload.requests = 2_000;
        config.workload.horizon = 43_200.0;

        let workload = generate(&config, 1);
        assert!(!workload.is_empty());
        assert!(workload.len() < 2_000);
        assert!(workload.windows(2).all(|w| w[0].1 <= w[1].1));
        assert!(workload.iter().all(|(_, t)| (0.0..=43_200.0).contains(t)));
    }

    #[test]
    fn test_reproducible_for_seed() {
        let config = ScenarioConfig::default();
        assert_eq!(generate(&config, 9), generate(&config, 9));
    }

    #[test]
    fn test_requests_target_configured_groups() {
        let mut config = ScenarioConfig::default();
        config.workload.requests = 500;
        config.workload.sticky = true;
        config.workload.users = 3;

        for (request, _) in generate(&config, 3) {
            assert!(request.path().starts_with("v1/") || request.path().starts_with("v2/"));
            assert!(request.is_sticky());
            assert!(["user-0", "user-1", "user-2"].contains(&request.session_key()));
        }
    }

    #[test]
    fn test_unknown_paths_only() {
        let mut config = ScenarioConfig::default();
        config.workload.requests = 50;
        config.workload.unknown_path_ratio = 1.0;
        config.workload.arrival = DistributionConfig::Uniform { low: 0.0, high: 100.0 };

        let workload = generate(&config, 5);
        assert_eq!(workload.len(), 50);
        assert!(workload.iter().all(|(r, _)| r.path().ends_with("unknown")));
    }

    #[test]
    fn test_no_groups_no_traffic() {
        let config = ScenarioConfig {
            groups: Vec::new(),
            ..ScenarioConfig::default()
        };
        assert!(generate(&config, 1).is_empty());
    }
}
