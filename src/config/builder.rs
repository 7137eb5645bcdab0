//! Turning a validated scenario into a runnable router.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::loader::ConfigError;
use crate::config::schema::{GroupConfig, ScenarioConfig};
use crate::load_balancer::{TargetGroup, TargetGroupSettings};
use crate::routing::Router;

impl ScenarioConfig {
    /// Build every target group, in order, behind a router.
    ///
    /// Each sampler gets its own seed drawn from the scenario seed, so a
    /// scenario always replays identically.
    pub fn build_router(&self) -> Result<Router, ConfigError> {
        let mut seeds = StdRng::seed_from_u64(self.seed);
        let groups = self
            .groups
            .iter()
            .map(|group| group.build(&mut seeds))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Router::new(groups))
    }
}

impl GroupConfig {
    /// Build the target group, drawing sampler seeds from `seeds`.
    pub fn build(&self, seeds: &mut StdRng) -> Result<TargetGroup, ConfigError> {
        let mut settings = TargetGroupSettings::new(self.path_prefix.clone())
            .name(self.name.clone())
            .slots(self.slots)
            .timeout(self.timeout)
            .health_check(self.health_check_path.clone(), self.health_check_method, self.health_check_interval)
            .default_processing_time(self.default_processing_time)
            .sticky_binding(self.sticky_binding);
        settings.break_time = self.break_time.sampler(seeds.gen())?;
        settings.init_time = self.init_time.sampler(seeds.gen())?;

        for handler in &self.handlers {
            let mut sampler = handler.service_time.sampler(seeds.gen())?;
            settings = settings.handler(handler.path.clone(), handler.method, move || sampler.sample());
        }

        Ok(TargetGroup::new(settings)?)
    }
}
