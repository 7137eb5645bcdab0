//! Pluggable duration sampling.
//!
//! The engine only ever asks for "the next duration". Where that number comes
//! from is up to the caller: a fixed value, a closure, or a seeded
//! `rand_distr` distribution built from the scenario config.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Distribution;

/// Source of simulated durations.
pub trait Sampler: Send {
    /// Draw the next duration.
    fn sample(&mut self) -> f64;
}

impl<F> Sampler for F
where
    F: FnMut() -> f64 + Send,
{
    fn sample(&mut self) -> f64 {
        self()
    }
}

/// Always returns the same duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl Sampler for Constant {
    fn sample(&mut self) -> f64 {
        self.0
    }
}

/// A `rand_distr` distribution paired with its own seeded RNG.
#[derive(Debug)]
pub struct DistributionSampler<D> {
    distribution: D,
    rng: StdRng,
}

impl<D> DistributionSampler<D>
where
    D: Distribution<f64> + Send,
{
    pub fn new(distribution: D, seed: u64) -> Self {
        Self {
            distribution,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<D> Sampler for DistributionSampler<D>
where
    D: Distribution<f64> + Send,
{
    fn sample(&mut self) -> f64 {
        self.distribution.sample(&mut self.rng)
    }
}

/// Replays a fixed sequence, then repeats the last value.
///
/// Handy for scripting crash and init times in scenarios.
#[derive(Debug, Clone)]
pub struct Sequence {
    values: Vec<f64>,
    next: usize,
}

impl Sequence {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }
}

impl Sampler for Sequence {
    fn sample(&mut self) -> f64 {
        let value = self
            .values
            .get(self.next)
            .or_else(|| self.values.last())
            .copied()
            .unwrap_or(0.0);
        self.next += 1;
        value
    }
}
