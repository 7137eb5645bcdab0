//! Periodic health-check scheduling.
//!
//! # Responsibilities
//! - Track the next checkpoint (a multiple of the interval) not yet scheduled
//! - Hand out every checkpoint up to a given time, exactly once
//!
//! # Design Decisions
//! - Checkpoints are produced lazily as simulated time advances
//! - The watermark only moves forward; nothing is recomputed from zero

/// Watermark over the periodic health-check checkpoints.
#[derive(Debug, Clone)]
pub struct HealthCheckSchedule {
    interval: f64,
    next_checkpoint: f64,
}

impl HealthCheckSchedule {
    /// Create a schedule whose first checkpoint is at `interval`.
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            next_checkpoint: interval,
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// The first checkpoint that has not been handed out yet.
    pub fn next_checkpoint(&self) -> f64 {
        self.next_checkpoint
    }

    /// Return all checkpoints `<= until` not returned before, advancing the
    /// watermark past them.
    pub fn advance_to(&mut self, until: f64) -> Vec<f64> {
        let mut due = Vec::new();
        while self.next_checkpoint <= until {
            due.push(self.next_checkpoint);
            self.next_checkpoint += self.interval;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoints_handed_out_once() {
        let mut schedule = HealthCheckSchedule::new(30.0);
        assert!(schedule.advance_to(10.0).is_empty());
        assert_eq!(schedule.advance_to(65.0), vec![30.0, 60.0]);
        assert!(schedule.advance_to(65.0).is_empty());
        assert!(schedule.advance_to(40.0).is_empty());
        assert_eq!(schedule.advance_to(90.0), vec![90.0]);
        assert_eq!(schedule.next_checkpoint(), 120.0);
    }
}
