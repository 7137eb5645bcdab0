//! Post-run summaries.
//!
//! [`SimulationReport`] condenses a finished router into the numbers worth
//! reading at a glance; [`SimulationSeries`] carries every raw time series
//! for plotting elsewhere. Both serialize to JSON.

use std::fmt;

use serde::Serialize;

use crate::load_balancer::{InstanceQueueHistory, Replacement, TargetGroup};
use crate::routing::Router;

/// Headline numbers of one target group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReport {
    pub name: String,
    pub path_prefix: String,
    pub slots: usize,
    pub requests: usize,
    pub timeouts: usize,
    pub success_rate: f64,
    pub mean_response_wait: f64,
    /// Deepest queue ever seen on each slot, across all its instances.
    pub max_queue_by_slot: Vec<i64>,
    pub replacements: usize,
    pub health_checks: usize,
}

/// Headline numbers of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub groups: Vec<GroupReport>,
    pub requests: usize,
    pub timeouts: usize,
    pub unrouted: usize,
    pub success_rate: f64,
    pub mean_response_wait: f64,
    /// Mean over every instance ever created of its deepest queue.
    pub mean_max_queue: f64,
}

impl SimulationReport {
    pub fn from_router(router: &Router) -> Self {
        let groups: Vec<GroupReport> = router.groups().map(GroupReport::from_group).collect();

        let requests = groups.iter().map(|g| g.requests).sum();
        let timeouts = groups.iter().map(|g| g.timeouts).sum();
        let waits: Vec<f64> = router
            .groups()
            .flat_map(|group| group.response_waits().into_iter().map(|(_, wait)| wait))
            .collect();
        let instance_maxima: Vec<f64> = router
            .groups()
            .flat_map(TargetGroup::instance_queue_depths)
            .map(|history| max_depth(&history.depths) as f64)
            .collect();

        Self {
            groups,
            requests,
            timeouts,
            unrouted: router.unrouted(),
            success_rate: success_rate(requests, timeouts),
            mean_response_wait: mean(&waits),
            mean_max_queue: mean(&instance_maxima),
        }
    }
}

impl GroupReport {
    fn from_group(group: &TargetGroup) -> Self {
        let requests = group.request_log().len();
        let timeouts = group.timeout_count();
        let waits: Vec<f64> = group.response_waits().into_iter().map(|(_, wait)| wait).collect();

        Self {
            name: group.name().to_string(),
            path_prefix: group.path_prefix().to_string(),
            slots: group.slot_count(),
            requests,
            timeouts,
            success_rate: success_rate(requests, timeouts),
            mean_response_wait: mean(&waits),
            max_queue_by_slot: group
                .queue_depths_by_slot()
                .iter()
                .map(|series| max_depth(series))
                .collect(),
            replacements: group.replacements().len(),
            health_checks: group.health_checks_sent(),
        }
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<10} {:<10} {:>6} {:>9} {:>9} {:>9} {:>10} {:>6}  max queue by slot",
            "group", "prefix", "slots", "requests", "timeouts", "success", "mean wait", "repl"
        )?;
        for g in &self.groups {
            writeln!(
                f,
                "{:<10} {:<10} {:>6} {:>9} {:>9} {:>8.2}% {:>10.2} {:>6}  {:?}",
                g.name,
                g.path_prefix,
                g.slots,
                g.requests,
                g.timeouts,
                g.success_rate * 100.0,
                g.mean_response_wait,
                g.replacements,
                g.max_queue_by_slot,
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "total: {} requests, {} timeouts, {} unrouted",
            self.requests, self.timeouts, self.unrouted
        )?;
        writeln!(f, "success rate:         {:.2}%", self.success_rate * 100.0)?;
        writeln!(f, "mean response wait:   {:.2}", self.mean_response_wait)?;
        write!(f, "mean max queue depth: {:.2}", self.mean_max_queue)
    }
}

/// Raw time series of one group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSeries {
    pub name: String,
    pub response_waits: Vec<(f64, f64)>,
    pub processing_times: Vec<(f64, f64)>,
    pub timeout_timeline: Vec<(f64, usize)>,
    pub queue_depths_by_slot: Vec<Vec<(f64, i64)>>,
    pub instance_queue_depths: Vec<InstanceQueueHistory>,
    pub replacements: Vec<Replacement>,
}

/// Raw time series of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSeries {
    pub groups: Vec<GroupSeries>,
    pub timeout_timeline: Vec<(f64, usize)>,
}

impl SimulationSeries {
    pub fn from_router(router: &Router) -> Self {
        Self {
            groups: router
                .groups()
                .map(|group| GroupSeries {
                    name: group.name().to_string(),
                    response_waits: group.response_waits(),
                    processing_times: group.processing_times(),
                    timeout_timeline: group.timeout_timeline(),
                    queue_depths_by_slot: group.queue_depths_by_slot(),
                    instance_queue_depths: group.instance_queue_depths(),
                    replacements: group.replacements().to_vec(),
                })
                .collect(),
            timeout_timeline: router.timeout_timeline(),
        }
    }
}

fn max_depth(series: &[(f64, i64)]) -> i64 {
    series.iter().map(|&(_, depth)| depth).max().unwrap_or(0)
}

fn success_rate(requests: usize, timeouts: usize) -> f64 {
    if requests == 0 {
        1.0
    } else {
        1.0 - timeouts as f64 / requests as f64
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
