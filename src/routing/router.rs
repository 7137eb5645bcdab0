//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Hold the ordered list of target groups
//! - Look up the group for a request (first prefix match wins)
//! - Split a workload into per-group batches and run each group once
//!
//! # Design Decisions
//! - Groups never see each other's requests or events
//! - Explicit no-match: unrouted requests are counted, not defaulted
//! - Aggregation happens only after every group has finished

use tracing::{info, warn};

use crate::error::{SimError, SimResult};
use crate::http::Request;
use crate::load_balancer::target_group::cumulative_timeline;
use crate::load_balancer::{RunSummary, TargetGroup};
use crate::routing::matcher::PathPrefixMatcher;

#[derive(Debug)]
struct Route {
    matcher: PathPrefixMatcher,
    group: TargetGroup,
}

/// Top-level router fronting the target groups.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
    unrouted: usize,
}

impl Router {
    /// Create a router. Earlier groups take precedence.
    pub fn new(groups: Vec<TargetGroup>) -> Self {
        let routes = groups
            .into_iter()
            .map(|group| Route {
                matcher: PathPrefixMatcher::new(group.path_prefix()),
                group,
            })
            .collect();
        Self { routes, unrouted: 0 }
    }

    /// Index of the first group whose prefix matches `request`.
    pub fn route_request(&self, request: &Request) -> Option<usize> {
        self.routes.iter().position(|route| route.matcher.matches(request))
    }

    /// Run the workload, one group after another.
    ///
    /// Returns one summary per group, in group order.
    pub fn run(&mut self, requests: impl IntoIterator<Item = (Request, f64)>) -> Vec<RunSummary> {
        let batches = self.partition(requests);
        let summaries: Vec<RunSummary> = self
            .routes
            .iter_mut()
            .zip(batches)
            .map(|(route, batch)| route.group.run(batch))
            .collect();
        self.log_summaries(&summaries);
        summaries
    }

    /// Run every group's batch on its own blocking worker and wait for all.
    pub async fn run_parallel(&mut self, requests: impl IntoIterator<Item = (Request, f64)>) -> SimResult<Vec<RunSummary>> {
        let batches = self.partition(requests);
        let routes = std::mem::take(&mut self.routes);

        let handles: Vec<_> = routes
            .into_iter()
            .zip(batches)
            .map(|(mut route, batch)| {
                tokio::task::spawn_blocking(move || {
                    let summary = route.group.run(batch);
                    (route, summary)
                })
            })
            .collect();

        let mut summaries = Vec::with_capacity(handles.len());
        let mut failure: Option<SimError> = None;
        for handle in handles {
            match handle.await {
                Ok((route, summary)) => {
                    self.routes.push(route);
                    summaries.push(summary);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Target group worker failed");
                    failure.get_or_insert(SimError::Worker(e));
                }
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }
        self.log_summaries(&summaries);
        Ok(summaries)
    }

    fn partition(&mut self, requests: impl IntoIterator<Item = (Request, f64)>) -> Vec<Vec<(Request, f64)>> {
        let mut batches: Vec<Vec<(Request, f64)>> = self.routes.iter().map(|_| Vec::new()).collect();
        for (request, arrival) in requests {
            match self.route_request(&request) {
                Some(index) => batches[index].push((request, arrival)),
                None => {
                    self.unrouted += 1;
                    warn!(path = request.path(), method = %request.method(), arrival, "No target group matches request");
                }
            }
        }
        batches
    }

    fn log_summaries(&self, summaries: &[RunSummary]) {
        let requests: usize = summaries.iter().map(|s| s.requests).sum();
        let timeouts: usize = summaries.iter().map(|s| s.timeouts).sum();
        info!(
            groups = self.routes.len(),
            requests,
            timeouts,
            unrouted = self.unrouted,
            "Router run finished"
        );
    }

    pub fn groups(&self) -> impl Iterator<Item = &TargetGroup> {
        self.routes.iter().map(|route| &route.group)
    }

    pub fn group(&self, index: usize) -> Option<&TargetGroup> {
        self.routes.get(index).map(|route| &route.group)
    }

    pub fn group_by_name(&self, name: &str) -> Option<&TargetGroup> {
        self.groups().find(|group| group.name() == name)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Requests that matched no group.
    pub fn unrouted(&self) -> usize {
        self.unrouted
    }

    /// Cumulative timeouts across all groups.
    pub fn timeout_timeline(&self) -> Vec<(f64, usize)> {
        cumulative_timeline(
            self.groups()
                .flat_map(|group| group.timeout_timeline().into_iter().skip(1).map(|(time, _)| time)),
        )
    }
}
