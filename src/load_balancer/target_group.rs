//! Target-group simulation engine.
//!
//! # Responsibilities
//! - Own a fixed array of slots, each holding one instance at a time
//! - Route requests (round robin, sticky sessions)
//! - Run periodic health checks, detect failures, replace instances
//! - Record response waits, timeouts and queue history for reporting
//!
//! # Design Decisions
//! - One private event queue per group; groups never share state
//! - Events name the instance they were scheduled for. Every handler
//!   re-reads the slot and ignores the event if that instance is gone, so
//!   nothing ever needs to be cancelled
//! - Retired instances are kept so per-slot queue history survives churn

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::error::{SimError, SimResult};
use crate::health::{HealthCheckSchedule, InstanceState};
use crate::http::{HandlerSet, Method, PathHandler, Request};
use crate::load_balancer::instance::{replay_queue_log, Instance, InstanceId};
use crate::load_balancer::round_robin::{RoundRobin, StickyBinding};
use crate::observability::metrics;
use crate::sim::{Constant, EventQueue, Sampler};

/// Construction parameters of a [`TargetGroup`].
pub struct TargetGroupSettings {
    /// Name used in logs, metrics and reports.
    pub name: String,
    /// Requests whose path starts with this prefix belong to the group.
    pub path_prefix: String,
    pub handlers: Vec<PathHandler>,
    /// Service time of requests no handler matches.
    pub default_processing_time: f64,
    /// Lifetime of an instance, from creation to crash.
    pub break_time: Box<dyn Sampler>,
    /// Boot time of a replacement instance.
    pub init_time: Box<dyn Sampler>,
    pub slot_count: usize,
    /// Synthetic request sent to every slot at each checkpoint.
    pub health_check: Request,
    pub health_check_interval: f64,
    pub timeout: f64,
    pub sticky_binding: StickyBinding,
}

impl TargetGroupSettings {
    /// Settings for one slot that never crashes, with the reference
    /// deployment's interval (121) and timeout (120).
    pub fn new(path_prefix: impl Into<String>) -> Self {
        let path_prefix = path_prefix.into();
        Self {
            name: path_prefix.clone(),
            health_check: Request::new(path_prefix.clone(), Method::Get),
            path_prefix,
            handlers: Vec::new(),
            default_processing_time: 3.0,
            break_time: Box::new(Constant(f64::INFINITY)),
            init_time: Box::new(Constant(100.0)),
            slot_count: 1,
            health_check_interval: 121.0,
            timeout: 120.0,
            sticky_binding: StickyBinding::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn handler(mut self, path: impl Into<String>, method: Method, service_time: impl Sampler + 'static) -> Self {
        self.handlers.push(PathHandler::new(path, method, service_time));
        self
    }

    pub fn default_processing_time(mut self, time: f64) -> Self {
        self.default_processing_time = time;
        self
    }

    pub fn break_time(mut self, sampler: impl Sampler + 'static) -> Self {
        self.break_time = Box::new(sampler);
        self
    }

    pub fn init_time(mut self, sampler: impl Sampler + 'static) -> Self {
        self.init_time = Box::new(sampler);
        self
    }

    pub fn slots(mut self, slot_count: usize) -> Self {
        self.slot_count = slot_count;
        self
    }

    pub fn health_check(mut self, path: impl Into<String>, method: Method, interval: f64) -> Self {
        self.health_check = Request::new(path, method);
        self.health_check_interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: f64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn sticky_binding(mut self, binding: StickyBinding) -> Self {
        self.sticky_binding = binding;
        self
    }
}

/// Kind of a scheduled event, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Request,
    RequestCompleted,
    RequestTimedOut,
    HealthCheck,
    HealthCheckCompleted,
    InstanceFailureDetected,
    InstanceBroken,
    InstanceReady,
}

#[derive(Debug)]
enum GroupEvent {
    Request(Request),
    RequestCompleted {
        slot: usize,
        instance: InstanceId,
        dispatched_at: f64,
        record: usize,
    },
    RequestTimedOut {
        record: usize,
    },
    HealthCheck {
        slot: usize,
    },
    HealthCheckCompleted {
        slot: usize,
        instance: InstanceId,
        submitted_at: f64,
    },
    InstanceFailureDetected {
        slot: usize,
        instance: InstanceId,
    },
    InstanceBroken {
        slot: usize,
        instance: InstanceId,
    },
    InstanceReady {
        slot: usize,
        instance: InstanceId,
    },
}

impl GroupEvent {
    /// Whether the event decides the outcome of an already routed request.
    fn settles_request(&self) -> bool {
        matches!(self, GroupEvent::RequestCompleted { .. } | GroupEvent::RequestTimedOut { .. })
    }

    fn kind(&self) -> EventKind {
        match self {
            GroupEvent::Request(_) => EventKind::Request,
            GroupEvent::RequestCompleted { .. } => EventKind::RequestCompleted,
            GroupEvent::RequestTimedOut { .. } => EventKind::RequestTimedOut,
            GroupEvent::HealthCheck { .. } => EventKind::HealthCheck,
            GroupEvent::HealthCheckCompleted { .. } => EventKind::HealthCheckCompleted,
            GroupEvent::InstanceFailureDetected { .. } => EventKind::InstanceFailureDetected,
            GroupEvent::InstanceBroken { .. } => EventKind::InstanceBroken,
            GroupEvent::InstanceReady { .. } => EventKind::InstanceReady,
        }
    }
}

/// Final (or current) outcome of a routed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    InFlight,
    Succeeded,
    TimedOut,
}

/// Ledger entry for one routed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestRecord {
    pub arrival: f64,
    pub slot: usize,
    pub instance: InstanceId,
    pub response_wait: f64,
    pub outcome: RequestOutcome,
}

/// An instance swap performed after a failed health check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Replacement {
    pub time: f64,
    pub slot: usize,
    pub retired: InstanceId,
    pub installed: InstanceId,
}

/// Queue-depth series of a single instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceQueueHistory {
    pub slot: usize,
    pub instance: InstanceId,
    pub created_at: f64,
    pub depths: Vec<(f64, i64)>,
}

/// Counters describing one call to [`TargetGroup::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub requests: usize,
    pub events_processed: usize,
    pub timeouts: usize,
    pub replacements: usize,
    /// Simulated time the run stopped at.
    pub horizon: f64,
}

/// A group of interchangeable instances behind one path prefix.
pub struct TargetGroup {
    name: String,
    path_prefix: String,
    handlers: HandlerSet,
    break_time: Box<dyn Sampler>,
    init_time: Box<dyn Sampler>,
    health_check: Request,
    timeout: f64,

    slots: Vec<Instance>,
    retired: Vec<Instance>,
    balancer: RoundRobin,
    health_checks: HealthCheckSchedule,
    events: EventQueue<GroupEvent>,
    next_instance_id: u64,
    now: f64,

    response_waits: Vec<(f64, f64)>,
    processing_times: Vec<(f64, f64)>,
    timeouts: Vec<f64>,
    requests: Vec<RequestRecord>,
    replacements: Vec<Replacement>,
    health_checks_sent: usize,
}

impl TargetGroup {
    /// Build a group and schedule the crash of every initial instance.
    ///
    /// Fails on duplicate (path, method) handlers, zero slots, or a
    /// non-positive interval or timeout.
    pub fn new(settings: TargetGroupSettings) -> SimResult<Self> {
        let TargetGroupSettings {
            name,
            path_prefix,
            handlers,
            default_processing_time,
            break_time,
            init_time,
            slot_count,
            health_check,
            health_check_interval,
            timeout,
            sticky_binding,
        } = settings;

        if slot_count == 0 {
            return Err(SimError::NoSlots { prefix: path_prefix });
        }
        for (field, value) in [("health_check_interval", health_check_interval), ("timeout", timeout)] {
            if !(value > 0.0) {
                return Err(SimError::NonPositive {
                    prefix: path_prefix,
                    field,
                    value,
                });
            }
        }
        let handlers = HandlerSet::new(handlers, default_processing_time)?;

        let mut group = Self {
            name,
            path_prefix,
            handlers,
            break_time,
            init_time,
            health_check,
            timeout,
            slots: Vec::with_capacity(slot_count),
            retired: Vec::new(),
            balancer: RoundRobin::new(slot_count, sticky_binding),
            health_checks: HealthCheckSchedule::new(health_check_interval),
            events: EventQueue::new(),
            next_instance_id: 0,
            now: 0.0,
            response_waits: Vec::new(),
            processing_times: Vec::new(),
            timeouts: Vec::new(),
            requests: Vec::new(),
            replacements: Vec::new(),
            health_checks_sent: 0,
        };

        for slot in 0..slot_count {
            let instance = group.spawn_instance(slot, 0.0, InstanceState::Healthy);
            group.slots.push(instance);
        }

        debug!(
            group = %group.name,
            prefix = %group.path_prefix,
            slots = slot_count,
            handlers = group.handlers.len(),
            "Target group created"
        );
        Ok(group)
    }

    /// Simulate a batch of `(request, arrival_time)` pairs.
    ///
    /// Arrivals need not be sorted; non-finite ones are skipped. Events are
    /// processed until the next one lies beyond `max(arrival) + timeout`.
    /// Outcomes of this run's requests are then settled; anything else
    /// later stays queued.
    pub fn run(&mut self, requests: impl IntoIterator<Item = (Request, f64)>) -> RunSummary {
        let timeouts_before = self.timeouts.len();
        let replacements_before = self.replacements.len();

        let mut count = 0;
        let mut last_arrival = f64::NEG_INFINITY;
        for (request, arrival) in requests {
            if !arrival.is_finite() {
                warn!(group = %self.name, path = request.path(), arrival, "Skipping request with non-finite arrival time");
                continue;
            }
            // Colliding arrivals are filed later than asked; the horizon
            // follows the filed times.
            if let Some(filed) = self.schedule(arrival, GroupEvent::Request(request)) {
                last_arrival = last_arrival.max(filed);
            }
            count += 1;
        }
        if count == 0 {
            return RunSummary {
                horizon: self.now,
                ..RunSummary::default()
            };
        }

        let horizon = last_arrival + self.timeout;
        self.extend_health_checks(horizon);

        info!(
            group = %self.name,
            requests = count,
            horizon,
            pending_events = self.events.len(),
            "Simulation run starting"
        );

        let mut processed = 0;
        while let Some(time) = self.events.peek_time() {
            if time > horizon {
                break;
            }
            let Some(scheduled) = self.events.pop() else {
                break;
            };
            self.now = scheduled.time;
            self.handle(scheduled.time, scheduled.event);
            processed += 1;
        }

        // Every request of this run is settled by `horizon`, but tie-break
        // jitter can file its completion or timeout just past it.
        while let Some(scheduled) = self.events.pop_where(GroupEvent::settles_request) {
            trace!(group = %self.name, time = scheduled.time, horizon, "Settling request past horizon");
            self.now = self.now.max(scheduled.time);
            self.handle(scheduled.time, scheduled.event);
            processed += 1;
        }

        let summary = RunSummary {
            requests: count,
            events_processed: processed,
            timeouts: self.timeouts.len() - timeouts_before,
            replacements: self.replacements.len() - replacements_before,
            horizon,
        };
        info!(
            group = %self.name,
            events = summary.events_processed,
            timeouts = summary.timeouts,
            replacements = summary.replacements,
            left_pending = self.events.len(),
            "Simulation run finished"
        );
        summary
    }

    fn handle(&mut self, time: f64, event: GroupEvent) {
        trace!(group = %self.name, time, kind = ?event.kind(), "Handling event");

        match event {
            GroupEvent::Request(request) => self.route(request, time),
            GroupEvent::RequestCompleted {
                slot,
                instance,
                dispatched_at,
                record,
            } => match self.current(slot, instance).map(Instance::state) {
                Some(InstanceState::Healthy) => {
                    self.requests[record].outcome = RequestOutcome::Succeeded;
                    metrics::record_request(&self.name, "succeeded");
                }
                Some(InstanceState::Broken | InstanceState::Initializing) | None => {
                    // The client only notices once its own timeout expires.
                    self.schedule(dispatched_at + self.timeout, GroupEvent::RequestTimedOut { record });
                }
            },
            GroupEvent::RequestTimedOut { record } => {
                self.timeouts.push(time);
                self.requests[record].outcome = RequestOutcome::TimedOut;
                metrics::record_request(&self.name, "timed_out");
            }
            GroupEvent::HealthCheck { slot } => self.check_health(slot, time),
            GroupEvent::HealthCheckCompleted {
                slot,
                instance,
                submitted_at,
            } => match self.current(slot, instance).map(Instance::state) {
                Some(InstanceState::Broken) => {
                    self.schedule(
                        submitted_at + self.timeout,
                        GroupEvent::InstanceFailureDetected { slot, instance },
                    );
                }
                Some(InstanceState::Healthy | InstanceState::Initializing) | None => {}
            },
            GroupEvent::InstanceFailureDetected { slot, instance } => {
                if self.current(slot, instance).is_some() {
                    self.replace(slot, time);
                } else {
                    trace!(group = %self.name, slot, ?instance, "Instance already replaced");
                }
            }
            GroupEvent::InstanceBroken { slot, instance } => {
                if let Some(current) = self.current_mut(slot, instance) {
                    current.state = current.state.on_crash();
                    debug!(group = %self.name, slot, ?instance, time, "Instance crashed");
                }
            }
            GroupEvent::InstanceReady { slot, instance } => {
                if let Some(current) = self.current_mut(slot, instance) {
                    current.state = current.state.on_ready();
                    let state = current.state;
                    debug!(group = %self.name, slot, ?instance, time, ?state, "Instance initialization finished");
                }
            }
        }
    }

    fn route(&mut self, request: Request, time: f64) {
        let states: Vec<InstanceState> = self.slots.iter().map(Instance::state).collect();
        let slot = self.balancer.next_slot(&request, &states);

        let instance = &mut self.slots[slot];
        let dispatch = instance.dispatch(&request, time, &mut self.handlers);
        let state = instance.state();
        let id = instance.id();

        let record = self.requests.len();
        debug!(
            group = %self.name,
            path = request.path(),
            method = %request.method(),
            sticky = request.is_sticky(),
            slot,
            ?state,
            response_wait = dispatch.response_wait,
            "Request routed"
        );

        if !state.is_healthy() || dispatch.response_wait > self.timeout {
            self.requests.push(RequestRecord {
                arrival: time,
                slot,
                instance: id,
                response_wait: self.timeout,
                outcome: RequestOutcome::InFlight,
            });
            self.response_waits.push((time, self.timeout));
            self.processing_times.push((time, self.timeout));
            metrics::record_response_wait(&self.name, self.timeout);
            self.schedule(time + self.timeout, GroupEvent::RequestTimedOut { record });
        } else {
            self.requests.push(RequestRecord {
                arrival: time,
                slot,
                instance: id,
                response_wait: dispatch.response_wait,
                outcome: RequestOutcome::InFlight,
            });
            self.response_waits.push((time, dispatch.response_wait));
            self.processing_times.push((time, dispatch.service_time));
            metrics::record_response_wait(&self.name, dispatch.response_wait);
            self.schedule(
                time + dispatch.response_wait,
                GroupEvent::RequestCompleted {
                    slot,
                    instance: id,
                    dispatched_at: time,
                    record,
                },
            );
        }
    }

    fn check_health(&mut self, slot: usize, time: f64) {
        let instance = &mut self.slots[slot];
        let id = instance.id();
        let state = instance.state();
        if !state.accepts_health_checks() {
            trace!(group = %self.name, slot, ?state, "Health check suppressed");
            return;
        }

        let dispatch = instance.dispatch(&self.health_check, time, &mut self.handlers);
        self.health_checks_sent += 1;
        metrics::record_health_check(&self.name);

        if !state.is_healthy() || dispatch.response_wait >= self.timeout {
            self.schedule(
                time + self.timeout,
                GroupEvent::InstanceFailureDetected { slot, instance: id },
            );
        } else {
            self.schedule(
                time + dispatch.response_wait,
                GroupEvent::HealthCheckCompleted {
                    slot,
                    instance: id,
                    submitted_at: time,
                },
            );
        }
    }

    /// Retire the instance at `slot` and boot a fresh one in its place.
    fn replace(&mut self, slot: usize, time: f64) {
        let fresh = self.spawn_instance(slot, time, InstanceState::Initializing);
        let installed = fresh.id();
        let init_time = self.init_time.sample().max(0.0);
        self.schedule(
            time + init_time,
            GroupEvent::InstanceReady {
                slot,
                instance: installed,
            },
        );

        let old = std::mem::replace(&mut self.slots[slot], fresh);
        let retired = old.id();
        self.retired.push(old);
        self.replacements.push(Replacement {
            time,
            slot,
            retired,
            installed,
        });
        metrics::record_replacement(&self.name);
        debug!(
            group = %self.name,
            slot,
            ?retired,
            ?installed,
            time,
            ready_at = time + init_time,
            "Instance replaced"
        );
    }

    /// Create an instance and pre-schedule its crash.
    ///
    /// Crash events do not move the health-check watermark: lifetimes can be
    /// arbitrarily long and checks are only needed up to the run horizon.
    fn spawn_instance(&mut self, slot: usize, time: f64, state: InstanceState) -> Instance {
        let id = InstanceId(self.next_instance_id);
        self.next_instance_id += 1;

        let crash_at = time + self.break_time.sample().max(0.0);
        if crash_at.is_finite() {
            self.events.schedule(crash_at, GroupEvent::InstanceBroken { slot, instance: id });
        }
        Instance::new(id, slot, time, state)
    }

    /// Enqueue `event` and catch the health-check schedule up to `time`.
    /// Returns the time the event was filed under. Events at a non-finite
    /// time never fire and are dropped.
    fn schedule(&mut self, time: f64, event: GroupEvent) -> Option<f64> {
        if !time.is_finite() {
            trace!(group = %self.name, kind = ?event.kind(), "Dropping event scheduled at non-finite time");
            return None;
        }
        let filed = self.events.schedule(time, event);
        self.extend_health_checks(time);
        Some(filed)
    }

    fn extend_health_checks(&mut self, until: f64) {
        for checkpoint in self.health_checks.advance_to(until) {
            for slot in 0..self.slots.len() {
                self.events.schedule(checkpoint, GroupEvent::HealthCheck { slot });
            }
        }
    }

    /// The instance at `slot`, if it is still `instance`.
    fn current(&self, slot: usize, instance: InstanceId) -> Option<&Instance> {
        self.slots.get(slot).filter(|current| current.id() == instance)
    }

    fn current_mut(&mut self, slot: usize, instance: InstanceId) -> Option<&mut Instance> {
        self.slots.get_mut(slot).filter(|current| current.id() == instance)
    }

    // --- Accessors ---

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    pub fn health_check_interval(&self) -> f64 {
        self.health_checks.interval()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Simulated time of the last processed event.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Current state of every slot.
    pub fn slot_states(&self) -> Vec<InstanceState> {
        self.slots.iter().map(Instance::state).collect()
    }

    /// Instance currently occupying `slot`.
    pub fn instance(&self, slot: usize) -> Option<&Instance> {
        self.slots.get(slot)
    }

    /// Every instance ever created, retired ones first, in creation order.
    pub fn instance_history(&self) -> Vec<&Instance> {
        let mut all: Vec<&Instance> = self.retired.iter().chain(self.slots.iter()).collect();
        all.sort_by_key(|instance| instance.id());
        all
    }

    /// `(arrival, response_wait)` samples, sorted by arrival.
    pub fn response_waits(&self) -> Vec<(f64, f64)> {
        sorted_by_time(&self.response_waits)
    }

    /// `(arrival, service_time)` samples, sorted by arrival. Failed requests
    /// count as the full timeout.
    pub fn processing_times(&self) -> Vec<(f64, f64)> {
        sorted_by_time(&self.processing_times)
    }

    /// Cumulative number of timeouts over time, starting at `(0, 0)`.
    pub fn timeout_timeline(&self) -> Vec<(f64, usize)> {
        cumulative_timeline(self.timeouts.iter().copied())
    }

    pub fn timeout_count(&self) -> usize {
        self.timeouts.len()
    }

    /// Queue-depth series per slot, merging every instance that ever
    /// occupied the slot.
    pub fn queue_depths_by_slot(&self) -> Vec<Vec<(f64, i64)>> {
        (0..self.slots.len())
            .map(|slot| {
                replay_queue_log(
                    self.retired
                        .iter()
                        .chain(self.slots.iter())
                        .filter(|instance| instance.slot() == slot)
                        .flat_map(|instance| instance.queue_log().iter().copied()),
                )
            })
            .collect()
    }

    /// Queue-depth series of every instance ever created.
    pub fn instance_queue_depths(&self) -> Vec<InstanceQueueHistory> {
        self.instance_history()
            .into_iter()
            .map(|instance| InstanceQueueHistory {
                slot: instance.slot(),
                instance: instance.id(),
                created_at: instance.created_at(),
                depths: instance.queue_depth_history(),
            })
            .collect()
    }

    pub fn request_log(&self) -> &[RequestRecord] {
        &self.requests
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    pub fn health_checks_sent(&self) -> usize {
        self.health_checks_sent
    }

    /// Slot bound to a sticky session key.
    pub fn session_slot(&self, session_key: &str) -> Option<usize> {
        self.balancer.session_slot(session_key)
    }
}

impl std::fmt::Debug for TargetGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetGroup")
            .field("name", &self.name)
            .field("path_prefix", &self.path_prefix)
            .field("slots", &self.slots.len())
            .field("timeout", &self.timeout)
            .field("now", &self.now)
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

fn sorted_by_time(samples: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    sorted
}

/// Step function of cumulative counts, starting at `(0, 0)`.
pub(crate) fn cumulative_timeline(times: impl IntoIterator<Item = f64>) -> Vec<(f64, usize)> {
    let mut times: Vec<f64> = times.into_iter().collect();
    times.sort_by(f64::total_cmp);

    let mut timeline = Vec::with_capacity(times.len() + 1);
    timeline.push((0.0, 0));
    timeline.extend(times.into_iter().enumerate().map(|(i, time)| (time, i + 1)));
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Sequence;

    fn users() -> Request {
        Request::new("users", Method::Get)
    }

    /// Two slots, no health checks within the test window, no crashes.
    fn quiet_group(slots: usize, service: f64, timeout: f64) -> TargetGroup {
        TargetGroup::new(
            TargetGroupSettings::new("")
                .slots(slots)
                .handler("users", Method::Get, Constant(service))
                .health_check("health", Method::Get, 10_000.0)
                .timeout(timeout),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_duplicate_handlers() {
        let result = TargetGroup::new(
            TargetGroupSettings::new("")
                .handler("x", Method::Post, Constant(1.0))
                .handler("x", Method::Post, Constant(1.0)),
        );
        assert!(matches!(result, Err(SimError::DuplicateHandler { .. })));
    }

    #[test]
    fn test_rejects_bad_settings() {
        assert!(matches!(
            TargetGroup::new(TargetGroupSettings::new("v1/").slots(0)),
            Err(SimError::NoSlots { .. })
        ));
        assert!(matches!(
            TargetGroup::new(TargetGroupSettings::new("v1/").timeout(0.0)),
            Err(SimError::NonPositive { field: "timeout", .. })
        ));
        assert!(matches!(
            TargetGroup::new(TargetGroupSettings::new("v1/").health_check("h", Method::Get, -1.0)),
            Err(SimError::NonPositive { field: "health_check_interval", .. })
        ));
    }

    #[test]
    fn test_successful_requests_recorded() {
        let mut group = quiet_group(2, 3.0, 60.0);
        let summary = group.run(vec![(users(), 5.0), (users(), 6.0)]);

        assert_eq!(summary.requests, 2);
        assert_eq!(summary.timeouts, 0);
        assert_eq!(group.response_waits(), vec![(5.0, 3.0), (6.0, 3.0)]);
        assert!(group
            .request_log()
            .iter()
            .all(|r| r.outcome == RequestOutcome::Succeeded));
        assert_eq!(group.timeout_timeline(), vec![(0.0, 0)]);
    }

    #[test]
    fn test_overloaded_instance_times_out() {
        let mut group = quiet_group(1, 50.0, 60.0);
        group.run(vec![(users(), 0.0), (users(), 1.0)]);

        let log = group.request_log();
        assert_eq!(log[0].outcome, RequestOutcome::Succeeded);
        // Second request would wait 99 > 60.
        assert_eq!(log[1].outcome, RequestOutcome::TimedOut);
        assert_eq!(group.timeout_timeline(), vec![(0.0, 0), (61.0, 1)]);
        assert_eq!(group.response_waits()[1], (1.0, 60.0));
    }

    #[test]
    fn test_request_to_broken_instance_times_out() {
        let mut group = TargetGroup::new(
            TargetGroupSettings::new("")
                .slots(1)
                .handler("users", Method::Get, Constant(3.0))
                .health_check("health", Method::Get, 10_000.0)
                .timeout(60.0)
                .break_time(Sequence::new(vec![10.0, f64::INFINITY])),
        )
        .unwrap();

        group.run(vec![(users(), 20.0)]);
        assert_eq!(group.request_log()[0].outcome, RequestOutcome::TimedOut);
        assert_eq!(group.timeout_timeline(), vec![(0.0, 0), (80.0, 1)]);
    }

    #[test]
    fn test_crash_during_service_detected_at_timeout() {
        let mut group = TargetGroup::new(
            TargetGroupSettings::new("")
                .slots(1)
                .handler("users", Method::Get, Constant(10.0))
                .health_check("health", Method::Get, 10_000.0)
                .timeout(60.0)
                .break_time(Sequence::new(vec![5.0, f64::INFINITY])),
        )
        .unwrap();

        // Dispatched healthy at t=1, instance breaks at t=5, completion at
        // t=11 finds it broken: timeout at 1 + 60.
        group.run(vec![(users(), 1.0)]);
        assert_eq!(group.request_log()[0].response_wait, 10.0);
        assert_eq!(group.request_log()[0].outcome, RequestOutcome::TimedOut);
        assert_eq!(group.timeout_timeline(), vec![(0.0, 0), (61.0, 1)]);
    }

    #[test]
    fn test_broken_instance_detected_and_replaced() {
        let mut group = TargetGroup::new(
            TargetGroupSettings::new("")
                .slots(2)
                .handler("users", Method::Get, Constant(1.0))
                .health_check("users", Method::Get, 10.0)
                .timeout(20.0)
                .break_time(Sequence::new(vec![5.0, f64::INFINITY]))
                .init_time(Constant(100.0)),
        )
        .unwrap();

        // Crash at 5, check at 10, detection at 30, ready at 130.
        group.run(vec![(users(), 1.0), (users(), 2.0), (users(), 40.0), (users(), 41.0)]);

        assert_eq!(group.replacements().len(), 1);
        let replacement = group.replacements()[0];
        assert_eq!(replacement.slot, 0);
        // Detection lands on the t=30 checkpoint and is jittered past it.
        assert!((replacement.time - 30.0).abs() < 0.1);
        assert_eq!(group.slot_states()[0], InstanceState::Initializing);

        let slots: Vec<usize> = group.request_log().iter().map(|r| r.slot).collect();
        assert_eq!(slots, vec![0, 1, 1, 1]);
        assert_eq!(group.instance_history().len(), 3);
    }

    #[test]
    fn test_replacement_becomes_healthy() {
        let mut group = TargetGroup::new(
            TargetGroupSettings::new("")
                .slots(1)
                .handler("users", Method::Get, Constant(1.0))
                .health_check("users", Method::Get, 10.0)
                .timeout(20.0)
                .break_time(Sequence::new(vec![5.0, f64::INFINITY]))
                .init_time(Constant(15.0)),
        )
        .unwrap();

        // Detection at 30, ready at 45.
        group.run(vec![(users(), 100.0)]);
        assert_eq!(group.slot_states(), vec![InstanceState::Healthy]);
        assert_eq!(group.request_log()[0].outcome, RequestOutcome::Succeeded);
        assert_eq!(group.replacements().len(), 1);
    }

    #[test]
    fn test_health_checks_scheduled_for_every_slot() {
        let mut group = TargetGroup::new(
            TargetGroupSettings::new("")
                .slots(3)
                .health_check("users", Method::Get, 30.0)
                .timeout(10.0),
        )
        .unwrap();

        // Horizon 100: checkpoints 30, 60, 90 for three slots.
        group.run(vec![(users(), 90.0)]);
        assert_eq!(group.health_checks_sent(), 9);
        assert!(group.replacements().is_empty());
    }

    #[test]
    fn test_queue_depth_by_slot_includes_retired_instances() {
        let mut group = TargetGroup::new(
            TargetGroupSettings::new("")
                .slots(1)
                .handler("users", Method::Get, Constant(1.0))
                .health_check("users", Method::Get, 10.0)
                .timeout(20.0)
                .break_time(Sequence::new(vec![5.0, f64::INFINITY]))
                .init_time(Constant(15.0)),
        )
        .unwrap();
        group.run(vec![(users(), 1.0), (users(), 100.0)]);

        let by_slot = group.queue_depths_by_slot();
        assert_eq!(by_slot.len(), 1);
        let per_instance = group.instance_queue_depths();
        assert_eq!(per_instance.len(), 2);
        let total: usize = per_instance.iter().map(|h| h.depths.len()).sum();
        assert_eq!(by_slot[0].len(), total);
        assert!(by_slot[0].iter().all(|(_, depth)| *depth >= 0));
        assert_eq!(by_slot[0].last().unwrap().1, 0);
    }

    fn slow_default_group(timeout: f64, interval: f64) -> TargetGroup {
        TargetGroup::new(
            TargetGroupSettings::new("")
                .default_processing_time(100.0)
                .health_check("health", Method::Get, interval)
                .timeout(timeout),
        )
        .unwrap()
    }

    #[test]
    fn test_colliding_arrivals_all_time_out() {
        let mut group = slow_default_group(10.0, 10_000.0);
        let x = Request::new("x", Method::Get);
        let summary = group.run(vec![(x.clone(), 0.0), (x, 0.0)]);

        assert_eq!(summary.requests, 2);
        assert_eq!(summary.timeouts, 2);
        assert_eq!(group.timeout_count(), 2);
        assert!(group
            .request_log()
            .iter()
            .all(|r| r.outcome == RequestOutcome::TimedOut));
    }

    #[test]
    fn test_timeout_filed_past_horizon_still_counted() {
        // Horizon 30 coincides with a checkpoint, so the timeout due at 30
        // is filed just after it.
        let mut group = slow_default_group(10.0, 30.0);
        let summary = group.run(vec![(Request::new("x", Method::Get), 20.0)]);

        assert_eq!(summary.horizon, 30.0);
        assert_eq!(summary.timeouts, 1);
        assert_eq!(group.request_log()[0].outcome, RequestOutcome::TimedOut);
        let timeline = group.timeout_timeline();
        assert_eq!(timeline.len(), 2);
        assert!((timeline[1].0 - 30.0).abs() < 0.1);
    }

    #[test]
    fn test_non_finite_arrivals_skipped() {
        let mut group = quiet_group(1, 1.0, 10.0);
        let summary = group.run(vec![(users(), f64::NAN), (users(), f64::INFINITY), (users(), 1.0)]);

        assert_eq!(summary.requests, 1);
        assert_eq!(summary.horizon, 11.0);
        assert_eq!(group.request_log().len(), 1);
        assert_eq!(group.request_log()[0].outcome, RequestOutcome::Succeeded);
    }

    #[test]
    fn test_initializing_slot_gets_no_health_checks() {
        let mut group = TargetGroup::new(
            TargetGroupSettings::new("")
                .slots(1)
                .handler("users", Method::Get, Constant(1.0))
                .health_check("users", Method::Get, 10.0)
                .timeout(20.0)
                .break_time(Sequence::new(vec![5.0, f64::INFINITY]))
                .init_time(Constant(100.0)),
        )
        .unwrap();

        // Checks at 10, 20, 30 reach the broken instance; it is replaced
        // right after the t=30 check and the 40..80 checkpoints are skipped.
        group.run(vec![(users(), 60.0)]);
        assert_eq!(group.replacements().len(), 1);
        assert_eq!(group.health_checks_sent(), 3);
        assert_eq!(group.slot_states(), vec![InstanceState::Initializing]);
    }

    #[test]
    fn test_empty_run() {
        let mut group = quiet_group(1, 1.0, 10.0);
        let summary = group.run(Vec::new());
        assert_eq!(summary.requests, 0);
        assert_eq!(summary.events_processed, 0);
    }

    #[test]
    fn test_cumulative_timeline() {
        assert_eq!(
            cumulative_timeline(vec![5.0, 2.0, 9.0]),
            vec![(0.0, 0), (2.0, 1), (5.0, 2), (9.0, 3)]
        );
    }
}
