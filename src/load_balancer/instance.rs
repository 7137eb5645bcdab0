//! Single-server queue model of one backend instance.
//!
//! # Responsibilities
//! - Serve requests FIFO, one at a time
//! - Track when the server next becomes free (busy-until)
//! - Log queue arrivals and departures for depth reconstruction
//! - Carry the instance health state (mutated by the target group only)

use serde::Serialize;

use crate::health::InstanceState;
use crate::http::{HandlerSet, Request};

/// Unique, per-group identifier of an instance.
///
/// Slots are reused across replacements; ids are not. Events that refer to an
/// instance carry its id so stale events can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InstanceId(pub u64);

/// Outcome of dispatching one request to an instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dispatch {
    /// Time from arrival until the response leaves the server.
    pub response_wait: f64,
    /// Pure processing time of this request.
    pub service_time: f64,
}

/// One entry of the queue-depth log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueChange {
    Added,
    Removed,
}

impl QueueChange {
    fn delta(self) -> i64 {
        match self {
            QueueChange::Added => 1,
            QueueChange::Removed => -1,
        }
    }
}

/// A simulated backend server.
#[derive(Debug, Clone)]
pub struct Instance {
    id: InstanceId,
    slot: usize,
    created_at: f64,
    pub(crate) state: InstanceState,
    busy_until: f64,
    queue_log: Vec<(f64, QueueChange)>,
}

impl Instance {
    /// Create an instance occupying `slot`, born at `created_at`.
    pub fn new(id: InstanceId, slot: usize, created_at: f64, state: InstanceState) -> Self {
        Self {
            id,
            slot,
            created_at,
            state,
            busy_until: created_at,
            queue_log: Vec::new(),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn busy_until(&self) -> f64 {
        self.busy_until
    }

    /// Queue `request`, arriving at `arrival_time`, behind all earlier work.
    pub fn dispatch(&mut self, request: &Request, arrival_time: f64, handlers: &mut HandlerSet) -> Dispatch {
        let service_time = handlers.service_time(request);
        let start = arrival_time.max(self.busy_until);
        self.busy_until = start + service_time;

        self.queue_log.push((arrival_time, QueueChange::Added));
        self.queue_log.push((self.busy_until, QueueChange::Removed));

        Dispatch {
            response_wait: self.busy_until - arrival_time,
            service_time,
        }
    }

    /// Raw queue log in dispatch order.
    pub fn queue_log(&self) -> &[(f64, QueueChange)] {
        &self.queue_log
    }

    /// Replay the queue log into a `(time, depth)` series.
    ///
    /// At equal timestamps arrivals are applied before departures, so the
    /// depth never dips below zero.
    pub fn queue_depth_history(&self) -> Vec<(f64, i64)> {
        replay_queue_log(self.queue_log.iter().copied())
    }
}

/// Replay any number of queue logs merged together.
pub(crate) fn replay_queue_log(log: impl IntoIterator<Item = (f64, QueueChange)>) -> Vec<(f64, i64)> {
    let mut entries: Vec<(f64, QueueChange)> = log.into_iter().collect();
    entries.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| b.1.delta().cmp(&a.1.delta()))
    });

    let mut depth = 0;
    entries
        .into_iter()
        .map(|(time, change)| {
            depth += change.delta();
            (time, depth)
        })
        .collect()
}
