//! Shared builders for integration tests.

use balancer_sim::http::{Method, Request};
use balancer_sim::load_balancer::{TargetGroup, TargetGroupSettings};
use balancer_sim::sim::{Constant, Sequence};

/// A non-sticky `GET users` request.
#[allow(dead_code)]
pub fn get_users() -> Request {
    Request::new("users", Method::Get)
}

/// A sticky `GET users` request for `user`.
#[allow(dead_code)]
pub fn sticky_users(user: &str) -> Request {
    Request::new("users", Method::Get).sticky(user)
}

/// Settings for a group serving `GET users` in constant time.
#[allow(dead_code)]
pub fn users_group(slots: usize, service: f64, timeout: f64, interval: f64) -> TargetGroupSettings {
    TargetGroupSettings::new("")
        .slots(slots)
        .handler("users", Method::Get, Constant(service))
        .health_check("users", Method::Get, interval)
        .timeout(timeout)
}

/// Like [`users_group`], but slot 0 crashes at `crash_at` and every later
/// instance lives forever.
#[allow(dead_code)]
pub fn crashing_group(slots: usize, crash_at: f64, timeout: f64, interval: f64, init: f64) -> TargetGroup {
    let mut lifetimes = vec![crash_at];
    lifetimes.extend(std::iter::repeat(f64::INFINITY).take(slots));
    TargetGroup::new(
        users_group(slots, 3.0, timeout, interval)
            .break_time(Sequence::new(lifetimes))
            .init_time(Constant(init)),
    )
    .unwrap()
}
