//! Per-group path handler table.

use std::collections::HashSet;
use std::fmt;

use crate::error::{SimError, SimResult};
use crate::http::{Method, Request};
use crate::sim::Sampler;

/// Serves one (path, method) pair with a sampled service time.
pub struct PathHandler {
    pub path: String,
    pub method: Method,
    service_time: Box<dyn Sampler>,
}

impl PathHandler {
    pub fn new(path: impl Into<String>, method: Method, service_time: impl Sampler + 'static) -> Self {
        Self {
            path: path.into(),
            method,
            service_time: Box::new(service_time),
        }
    }

    fn matches(&self, request: &Request) -> bool {
        self.path == request.path() && self.method == request.method()
    }
}

impl fmt::Debug for PathHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathHandler")
            .field("path", &self.path)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// The validated handler table shared by every instance of a group.
#[derive(Debug)]
pub struct HandlerSet {
    handlers: Vec<PathHandler>,
    default_processing_time: f64,
}

impl HandlerSet {
    /// Build a table, rejecting duplicate (path, method) pairs.
    pub fn new(handlers: Vec<PathHandler>, default_processing_time: f64) -> SimResult<Self> {
        {
            let mut seen = HashSet::new();
            for handler in &handlers {
                if !seen.insert((handler.path.as_str(), handler.method)) {
                    return Err(SimError::DuplicateHandler {
                        path: handler.path.clone(),
                        method: handler.method,
                    });
                }
            }
        }
        Ok(Self {
            handlers,
            default_processing_time,
        })
    }

    /// Sample the service time for `request`.
    ///
    /// Unknown endpoints take the default processing time. Negative samples
    /// are clamped to zero.
    pub fn service_time(&mut self, request: &Request) -> f64 {
        let time = self
            .handlers
            .iter_mut()
            .find(|h| h.matches(request))
            .map(|h| h.service_time.sample())
            .unwrap_or(self.default_processing_time);
        time.max(0.0)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
