//! Discrete-event simulator of a load-balancing tier.

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod load_balancer;
pub mod observability;
pub mod report;
pub mod routing;
pub mod sim;
pub mod workload;

pub use config::schema::ScenarioConfig;
pub use error::{SimError, SimResult};
pub use load_balancer::{TargetGroup, TargetGroupSettings};
pub use report::SimulationReport;
pub use routing::Router;
pub use workload::WorkloadGenerator;
