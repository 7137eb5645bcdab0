//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! scenario file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ScenarioConfig (validated, immutable)
//!     → builder.rs (seeded samplers, target groups, router)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults; an empty file is the reference scenario
//! - Validation separates syntactic (serde) from semantic checks

pub mod builder;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{DistributionConfig, GroupConfig, HandlerConfig, ScenarioConfig, WorkloadConfig};
pub use validation::{validate_config, ValidationError};
