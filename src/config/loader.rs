//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::{DistributionError, ScenarioConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::error::SimError;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    Engine(#[from] SimError),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Parse and validate a scenario from TOML text.
pub fn parse_config(content: &str) -> Result<ScenarioConfig, ConfigError> {
    let config: ScenarioConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate a scenario from a TOML file.
pub fn load_config(path: &Path) -> Result<ScenarioConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
seed = 7

[workload]
requests = 500
users = 10
sticky = true
arrival = { kind = "uniform", low = 0.0, high = 3600.0 }

[[groups]]
name = "api"
path_prefix = "api/"
slots = 3
timeout = 60.0
health_check_interval = 30.0
health_check_path = "api/health"
sticky_binding = "preserve-rotation"
break_time = { kind = "exponential", rate = 0.0001 }
init_time = { kind = "constant", value = 45.0 }

[[groups.handlers]]
path = "api/users"
method = "GET"
service_time = { kind = "normal", mean = 3.0, std_dev = 0.1 }

[[groups.handlers]]
path = "api/users"
method = "POST"
service_time = { kind = "constant", value = 7.0 }
"#;

    #[test]
    fn test_parse_scenario() {
        let config = parse_config(SCENARIO).unwrap();
        assert_eq!(config.seed, 7);
        assert!(config.workload.sticky);
        assert_eq!(config.workload.horizon, 86_400.0);
        assert_eq!(config.groups.len(), 1);

        let group = &config.groups[0];
        assert_eq!(group.slots, 3);
        assert_eq!(group.handlers.len(), 2);
        assert_eq!(group.handlers[1].method, crate::http::Method::Post);
        assert_eq!(group.sticky_binding, crate::load_balancer::StickyBinding::PreserveRotation);
    }

    #[test]
    fn test_validation_error_surfaces() {
        let broken = SCENARIO.replace("timeout = 60.0", "timeout = -1.0");
        match parse_config(&broken) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_config("groups = 5"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
