//! Configuration loading and validation.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::ProdflowConfig;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load and validate configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<ProdflowConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ProdflowConfig = serde_yaml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProdflowConfig) -> Result<(), ConfigError> {
    if config.app.name.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "app.name must not be empty".to_string(),
        ));
    }

    for (label, profile) in [
        ("rate_limit.auth", &config.rate_limit.auth),
        ("rate_limit.api", &config.rate_limit.api),
    ] {
        if profile.limit == 0 {
            return Err(ConfigError::Invalid(format!(
                "{}.limit must be > 0",
                label
            )));
        }
        if profile.window_secs == 0 {
            return Err(ConfigError::Invalid(format!(
                "{}.window_secs must be > 0",
                label
            )));
        }
    }

    if config.rate_limit.cleanup_interval_secs == 0 {
        return Err(ConfigError::Invalid(
            "rate_limit.cleanup_interval_secs must be > 0".to_string(),
        ));
    }

    for (label, spec) in [
        ("stores.plan", &config.stores.plan),
        ("stores.schedule", &config.stores.schedule),
        ("stores.link", &config.stores.link),
    ] {
        if spec.backend.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{}.backend must not be empty",
                label
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass_validation() {
        let config = ProdflowConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.rate_limit.auth.limit, 5);
        assert_eq!(config.rate_limit.api.limit, 100);
        assert_eq!(config.rate_limit.cleanup_interval_secs, 300);
        assert_eq!(config.stores.plan.backend, "in_memory");
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "rate_limit:\n  auth:\n    limit: 3\n    window_secs: 30\n";
        let config: ProdflowConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.rate_limit.auth.limit, 3);
        assert_eq!(config.rate_limit.auth.window_secs, 30);
        assert_eq!(config.rate_limit.api.limit, 100);
        assert_eq!(config.app.name, "prodflow");
    }

    #[test]
    fn test_zero_limit_rejected() {
        let yaml = "rate_limit:\n  auth:\n    limit: 0\n    window_secs: 60\n";
        let config: ProdflowConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }
}
