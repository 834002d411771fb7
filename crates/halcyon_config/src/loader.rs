//! Loading and validation of `halcyon.toml`.

use crate::error::ConfigError;
use crate::types::HalcyonConfig;
use std::path::Path;

/// Loads `<project_dir>/halcyon.toml`.
pub fn load_config(project_dir: &Path) -> Result<HalcyonConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join("halcyon.toml"))?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from TOML text.
///
/// Kept separate from [`load_config`] so tests need no filesystem.
pub fn load_config_from_str(content: &str) -> Result<HalcyonConfig, ConfigError> {
    let config: HalcyonConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &HalcyonConfig) -> Result<(), ConfigError> {
    if config.optimize.max_iterations == 0 {
        return Err(ConfigError::Invalid(
            "optimize.max_iterations must be nonzero".into(),
        ));
    }
    for name in config.lint.deny.iter() {
        if config.lint.allow.contains(name) {
            return Err(ConfigError::Invalid(format!(
                "lint rule '{name}' is both denied and allowed"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.optimize.max_iterations, 1000);
        assert!(!config.optimize.flatten);
    }

    #[test]
    fn full_config() {
        let config = load_config_from_str(
            r#"
[optimize]
max_iterations = 64
flatten = true

[lint]
deny = ["ambiguous-case-overlap"]
allow = ["order-dependent-assignment"]
"#,
        )
        .unwrap();
        assert_eq!(config.optimize.max_iterations, 64);
        assert!(config.optimize.flatten);
        assert_eq!(config.lint.deny, vec!["ambiguous-case-overlap"]);
        assert_eq!(config.lint.allow, vec!["order-dependent-assignment"]);
    }

    #[test]
    fn zero_iteration_cap_rejected() {
        let err = load_config_from_str("[optimize]\nmax_iterations = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn conflicting_rule_lists_rejected() {
        let err = load_config_from_str(
            "[lint]\ndeny = [\"latch-inferred\"]\nallow = [\"latch-inferred\"]\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            load_config_from_str("[optimize\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
