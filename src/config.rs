// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::licenses::registry::OrderPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const ALLOWED_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            description: String::new(),
        }
    }
}

fn default_app_name() -> String {
    "Relic".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LicensesConfig {
    #[serde(default = "default_order_policy")]
    pub ordering: OrderPolicy,
}

impl Default for LicensesConfig {
    fn default() -> Self {
        Self {
            ordering: default_order_policy(),
        }
    }
}

fn default_order_policy() -> OrderPolicy {
    OrderPolicy::Priority
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub licenses: LicensesConfig,
}

impl Config {
    /// Reads `config.yaml` from the runtime root. A missing file yields the
    /// defaults; a present but broken one is an error, never a fallback.
    pub fn load_and_validate(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join("config.yaml");
        let config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).map_err(|err| {
                ConfigError::LoadError(format!(
                    "Failed to read '{}': {}",
                    config_path.display(),
                    err
                ))
            })?;
            serde_yaml::from_str::<Config>(&content).map_err(|err| {
                ConfigError::LoadError(format!(
                    "Failed to parse '{}': {}",
                    config_path.display(),
                    err
                ))
            })?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "app.name must not be empty".to_string(),
            ));
        }
        if !ALLOWED_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}, got '{}'",
                ALLOWED_LOG_LEVELS, self.logging.level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;
    use std::fs;

    #[test]
    fn missing_config_file_yields_defaults() {
        let fixture = TestFixtureRoot::new_unique("config-defaults").unwrap();
        let config = Config::load_and_validate(fixture.path()).unwrap();
        assert_eq!(config.app.name, "Relic");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.licenses.ordering, OrderPolicy::Priority);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let fixture = TestFixtureRoot::new_unique("config-partial").unwrap();
        fs::write(
            fixture.path().join("config.yaml"),
            "licenses:\n  ordering: insertion\n",
        )
        .unwrap();
        let config = Config::load_and_validate(fixture.path()).unwrap();
        assert_eq!(config.licenses.ordering, OrderPolicy::Insertion);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let fixture = TestFixtureRoot::new_unique("config-bad-level").unwrap();
        fs::write(
            fixture.path().join("config.yaml"),
            "logging:\n  level: \"verbose\"\n",
        )
        .unwrap();
        let err = Config::load_and_validate(fixture.path()).unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn malformed_yaml_is_a_load_error() {
        let fixture = TestFixtureRoot::new_unique("config-malformed").unwrap();
        fs::write(fixture.path().join("config.yaml"), "app: [not a map").unwrap();
        let err = Config::load_and_validate(fixture.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
