// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{Config, ConfigError};
use crate::licenses::LicenseError;
use crate::runtime_paths::RuntimePaths;
use crate::settings::SettingsError;
use std::error::Error;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

pub mod licenses;

#[derive(Debug)]
pub struct BootstrapResult {
    pub config: Config,
    pub runtime_paths: RuntimePaths,
    pub created_config: bool,
    pub created_licenses: bool,
}

#[derive(Debug)]
pub enum BootstrapError {
    Config(ConfigError),
    Settings(SettingsError),
    License(LicenseError),
    Io(io::Error),
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Config(err) => write!(f, "{}", err),
            BootstrapError::Settings(err) => write!(f, "Bootstrap settings error: {}", err),
            BootstrapError::License(err) => write!(f, "Bootstrap license error: {}", err),
            BootstrapError::Io(err) => write!(f, "Bootstrap I/O error: {}", err),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BootstrapError::Config(err) => Some(err),
            BootstrapError::Settings(err) => Some(err),
            BootstrapError::License(err) => Some(err),
            BootstrapError::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for BootstrapError {
    fn from(err: ConfigError) -> Self {
        BootstrapError::Config(err)
    }
}

impl From<io::Error> for BootstrapError {
    fn from(err: io::Error) -> Self {
        BootstrapError::Io(err)
    }
}

/// Prepares a runtime root for use: default config, state layout, and the
/// preinstalled license set. Safe to call on every start.
pub fn bootstrap_runtime(root: &Path) -> Result<BootstrapResult, BootstrapError> {
    let created_config = ensure_config(root)?;
    let config = Config::load_and_validate(root)?;
    let runtime_paths = RuntimePaths::from_root(root)?;
    let created_licenses = licenses::ensure_licenses(&runtime_paths, &config)?;

    Ok(BootstrapResult {
        config,
        runtime_paths,
        created_config,
        created_licenses,
    })
}

fn ensure_config(root: &Path) -> Result<bool, BootstrapError> {
    std::fs::create_dir_all(root)?;
    let config_path = root.join("config.yaml");
    if config_path.exists() {
        return Ok(false);
    }
    let content = serde_yaml::to_string(&Config::default())
        .map_err(|err| BootstrapError::Io(io::Error::other(err)))?;
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&config_path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(BootstrapError::Io(err)),
    };
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    log_action(format!("created {}", config_path.display()));
    Ok(true)
}

pub(crate) fn log_action(message: impl AsRef<str>) {
    eprintln!("[bootstrap] {}", message.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::licenses::registry::OrderPolicy;
    use crate::util::test_fixtures::TestFixtureRoot;
    use std::fs;

    #[test]
    fn bootstrap_creates_defaults_when_missing() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-default").unwrap();
        let result = bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");

        assert!(result.created_config);
        assert!(result.created_licenses);
        assert_eq!(result.config.licenses.ordering, OrderPolicy::Priority);

        assert!(fixture.path().join("config.yaml").exists());
        let licenses_path = fixture.state_dir().join("sys").join("licenses.yaml");
        assert!(licenses_path.exists());
        let settings_path = fixture.state_dir().join("sys").join("settings.yaml");
        let settings = fs::read_to_string(settings_path).unwrap();
        assert!(settings.contains("sitedefaultlicense: unknown"));
        assert!(settings.contains("licensepriority:"));
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-idempotent").unwrap();
        let first = bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");
        assert!(first.created_config);
        assert!(first.created_licenses);

        let config_path = fixture.path().join("config.yaml");
        let licenses_path = fixture.state_dir().join("sys").join("licenses.yaml");
        let config_before = fs::read_to_string(&config_path).unwrap();
        let licenses_before = fs::read_to_string(&licenses_path).unwrap();

        let second = bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");
        assert!(!second.created_config);
        assert!(!second.created_licenses);
        assert_eq!(config_before, fs::read_to_string(&config_path).unwrap());
        assert_eq!(licenses_before, fs::read_to_string(&licenses_path).unwrap());
    }

    #[test]
    fn bootstrap_respects_existing_config() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-existing-config").unwrap();
        fs::create_dir_all(fixture.path()).unwrap();
        let config = "app:\n  name: \"Relic Test\"\nlicenses:\n  ordering: insertion\n";
        fs::write(fixture.path().join("config.yaml"), config).unwrap();

        let result = bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");
        assert!(!result.created_config);
        assert_eq!(result.config.app.name, "Relic Test");
        assert_eq!(result.config.licenses.ordering, OrderPolicy::Insertion);

        // The insertion policy writes the plain order key.
        let settings_path = fixture.state_dir().join("sys").join("settings.yaml");
        let settings = fs::read_to_string(settings_path).unwrap();
        assert!(settings.contains("licenseorder:"));
    }
}
