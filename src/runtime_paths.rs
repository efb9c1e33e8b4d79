// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RuntimePaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub state_dir: PathBuf,
    pub state_sys_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl RuntimePaths {
    pub fn from_root(root: &Path) -> Result<Self, ConfigError> {
        let root_path = if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root.to_path_buf()
        };

        if !root_path.exists() {
            fs::create_dir_all(&root_path).map_err(|err| {
                ConfigError::ValidationError(format!(
                    "Failed to create runtime root '{}': {}",
                    root_path.display(),
                    err
                ))
            })?;
        }

        let root_canonical = root_path.canonicalize().map_err(|err| {
            ConfigError::ValidationError(format!(
                "Failed to canonicalize runtime root '{}': {}",
                root_path.display(),
                err
            ))
        })?;

        let config_file = root_canonical.join("config.yaml");
        let state_dir = root_canonical.join("state");
        let state_sys_dir = state_dir.join("sys");
        let logs_dir = root_canonical.join("logs");

        ensure_dir_exists(&state_dir)?;
        ensure_dir_exists(&state_sys_dir)?;
        ensure_dir_exists(&logs_dir)?;

        let state_dir = canonicalize_dir(state_dir)?;
        let state_sys_dir = canonicalize_dir(state_sys_dir)?;
        let logs_dir = canonicalize_dir(logs_dir)?;

        Ok(Self {
            root: root_canonical,
            config_file,
            state_dir,
            state_sys_dir,
            logs_dir,
        })
    }
}

fn canonicalize_dir(path: PathBuf) -> Result<PathBuf, ConfigError> {
    path.canonicalize().map_err(|err| {
        ConfigError::ValidationError(format!(
            "Failed to canonicalize directory '{}': {}",
            path.display(),
            err
        ))
    })
}

fn ensure_dir_exists(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|err| {
            ConfigError::ValidationError(format!(
                "Failed to create directory '{}': {}",
                path.display(),
                err
            ))
        })?;
    }
    ensure_dir_writable(path)
}

fn ensure_dir_writable(path: &Path) -> Result<(), ConfigError> {
    if !path.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "Not a directory: {}",
            path.display()
        )));
    }

    let probe_name = format!(".relic-write-check-{}", Uuid::new_v4());
    let probe_path = path.join(probe_name);

    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe_path)
    {
        Ok(_) => {
            if let Err(err) = fs::remove_file(&probe_path) {
                return Err(ConfigError::ValidationError(format!(
                    "Unable to clean probe file '{}': {}",
                    probe_path.display(),
                    err
                )));
            }
            Ok(())
        }
        Err(err) => Err(ConfigError::ValidationError(format!(
            "Directory '{}' must be writable: {}",
            path.display(),
            err
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn from_root_creates_state_layout() {
        let fixture = TestFixtureRoot::new_unique("runtime-paths").unwrap();
        let paths = RuntimePaths::from_root(fixture.path()).unwrap();
        assert!(paths.state_dir.is_dir());
        assert!(paths.state_sys_dir.is_dir());
        assert!(paths.logs_dir.is_dir());
        assert!(paths.state_sys_dir.starts_with(&paths.state_dir));
    }

    #[test]
    fn from_root_accepts_existing_layout() {
        let fixture = TestFixtureRoot::new_unique("runtime-paths-existing").unwrap();
        fixture.init_runtime_layout().unwrap();
        let paths = RuntimePaths::from_root(fixture.path()).unwrap();
        assert!(paths.state_sys_dir.is_dir());
    }
}
