// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::yaml_store;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// Settings key holding the comma-joined insertion order of license shortnames.
pub const SETTING_LICENSE_ORDER: &str = "licenseorder";
/// Settings key holding the comma-joined priority order (site default first).
pub const SETTING_LICENSE_PRIORITY: &str = "licensepriority";
/// Settings key holding the comma-joined shortnames of enabled licenses.
pub const SETTING_ACTIVE_LICENSES: &str = "licenses";
/// Settings key holding the shortname of the site default license.
pub const SETTING_SITE_DEFAULT: &str = "sitedefaultlicense";

#[derive(Debug)]
pub struct SettingsError {
    message: String,
}

impl SettingsError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for SettingsError {}

/// Process-wide key-value configuration consumed by the license registry.
///
/// The registry only ever needs `get` and `set`; callers own the choice of
/// backing (a YAML file under `state/sys` in production, memory in tests).
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;
}

pub struct YamlSettingsStore {
    settings_file: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl YamlSettingsStore {
    pub fn open(state_sys_dir: &Path) -> Result<Self, SettingsError> {
        let settings_file = state_sys_dir.join(SETTINGS_FILE_NAME);
        let values = yaml_store::read_yaml(&settings_file, "settings")
            .map_err(|err| SettingsError::new(err.to_string()))?
            .unwrap_or_default();
        Ok(Self {
            settings_file,
            values: RwLock::new(values),
        })
    }
}

impl SettingsStore for YamlSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let guard = self
            .values
            .read()
            .map_err(|_| SettingsError::new("Settings store lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut guard = self
            .values
            .write()
            .map_err(|_| SettingsError::new("Settings store lock poisoned"))?;
        let mut updated = guard.clone();
        updated.insert(key.to_string(), value.to_string());
        yaml_store::write_yaml_atomic(&self.settings_file, "settings", &updated)
            .map_err(|err| SettingsError::new(err.to_string()))?;
        *guard = updated;
        Ok(())
    }
}

/// In-memory settings store for tests and embedders without a runtime root.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let guard = self
            .values
            .read()
            .map_err(|_| SettingsError::new("Settings store lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut guard = self
            .values
            .write()
            .map_err(|_| SettingsError::new("Settings store lock poisoned"))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn memory_store_round_trips_values() {
        let store = MemorySettingsStore::new();
        assert_eq!(store.get("sitedefaultlicense").unwrap(), None);
        store.set("sitedefaultlicense", "unknown").unwrap();
        assert_eq!(
            store.get("sitedefaultlicense").unwrap().as_deref(),
            Some("unknown")
        );
    }

    #[test]
    fn yaml_store_persists_across_reopen() {
        let fixture = TestFixtureRoot::new_unique("settings-reopen").unwrap();
        fixture.init_runtime_layout().unwrap();
        let state_sys_dir = fixture.state_dir().join("sys");

        let store = YamlSettingsStore::open(&state_sys_dir).unwrap();
        store.set("licenseorder", "unknown,cc").unwrap();

        let reopened = YamlSettingsStore::open(&state_sys_dir).unwrap();
        assert_eq!(
            reopened.get("licenseorder").unwrap().as_deref(),
            Some("unknown,cc")
        );
    }

    #[test]
    fn yaml_store_overwrites_existing_key() {
        let fixture = TestFixtureRoot::new_unique("settings-overwrite").unwrap();
        fixture.init_runtime_layout().unwrap();
        let state_sys_dir = fixture.state_dir().join("sys");

        let store = YamlSettingsStore::open(&state_sys_dir).unwrap();
        store.set("licenses", "unknown").unwrap();
        store.set("licenses", "unknown,cc").unwrap();
        assert_eq!(
            store.get("licenses").unwrap().as_deref(),
            Some("unknown,cc")
        );
    }
}
