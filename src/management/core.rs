// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::bootstrap::{self, BootstrapError};
use crate::config::Config;
use crate::licenses::{FileUsage, LicenseRegistry, LicenseStore, NoFileUsage};
use crate::runtime_paths::RuntimePaths;
use crate::settings::{SettingsStore, YamlSettingsStore};
use std::path::Path;
use std::sync::Arc;

/// Everything a management handler needs to run a command against one
/// runtime root.
pub struct ManagementContext {
    pub config: Arc<Config>,
    pub runtime_paths: RuntimePaths,
    pub settings: Arc<dyn SettingsStore>,
    pub registry: Arc<LicenseRegistry>,
}

impl ManagementContext {
    pub fn from_components(
        config: Arc<Config>,
        runtime_paths: RuntimePaths,
        usage: Arc<dyn FileUsage>,
    ) -> Result<Self, BootstrapError> {
        let settings: Arc<dyn SettingsStore> = Arc::new(
            YamlSettingsStore::open(&runtime_paths.state_sys_dir)
                .map_err(BootstrapError::Settings)?,
        );
        let store = LicenseStore::new(&runtime_paths.state_sys_dir);
        let registry = Arc::new(LicenseRegistry::new(
            store,
            settings.clone(),
            usage,
            config.licenses.ordering,
        ));
        Ok(Self {
            config,
            runtime_paths,
            settings,
            registry,
        })
    }

    /// Bootstraps the root (config, state layout, core licenses) and builds
    /// a context on top of it.
    pub fn from_runtime_root(root: &Path) -> Result<Self, BootstrapError> {
        Self::from_runtime_root_with_usage(root, Arc::new(NoFileUsage))
    }

    pub fn from_runtime_root_with_usage(
        root: &Path,
        usage: Arc<dyn FileUsage>,
    ) -> Result<Self, BootstrapError> {
        let bootstrap = bootstrap::bootstrap_runtime(root)?;
        Self::from_components(Arc::new(bootstrap.config), bootstrap.runtime_paths, usage)
    }
}
