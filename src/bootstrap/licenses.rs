// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{BootstrapError, log_action};
use crate::config::Config;
use crate::licenses::{LicenseData, LicenseError, LicenseRegistry, LicenseStore, NoFileUsage};
use crate::runtime_paths::RuntimePaths;
use crate::settings::{SettingsStore, YamlSettingsStore};
use std::sync::Arc;

// All core licenses ship with the same legacy version marker.
const CORE_LICENSE_VERSION: &str = "2010033100";

struct CoreLicenseDef {
    shortname: &'static str,
    fullname: &'static str,
    source: &'static str,
}

const CORE_LICENSES: [CoreLicenseDef; 9] = [
    CoreLicenseDef {
        shortname: "unknown",
        fullname: "Unknown license",
        source: "",
    },
    CoreLicenseDef {
        shortname: "allrightsreserved",
        fullname: "All rights reserved",
        source: "https://en.wikipedia.org/wiki/All_rights_reserved",
    },
    CoreLicenseDef {
        shortname: "public",
        fullname: "Public Domain",
        source: "https://en.wikipedia.org/wiki/Public_domain",
    },
    CoreLicenseDef {
        shortname: "cc",
        fullname: "Creative Commons",
        source: "https://creativecommons.org/licenses/by/3.0/",
    },
    CoreLicenseDef {
        shortname: "cc-nd",
        fullname: "Creative Commons - NoDerivs",
        source: "https://creativecommons.org/licenses/by-nd/3.0/",
    },
    CoreLicenseDef {
        shortname: "cc-nc-nd",
        fullname: "Creative Commons - No Commercial NoDerivs",
        source: "https://creativecommons.org/licenses/by-nc-nd/3.0/",
    },
    CoreLicenseDef {
        shortname: "cc-nc",
        fullname: "Creative Commons - No Commercial",
        source: "https://creativecommons.org/licenses/by-nc/3.0/",
    },
    CoreLicenseDef {
        shortname: "cc-nc-sa",
        fullname: "Creative Commons - No Commercial ShareAlike",
        source: "https://creativecommons.org/licenses/by-nc-sa/3.0/",
    },
    CoreLicenseDef {
        shortname: "cc-sa",
        fullname: "Creative Commons - ShareAlike",
        source: "https://creativecommons.org/licenses/by-sa/3.0/",
    },
];

/// Installs the preinstalled license set. Already-known shortnames are
/// skipped so re-running against an existing state directory never touches
/// records an administrator may have disabled or reordered since.
pub fn install_core_licenses(registry: &LicenseRegistry) -> Result<bool, LicenseError> {
    let mut installed = false;
    for definition in &CORE_LICENSES {
        if registry.get_by_shortname(definition.shortname)?.is_some() {
            log::debug!(
                "Core license '{}' already installed, skipping",
                definition.shortname
            );
            continue;
        }
        registry.add(&LicenseData {
            shortname: definition.shortname.to_string(),
            fullname: definition.fullname.to_string(),
            source: definition.source.to_string(),
            version: CORE_LICENSE_VERSION.to_string(),
            custom: false,
            enabled: true,
        })?;
        installed = true;
    }
    if registry.site_default()?.is_none() {
        registry.set_site_default(CORE_LICENSES[0].shortname)?;
    }
    Ok(installed)
}

pub fn ensure_licenses(
    runtime_paths: &RuntimePaths,
    config: &Config,
) -> Result<bool, BootstrapError> {
    let store = LicenseStore::new(&runtime_paths.state_sys_dir);
    let settings: Arc<dyn SettingsStore> = Arc::new(
        YamlSettingsStore::open(&runtime_paths.state_sys_dir).map_err(BootstrapError::Settings)?,
    );
    let registry = LicenseRegistry::new(
        store,
        settings,
        Arc::new(NoFileUsage),
        config.licenses.ordering,
    );
    let installed = install_core_licenses(&registry).map_err(BootstrapError::License)?;
    if installed {
        log_action("installed core licenses");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::licenses::LicenseFilter;
    use crate::licenses::registry::OrderPolicy;
    use crate::settings::MemorySettingsStore;
    use crate::util::test_fixtures::TestFixtureRoot;

    fn build_registry(fixture: &TestFixtureRoot) -> LicenseRegistry {
        fixture.init_runtime_layout().unwrap();
        let store = LicenseStore::new(&fixture.state_dir().join("sys"));
        LicenseRegistry::new(
            store,
            Arc::new(MemorySettingsStore::new()),
            Arc::new(NoFileUsage),
            OrderPolicy::Insertion,
        )
    }

    #[test]
    fn install_creates_nine_enabled_core_licenses() {
        let fixture = TestFixtureRoot::new_unique("install-core").unwrap();
        let registry = build_registry(&fixture);

        assert!(install_core_licenses(&registry).unwrap());

        let all = registry.get_all(LicenseFilter::default()).unwrap();
        assert_eq!(all.len(), 9);
        assert!(all.iter().all(|license| license.enabled && !license.custom));
        assert_eq!(registry.site_default().unwrap().as_deref(), Some("unknown"));
    }

    #[test]
    fn install_is_idempotent_and_keeps_admin_changes() {
        let fixture = TestFixtureRoot::new_unique("install-idempotent").unwrap();
        let registry = build_registry(&fixture);

        assert!(install_core_licenses(&registry).unwrap());
        registry.disable("cc-sa").unwrap();
        registry.set_site_default("public").unwrap();

        // Second run installs nothing and leaves admin state alone.
        assert!(!install_core_licenses(&registry).unwrap());
        let license = registry.get_by_shortname("cc-sa").unwrap().unwrap();
        assert!(!license.enabled);
        assert_eq!(registry.site_default().unwrap().as_deref(), Some("public"));
    }
}
