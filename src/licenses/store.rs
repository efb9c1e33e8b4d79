// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::licenses::{LicenseError, validate_shortname};
use crate::yaml_store;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const LICENSES_FILE_NAME: &str = "licenses.yaml";

/// On-disk shape of one license, keyed by shortname in the store map.
/// The surrogate `id` is assigned on insert and survives updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LicenseRecord {
    pub id: u32,
    pub fullname: String,
    pub source: String,
    pub version: String,
    pub custom: bool,
    pub enabled: bool,
}

/// Backing store for license records: one YAML map under `state/sys`,
/// replaced atomically on every persist.
pub struct LicenseStore {
    licenses_file: PathBuf,
}

impl LicenseStore {
    pub fn new(state_sys_dir: &Path) -> Self {
        Self {
            licenses_file: state_sys_dir.join(LICENSES_FILE_NAME),
        }
    }

    pub fn load(&self) -> Result<BTreeMap<String, LicenseRecord>, LicenseError> {
        let raw: Option<BTreeMap<String, LicenseRecord>> =
            yaml_store::read_yaml(&self.licenses_file, "licenses")
                .map_err(|err| LicenseError::Storage(err.to_string()))?;
        let records = match raw {
            Some(records) => records,
            None => return Ok(BTreeMap::new()),
        };
        for shortname in records.keys() {
            validate_shortname(shortname).map_err(|err| {
                LicenseError::Storage(format!(
                    "Rejecting stored license '{}': {}",
                    shortname, err
                ))
            })?;
        }
        Ok(records)
    }

    pub fn persist(&self, records: &BTreeMap<String, LicenseRecord>) -> Result<(), LicenseError> {
        yaml_store::write_yaml_atomic(&self.licenses_file, "licenses", records)
            .map_err(|err| LicenseError::Storage(err.to_string()))
    }
}
