// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::licenses::store::{LicenseRecord, LicenseStore};
use crate::licenses::usage::FileUsage;
use crate::licenses::{License, LicenseData, LicenseError};
use crate::settings::{
    SETTING_ACTIVE_LICENSES, SETTING_LICENSE_ORDER, SETTING_LICENSE_PRIORITY, SETTING_SITE_DEFAULT,
    SettingsStore,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// How the display order treats the site default license.
///
/// `Insertion` keeps licenses exactly where the order list puts them.
/// `Priority` reserves position 0 for the site default; everything else
/// moves within positions 1..n.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderPolicy {
    Insertion,
    Priority,
}

impl OrderPolicy {
    pub fn settings_key(&self) -> &'static str {
        match self {
            OrderPolicy::Insertion => SETTING_LICENSE_ORDER,
            OrderPolicy::Priority => SETTING_LICENSE_PRIORITY,
        }
    }

    /// Index of the first position that participates in move-up/move-down
    /// swaps. Position 0 is off limits under the priority policy.
    pub fn first_movable_index(&self) -> usize {
        match self {
            OrderPolicy::Insertion => 0,
            OrderPolicy::Priority => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Exact-match filters for [`LicenseRegistry::get_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LicenseFilter {
    pub enabled: Option<bool>,
    pub custom: Option<bool>,
}

impl LicenseFilter {
    pub fn enabled(value: bool) -> Self {
        Self {
            enabled: Some(value),
            custom: None,
        }
    }

    pub fn custom(value: bool) -> Self {
        Self {
            enabled: None,
            custom: Some(value),
        }
    }

    fn matches(&self, record: &LicenseRecord) -> bool {
        if let Some(enabled) = self.enabled
            && record.enabled != enabled
        {
            return false;
        }
        if let Some(custom) = self.custom
            && record.custom != custom
        {
            return false;
        }
        true
    }
}

/// The ordered license registry.
///
/// Owns the record set, the display order, the denormalized active list and
/// the site-default pointer. Reads go through a single-slot snapshot that is
/// dropped on every mutation and rebuilt lazily from the backing store.
pub struct LicenseRegistry {
    store: LicenseStore,
    settings: Arc<dyn SettingsStore>,
    usage: Arc<dyn FileUsage>,
    policy: OrderPolicy,
    cache: RwLock<Option<BTreeMap<String, LicenseRecord>>>,
}

impl LicenseRegistry {
    pub fn new(
        store: LicenseStore,
        settings: Arc<dyn SettingsStore>,
        usage: Arc<dyn FileUsage>,
        policy: OrderPolicy,
    ) -> Self {
        Self {
            store,
            settings,
            usage,
            policy,
            cache: RwLock::new(None),
        }
    }

    pub fn order_policy(&self) -> OrderPolicy {
        self.policy
    }

    /// Inserts a new license or updates fullname/source/version of an
    /// existing one. Core records are immutable: any `add` against an
    /// existing core shortname is rejected before anything is written.
    pub fn add(&self, candidate: &LicenseData) -> Result<(), LicenseError> {
        let mut records = self.snapshot()?;
        match records.get(&candidate.shortname) {
            Some(existing) if !existing.custom => {
                return Err(LicenseError::CoreLicenseImmutable(
                    candidate.shortname.clone(),
                ));
            }
            Some(existing) => {
                let updated = LicenseRecord {
                    id: existing.id,
                    enabled: existing.enabled,
                    fullname: candidate.fullname.clone(),
                    source: candidate.source.clone(),
                    version: candidate.version.clone(),
                    custom: candidate.custom,
                };
                records.insert(candidate.shortname.clone(), updated);
            }
            None => {
                let id = next_record_id(&records);
                records.insert(
                    candidate.shortname.clone(),
                    LicenseRecord {
                        id,
                        fullname: candidate.fullname.clone(),
                        source: candidate.source.clone(),
                        version: candidate.version.clone(),
                        custom: candidate.custom,
                        enabled: candidate.enabled,
                    },
                );
            }
        }
        self.commit(&records)?;
        self.append_to_order(&candidate.shortname)?;
        self.write_active_list(&records)?;
        log::info!("License '{}' saved", candidate.shortname);
        Ok(())
    }

    /// Exact-match lookup. Absence is `None`, never an error.
    pub fn get_by_shortname(&self, shortname: &str) -> Result<Option<License>, LicenseError> {
        let records = self.snapshot()?;
        Ok(records
            .get(shortname)
            .map(|record| License::from_record(shortname.to_string(), record.clone())))
    }

    pub fn get_all(&self, filter: LicenseFilter) -> Result<Vec<License>, LicenseError> {
        let records = self.snapshot()?;
        Ok(records
            .into_iter()
            .filter(|(_, record)| filter.matches(record))
            .map(|(shortname, record)| License::from_record(shortname, record))
            .collect())
    }

    /// Materializes the display order. Licenses missing from the stored
    /// order are appended (repairing drift); under the priority policy the
    /// site default is forced to position 0. The stored order is rewritten
    /// whenever repair or pinning changed it.
    pub fn get_in_order(&self) -> Result<Vec<License>, LicenseError> {
        let records = self.snapshot()?;
        let stored = self.read_order()?;

        let mut ordered: Vec<String> = Vec::with_capacity(records.len());
        for shortname in &stored {
            if records.contains_key(shortname) && !ordered.contains(shortname) {
                ordered.push(shortname.clone());
            }
        }
        for shortname in records.keys() {
            if !ordered.contains(shortname) {
                log::debug!("License '{}' missing from stored order, appending", shortname);
                ordered.push(shortname.clone());
            }
        }

        if self.policy == OrderPolicy::Priority
            && let Some(site_default) = self.site_default()?
            && let Some(position) = ordered.iter().position(|name| *name == site_default)
            && position > 0
        {
            let pinned = ordered.remove(position);
            ordered.insert(0, pinned);
        }

        if ordered != stored {
            self.write_order(&ordered)?;
        }

        Ok(ordered
            .into_iter()
            .filter_map(|shortname| {
                records
                    .get(&shortname)
                    .cloned()
                    .map(|record| License::from_record(shortname, record))
            })
            .collect())
    }

    pub fn enable(&self, shortname: &str) -> Result<(), LicenseError> {
        self.set_enabled(shortname, true)
    }

    /// The site default license can never be disabled.
    pub fn disable(&self, shortname: &str) -> Result<(), LicenseError> {
        if self.site_default()?.as_deref() == Some(shortname) {
            return Err(LicenseError::SiteDefaultProtected(shortname.to_string()));
        }
        self.set_enabled(shortname, false)
    }

    /// Deletes a custom license. Every constraint is checked before any
    /// write: the record must exist, must not be core, must not be the site
    /// default, and must not be referenced by stored files.
    pub fn delete(&self, shortname: &str) -> Result<(), LicenseError> {
        let mut records = self.snapshot()?;
        let record = records
            .get(shortname)
            .ok_or_else(|| LicenseError::LicenseNotFound(shortname.to_string()))?;
        if !record.custom {
            return Err(LicenseError::CoreLicenseImmutable(shortname.to_string()));
        }
        if self.site_default()?.as_deref() == Some(shortname) {
            return Err(LicenseError::SiteDefaultProtected(shortname.to_string()));
        }
        let references = self.usage.count_files_using_license(shortname);
        if references > 0 {
            return Err(LicenseError::LicenseInUse {
                shortname: shortname.to_string(),
                references,
            });
        }

        records.remove(shortname);
        self.commit(&records)?;
        let mut order = self.read_order()?;
        order.retain(|name| name != shortname);
        self.write_order(&order)?;
        self.write_active_list(&records)?;
        log::info!("License '{}' deleted", shortname);
        Ok(())
    }

    /// Moves a license one step within the order. Out-of-band positions are
    /// no-ops, but the order is persisted regardless so any drift picked up
    /// along the way is normalized.
    pub fn reorder(&self, shortname: &str, direction: MoveDirection) -> Result<(), LicenseError> {
        let mut order: Vec<String> = self
            .get_in_order()?
            .into_iter()
            .map(|license| license.shortname)
            .collect();

        if let Some(index) = order.iter().position(|name| name == shortname) {
            let floor = self.policy.first_movable_index();
            match direction {
                MoveDirection::Up if index > floor => order.swap(index, index - 1),
                MoveDirection::Down if index >= floor && index + 1 < order.len() => {
                    order.swap(index, index + 1)
                }
                _ => {}
            }
        }

        self.write_order(&order)
    }

    /// Repoints the site default. Validates that the shortname is known
    /// before committing, so the default pointer can never dangle.
    pub fn set_site_default(&self, shortname: &str) -> Result<(), LicenseError> {
        let records = self.snapshot()?;
        if !records.contains_key(shortname) {
            return Err(LicenseError::LicenseNotFound(shortname.to_string()));
        }
        self.settings
            .set(SETTING_SITE_DEFAULT, shortname)
            .map_err(|err| LicenseError::Storage(err.to_string()))
    }

    pub fn site_default(&self) -> Result<Option<String>, LicenseError> {
        let value = self
            .settings
            .get(SETTING_SITE_DEFAULT)
            .map_err(|err| LicenseError::Storage(err.to_string()))?;
        Ok(value.filter(|shortname| !shortname.is_empty()))
    }

    /// The enabled licenses in display order, resolved through the
    /// denormalized active list.
    pub fn active_licenses(&self) -> Result<Vec<License>, LicenseError> {
        let raw = self
            .settings
            .get(SETTING_ACTIVE_LICENSES)
            .map_err(|err| LicenseError::Storage(err.to_string()))?
            .unwrap_or_default();
        let active: Vec<&str> = raw.split(',').filter(|name| !name.is_empty()).collect();
        Ok(self
            .get_in_order()?
            .into_iter()
            .filter(|license| active.contains(&license.shortname.as_str()))
            .collect())
    }

    fn set_enabled(&self, shortname: &str, enabled: bool) -> Result<(), LicenseError> {
        let mut records = self.snapshot()?;
        if let Some(record) = records.get_mut(shortname) {
            record.enabled = enabled;
            self.commit(&records)?;
            log::info!(
                "License '{}' {}",
                shortname,
                if enabled { "enabled" } else { "disabled" }
            );
        }
        // The active list is recomputed on every toggle, even when the
        // shortname was unknown.
        self.write_active_list(&records)
    }

    fn snapshot(&self) -> Result<BTreeMap<String, LicenseRecord>, LicenseError> {
        {
            let guard = self
                .cache
                .read()
                .map_err(|_| LicenseError::Storage("License cache lock poisoned".to_string()))?;
            if let Some(records) = guard.as_ref() {
                return Ok(records.clone());
            }
        }
        let records = self.store.load()?;
        let mut guard = self
            .cache
            .write()
            .map_err(|_| LicenseError::Storage("License cache lock poisoned".to_string()))?;
        *guard = Some(records.clone());
        Ok(records)
    }

    fn commit(&self, records: &BTreeMap<String, LicenseRecord>) -> Result<(), LicenseError> {
        self.store.persist(records)?;
        let mut guard = self
            .cache
            .write()
            .map_err(|_| LicenseError::Storage("License cache lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }

    fn read_order(&self) -> Result<Vec<String>, LicenseError> {
        let raw = self
            .settings
            .get(self.policy.settings_key())
            .map_err(|err| LicenseError::Storage(err.to_string()))?;
        Ok(raw
            .map(|value| {
                value
                    .split(',')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn write_order(&self, order: &[String]) -> Result<(), LicenseError> {
        self.settings
            .set(self.policy.settings_key(), &order.join(","))
            .map_err(|err| LicenseError::Storage(err.to_string()))
    }

    fn append_to_order(&self, shortname: &str) -> Result<(), LicenseError> {
        let mut order = self.read_order()?;
        if !order.iter().any(|name| name == shortname) {
            order.push(shortname.to_string());
            self.write_order(&order)?;
        }
        Ok(())
    }

    fn write_active_list(
        &self,
        records: &BTreeMap<String, LicenseRecord>,
    ) -> Result<(), LicenseError> {
        let active: Vec<&str> = records
            .iter()
            .filter(|(_, record)| record.enabled)
            .map(|(shortname, _)| shortname.as_str())
            .collect();
        self.settings
            .set(SETTING_ACTIVE_LICENSES, &active.join(","))
            .map_err(|err| LicenseError::Storage(err.to_string()))
    }
}

fn next_record_id(records: &BTreeMap<String, LicenseRecord>) -> u32 {
    records
        .values()
        .map(|record| record.id)
        .max()
        .map_or(1, |max| max + 1)
}
