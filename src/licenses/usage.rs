// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::collections::BTreeMap;

/// Seam to the file-storage subsystem. The registry only asks one question,
/// and only while deleting: how many stored files reference this license?
pub trait FileUsage: Send + Sync {
    fn count_files_using_license(&self, shortname: &str) -> u64;
}

/// Usage oracle for deployments without a file subsystem attached.
pub struct NoFileUsage;

impl FileUsage for NoFileUsage {
    fn count_files_using_license(&self, _shortname: &str) -> u64 {
        0
    }
}

/// Fixed per-shortname counts, for tests and offline tooling.
#[derive(Default)]
pub struct StaticFileUsage {
    counts: BTreeMap<String, u64>,
}

impl StaticFileUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(mut self, shortname: &str, count: u64) -> Self {
        self.counts.insert(shortname.to_string(), count);
        self
    }
}

impl FileUsage for StaticFileUsage {
    fn count_files_using_license(&self, shortname: &str) -> u64 {
        self.counts.get(shortname).copied().unwrap_or(0)
    }
}
