// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use crate::runtime_paths::RuntimePaths;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A throwaway runtime root for tests, deleted again on drop. Roots live
/// under `target/test-fixtures` so a crashed run leaves its debris where
/// `cargo clean` sweeps it up.
#[derive(Debug)]
pub struct TestFixtureRoot {
    path: PathBuf,
}

impl TestFixtureRoot {
    pub fn new_unique(prefix: &str) -> std::io::Result<Self> {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("target")
            .join("test-fixtures")
            .join(format!("{}-{}", prefix, Uuid::new_v4()));
        fs::create_dir_all(&root)?;
        Ok(Self { path: root })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path.join("state")
    }

    pub fn init_runtime_layout(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.state_dir().join("sys"))?;
        fs::create_dir_all(self.path.join("logs"))
    }

    pub fn runtime_paths(&self) -> std::io::Result<RuntimePaths> {
        self.init_runtime_layout()?;
        Ok(RuntimePaths {
            root: self.path.canonicalize()?,
            config_file: self.path.join("config.yaml"),
            state_dir: self.state_dir().canonicalize()?,
            state_sys_dir: self.state_dir().join("sys").canonicalize()?,
            logs_dir: self.path.join("logs").canonicalize()?,
        })
    }
}

impl Drop for TestFixtureRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}
