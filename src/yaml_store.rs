// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug)]
pub(crate) struct YamlStoreError {
    message: String,
}

impl YamlStoreError {
    fn new(message: String) -> Self {
        Self { message }
    }
}

impl fmt::Display for YamlStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for YamlStoreError {}

/// Missing and empty files both read as `None`; callers decide what an
/// absent store means.
pub(crate) fn read_yaml<T: DeserializeOwned>(
    path: &Path,
    label: &str,
) -> Result<Option<T>, YamlStoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(YamlStoreError::new(format!(
                "Failed to read {} store '{}': {}",
                label,
                path.display(),
                err
            )));
        }
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|err| {
            YamlStoreError::new(format!(
                "Failed to parse {} store '{}': {}",
                label,
                path.display(),
                err
            ))
        })
}

/// The replacement file is staged next to the target and renamed into
/// place, so readers never observe a torn store.
pub(crate) fn write_yaml_atomic<T: Serialize>(
    path: &Path,
    label: &str,
    value: &T,
) -> Result<(), YamlStoreError> {
    let fail = |stage: &str, err: &dyn fmt::Display| {
        YamlStoreError::new(format!(
            "Failed to {} {} store '{}': {}",
            stage,
            label,
            path.display(),
            err
        ))
    };

    let content = serde_yaml::to_string(value).map_err(|err| fail("serialize", &err))?;
    let parent = path
        .parent()
        .ok_or_else(|| fail("stage", &"path has no parent directory"))?;
    let staging_path = parent.join(format!(".{}.{}.tmp", label, Uuid::new_v4()));

    let result = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&staging_path)
        .and_then(|mut staging| {
            staging.write_all(content.as_bytes())?;
            staging.sync_all()
        })
        .and_then(|_| fs::rename(&staging_path, path));
    if let Err(err) = result {
        let _ = fs::remove_file(&staging_path);
        return Err(fail("replace", &err));
    }

    #[cfg(unix)]
    if let Err(err) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
        log::warn!(
            "Directory sync after writing {} store '{}' failed: {}",
            label,
            path.display(),
            err
        );
    }

    Ok(())
}
