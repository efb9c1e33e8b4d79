// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! License records and the ordered registry over them.
//!
//! A license is either CORE (preinstalled, immutable, never deleted) or
//! CUSTOM (user-defined, editable, deletable while unreferenced). The
//! registry layers a display order, an active list, and a protected site
//! default on top of the record store.

pub mod registry;
pub mod store;
pub mod usage;

pub use registry::{LicenseFilter, LicenseRegistry, MoveDirection, OrderPolicy};
pub use store::{LicenseRecord, LicenseStore};
pub use usage::{FileUsage, NoFileUsage, StaticFileUsage};

use chrono::NaiveDate;
use std::error::Error;
use std::fmt;
use validator::ValidateUrl;

pub const MAX_SHORTNAME_CHARS: usize = 64;
pub const MAX_FULLNAME_CHARS: usize = 256;
pub const MAX_SOURCE_CHARS: usize = 1024;

// Legacy version marker: an 8-digit calendar date plus two padding digits,
// e.g. "2010033100". Kept as an opaque string everywhere past validation.
const VERSION_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseError {
    CoreLicenseImmutable(String),
    LicenseInUse { shortname: String, references: u64 },
    LicenseNotFound(String),
    SiteDefaultProtected(String),
    DuplicateShortname(String),
    Validation(String),
    Storage(String),
}

impl fmt::Display for LicenseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicenseError::CoreLicenseImmutable(shortname) => {
                write!(f, "License '{}' is a core license and cannot be changed or deleted", shortname)
            }
            LicenseError::LicenseInUse {
                shortname,
                references,
            } => write!(
                f,
                "License '{}' is referenced by {} file(s) and cannot be deleted",
                shortname, references
            ),
            LicenseError::LicenseNotFound(shortname) => {
                write!(f, "License '{}' not found", shortname)
            }
            LicenseError::SiteDefaultProtected(shortname) => write!(
                f,
                "License '{}' is the site default and cannot be disabled or deleted",
                shortname
            ),
            LicenseError::DuplicateShortname(shortname) => {
                write!(f, "A license with shortname '{}' already exists", shortname)
            }
            LicenseError::Validation(message) => write!(f, "{}", message),
            LicenseError::Storage(message) => write!(f, "License storage error: {}", message),
        }
    }
}

impl Error for LicenseError {}

/// A license record joined with its shortname key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    pub shortname: String,
    pub id: u32,
    pub fullname: String,
    pub source: String,
    pub version: String,
    pub custom: bool,
    pub enabled: bool,
}

impl License {
    pub(crate) fn from_record(shortname: String, record: LicenseRecord) -> Self {
        Self {
            shortname,
            id: record.id,
            fullname: record.fullname,
            source: record.source,
            version: record.version,
            custom: record.custom,
            enabled: record.enabled,
        }
    }
}

/// Candidate record handed to [`LicenseRegistry::add`]. The `enabled` flag
/// only applies on insert; updates keep the stored flag.
#[derive(Debug, Clone)]
pub struct LicenseData {
    pub shortname: String,
    pub fullname: String,
    pub source: String,
    pub version: String,
    pub custom: bool,
    pub enabled: bool,
}

pub fn validate_shortname(shortname: &str) -> Result<(), LicenseError> {
    if shortname.is_empty() {
        return Err(LicenseError::Validation(
            "License shortname is required".to_string(),
        ));
    }
    if shortname.chars().count() > MAX_SHORTNAME_CHARS {
        return Err(LicenseError::Validation(format!(
            "License shortname must be at most {} characters",
            MAX_SHORTNAME_CHARS
        )));
    }
    if !shortname
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(LicenseError::Validation(format!(
            "License shortname '{}' contains invalid characters",
            shortname
        )));
    }
    Ok(())
}

pub fn validate_fullname(fullname: &str) -> Result<(), LicenseError> {
    if fullname.trim().is_empty() {
        return Err(LicenseError::Validation(
            "License full name is required".to_string(),
        ));
    }
    if fullname.chars().count() > MAX_FULLNAME_CHARS {
        return Err(LicenseError::Validation(format!(
            "License full name must be at most {} characters",
            MAX_FULLNAME_CHARS
        )));
    }
    Ok(())
}

/// Core licenses may carry an empty source (the preinstalled "unknown"
/// license does); custom licenses must point at real license terms.
pub fn validate_source(source: &str, allow_empty: bool) -> Result<(), LicenseError> {
    if source.is_empty() {
        if allow_empty {
            return Ok(());
        }
        return Err(LicenseError::Validation(
            "License source URL is required".to_string(),
        ));
    }
    if source.chars().count() > MAX_SOURCE_CHARS {
        return Err(LicenseError::Validation(format!(
            "License source must be at most {} characters",
            MAX_SOURCE_CHARS
        )));
    }
    if !source.validate_url() {
        return Err(LicenseError::Validation(format!(
            "License source '{}' is not a valid URL",
            source
        )));
    }
    Ok(())
}

pub fn validate_version(version: &str) -> Result<(), LicenseError> {
    if version.chars().count() != VERSION_CHARS || !version.chars().all(|c| c.is_ascii_digit()) {
        return Err(LicenseError::Validation(format!(
            "License version '{}' must be {} digits (a YYYYMMDD date plus two padding digits)",
            version, VERSION_CHARS
        )));
    }
    let date_part = &version[..8];
    if NaiveDate::parse_from_str(date_part, "%Y%m%d").is_err() {
        return Err(LicenseError::Validation(format!(
            "License version '{}' does not start with a valid YYYYMMDD date",
            version
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortname_charset_enforced() {
        assert!(validate_shortname("cc-nc-sa").is_ok());
        assert!(validate_shortname("all_rights.v2").is_ok());
        assert!(validate_shortname("").is_err());
        assert!(validate_shortname("has space").is_err());
        assert!(validate_shortname("sl/ash").is_err());
    }

    #[test]
    fn shortname_length_enforced() {
        assert!(validate_shortname(&"a".repeat(MAX_SHORTNAME_CHARS)).is_ok());
        assert!(validate_shortname(&"a".repeat(MAX_SHORTNAME_CHARS + 1)).is_err());
    }

    #[test]
    fn fullname_must_not_be_blank() {
        assert!(validate_fullname("Creative Commons").is_ok());
        assert!(validate_fullname("   ").is_err());
        assert!(validate_fullname(&"a".repeat(MAX_FULLNAME_CHARS + 1)).is_err());
    }

    #[test]
    fn source_must_be_absolute_url() {
        assert!(validate_source("https://creativecommons.org/licenses/by/3.0/", false).is_ok());
        assert!(validate_source("not a url", false).is_err());
        assert!(validate_source("", false).is_err());
        assert!(validate_source("", true).is_ok());
    }

    #[test]
    fn version_requires_date_prefix_and_padding() {
        assert!(validate_version("2010033100").is_ok());
        assert!(validate_version("2020010100").is_ok());
        // Wrong length, non-digit, and impossible calendar dates.
        assert!(validate_version("20100331").is_err());
        assert!(validate_version("2010x33100").is_err());
        assert!(validate_version("2010133100").is_err());
    }
}
