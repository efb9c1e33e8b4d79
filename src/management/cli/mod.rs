// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod licenses;

use crate::management::LicenseCommand;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorKind {
    Usage,
    Execution,
}

#[derive(Debug, Clone)]
pub struct CliError {
    kind: CliErrorKind,
    message: String,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Usage,
            message: message.into(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Execution,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind {
            CliErrorKind::Usage => 2,
            CliErrorKind::Execution => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

pub struct CliRegistry {
    domains: Vec<DomainSpec>,
    aliases: BTreeSet<String>,
}

impl Default for CliRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        // The one management domain this tool ships. A static command table
        // cannot collide with itself.
        if let Err(err) = registry.register_domain(licenses::domain()) {
            unreachable!("license domain registration failed: {}", err);
        }
        registry
    }
}

impl CliRegistry {
    pub fn new() -> Self {
        Self {
            domains: Vec::new(),
            aliases: BTreeSet::new(),
        }
    }

    pub fn register_domain(&mut self, domain: DomainSpec) -> Result<(), CliError> {
        let domain_key = domain.name.to_ascii_lowercase();
        if !self.aliases.insert(domain_key) {
            return Err(CliError::usage(format!(
                "Duplicate domain name '{}'",
                domain.name
            )));
        }
        for alias in domain.aliases.iter() {
            if !self.aliases.insert(alias.to_ascii_lowercase()) {
                return Err(CliError::usage(format!("Duplicate domain alias '{}'", alias)));
            }
        }
        self.domains.push(domain);
        Ok(())
    }

    pub fn resolve_command(&self, tokens: &[String]) -> Result<LicenseCommand, CliError> {
        if tokens.is_empty() {
            return Err(CliError::usage("Missing command domain"));
        }
        let domain_token = tokens[0].to_ascii_lowercase();
        let domain = self
            .domains
            .iter()
            .find(|domain| {
                domain.name.eq_ignore_ascii_case(&domain_token)
                    || domain
                        .aliases
                        .iter()
                        .any(|alias| alias.eq_ignore_ascii_case(&domain_token))
            })
            .ok_or_else(|| CliError::usage(format!("Unknown domain '{}'", tokens[0])))?;
        if tokens.len() < 2 {
            return Err(CliError::usage(format!(
                "Missing command for domain '{}'",
                domain.name
            )));
        }
        let command_token = tokens[1].to_ascii_lowercase();
        let command = domain
            .commands
            .iter()
            .find(|command| command.name.eq_ignore_ascii_case(&command_token))
            .ok_or_else(|| {
                CliError::usage(format!(
                    "Unknown command '{}' for domain '{}'",
                    tokens[1], domain.name
                ))
            })?;
        (command.parser)(&tokens[2..])
    }

    pub fn usage_lines(&self) -> Vec<&'static str> {
        self.domains
            .iter()
            .flat_map(|domain| domain.commands.iter())
            .flat_map(|command| command.usage.iter().copied())
            .collect()
    }
}

pub struct DomainSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub commands: Vec<CommandSpec>,
}

pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static [&'static str],
    pub parser: fn(&[String]) -> Result<LicenseCommand, CliError>,
}

pub(crate) fn take_positional<'a>(
    args: &'a [String],
    label: &str,
) -> Result<(String, &'a [String]), CliError> {
    match args.split_first() {
        Some((value, rest)) => Ok((value.clone(), rest)),
        None => Err(CliError::usage(format!("Missing {}", label))),
    }
}

pub(crate) fn flag_value(args: &[String], idx: &mut usize, flag: &str) -> Result<String, CliError> {
    if *idx >= args.len() {
        return Err(CliError::usage(format!("{} requires a value", flag)));
    }
    let value = args[*idx].clone();
    *idx += 1;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rejects_unknown_domain() {
        let registry = CliRegistry::default();
        let tokens = vec!["widgets".to_string(), "list".to_string()];
        let err = registry.resolve_command(&tokens).unwrap_err();
        assert!(err.to_string().contains("Unknown domain"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn resolve_requires_a_command() {
        let registry = CliRegistry::default();
        let tokens = vec!["license".to_string()];
        let err = registry.resolve_command(&tokens).unwrap_err();
        assert!(err.to_string().contains("Missing command"));
    }

    #[test]
    fn resolve_accepts_domain_alias() {
        let registry = CliRegistry::default();
        let tokens = vec!["lic".to_string(), "list".to_string()];
        let command = registry.resolve_command(&tokens).expect("resolve");
        assert!(matches!(command, LicenseCommand::List(_)));
    }
}
