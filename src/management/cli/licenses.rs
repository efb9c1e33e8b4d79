// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::management::cli::{CliError, CommandSpec, DomainSpec, flag_value, take_positional};
use crate::management::{
    LicenseCommand, LicenseEditRequest, LicenseListRequest, LicenseTargetRequest,
};

pub fn domain() -> DomainSpec {
    DomainSpec {
        name: "license",
        aliases: &["lic"],
        commands: vec![
            CommandSpec {
                name: "create",
                usage: &[
                    "license create <shortname> --fullname <name> --source <url> --version <YYYYMMDD00>",
                ],
                parser: parse_create,
            },
            CommandSpec {
                name: "update",
                usage: &[
                    "license update <shortname> --fullname <name> --source <url> --version <YYYYMMDD00>",
                ],
                parser: parse_update,
            },
            CommandSpec {
                name: "delete",
                usage: &["license delete <shortname>"],
                parser: parse_delete,
            },
            CommandSpec {
                name: "enable",
                usage: &["license enable <shortname>"],
                parser: parse_enable,
            },
            CommandSpec {
                name: "disable",
                usage: &["license disable <shortname>"],
                parser: parse_disable,
            },
            CommandSpec {
                name: "moveup",
                usage: &["license moveup <shortname>"],
                parser: parse_moveup,
            },
            CommandSpec {
                name: "movedown",
                usage: &["license movedown <shortname>"],
                parser: parse_movedown,
            },
            CommandSpec {
                name: "set-default",
                usage: &["license set-default <shortname>"],
                parser: parse_set_default,
            },
            CommandSpec {
                name: "list",
                usage: &["license list"],
                parser: parse_list,
            },
            CommandSpec {
                name: "show",
                usage: &["license show <shortname>"],
                parser: parse_show,
            },
        ],
    }
}

fn parse_edit_fields(args: &[String], action: &str) -> Result<LicenseEditRequest, CliError> {
    let (shortname, rest) = take_positional(args, "license shortname")?;
    let mut fullname = None;
    let mut source = None;
    let mut version = None;

    let mut idx = 0;
    while idx < rest.len() {
        match rest[idx].as_str() {
            "--fullname" => {
                idx += 1;
                fullname = Some(flag_value(rest, &mut idx, "--fullname")?);
            }
            "--source" => {
                idx += 1;
                source = Some(flag_value(rest, &mut idx, "--source")?);
            }
            "--version" => {
                idx += 1;
                version = Some(flag_value(rest, &mut idx, "--version")?);
            }
            flag => {
                return Err(CliError::usage(format!(
                    "Unknown flag for license {}: {}",
                    action, flag
                )));
            }
        }
    }

    let fullname =
        fullname.ok_or_else(|| CliError::usage(format!("license {} requires --fullname", action)))?;
    let source =
        source.ok_or_else(|| CliError::usage(format!("license {} requires --source", action)))?;
    let version =
        version.ok_or_else(|| CliError::usage(format!("license {} requires --version", action)))?;

    Ok(LicenseEditRequest {
        shortname,
        fullname,
        source,
        version,
    })
}

fn parse_target(
    args: &[String],
    command: &str,
) -> Result<LicenseTargetRequest, CliError> {
    let (shortname, rest) = take_positional(args, "license shortname")?;
    if !rest.is_empty() {
        return Err(CliError::usage(format!(
            "license {} takes only <shortname>",
            command
        )));
    }
    Ok(LicenseTargetRequest { shortname })
}

fn parse_create(args: &[String]) -> Result<LicenseCommand, CliError> {
    Ok(LicenseCommand::Create(parse_edit_fields(args, "create")?))
}

fn parse_update(args: &[String]) -> Result<LicenseCommand, CliError> {
    Ok(LicenseCommand::Update(parse_edit_fields(args, "update")?))
}

fn parse_delete(args: &[String]) -> Result<LicenseCommand, CliError> {
    Ok(LicenseCommand::Delete(parse_target(args, "delete")?))
}

fn parse_enable(args: &[String]) -> Result<LicenseCommand, CliError> {
    Ok(LicenseCommand::Enable(parse_target(args, "enable")?))
}

fn parse_disable(args: &[String]) -> Result<LicenseCommand, CliError> {
    Ok(LicenseCommand::Disable(parse_target(args, "disable")?))
}

fn parse_moveup(args: &[String]) -> Result<LicenseCommand, CliError> {
    Ok(LicenseCommand::MoveUp(parse_target(args, "moveup")?))
}

fn parse_movedown(args: &[String]) -> Result<LicenseCommand, CliError> {
    Ok(LicenseCommand::MoveDown(parse_target(args, "movedown")?))
}

fn parse_set_default(args: &[String]) -> Result<LicenseCommand, CliError> {
    Ok(LicenseCommand::SetSiteDefault(parse_target(
        args,
        "set-default",
    )?))
}

fn parse_list(args: &[String]) -> Result<LicenseCommand, CliError> {
    if !args.is_empty() {
        return Err(CliError::usage("license list does not take any arguments"));
    }
    Ok(LicenseCommand::List(LicenseListRequest {}))
}

fn parse_show(args: &[String]) -> Result<LicenseCommand, CliError> {
    Ok(LicenseCommand::Show(parse_target(args, "show")?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_create_requires_all_fields() {
        let args = vec![
            "my-lic".to_string(),
            "--fullname".to_string(),
            "My License".to_string(),
        ];
        let err = parse_create(&args).unwrap_err();
        assert!(err.to_string().contains("--source"));
    }

    #[test]
    fn parse_create_builds_edit_request() {
        let args = vec![
            "my-lic".to_string(),
            "--fullname".to_string(),
            "My License".to_string(),
            "--source".to_string(),
            "https://example.org".to_string(),
            "--version".to_string(),
            "2020010100".to_string(),
        ];
        let command = parse_create(&args).expect("parse create");
        match command {
            LicenseCommand::Create(request) => {
                assert_eq!(request.shortname, "my-lic");
                assert_eq!(request.fullname, "My License");
                assert_eq!(request.source, "https://example.org");
                assert_eq!(request.version, "2020010100");
            }
            other => panic!("Expected create command, got {:?}", other),
        }
    }

    #[test]
    fn parse_create_rejects_unknown_flag() {
        let args = vec!["my-lic".to_string(), "--color".to_string()];
        let err = parse_create(&args).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"));
    }

    #[test]
    fn parse_delete_rejects_extra_args() {
        let args = vec!["my-lic".to_string(), "extra".to_string()];
        let err = parse_delete(&args).unwrap_err();
        assert!(err.to_string().contains("takes only"));
    }

    #[test]
    fn parse_list_rejects_args() {
        let args = vec!["extra".to_string()];
        let err = parse_list(&args).unwrap_err();
        assert!(err.to_string().contains("does not take"));
    }

    #[test]
    fn parse_show_requires_shortname() {
        let err = parse_show(&[]).unwrap_err();
        assert!(err.to_string().contains("Missing license shortname"));
    }
}
