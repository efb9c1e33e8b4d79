// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use relic::management::cli::CliRegistry;
use relic::management::{
    LicenseResponse, LicenseShowResponse, ManagementContext, handle_license_command,
};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_logger();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let registry = CliRegistry::default();

    let mut root = PathBuf::from(".");
    let mut tokens: Vec<String> = Vec::new();
    let mut idx = 0;
    while idx < args.len() {
        match args[idx].as_str() {
            "--root" => {
                idx += 1;
                match args.get(idx) {
                    Some(value) => root = PathBuf::from(value),
                    None => {
                        eprintln!("--root requires a value");
                        return ExitCode::from(2);
                    }
                }
                idx += 1;
            }
            "--help" | "-h" | "help" => {
                print_usage(&registry);
                return ExitCode::SUCCESS;
            }
            _ => {
                tokens.extend(args[idx..].iter().cloned());
                break;
            }
        }
    }

    if tokens.is_empty() {
        print_usage(&registry);
        return ExitCode::from(2);
    }

    let command = match registry.resolve_command(&tokens) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::from(err.exit_code() as u8);
        }
    };

    let context = match ManagementContext::from_runtime_root(&root) {
        Ok(context) => context,
        Err(err) => {
            eprintln!("Failed to open runtime root '{}': {}", root.display(), err);
            return ExitCode::from(1);
        }
    };

    match handle_license_command(command, &context) {
        Ok(response) => {
            print_response(response);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(1)
        }
    }
}

fn init_logger() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
            record.level(),
            record.args()
        )
    });
    builder.init();
}

fn print_usage(registry: &CliRegistry) {
    eprintln!("Usage: relic [--root <dir>] <domain> <command> [args...]");
    eprintln!();
    eprintln!("Commands:");
    for line in registry.usage_lines() {
        eprintln!("  {}", line);
    }
}

fn print_response(response: LicenseResponse) {
    match response {
        LicenseResponse::Message(text) => println!("{}", text),
        LicenseResponse::Show(show) => print_show(show),
        LicenseResponse::List(list) => {
            for row in list.licenses {
                let mut flags = vec![
                    if row.enabled { "enabled" } else { "disabled" },
                    if row.custom { "custom" } else { "core" },
                ];
                if row.is_site_default {
                    flags.push("default");
                }
                let moves = match (row.can_move_up, row.can_move_down) {
                    (true, true) => "up/down",
                    (true, false) => "up",
                    (false, true) => "down",
                    (false, false) => "-",
                };
                println!(
                    "{:<20} {:<45} {:<12} {:<24} {}",
                    row.shortname,
                    row.fullname,
                    row.version,
                    flags.join(","),
                    moves
                );
            }
        }
    }
}

fn print_show(show: LicenseShowResponse) {
    let license = show.license;
    println!("shortname: {}", license.shortname);
    println!("fullname:  {}", license.fullname);
    println!("source:    {}", license.source);
    println!("version:   {}", license.version);
    println!("custom:    {}", license.custom);
    println!("enabled:   {}", license.enabled);
    println!("default:   {}", show.is_site_default);
}
