// This file is part of the product Relic.
// SPDX-FileCopyrightText: 2025-2026 Relic Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::licenses::{
    License, LicenseData, LicenseError, MoveDirection, OrderPolicy, validate_fullname,
    validate_shortname, validate_source, validate_version,
};
use crate::management::core::ManagementContext;
use serde::{Deserialize, Serialize};

/// The admin operations on licenses. One enum replaces the string-typed
/// action dispatch of form-driven admin pages.
#[derive(Debug, Clone)]
pub enum LicenseCommand {
    Create(LicenseEditRequest),
    Update(LicenseEditRequest),
    Delete(LicenseTargetRequest),
    Enable(LicenseTargetRequest),
    Disable(LicenseTargetRequest),
    MoveUp(LicenseTargetRequest),
    MoveDown(LicenseTargetRequest),
    SetSiteDefault(LicenseTargetRequest),
    List(LicenseListRequest),
    Show(LicenseTargetRequest),
}

/// Field tuple submitted by the form layer for create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseEditRequest {
    pub shortname: String,
    pub fullname: String,
    pub source: String,
    pub version: String,
}

impl LicenseEditRequest {
    fn validate(&self) -> Result<(), LicenseError> {
        validate_shortname(&self.shortname)?;
        validate_fullname(&self.fullname)?;
        validate_source(&self.source, false)?;
        validate_version(&self.version)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseTargetRequest {
    pub shortname: String,
}

impl LicenseTargetRequest {
    fn validate(&self) -> Result<(), LicenseError> {
        validate_shortname(&self.shortname)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseListRequest {}

#[derive(Debug, Clone)]
pub enum LicenseResponse {
    Message(String),
    List(LicenseListResponse),
    Show(LicenseShowResponse),
}

/// One display row, with the move affordances the list view renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseRow {
    pub shortname: String,
    pub fullname: String,
    pub source: String,
    pub version: String,
    pub custom: bool,
    pub enabled: bool,
    pub is_site_default: bool,
    pub can_move_up: bool,
    pub can_move_down: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseListResponse {
    pub licenses: Vec<LicenseRow>,
}

#[derive(Debug, Clone)]
pub struct LicenseShowResponse {
    pub license: License,
    pub is_site_default: bool,
}

pub fn handle_license_command(
    command: LicenseCommand,
    context: &ManagementContext,
) -> Result<LicenseResponse, LicenseError> {
    match command {
        LicenseCommand::Create(request) => handle_create(request, context),
        LicenseCommand::Update(request) => handle_update(request, context),
        LicenseCommand::Delete(request) => {
            request.validate()?;
            context.registry.delete(&request.shortname)?;
            Ok(message(format!("License '{}' deleted", request.shortname)))
        }
        LicenseCommand::Enable(request) => {
            request.validate()?;
            context.registry.enable(&request.shortname)?;
            Ok(message(format!("License '{}' enabled", request.shortname)))
        }
        LicenseCommand::Disable(request) => {
            request.validate()?;
            context.registry.disable(&request.shortname)?;
            Ok(message(format!("License '{}' disabled", request.shortname)))
        }
        LicenseCommand::MoveUp(request) => {
            request.validate()?;
            context
                .registry
                .reorder(&request.shortname, MoveDirection::Up)?;
            Ok(message(format!("License '{}' moved up", request.shortname)))
        }
        LicenseCommand::MoveDown(request) => {
            request.validate()?;
            context
                .registry
                .reorder(&request.shortname, MoveDirection::Down)?;
            Ok(message(format!(
                "License '{}' moved down",
                request.shortname
            )))
        }
        LicenseCommand::SetSiteDefault(request) => {
            request.validate()?;
            context.registry.set_site_default(&request.shortname)?;
            Ok(message(format!(
                "Site default license set to '{}'",
                request.shortname
            )))
        }
        LicenseCommand::List(_) => handle_list(context),
        LicenseCommand::Show(request) => {
            request.validate()?;
            let license = context
                .registry
                .get_by_shortname(&request.shortname)?
                .ok_or_else(|| LicenseError::LicenseNotFound(request.shortname.clone()))?;
            let is_site_default =
                context.registry.site_default()?.as_deref() == Some(request.shortname.as_str());
            Ok(LicenseResponse::Show(LicenseShowResponse {
                license,
                is_site_default,
            }))
        }
    }
}

/// Create refuses to touch an existing record: the shortname is the natural
/// key and silently upserting would let a form post overwrite somebody
/// else's license.
fn handle_create(
    request: LicenseEditRequest,
    context: &ManagementContext,
) -> Result<LicenseResponse, LicenseError> {
    request.validate()?;
    if context
        .registry
        .get_by_shortname(&request.shortname)?
        .is_some()
    {
        return Err(LicenseError::DuplicateShortname(request.shortname));
    }
    context.registry.add(&LicenseData {
        shortname: request.shortname.clone(),
        fullname: request.fullname,
        source: request.source,
        version: request.version,
        custom: true,
        enabled: true,
    })?;
    Ok(message(format!("License '{}' created", request.shortname)))
}

fn handle_update(
    request: LicenseEditRequest,
    context: &ManagementContext,
) -> Result<LicenseResponse, LicenseError> {
    request.validate()?;
    if context
        .registry
        .get_by_shortname(&request.shortname)?
        .is_none()
    {
        return Err(LicenseError::LicenseNotFound(request.shortname));
    }
    context.registry.add(&LicenseData {
        shortname: request.shortname.clone(),
        fullname: request.fullname,
        source: request.source,
        version: request.version,
        custom: true,
        enabled: true,
    })?;
    Ok(message(format!("License '{}' updated", request.shortname)))
}

fn handle_list(context: &ManagementContext) -> Result<LicenseResponse, LicenseError> {
    let licenses = context.registry.get_in_order()?;
    let site_default = context.registry.site_default()?;
    let policy = context.registry.order_policy();
    let count = licenses.len();

    let rows = licenses
        .into_iter()
        .enumerate()
        .map(|(index, license)| {
            let is_site_default = site_default.as_deref() == Some(license.shortname.as_str());
            let (can_move_up, can_move_down) = move_affordances(policy, index, count);
            LicenseRow {
                shortname: license.shortname,
                fullname: license.fullname,
                source: license.source,
                version: license.version,
                custom: license.custom,
                enabled: license.enabled,
                is_site_default,
                can_move_up,
                can_move_down,
            }
        })
        .collect();
    Ok(LicenseResponse::List(LicenseListResponse {
        licenses: rows,
    }))
}

fn move_affordances(policy: OrderPolicy, index: usize, count: usize) -> (bool, bool) {
    let floor = policy.first_movable_index();
    let can_move_up = index > floor;
    let can_move_down = index >= floor && index + 1 < count;
    (can_move_up, can_move_down)
}

fn message(text: String) -> LicenseResponse {
    LicenseResponse::Message(text)
}
