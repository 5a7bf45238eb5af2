//! Access-list management: the only path that mutates who can see an entry.

use anyhow::Result;
use pslv_domain::{columns, CatalogEntry};
use serde_json::json;

use crate::core::actions::record_action;
use crate::core::commands::admin::{admin_gate, fetch_catalog_row};
use crate::core::config::context::CommandContext;
use crate::core::tooling::outcome::ExecutionOutcome;
use crate::core::worker::with_retry;

#[derive(Clone, Debug)]
pub struct AccessListRequest {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct AccessEditRequest {
    pub name: String,
    pub sid: String,
}

fn catalog_entry_or_outcome(
    ctx: &CommandContext,
    name: &str,
) -> Result<std::result::Result<CatalogEntry, ExecutionOutcome>> {
    if let Err(outcome) = admin_gate(ctx) {
        return Ok(Err(outcome));
    }
    match fetch_catalog_row(ctx, name)? {
        Some(row) => Ok(Ok(CatalogEntry::from_row(&row))),
        None => Ok(Err(ExecutionOutcome::user_error(
            format!("'{name}' is not in the catalog"),
            json!({ "solution": name }),
        ))),
    }
}

/// Writes only the access column back; the list service merges it into the
/// existing row.
fn store_access(ctx: &CommandContext, entry: &CatalogEntry) -> Result<()> {
    let mut row = pslv_domain::RawRow::new();
    row.insert(columns::ACCESS.to_string(), entry.access.as_column());
    let list = ctx.config().lists.catalog.clone();
    with_retry("access update", || {
        ctx.list_service()
            .update(&list, columns::NAME, &entry.name, &row)
    })
}

pub fn access_list(ctx: &CommandContext, request: &AccessListRequest) -> Result<ExecutionOutcome> {
    let entry = match catalog_entry_or_outcome(ctx, &request.name)? {
        Ok(entry) => entry,
        Err(outcome) => return Ok(outcome),
    };
    let ids = entry.access.ids();
    let message = if ids.is_empty() {
        format!("{} has an empty access list", entry.name)
    } else {
        format!("{} is visible to: {}", entry.name, ids.join(", "))
    };
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "solution": entry.name,
            "access": ids,
            "everyone": entry.access.grants_everyone(),
        }),
    ))
}

pub fn access_grant(ctx: &CommandContext, request: &AccessEditRequest) -> Result<ExecutionOutcome> {
    let mut entry = match catalog_entry_or_outcome(ctx, &request.name)? {
        Ok(entry) => entry,
        Err(outcome) => return Ok(outcome),
    };
    let sid = request.sid.trim().to_lowercase();
    if !entry.access.grant(&sid) {
        return Ok(ExecutionOutcome::success(
            format!("{sid} already had access to {}", entry.name),
            json!({ "solution": entry.name, "sid": sid }),
        ));
    }
    store_access(ctx, &entry)?;
    record_action(ctx, &format!("Granted {sid} access to {}", entry.name));
    Ok(ExecutionOutcome::success(
        format!("granted {sid} access to {}", entry.name),
        json!({
            "solution": entry.name,
            "sid": sid,
            "access": entry.access.ids(),
        }),
    ))
}

pub fn access_revoke(ctx: &CommandContext, request: &AccessEditRequest) -> Result<ExecutionOutcome> {
    let mut entry = match catalog_entry_or_outcome(ctx, &request.name)? {
        Ok(entry) => entry,
        Err(outcome) => return Ok(outcome),
    };
    let sid = request.sid.trim().to_lowercase();
    if !entry.access.revoke(&sid) {
        return Ok(ExecutionOutcome::user_error(
            format!("{sid} does not have direct access to {}", entry.name),
            json!({
                "solution": entry.name,
                "sid": sid,
                "access": entry.access.ids(),
            }),
        ));
    }
    store_access(ctx, &entry)?;
    record_action(ctx, &format!("Revoked {sid} access to {}", entry.name));
    Ok(ExecutionOutcome::success(
        format!("revoked {sid} access to {}", entry.name),
        json!({
            "solution": entry.name,
            "sid": sid,
            "access": entry.access.ids(),
        }),
    ))
}
