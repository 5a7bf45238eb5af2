//! Administrator-side commands: privilege checks and catalog row edits.
//! These always talk to the live list service; the snapshot is a read-side
//! convenience and never a write target.

use anyhow::Result;
use pslv_domain::{columns, CatalogEntry, RawRow};
use serde_json::json;

use crate::core::config::context::CommandContext;
use crate::core::tooling::outcome::ExecutionOutcome;
use crate::core::worker::with_retry;

pub(crate) mod admin_columns {
    pub const SID: &str = "sid";
    pub const LOB: &str = "lob";
}

#[derive(Clone, Debug, Default)]
pub struct AdminAddRequest {
    pub name: String,
    pub description: String,
    pub executable_location: String,
    pub environment: String,
    pub release_date: String,
    pub validity_period_days: String,
    pub version_number: Option<String>,
    pub registration_id: Option<String>,
    pub access: String,
}

#[derive(Clone, Debug, Default)]
pub struct AdminUpdateRequest {
    pub name: String,
    pub description: Option<String>,
    pub executable_location: Option<String>,
    pub environment: Option<String>,
    pub release_date: Option<String>,
    pub validity_period_days: Option<String>,
    pub version_number: Option<String>,
    pub registration_id: Option<String>,
}

/// Line-of-business tags the current user administers, straight from the
/// admin list's `contains(sid)` query.
fn managed_lobs(ctx: &CommandContext) -> Result<Vec<String>> {
    let sid = ctx.user();
    let rows = ctx.list_service().fetch_contains(
        &ctx.config().lists.admins,
        admin_columns::SID,
        sid,
    )?;
    Ok(rows
        .iter()
        .filter(|row| {
            row.get(admin_columns::SID)
                .is_some_and(|v| v.eq_ignore_ascii_case(sid))
        })
        .filter_map(|row| row.get(admin_columns::LOB))
        .filter(|lob| !lob.is_empty())
        .cloned()
        .collect())
}

/// Admin commands are refused, not degraded, when the check cannot pass.
pub(crate) fn admin_gate(
    ctx: &CommandContext,
) -> std::result::Result<Vec<String>, ExecutionOutcome> {
    if !ctx.is_online() {
        return Err(ExecutionOutcome::user_error(
            "administration needs the list service",
            json!({ "hint": "re-run without PSLV_ONLINE=0" }),
        ));
    }
    match managed_lobs(ctx) {
        Err(err) => Err(ExecutionOutcome::user_error(
            "could not verify administrator access",
            json!({ "error": format!("{err:#}") }),
        )),
        Ok(lobs) if lobs.is_empty() => Err(ExecutionOutcome::user_error(
            format!("{} is not a launcher administrator", ctx.user()),
            json!({ "sid": ctx.user() }),
        )),
        Ok(lobs) => Ok(lobs),
    }
}

pub fn admin_check(ctx: &CommandContext) -> Result<ExecutionOutcome> {
    if !ctx.is_online() {
        return Ok(ExecutionOutcome::user_error(
            "administration needs the list service",
            json!({ "hint": "re-run without PSLV_ONLINE=0" }),
        ));
    }
    match managed_lobs(ctx) {
        Err(err) => Ok(ExecutionOutcome::user_error(
            "could not verify administrator access",
            json!({ "error": format!("{err:#}") }),
        )),
        Ok(lobs) => {
            let is_admin = !lobs.is_empty();
            let message = if is_admin {
                format!("{} administers: {}", ctx.user(), lobs.join(", "))
            } else {
                format!("{} is not a launcher administrator", ctx.user())
            };
            Ok(ExecutionOutcome::success(
                message,
                json!({ "sid": ctx.user(), "is_admin": is_admin, "managed_lobs": lobs }),
            ))
        }
    }
}

/// Fetches the catalog row whose name column matches exactly.
pub(crate) fn fetch_catalog_row(ctx: &CommandContext, name: &str) -> Result<Option<RawRow>> {
    let rows = ctx
        .list_service()
        .fetch_contains(&ctx.config().lists.catalog, columns::NAME, name)?;
    Ok(rows
        .into_iter()
        .find(|row| row.get(columns::NAME).is_some_and(|v| v.eq_ignore_ascii_case(name))))
}

pub fn admin_add(ctx: &CommandContext, request: &AdminAddRequest) -> Result<ExecutionOutcome> {
    if let Err(outcome) = admin_gate(ctx) {
        return Ok(outcome);
    }
    if request.name.trim().is_empty() {
        return Ok(ExecutionOutcome::user_error(
            "a catalog entry needs a name",
            json!({}),
        ));
    }
    if fetch_catalog_row(ctx, &request.name)?.is_some() {
        return Ok(ExecutionOutcome::user_error(
            format!("'{}' is already in the catalog", request.name),
            json!({
                "solution": request.name,
                "hint": format!("use `pslv admin update {}` to change it", request.name),
            }),
        ));
    }

    // Round-trip through the typed record so the stored row is normalized
    // the same way readers will see it.
    let mut raw = RawRow::new();
    raw.insert(columns::NAME.into(), request.name.clone());
    raw.insert(columns::DESCRIPTION.into(), request.description.clone());
    raw.insert(
        columns::EXECUTABLE_LOCATION.into(),
        request.executable_location.clone(),
    );
    raw.insert(columns::ENVIRONMENT.into(), request.environment.clone());
    raw.insert(columns::RELEASE_DATE.into(), request.release_date.clone());
    raw.insert(
        columns::VALIDITY_PERIOD_DAYS.into(),
        request.validity_period_days.clone(),
    );
    raw.insert(
        columns::VERSION_NUMBER.into(),
        request.version_number.clone().unwrap_or_default(),
    );
    raw.insert(
        columns::REGISTRATION_ID.into(),
        request.registration_id.clone().unwrap_or_default(),
    );
    raw.insert(columns::ACCESS.into(), request.access.clone());
    let entry = CatalogEntry::from_row(&raw);
    let row = entry.to_row();

    let list = ctx.config().lists.catalog.clone();
    with_retry("catalog add", || ctx.list_service().append(&list, &row))?;

    Ok(ExecutionOutcome::success(
        format!("added {} to the catalog", entry.name),
        json!({
            "solution": entry.name,
            "environment": entry.environment,
            "access": entry.access.as_column(),
        }),
    ))
}

pub fn admin_update(ctx: &CommandContext, request: &AdminUpdateRequest) -> Result<ExecutionOutcome> {
    if let Err(outcome) = admin_gate(ctx) {
        return Ok(outcome);
    }
    let Some(mut raw) = fetch_catalog_row(ctx, &request.name)? else {
        return Ok(ExecutionOutcome::user_error(
            format!("'{}' is not in the catalog", request.name),
            json!({
                "solution": request.name,
                "hint": "use `pslv admin add` to create it",
            }),
        ));
    };

    let overrides = [
        (columns::DESCRIPTION, request.description.as_ref()),
        (
            columns::EXECUTABLE_LOCATION,
            request.executable_location.as_ref(),
        ),
        (columns::ENVIRONMENT, request.environment.as_ref()),
        (columns::RELEASE_DATE, request.release_date.as_ref()),
        (
            columns::VALIDITY_PERIOD_DAYS,
            request.validity_period_days.as_ref(),
        ),
        (columns::VERSION_NUMBER, request.version_number.as_ref()),
        (columns::REGISTRATION_ID, request.registration_id.as_ref()),
    ];
    let mut changed = Vec::new();
    for (column, value) in overrides {
        if let Some(value) = value {
            raw.insert(column.to_string(), value.clone());
            changed.push(column);
        }
    }
    if changed.is_empty() {
        return Ok(ExecutionOutcome::user_error(
            "nothing to update",
            json!({ "hint": "pass at least one field, e.g. --version-number 2.0" }),
        ));
    }

    let entry = CatalogEntry::from_row(&raw);
    let row = entry.to_row();
    let list = ctx.config().lists.catalog.clone();
    let name = entry.name.clone();
    with_retry("catalog update", || {
        ctx.list_service().update(&list, columns::NAME, &name, &row)
    })?;

    Ok(ExecutionOutcome::success(
        format!("updated catalog entry {name}"),
        json!({ "solution": name, "changed": changed }),
    ))
}
