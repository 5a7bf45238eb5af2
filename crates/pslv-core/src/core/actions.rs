//! Action history and userbase writes. Both are best-effort remote appends
//! with the shared bounded retry; a launcher action never fails because its
//! audit row could not be written.

use anyhow::Result;
use pslv_domain::RawRow;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::core::config::context::CommandContext;
use crate::core::worker::with_retry;

pub(crate) mod action_columns {
    pub const SID: &str = "sid";
    pub const ACTION: &str = "action";
    pub const TIMESTAMP: &str = "timestamp";
}

pub(crate) mod user_columns {
    pub const SID: &str = "sid";
    pub const DISPLAY_NAME: &str = "display_name";
    pub const EMAIL: &str = "email";
    pub const JOB_TITLE: &str = "job_title";
    pub const BUILDING_NAME: &str = "building_name";
    pub const COST_CENTER_ID: &str = "cost_center_id";
}

fn timestamp_string() -> Result<String> {
    let now = OffsetDateTime::now_utc();
    Ok(now.format(&Rfc3339)?)
}

/// Appends `{sid, action}` to the action-history list. Skipped offline,
/// retried three times online, and downgraded to a warning when the retries
/// are spent.
pub fn record_action(ctx: &CommandContext, action: &str) {
    if !ctx.is_online() {
        tracing::debug!(action, "offline, skipping action history");
        return;
    }
    let mut row = RawRow::new();
    row.insert(action_columns::SID.into(), ctx.user().to_string());
    row.insert(action_columns::ACTION.into(), action.to_string());
    if let Ok(stamp) = timestamp_string() {
        row.insert(action_columns::TIMESTAMP.into(), stamp);
    }

    let list = ctx.config().lists.action_history.clone();
    let result = with_retry("action history", || {
        ctx.list_service().append(&list, &row)
    });
    if let Err(err) = result {
        tracing::warn!(action, error = %err, "could not record action history");
    }
}

/// Looks the user up in the userbase by a `contains(sid)` query; first sight
/// appends a minimal row so administrators can find them later.
pub fn ensure_user_registered(ctx: &CommandContext) -> Result<Option<RawRow>> {
    let lists = &ctx.config().lists;
    let sid = ctx.user().to_string();
    let rows = ctx
        .list_service()
        .fetch_contains(&lists.userbase, user_columns::SID, &sid)?;
    if let Some(row) = rows
        .into_iter()
        .find(|row| row.get(user_columns::SID).is_some_and(|v| v.eq_ignore_ascii_case(&sid)))
    {
        return Ok(Some(row));
    }

    let mut row = RawRow::new();
    row.insert(user_columns::SID.into(), sid);
    for column in [
        user_columns::DISPLAY_NAME,
        user_columns::EMAIL,
        user_columns::JOB_TITLE,
        user_columns::BUILDING_NAME,
        user_columns::COST_CENTER_ID,
    ] {
        row.insert(column.into(), String::new());
    }
    let list = lists.userbase.clone();
    with_retry("userbase append", || ctx.list_service().append(&list, &row))?;
    Ok(None)
}
