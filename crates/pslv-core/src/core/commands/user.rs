//! The current user's view of themselves, backed by the userbase list.

use anyhow::Result;
use serde_json::json;

use crate::core::actions::{ensure_user_registered, user_columns};
use crate::core::config::context::CommandContext;
use crate::core::tooling::outcome::ExecutionOutcome;

pub fn user_whoami(ctx: &CommandContext) -> Result<ExecutionOutcome> {
    let sid = ctx.user().to_string();
    if !ctx.is_online() {
        return Ok(ExecutionOutcome::success(
            format!("{sid} (offline)"),
            json!({ "sid": sid, "source": "local" }),
        ));
    }

    match ensure_user_registered(ctx) {
        Ok(Some(row)) => {
            let display = row
                .get(user_columns::DISPLAY_NAME)
                .filter(|name| !name.is_empty())
                .cloned();
            let message = match &display {
                Some(name) => format!("{sid} ({name})"),
                None => sid.clone(),
            };
            Ok(ExecutionOutcome::success(
                message,
                json!({ "sid": sid, "source": "userbase", "profile": row }),
            ))
        }
        Ok(None) => Ok(ExecutionOutcome::success(
            format!("registered {sid} in the userbase"),
            json!({ "sid": sid, "source": "userbase", "registered": true }),
        )),
        Err(err) => Ok(ExecutionOutcome::success(
            format!("{sid} (userbase unavailable)"),
            json!({
                "sid": sid,
                "source": "local",
                "error": format!("{err:#}"),
            }),
        )),
    }
}
