//! Read-side catalog commands: sync, list, info.

use anyhow::Result;
use pslv_domain::{
    days_remaining, expiry_date, is_expired, order_catalog, CatalogEntry, Environment,
    InstallRecord, TileState, CATALOG_COLUMNS,
};
use serde_json::{json, Value};

use crate::core::config::context::CommandContext;
use crate::core::sync::{sync_catalog, SyncOutcome, SyncProgress, SyncRequest, SyncSource};
use crate::core::tooling::outcome::ExecutionOutcome;
use crate::core::tooling::progress::ProgressReporter;
use crate::core::worker::{spawn_worker, WorkerEvent, WorkerScope};

struct ScopeProgress<'a, T>(&'a WorkerScope<T>);

impl<T> SyncProgress for ScopeProgress<'_, T> {
    fn stage(&self, text: &str) {
        self.0.progress(text);
    }

    fn cancelled(&self) -> bool {
        self.0.cancelled()
    }
}

/// Runs the sync policy on a background worker while the foreground updates
/// the progress line. Total like the policy itself.
pub(crate) fn run_sync(ctx: &CommandContext) -> SyncOutcome {
    let effects = ctx.shared_effects();
    let request = SyncRequest::from_context(ctx);
    let reporter = ProgressReporter::spinner("Refreshing applications...");

    let handle = spawn_worker("sync", move |scope| {
        Ok(sync_catalog(effects.list(), &request, &ScopeProgress(scope)))
    });

    let mut outcome = None;
    while let Some(event) = handle.next_event() {
        match event {
            WorkerEvent::Progress(text) => reporter.set_label(text),
            WorkerEvent::Percent(_) => {}
            WorkerEvent::Finished(sync) => outcome = Some(sync),
            WorkerEvent::Failed(message) => {
                outcome = Some(SyncOutcome {
                    entries: Vec::new(),
                    source: SyncSource::Empty,
                    reason: Some(message),
                });
            }
        }
    }
    drop(reporter);
    outcome.unwrap_or_else(|| SyncOutcome {
        entries: Vec::new(),
        source: SyncSource::Empty,
        reason: Some("sync worker stopped before reporting".to_string()),
    })
}

/// Finds a visible entry by name, case-insensitively.
pub(crate) fn find_entry(entries: &[CatalogEntry], name: &str) -> Option<CatalogEntry> {
    entries
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .cloned()
}

pub(crate) fn missing_entry_outcome(name: &str) -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        format!("solution '{name}' is not in your catalog"),
        json!({
            "solution": name,
            "hint": "run `pslv list` to see the applications you can access",
        }),
    )
}

fn sync_details(source: SyncSource, entry_count: usize, reason: Option<&str>) -> Value {
    let mut details = json!({
        "source": source.as_str(),
        "entries": entry_count,
    });
    if let Some(reason) = reason {
        details["reason"] = json!(reason);
    }
    if source == SyncSource::Empty {
        details["columns"] = json!(CATALOG_COLUMNS);
    }
    details
}

pub fn catalog_sync(ctx: &CommandContext) -> Result<ExecutionOutcome> {
    let sync = run_sync(ctx);
    let count = sync.entries.len();
    let details = sync_details(sync.source, count, sync.reason.as_deref());
    Ok(match sync.source {
        SyncSource::Remote => ExecutionOutcome::success(
            format!("catalog refreshed ({count} visible entries)"),
            details,
        ),
        SyncSource::Snapshot => ExecutionOutcome::success(
            format!("list service unreachable; loaded local snapshot ({count} entries)"),
            details,
        ),
        SyncSource::Empty => {
            let mut details = details;
            details["hint"] = json!("check your connection, or set PSLV_SITE_URL");
            ExecutionOutcome::user_error("no catalog available", details)
        }
    })
}

pub fn catalog_list(ctx: &CommandContext) -> Result<ExecutionOutcome> {
    let sync = run_sync(ctx);
    let today = ctx.today();
    let mut entries = sync.entries;
    order_catalog(&mut entries, today);

    if entries.is_empty() {
        let mut details = sync_details(sync.source, 0, sync.reason.as_deref());
        details["hint"] = json!("contact your administrator for access permissions");
        return Ok(ExecutionOutcome::success("no application access", details));
    }

    let apps_dir = ctx.apps_dir();
    let mut lines = Vec::new();
    let mut rows = Vec::new();
    for entry in &entries {
        let record = InstallRecord::locate(&apps_dir, &entry.name, &entry.executable_location);
        let state = TileState::evaluate(entry, &record, today);
        lines.push(format!(
            "{}  [{}]  {}",
            entry.name,
            entry.environment,
            state.status_line(entry.environment)
        ));
        rows.push(json!({
            "name": entry.name,
            "environment": entry.environment,
            "description": entry.description,
            "state": state.as_str(),
            "status": state.status_line(entry.environment),
            "action": state.button_label(),
            "version": entry.version_number,
        }));
    }

    let mut details = json!({
        "source": sync.source.as_str(),
        "applications": rows,
    });
    if let Some(reason) = &sync.reason {
        details["reason"] = json!(reason);
    }
    Ok(ExecutionOutcome::success(lines.join("\n"), details))
}

pub fn catalog_info(ctx: &CommandContext, name: &str) -> Result<ExecutionOutcome> {
    let sync = run_sync(ctx);
    let Some(entry) = find_entry(&sync.entries, name) else {
        return Ok(missing_entry_outcome(name));
    };

    let today = ctx.today();
    let expired = is_expired(&entry, today);
    let registration = entry
        .registration_id
        .clone()
        .unwrap_or_else(|| "Not Registered".to_string());
    let mut details = json!({
        "solution": entry.name,
        "environment": entry.environment,
        "registration": registration,
        "release_date": entry.release_date,
        "status": if expired { "Expired" } else { "Active" },
    });
    if let Some(expiry) = expiry_date(&entry) {
        details["valid_until"] = json!(expiry.to_string());
    }
    if let Some(days) = days_remaining(&entry, today) {
        details["days_remaining"] = json!(days);
    }
    if expired {
        details["note"] = if !entry.is_registered() && entry.environment == Environment::Beta {
            json!("register the application at the registration portal")
        } else {
            json!("application has expired; contact the launcher team for renewal")
        };
    }

    let message = format!(
        "{} [{}] {}",
        entry.name,
        entry.environment,
        if expired { "Expired" } else { "Active" }
    );
    Ok(ExecutionOutcome::success(message, details))
}
