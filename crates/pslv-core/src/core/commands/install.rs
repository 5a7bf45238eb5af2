//! Install, update, uninstall, and launch flows for a single solution.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use pslv_domain::{days_remaining, CatalogEntry, Environment, InstallRecord, TileState};
use serde_json::json;

use crate::core::actions::record_action;
use crate::core::commands::catalog::{find_entry, missing_entry_outcome, run_sync};
use crate::core::config::context::CommandContext;
use crate::core::tooling::outcome::ExecutionOutcome;
use crate::core::tooling::progress::ProgressReporter;
use crate::core::transfer::ChunkedCopy;
use crate::core::worker::{spawn_worker, WorkerEvent};

const DEFAULT_VERSION: &str = "1.0";

#[derive(Clone, Debug)]
pub struct InstallRequest {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct UpdateRequest {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct UninstallRequest {
    pub name: String,
    pub yes: bool,
}

#[derive(Clone, Debug)]
pub struct LaunchRequest {
    pub name: String,
}

struct Resolved {
    entry: CatalogEntry,
    record: InstallRecord,
    state: TileState,
}

fn resolve(ctx: &CommandContext, name: &str) -> std::result::Result<Resolved, ExecutionOutcome> {
    let sync = run_sync(ctx);
    let Some(entry) = find_entry(&sync.entries, name) else {
        return Err(missing_entry_outcome(name));
    };
    let record = InstallRecord::locate(&ctx.apps_dir(), &entry.name, &entry.executable_location);
    let state = TileState::evaluate(&entry, &record, ctx.today());
    Ok(Resolved {
        entry,
        record,
        state,
    })
}

fn expired_outcome(entry: &CatalogEntry, action: &str) -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        format!(
            "{}: {action} is disabled",
            TileState::Expired.status_line(entry.environment)
        ),
        json!({
            "solution": entry.name,
            "state": TileState::Expired.as_str(),
            "hint": "contact the launcher team for renewal",
        }),
    )
}

/// Copies the executable on a background worker, mirroring the percent
/// stream into a progress bar. Any failure becomes a command outcome; a
/// partial destination file is left where it stopped.
fn run_transfer(
    entry: &CatalogEntry,
    record: &InstallRecord,
) -> std::result::Result<(), ExecutionOutcome> {
    let source = PathBuf::from(&entry.executable_location);
    let destination = record.executable().to_path_buf();
    let install_dir = record.install_dir().to_path_buf();

    let reporter = ProgressReporter::bar(format!("Installing {}", entry.name), 100);
    let handle = spawn_worker("install", move |scope| {
        fs::create_dir_all(&install_dir)
            .with_context(|| format!("creating {}", install_dir.display()))?;
        let copy = ChunkedCopy::start(&source, &destination)?;
        for step in copy {
            if scope.cancelled() {
                bail!("installation cancelled");
            }
            scope.percent(step?);
        }
        Ok(())
    });

    let mut failure = None;
    while let Some(event) = handle.next_event() {
        match event {
            WorkerEvent::Percent(value) => reporter.set_current(usize::from(value)),
            WorkerEvent::Progress(text) => reporter.set_label(text),
            WorkerEvent::Finished(()) => {}
            WorkerEvent::Failed(message) => failure = Some(message),
        }
    }
    drop(reporter);

    match failure {
        None => Ok(()),
        Some(message) => Err(ExecutionOutcome::failure(
            format!("failed to install {}", entry.name),
            json!({
                "solution": entry.name,
                "error": message,
            }),
        )),
    }
}

fn marker_version(entry: &CatalogEntry) -> &str {
    entry.version_number.as_deref().unwrap_or(DEFAULT_VERSION)
}

pub fn solution_install(ctx: &CommandContext, request: &InstallRequest) -> Result<ExecutionOutcome> {
    let resolved = match resolve(ctx, &request.name) {
        Ok(resolved) => resolved,
        Err(outcome) => return Ok(outcome),
    };

    match resolved.state {
        TileState::Expired => return Ok(expired_outcome(&resolved.entry, "installation")),
        TileState::Installed => {
            return Ok(ExecutionOutcome::user_error(
                format!("{} is already installed", resolved.entry.name),
                json!({
                    "solution": resolved.entry.name,
                    "hint": format!("run `pslv launch {}`", resolved.entry.name),
                }),
            ))
        }
        TileState::UpdateAvailable => {
            return Ok(ExecutionOutcome::user_error(
                format!("{} is installed with an update pending", resolved.entry.name),
                json!({
                    "solution": resolved.entry.name,
                    "hint": format!("run `pslv update {}`", resolved.entry.name),
                }),
            ))
        }
        TileState::NotInstalled => {}
    }

    record_action(ctx, &format!("Installing {}", resolved.entry.name));
    if let Err(outcome) = run_transfer(&resolved.entry, &resolved.record) {
        return Ok(outcome);
    }
    let version = marker_version(&resolved.entry);
    resolved.record.write_version(version)?;

    Ok(ExecutionOutcome::success(
        format!("installed {} (version {version})", resolved.entry.name),
        json!({
            "solution": resolved.entry.name,
            "version": version,
            "install_dir": resolved.record.install_dir().display().to_string(),
            "executable": resolved.record.executable().display().to_string(),
        }),
    ))
}

pub fn solution_update(ctx: &CommandContext, request: &UpdateRequest) -> Result<ExecutionOutcome> {
    let resolved = match resolve(ctx, &request.name) {
        Ok(resolved) => resolved,
        Err(outcome) => return Ok(outcome),
    };

    match resolved.state {
        TileState::Expired => return Ok(expired_outcome(&resolved.entry, "updating")),
        TileState::NotInstalled => {
            return Ok(ExecutionOutcome::user_error(
                format!("{} is not installed", resolved.entry.name),
                json!({
                    "solution": resolved.entry.name,
                    "hint": format!("run `pslv install {}`", resolved.entry.name),
                }),
            ))
        }
        TileState::Installed => {
            return Ok(ExecutionOutcome::user_error(
                format!("{} is already on the catalog version", resolved.entry.name),
                json!({
                    "solution": resolved.entry.name,
                    "version": resolved.entry.version_number,
                    "hint": format!("run `pslv launch {}`", resolved.entry.name),
                }),
            ))
        }
        TileState::UpdateAvailable => {}
    }

    record_action(ctx, &format!("Updating {}", resolved.entry.name));
    if resolved.record.install_dir().exists() {
        resolved.record.remove()?;
    }
    if let Err(outcome) = run_transfer(&resolved.entry, &resolved.record) {
        return Ok(outcome);
    }
    let version = marker_version(&resolved.entry);
    resolved.record.write_version(version)?;

    Ok(ExecutionOutcome::success(
        format!("updated {} to version {version}", resolved.entry.name),
        json!({
            "solution": resolved.entry.name,
            "version": version,
            "install_dir": resolved.record.install_dir().display().to_string(),
        }),
    ))
}

pub fn solution_uninstall(
    ctx: &CommandContext,
    request: &UninstallRequest,
) -> Result<ExecutionOutcome> {
    let resolved = match resolve(ctx, &request.name) {
        Ok(resolved) => resolved,
        Err(outcome) => return Ok(outcome),
    };

    if resolved.state == TileState::Expired {
        return Ok(expired_outcome(&resolved.entry, "uninstalling"));
    }
    if !resolved.record.is_installed() {
        return Ok(ExecutionOutcome::user_error(
            format!("{} is not installed", resolved.entry.name),
            json!({ "solution": resolved.entry.name }),
        ));
    }
    if !request.yes {
        return Ok(ExecutionOutcome::user_error(
            format!("uninstalling {} needs confirmation", resolved.entry.name),
            json!({
                "solution": resolved.entry.name,
                "hint": format!("re-run as `pslv uninstall {} --yes`", resolved.entry.name),
            }),
        ));
    }

    if let Err(err) = resolved.record.remove() {
        // No automatic retry for destructive cleanup; report and leave the
        // directory for the user to inspect.
        return Ok(ExecutionOutcome::failure(
            format!("failed to uninstall {}", resolved.entry.name),
            json!({
                "solution": resolved.entry.name,
                "error": format!("{err:#}"),
            }),
        ));
    }
    record_action(ctx, &format!("Uninstalled {}", resolved.entry.name));

    Ok(ExecutionOutcome::success(
        format!("removed {}", resolved.entry.name),
        json!({ "solution": resolved.entry.name }),
    ))
}

pub fn solution_launch(ctx: &CommandContext, request: &LaunchRequest) -> Result<ExecutionOutcome> {
    let resolved = match resolve(ctx, &request.name) {
        Ok(resolved) => resolved,
        Err(outcome) => return Ok(outcome),
    };

    if resolved.state == TileState::Expired {
        return Ok(expired_outcome(&resolved.entry, "launching"));
    }
    if !resolved.record.is_installed() {
        return Ok(ExecutionOutcome::user_error(
            format!("{} is not installed", resolved.entry.name),
            json!({
                "solution": resolved.entry.name,
                "hint": format!("run `pslv install {}`", resolved.entry.name),
            }),
        ));
    }

    let mut details = json!({
        "solution": resolved.entry.name,
        "executable": resolved.record.executable().display().to_string(),
    });
    if !resolved.entry.is_registered() && resolved.entry.environment == Environment::Beta {
        let warning = match days_remaining(&resolved.entry, ctx.today()) {
            Some(days) => format!(
                "application is not registered and will stop working in {days} days"
            ),
            None => "application is not registered".to_string(),
        };
        tracing::warn!(solution = %resolved.entry.name, "{warning}");
        details["warning"] = json!(warning);
    }
    if resolved.state == TileState::UpdateAvailable {
        details["update_available"] = json!(true);
    }

    if let Err(err) = ctx.launcher().start(resolved.record.executable()) {
        return Ok(ExecutionOutcome::failure(
            format!("failed to launch {}", resolved.entry.name),
            json!({
                "solution": resolved.entry.name,
                "error": format!("{err:#}"),
            }),
        ));
    }
    record_action(ctx, &format!("Launched {}", resolved.entry.name));

    Ok(ExecutionOutcome::success(
        format!("launched {}", resolved.entry.name),
        details,
    ))
}
