//! The catalog sync policy: fetch the remote catalog, filter it down to the
//! current user, persist a snapshot, and degrade to the last snapshot (or an
//! empty catalog) on any failure. The contract is total: every path resolves
//! to one of the three sources, and failures travel as a reason string, not
//! as errors.

use std::path::PathBuf;

use anyhow::{bail, Result};
use pslv_domain::{load_snapshot, store_snapshot, CatalogEntry, RawRow};
use serde::Serialize;

use crate::core::config::context::CommandContext;
use crate::core::effects::ListService;
use crate::core::worker::with_retry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncSource {
    Remote,
    Snapshot,
    Empty,
}

impl SyncSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Snapshot => "snapshot",
            Self::Empty => "empty",
        }
    }
}

#[derive(Debug)]
pub struct SyncOutcome {
    pub entries: Vec<CatalogEntry>,
    pub source: SyncSource,
    pub reason: Option<String>,
}

/// Everything the sync needs, captured up front so the work can run on a
/// background thread without reaching back into ambient state.
#[derive(Clone, Debug)]
pub struct SyncRequest {
    pub list: String,
    pub user: String,
    pub snapshot_path: PathBuf,
    pub online: bool,
}

impl SyncRequest {
    pub fn from_context(ctx: &CommandContext) -> Self {
        Self {
            list: ctx.config().lists.catalog.clone(),
            user: ctx.config().user.sid.clone(),
            snapshot_path: ctx.config().paths.snapshot_path(),
            online: ctx.is_online(),
        }
    }
}

/// Progress callback handed through the sync stages. Background workers plug
/// their scope in; direct callers pass [`SilentProgress`].
pub trait SyncProgress {
    fn stage(&self, text: &str);
    fn cancelled(&self) -> bool {
        false
    }
}

pub struct SilentProgress;

impl SyncProgress for SilentProgress {
    fn stage(&self, _text: &str) {}
}

/// Runs the fetch-or-fallback policy. Never returns an error.
pub fn sync_catalog(
    service: &dyn ListService,
    request: &SyncRequest,
    progress: &dyn SyncProgress,
) -> SyncOutcome {
    match fetch_visible(service, request, progress) {
        Ok(entries) => {
            progress.stage("Saving local snapshot...");
            if let Err(err) = store_snapshot(&request.snapshot_path, &entries) {
                tracing::warn!(error = %err, "could not save catalog snapshot");
            }
            SyncOutcome {
                entries,
                source: SyncSource::Remote,
                reason: None,
            }
        }
        Err(err) => {
            let reason = format!("{err:#}");
            tracing::warn!(%reason, "catalog fetch failed, falling back");
            match load_snapshot(&request.snapshot_path) {
                Ok(entries) => SyncOutcome {
                    entries,
                    source: SyncSource::Snapshot,
                    reason: Some(reason),
                },
                Err(snapshot_err) => {
                    tracing::debug!(error = %snapshot_err, "no usable snapshot");
                    SyncOutcome {
                        entries: Vec::new(),
                        source: SyncSource::Empty,
                        reason: Some(reason),
                    }
                }
            }
        }
    }
}

fn fetch_visible(
    service: &dyn ListService,
    request: &SyncRequest,
    progress: &dyn SyncProgress,
) -> Result<Vec<CatalogEntry>> {
    if !request.online {
        bail!("offline mode (PSLV_ONLINE=0)");
    }
    progress.stage("Connecting to the list service...");
    if progress.cancelled() {
        bail!("cancelled");
    }

    progress.stage("Fetching application data...");
    let rows = with_retry("catalog fetch", || service.fetch_all(&request.list))?;
    if progress.cancelled() {
        bail!("cancelled");
    }

    progress.stage("Processing user access...");
    Ok(visible_entries(&rows, &request.user))
}

/// Rows tagged `everyone` plus rows whose access list contains the user.
fn visible_entries(rows: &[RawRow], user: &str) -> Vec<CatalogEntry> {
    rows.iter()
        .map(CatalogEntry::from_row)
        .filter(|entry| entry.access.grants(user))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use pslv_domain::columns;
    use std::sync::Mutex;

    struct StubList {
        responses: Mutex<Vec<Result<Vec<RawRow>>>>,
    }

    impl StubList {
        fn new(responses: Vec<Result<Vec<RawRow>>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    impl ListService for StubList {
        fn fetch_all(&self, _list: &str) -> Result<Vec<RawRow>> {
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(anyhow!("exhausted")))
        }

        fn fetch_contains(&self, _: &str, _: &str, _: &str) -> Result<Vec<RawRow>> {
            Err(anyhow!("not used"))
        }

        fn append(&self, _: &str, _: &RawRow) -> Result<()> {
            Err(anyhow!("not used"))
        }

        fn update(&self, _: &str, _: &str, _: &str, _: &RawRow) -> Result<()> {
            Err(anyhow!("not used"))
        }
    }

    fn row(name: &str, access: &str) -> RawRow {
        [
            (columns::NAME.to_string(), name.to_string()),
            (columns::ACCESS.to_string(), access.to_string()),
        ]
        .into_iter()
        .collect()
    }

    fn request(dir: &std::path::Path, online: bool) -> SyncRequest {
        SyncRequest {
            list: "catalog".into(),
            user: "u123".into(),
            snapshot_path: dir.join("snapshot.json"),
            online,
        }
    }

    #[test]
    fn remote_success_filters_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let service = StubList::new(vec![Ok(vec![
            row("ForEveryone", "everyone"),
            row("Mine", "U123;other"),
            row("NotMine", "someone-else"),
        ])]);
        let request = request(dir.path(), true);

        let outcome = sync_catalog(&service, &request, &SilentProgress);
        assert_eq!(outcome.source, SyncSource::Remote);
        assert_eq!(outcome.reason, None);
        let mut names: Vec<_> = outcome.entries.iter().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["ForEveryone", "Mine"]);

        let saved = load_snapshot(&request.snapshot_path).unwrap();
        assert_eq!(saved.len(), 2);
    }

    #[test]
    fn remote_failure_with_snapshot_returns_snapshot_and_reason() {
        let dir = tempfile::tempdir().unwrap();
        let request = request(dir.path(), true);
        let seeded = visible_entries(&[row("Cached", "everyone")], "u123");
        store_snapshot(&request.snapshot_path, &seeded).unwrap();

        // Three retry attempts all fail before the fallback engages.
        let service = StubList::new(vec![
            Err(anyhow!("timeout")),
            Err(anyhow!("timeout")),
            Err(anyhow!("timeout")),
        ]);
        let outcome = sync_catalog(&service, &request, &SilentProgress);
        assert_eq!(outcome.source, SyncSource::Snapshot);
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].name, "Cached");
        assert!(outcome.reason.as_deref().unwrap_or_default().contains("timeout"));
    }

    #[test]
    fn remote_failure_without_snapshot_returns_empty_with_reason() {
        let dir = tempfile::tempdir().unwrap();
        let request = request(dir.path(), true);
        let service = StubList::new(vec![
            Err(anyhow!("down")),
            Err(anyhow!("down")),
            Err(anyhow!("down")),
        ]);

        let outcome = sync_catalog(&service, &request, &SilentProgress);
        assert_eq!(outcome.source, SyncSource::Empty);
        assert!(outcome.entries.is_empty());
        assert!(outcome.reason.is_some());
    }

    #[test]
    fn transient_failure_recovers_within_the_retry_budget() {
        let dir = tempfile::tempdir().unwrap();
        let request = request(dir.path(), true);
        // Responses pop from the back: two failures, then success.
        let service = StubList::new(vec![
            Ok(vec![row("Late", "everyone")]),
            Err(anyhow!("flaky")),
            Err(anyhow!("flaky")),
        ]);

        let outcome = sync_catalog(&service, &request, &SilentProgress);
        assert_eq!(outcome.source, SyncSource::Remote);
        assert_eq!(outcome.entries[0].name, "Late");
    }

    #[test]
    fn offline_mode_goes_straight_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let request = request(dir.path(), false);
        let service = StubList::new(vec![Ok(vec![row("Unseen", "everyone")])]);

        let outcome = sync_catalog(&service, &request, &SilentProgress);
        assert_eq!(outcome.source, SyncSource::Empty);
        assert!(outcome.reason.as_deref().unwrap_or_default().contains("offline"));
    }
}
