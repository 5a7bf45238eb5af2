//! The local snapshot: last successfully fetched catalog, one file per user.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::catalog::CatalogEntry;

pub const SNAPSHOT_FILE: &str = "snapshot.json";

/// Reads the snapshot back. Only called when a remote fetch has failed.
pub fn load_snapshot(path: &Path) -> Result<Vec<CatalogEntry>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).context("invalid snapshot contents")
}

/// Overwrites the snapshot with a freshly fetched catalog. Full replacement,
/// never a merge.
pub fn store_snapshot(path: &Path, entries: &[CatalogEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut json = serde_json::to_vec_pretty(entries)?;
    json.push(b'\n');
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
