#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use serde_json::{json, Value};
use tempfile::TempDir;

/// A `pslv` invocation pinned to a throwaway home with a fixed identity.
/// Callers opt into online mode by overriding `PSLV_ONLINE`/`PSLV_SITE_URL`.
pub fn pslv(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pslv").expect("pslv binary");
    cmd.env("PSLV_HOME", home)
        .env("PSLV_USER", "u123")
        .env("PSLV_PROGRESS", "0")
        .env("PSLV_ONLINE", "0")
        .env_remove("PSLV_SITE_URL")
        .env_remove("PSLV_TOKEN")
        .env_remove("PSLV_APPS_DIR");
    cmd
}

pub fn home() -> TempDir {
    tempfile::Builder::new()
        .prefix("pslv-test")
        .tempdir()
        .expect("tempdir")
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn seed_snapshot(home: &Path, entries: &Value) {
    fs::create_dir_all(home).expect("home dir");
    fs::write(
        home.join(pslv_domain::SNAPSHOT_FILE),
        serde_json::to_vec_pretty(entries).expect("snapshot json"),
    )
    .expect("write snapshot");
}

/// A healthy catalog entry visible to everyone, valid for a century.
pub fn entry(name: &str, executable_location: &str) -> Value {
    json!({
        "name": name,
        "description": "test solution",
        "executable_location": executable_location,
        "environment": "PROD",
        "release_date": "2023-01-01",
        "validity_period_days": 36500,
        "version_number": "2.0",
        "registration_id": "REG-1",
        "access": "everyone",
    })
}

/// An entry whose 30-day validity window closed long ago.
pub fn expired_entry(name: &str) -> Value {
    json!({
        "name": name,
        "description": "old solution",
        "executable_location": "/shared/old.exe",
        "environment": "BETA",
        "release_date": "2023-01-01",
        "validity_period_days": 30,
        "access": "everyone",
    })
}
