use std::fs;

use serde_json::json;

mod common;

use common::{entry, expired_entry, home, parse_json, pslv, seed_snapshot};

fn seed_source(dir: &std::path::Path, name: &str, bytes: usize) -> std::path::PathBuf {
    let source = dir.join(format!("{name}.exe"));
    fs::write(&source, vec![0x5A; bytes]).expect("seed source");
    source
}

#[test]
fn install_copies_the_executable_and_writes_the_marker() {
    let home = home();
    let shared = tempfile::tempdir().unwrap();
    let source = seed_source(shared.path(), "Ledger", 10_000);
    seed_snapshot(
        home.path(),
        &json!([entry("Ledger", source.to_str().unwrap())]),
    );

    let assert = pslv(home.path())
        .args(["--json", "install", "Ledger"])
        .assert()
        .success();

    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["details"]["version"], "2.0");

    let install_dir = home.path().join("apps").join("Ledger");
    assert_eq!(
        fs::read(install_dir.join("Ledger.exe")).unwrap(),
        vec![0x5A; 10_000]
    );
    assert_eq!(
        fs::read_to_string(install_dir.join("version.txt")).unwrap().trim(),
        "2.0"
    );
}

#[test]
fn install_twice_points_at_launch() {
    let home = home();
    let shared = tempfile::tempdir().unwrap();
    let source = seed_source(shared.path(), "Ledger", 128);
    seed_snapshot(
        home.path(),
        &json!([entry("Ledger", source.to_str().unwrap())]),
    );

    pslv(home.path()).args(["install", "Ledger"]).assert().success();
    let assert = pslv(home.path())
        .args(["--json", "install", "Ledger"])
        .assert()
        .failure()
        .code(1);

    let payload = parse_json(&assert);
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .contains("already installed"));
    assert!(payload["details"]["hint"]
        .as_str()
        .unwrap_or_default()
        .contains("pslv launch Ledger"));
}

#[test]
fn install_with_a_missing_source_fails_cleanly() {
    let home = home();
    seed_snapshot(
        home.path(),
        &json!([entry("Ledger", "/nowhere/Ledger.exe")]),
    );

    let assert = pslv(home.path())
        .args(["--json", "install", "Ledger"])
        .assert()
        .failure()
        .code(2);

    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "error");
    assert!(payload["details"]["error"]
        .as_str()
        .unwrap_or_default()
        .contains("source file not found"));
}

#[test]
fn install_refuses_expired_entries() {
    let home = home();
    seed_snapshot(home.path(), &json!([expired_entry("Abacus")]));

    let assert = pslv(home.path())
        .args(["--json", "install", "Abacus"])
        .assert()
        .failure()
        .code(1);

    let payload = parse_json(&assert);
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .contains("UAT Period Expired"));
}

#[test]
fn update_reinstalls_when_the_marker_is_stale() {
    let home = home();
    let shared = tempfile::tempdir().unwrap();
    let source = seed_source(shared.path(), "Ledger", 2048);
    seed_snapshot(
        home.path(),
        &json!([entry("Ledger", source.to_str().unwrap())]),
    );

    // An earlier install recorded version 1.5; the catalog now says 2.0.
    let install_dir = home.path().join("apps").join("Ledger");
    fs::create_dir_all(&install_dir).unwrap();
    fs::write(install_dir.join("Ledger.exe"), b"old build").unwrap();
    fs::write(install_dir.join("version.txt"), "1.5\n").unwrap();

    let assert = pslv(home.path())
        .args(["--json", "update", "Ledger"])
        .assert()
        .success();

    let payload = parse_json(&assert);
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .contains("updated Ledger to version 2.0"));
    assert_eq!(
        fs::read(install_dir.join("Ledger.exe")).unwrap(),
        vec![0x5A; 2048]
    );
    assert_eq!(
        fs::read_to_string(install_dir.join("version.txt")).unwrap().trim(),
        "2.0"
    );
}

#[test]
fn update_of_a_current_install_is_a_user_error() {
    let home = home();
    let shared = tempfile::tempdir().unwrap();
    let source = seed_source(shared.path(), "Ledger", 64);
    seed_snapshot(
        home.path(),
        &json!([entry("Ledger", source.to_str().unwrap())]),
    );

    pslv(home.path()).args(["install", "Ledger"]).assert().success();
    let assert = pslv(home.path())
        .args(["--json", "update", "Ledger"])
        .assert()
        .failure()
        .code(1);

    let payload = parse_json(&assert);
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .contains("already on the catalog version"));
}

#[test]
fn uninstall_requires_confirmation_then_removes_everything() {
    let home = home();
    let shared = tempfile::tempdir().unwrap();
    let source = seed_source(shared.path(), "Ledger", 64);
    seed_snapshot(
        home.path(),
        &json!([entry("Ledger", source.to_str().unwrap())]),
    );
    pslv(home.path()).args(["install", "Ledger"]).assert().success();

    let assert = pslv(home.path())
        .args(["--json", "uninstall", "Ledger"])
        .assert()
        .failure()
        .code(1);
    let payload = parse_json(&assert);
    assert!(payload["details"]["hint"]
        .as_str()
        .unwrap_or_default()
        .contains("--yes"));
    assert!(home.path().join("apps").join("Ledger").exists());

    pslv(home.path())
        .args(["uninstall", "Ledger", "--yes"])
        .assert()
        .success();
    assert!(!home.path().join("apps").join("Ledger").exists());
}

#[test]
fn uninstall_of_something_not_installed_is_a_user_error() {
    let home = home();
    seed_snapshot(home.path(), &json!([entry("Ledger", "/shared/Ledger.exe")]));

    let assert = pslv(home.path())
        .args(["--json", "uninstall", "Ledger", "--yes"])
        .assert()
        .failure()
        .code(1);
    let payload = parse_json(&assert);
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .contains("not installed"));
}

#[test]
fn launch_requires_an_install_first() {
    let home = home();
    seed_snapshot(home.path(), &json!([entry("Ledger", "/shared/Ledger.exe")]));

    let assert = pslv(home.path())
        .args(["--json", "launch", "Ledger"])
        .assert()
        .failure()
        .code(1);

    let payload = parse_json(&assert);
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .contains("not installed"));
    assert!(payload["details"]["hint"]
        .as_str()
        .unwrap_or_default()
        .contains("pslv install Ledger"));
}

#[test]
fn launch_surfaces_os_start_failures() {
    let home = home();
    let shared = tempfile::tempdir().unwrap();
    let source = seed_source(shared.path(), "Ledger", 64);
    seed_snapshot(
        home.path(),
        &json!([entry("Ledger", source.to_str().unwrap())]),
    );
    // The copied file has no execute permission, so the OS refuses it.
    pslv(home.path()).args(["install", "Ledger"]).assert().success();

    let assert = pslv(home.path())
        .args(["--json", "launch", "Ledger"])
        .assert()
        .failure()
        .code(2);

    let payload = parse_json(&assert);
    assert_eq!(payload["status"], "error");
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .contains("failed to launch Ledger"));
}

#[test]
fn launch_refuses_expired_entries_with_the_terminal_message() {
    let home = home();
    seed_snapshot(home.path(), &json!([expired_entry("Abacus")]));

    let assert = pslv(home.path())
        .args(["--json", "launch", "Abacus"])
        .assert()
        .failure()
        .code(1);

    let payload = parse_json(&assert);
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .contains("UAT Period Expired"));
    assert!(payload["details"]["hint"]
        .as_str()
        .unwrap_or_default()
        .contains("renewal"));
}
