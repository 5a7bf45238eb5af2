use assert_cmd::Command;

#[test]
fn help_shows_the_everyday_workflow() {
    let assert = Command::cargo_bin("pslv")
        .expect("pslv binary")
        .arg("--help")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("Solution Launcher for VDI"));
    for command in ["sync", "list", "install", "launch", "uninstall", "admin", "access"] {
        assert!(stdout.contains(command), "help missing {command}");
    }
}

#[test]
fn subcommand_help_carries_usage_and_examples() {
    let assert = Command::cargo_bin("pslv")
        .expect("pslv binary")
        .args(["sync", "--help"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("snapshot"));
    assert!(stdout.contains("pslv --offline sync"));
}

#[test]
fn unknown_subcommands_fail_with_clap_usage() {
    Command::cargo_bin("pslv")
        .expect("pslv binary")
        .arg("teleport")
        .assert()
        .failure();
}
