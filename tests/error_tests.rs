//! Error scenario integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn vibecam_bin(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vibecam").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_RUNTIME_DIR", home.path())
        .env_remove("VIBECAM_OUTPUT_DIR");
    cmd
}

#[test]
fn config_get_unknown_key() {
    let home = TempDir::new().unwrap();
    vibecam_bin(&home)
        .args(["config", "get", "unknown_key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Valid keys"));
}

#[test]
fn config_set_unknown_key() {
    let home = TempDir::new().unwrap();
    vibecam_bin(&home)
        .args(["config", "set", "api_key", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn config_set_invalid_duration() {
    let home = TempDir::new().unwrap();
    vibecam_bin(&home)
        .args(["config", "set", "max_duration", "invalid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn config_set_invalid_container() {
    let home = TempDir::new().unwrap();
    vibecam_bin(&home)
        .args(["config", "set", "container", "avi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid container"));
}

#[test]
fn config_set_invalid_boolean() {
    let home = TempDir::new().unwrap();
    vibecam_bin(&home)
        .args(["config", "set", "camera", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'true' or 'false'"));
}

#[test]
fn config_set_zero_framerate() {
    let home = TempDir::new().unwrap();
    vibecam_bin(&home)
        .args(["config", "set", "capture.framerate", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive integer"));
}

#[test]
fn config_list_with_no_file() {
    let home = TempDir::new().unwrap();
    vibecam_bin(&home)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not set"))
        .stdout(predicate::str::contains("microphone"));
}

#[test]
fn malformed_config_file_is_reported() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("config").join("vibecam");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "camera = [not valid").unwrap();

    vibecam_bin(&home)
        .args(["config", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse"));
}

#[cfg(unix)]
#[test]
fn daemon_command_without_daemon() {
    let home = TempDir::new().unwrap();
    vibecam_bin(&home)
        .args(["daemon", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No daemon running"));
}
