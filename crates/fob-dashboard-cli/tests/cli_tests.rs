//! Smoke tests for the `fob-dashboard` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn dashboard() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fob-dashboard"));
    cmd.env_remove("FOB_DASHBOARD_HOST")
        .env_remove("FOB_DASHBOARD_PORT")
        .env_remove("FOB_DASHBOARD_ROOT");
    cmd
}

#[test]
fn test_help_lists_options() {
    dashboard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--minimal"))
        .stdout(predicate::str::contains("--port"));
}

#[test]
fn test_version() {
    dashboard()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_port_is_reported() {
    dashboard()
        .args(["--port", "0", "--no-color"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for 'port'"));
}

#[cfg(unix)]
#[test]
fn test_exits_with_child_code() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
        .to_string();

    dashboard()
        .args(["--port", port.as_str(), "--minimal", "--no-color", "--", "sh", "-c", "exit 3"])
        .assert()
        .code(3);
}
