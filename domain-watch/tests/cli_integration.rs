// domain-watch/tests/cli_integration.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const USAGE: &str =
    "Usage: domain-watch <domains_file> | <input> <status> | <input> <output> <status>";

/// Command isolated from the caller's config files, env and cwd.
fn watch_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("domain-watch").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir)
        .env_remove("DW_CONFIG")
        .env_remove("DW_RECHECK_DAYS")
        .env_remove("DW_MAX_CHECKS")
        .env_remove("DW_DELAY_MS")
        .env_remove("DW_REPORT_STYLE")
        .env_remove("DW_NOTIFY_SUMMARY")
        .env_remove("TELEGRAM_BOT_TOKEN")
        .env_remove("TELEGRAM_CHAT_ID")
        .arg("--log-file")
        .arg(dir.join("domain_watch.log"));
    cmd
}

#[test]
fn test_help_shows_flags() {
    let mut cmd = Command::cargo_bin("domain-watch").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--recheck-days"))
        .stdout(predicate::str::contains("--max-checks"))
        .stdout(predicate::str::contains("--report-style"))
        .stdout(predicate::str::contains("--notify-summary"));
}

#[test]
fn test_no_files_prints_usage() {
    let dir = TempDir::new().unwrap();
    watch_cmd(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains(USAGE));
}

#[test]
fn test_too_many_files_prints_usage() {
    let dir = TempDir::new().unwrap();
    watch_cmd(dir.path())
        .args(["a.csv", "b.csv", "c.csv", "d.csv"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(USAGE));
}

#[test]
fn test_missing_combined_roster_fails() {
    let dir = TempDir::new().unwrap();
    watch_cmd(dir.path())
        .arg("missing.csv")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load roster"));

    let log = fs::read_to_string(dir.path().join("domain_watch.log")).unwrap();
    assert!(log.contains(" - ERROR - "));
}

#[test]
fn test_empty_roster_reports_no_changes() {
    let dir = TempDir::new().unwrap();
    let roster = dir.path().join("domains.csv");
    fs::write(
        &roster,
        "domain,base_domain,generation_date,last_checked,status\n",
    )
    .unwrap();

    watch_cmd(dir.path())
        .arg(&roster)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 domains checked"))
        .stdout(predicate::str::contains("No status changes detected."));

    let rewritten = fs::read_to_string(&roster).unwrap();
    assert!(rewritten.starts_with("domain,base_domain,generation_date,last_checked,status"));
}

#[test]
fn test_split_layout_tolerates_missing_files() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.csv");
    let output = dir.path().join("output.csv");
    let status = dir.path().join("status.csv");

    watch_cmd(dir.path())
        .arg(&input)
        .arg(&output)
        .arg(&status)
        .assert()
        .success()
        .stdout(predicate::str::contains("No status changes detected."));

    let status_text = fs::read_to_string(&status).unwrap();
    assert!(status_text.starts_with("Domain,Status,Last_Checked"));
    let output_text = fs::read_to_string(&output).unwrap();
    assert!(output_text.starts_with("Domain,Status,Check_Time"));
}

#[test]
fn test_invalid_names_reported_on_stdout() {
    let dir = TempDir::new().unwrap();
    let roster = dir.path().join("domains.csv");
    fs::write(
        &roster,
        "domain,base_domain,generation_date,last_checked,status\nbad..name,,,,\n",
    )
    .unwrap();

    watch_cmd(dir.path())
        .args(["--delay-ms", "0"])
        .arg(&roster)
        .assert()
        .success()
        .stdout(predicate::str::contains("bad..name: error"))
        .stdout(predicate::str::contains(
            "::warning::Domain bad..name changed from unchecked to error",
        ));

    let rewritten = fs::read_to_string(&roster).unwrap();
    assert!(rewritten.contains("bad..name,,,"));
    assert!(rewritten.trim_end().ends_with(",error"));
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("watch.toml");
    fs::write(&config, "[report]\nstyle = \"loud\"\n").unwrap();
    let roster = dir.path().join("domains.csv");
    fs::write(
        &roster,
        "domain,base_domain,generation_date,last_checked,status\n",
    )
    .unwrap();

    watch_cmd(dir.path())
        .arg("--config")
        .arg(&config)
        .arg(&roster)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_invalid_report_style_flag_rejected() {
    let dir = TempDir::new().unwrap();
    watch_cmd(dir.path())
        .args(["--report-style", "loud", "domains.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loud"));
}
