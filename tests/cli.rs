use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn help_lists_timer_options() {
    let mut cmd = cargo_bin_cmd!("gtd-timer");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--state-file"))
        .stdout(predicate::str::contains("--notify-command"))
        .stdout(predicate::str::contains("--headless"));
}

#[test]
fn unknown_flag_is_rejected() {
    let mut cmd = cargo_bin_cmd!("gtd-timer");
    cmd.arg("--minutes")
        .arg("5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}
