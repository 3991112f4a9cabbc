use assert_cmd::Command;
use predicates::prelude::*;

fn cmd(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("rentbooks").unwrap();
    cmd.env("HOME", home);
    cmd
}

fn setup(home: &std::path::Path) {
    let data_dir = home.join("data");
    cmd(home)
        .args(["init", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Database ready"));
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("rentbooks")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("addendum"));
}

#[test]
fn init_then_status() {
    let home = tempfile::tempdir().unwrap();
    setup(home.path());
    cmd(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Accounts:      0"));
}

#[test]
fn account_requires_known_bank() {
    let home = tempfile::tempdir().unwrap();
    setup(home.path());
    cmd(home.path())
        .args(["accounts", "add", "chase_checking", "--bank", "chase"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown bank"));
}

#[test]
fn manual_entry_flow() {
    let home = tempfile::tempdir().unwrap();
    setup(home.path());
    cmd(home.path())
        .args([
            "banks",
            "add",
            "chase",
            "--date-col",
            "1",
            "--description-col",
            "2",
            "--credit-col",
            "3",
        ])
        .assert()
        .success();
    cmd(home.path())
        .args(["accounts", "add", "chase_checking", "--bank", "chase"])
        .assert()
        .success();
    cmd(home.path())
        .args([
            "addendum",
            "add",
            "--account",
            "chase_checking",
            "--date",
            "2025-03-01",
            "--description",
            "CASH RENT",
            "--credit",
            "950",
        ])
        .assert()
        .success();
    cmd(home.path())
        .arg("transactions")
        .assert()
        .success()
        .stdout(predicate::str::contains("CASH RENT"))
        .stdout(predicate::str::contains("manual"));
    // Imported-row protection does not apply to manual rows.
    cmd(home.path())
        .args(["addendum", "delete", "1"])
        .assert()
        .success();
}

#[test]
fn rules_are_ordered_and_classify_matches() {
    let home = tempfile::tempdir().unwrap();
    setup(home.path());
    cmd(home.path())
        .args([
            "banks",
            "add",
            "chase",
            "--date-col",
            "1",
            "--description-col",
            "2",
            "--credit-col",
            "3",
        ])
        .assert()
        .success();
    cmd(home.path())
        .args(["accounts", "add", "chase_checking", "--bank", "chase"])
        .assert()
        .success();
    cmd(home.path())
        .args([
            "properties",
            "add",
            "maple_st",
            "--cost",
            "100000",
        ])
        .assert()
        .success();
    cmd(home.path())
        .args([
            "rules",
            "add",
            "--account",
            "chase_checking",
            "--pattern",
            "desc_contains=ACME PROPERTY",
            "--type",
            "rent",
            "--tax",
            "rental",
            "--property",
            "maple_st",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("position 1"));
    cmd(home.path())
        .args(["rules", "list", "--account", "chase_checking"])
        .assert()
        .success()
        .stdout(predicate::str::contains("desc_contains=ACME PROPERTY"));
    cmd(home.path())
        .args([
            "addendum",
            "add",
            "--account",
            "chase_checking",
            "--date",
            "2025-03-01",
            "--description",
            "ACME PROPERTY MGMT",
            "--credit",
            "1200",
        ])
        .assert()
        .success();
    // Manual rows are never classified.
    cmd(home.path())
        .args(["classify", "--account", "chase_checking"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 classified"));
}
