//! End-to-end tests for the `composer-stager status` command.

#[allow(dead_code)]
mod common;
#[allow(unused_imports)]
use common::prelude::*;

#[test]
fn test_status_before_begin() {
    let fixture = TestFixture::new().with_file("a.txt", "1");

    fixture
        .command()
        .args(["status", "--tool", "sh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] begin: ready"))
        .stdout(predicate::str::contains("[FAIL] stage: blocked"))
        .stdout(predicate::str::contains("[FAIL] commit: blocked"))
        .stdout(predicate::str::contains("[OK] clean: ready"))
        .stdout(predicate::str::contains(
            "[FAIL] Staging directory is ready",
        ));
}

#[test]
fn test_status_after_begin() {
    let fixture = TestFixture::new().with_file("a.txt", "1");
    fixture.command().arg("begin").assert().success();

    fixture
        .command()
        .args(["status", "--tool", "sh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[FAIL] begin: blocked"))
        .stdout(predicate::str::contains("[OK] stage: ready"))
        .stdout(predicate::str::contains("[OK] commit: ready"))
        .stdout(predicate::str::contains("The staging directory already exists"));
}

#[test]
fn test_status_reports_every_failing_leaf() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["status", "--active-dir", "missing", "--tool", "definitely-not-a-tool"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The active directory does not exist"))
        .stdout(predicate::str::contains("definitely-not-a-tool cannot be found"));
}
