//! End-to-end tests for the `composer-stager clean` command.

#[allow(dead_code)]
mod common;
#[allow(unused_imports)]
use common::prelude::*;

#[test]
fn test_clean_removes_staging_dir() {
    let fixture = TestFixture::new().with_file("a.txt", "1");
    fixture.command().arg("begin").assert().success();
    assert!(fixture.staging().exists());

    fixture
        .command()
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed staging directory"));

    assert!(!fixture.staging().exists());
    assert_eq!(fixture.read("a.txt"), "1");
}

#[test]
fn test_clean_without_staging_dir_is_noop() {
    let fixture = TestFixture::new().with_file("a.txt", "1");

    for _ in 0..2 {
        fixture
            .command()
            .arg("clean")
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing to clean"));
    }
    assert_eq!(fixture.read("a.txt"), "1");
}

#[test]
fn test_clean_refuses_staging_dir_equal_to_active_dir() {
    let fixture = TestFixture::new().with_file("a.txt", "1");

    fixture
        .command()
        .args(["clean", "--staging-dir", "."])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("are the same"));
    assert_eq!(fixture.read("a.txt"), "1");
}

#[test]
fn test_begin_after_clean_succeeds() {
    let fixture = TestFixture::new().with_file("a.txt", "1");
    fixture.command().arg("begin").assert().success();
    fixture.command().arg("clean").assert().success();
    fixture.command().arg("begin").assert().success();
}
