use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use rstest::rstest;

mod common;

use common::command::{head_commit_id, init_repository_dir, repository_dir, run_bit_command};

#[rstest]
fn new_branch_points_at_head(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let head = head_commit_id(dir);

    run_bit_command(dir, &["branch", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Created branch 'feature' at {}",
            &head[..7]
        )));

    init_repository_dir
        .child(".bit/refs/heads/feature")
        .assert(format!("{}\n", head));
}

#[rstest]
fn nested_branch_names_are_listed_with_slashes(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_bit_command(dir, &["branch", "feature/login"])
        .assert()
        .success();
    run_bit_command(dir, &["branch", "bugfix"]).assert().success();

    run_bit_command(dir, &["branch"])
        .assert()
        .success()
        .stdout(predicate::str::diff("  bugfix\n  feature/login\n* main\n"));
}

#[rstest]
fn branch_before_first_commit_fails(repository_dir: TempDir) {
    run_bit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_bit_command(repository_dir.path(), &["branch", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HEAD does not point to any commit yet"));
}

#[rstest]
fn duplicate_branch_is_rejected(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_bit_command(dir, &["branch", "feature"]).assert().success();

    run_bit_command(dir, &["branch", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a branch named 'feature' already exists"));
}

#[rstest]
#[case::leading_dot(".hidden")]
#[case::double_dot("a..b")]
#[case::lock_suffix("topic.lock")]
#[case::trailing_slash("topic/")]
#[case::whitespace("has space")]
fn invalid_branch_names_are_rejected(init_repository_dir: TempDir, #[case] name: &str) {
    run_bit_command(init_repository_dir.path(), &["branch", name])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid branch name"));
}

#[rstest]
fn current_branch_prints_attached_branch(init_repository_dir: TempDir) {
    run_bit_command(init_repository_dir.path(), &["current-branch"])
        .assert()
        .success()
        .stdout(predicate::str::diff("main\n"));
}

#[rstest]
fn current_branch_reports_detached_head(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let head = head_commit_id(dir);
    run_bit_command(dir, &["switch", &head]).assert().success();

    run_bit_command(dir, &["current-branch"])
        .assert()
        .success()
        .stdout(predicate::str::diff("detached HEAD\n"));
}
