use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use rstest::rstest;

mod common;

use common::command::{commit_file, head_commit_id, init_repository_dir, run_bit_command};

#[rstest]
fn switching_branches_updates_the_working_tree(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_bit_command(dir, &["branch", "feature"]).assert().success();
    run_bit_command(dir, &["switch", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to branch 'feature'"));

    commit_file(dir, "a.txt", "changed", "Change a");
    commit_file(dir, "nested/b.txt", "new", "Add b");

    run_bit_command(dir, &["switch", "main"]).assert().success();
    init_repository_dir.child("a.txt").assert("1");
    init_repository_dir.child("nested/b.txt").assert(predicate::path::missing());
    init_repository_dir.child("nested").assert(predicate::path::missing());
    init_repository_dir
        .child(".bit/HEAD")
        .assert("ref: refs/heads/main\n");

    run_bit_command(dir, &["switch", "feature"]).assert().success();
    init_repository_dir.child("a.txt").assert("changed");
    init_repository_dir.child("nested/b.txt").assert("new");
}

#[rstest]
fn switching_to_the_current_branch_is_a_no_op(init_repository_dir: TempDir) {
    run_bit_command(init_repository_dir.path(), &["switch", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already on 'main'"));
}

#[rstest]
fn switching_to_a_commit_detaches_head(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let root = head_commit_id(dir);
    commit_file(dir, "a.txt", "2", "Second");

    run_bit_command(dir, &["switch", &root])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("HEAD is now at {}", &root[..7])));

    init_repository_dir
        .child(".bit/HEAD")
        .assert(format!("{}\n", root));
    init_repository_dir.child("a.txt").assert("1");
}

#[rstest]
fn unknown_targets_are_rejected(init_repository_dir: TempDir) {
    run_bit_command(init_repository_dir.path(), &["switch", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("branch 'nowhere' does not exist"));
}

#[rstest]
fn local_edits_block_the_switch(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_bit_command(dir, &["branch", "feature"]).assert().success();
    run_bit_command(dir, &["switch", "feature"]).assert().success();
    commit_file(dir, "a.txt", "feature", "Feature change");
    run_bit_command(dir, &["switch", "main"]).assert().success();

    init_repository_dir.child("a.txt").write_str("unsaved")?;

    run_bit_command(dir, &["switch", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("local changes would be overwritten in: a.txt"));

    init_repository_dir.child("a.txt").assert("unsaved");
    init_repository_dir
        .child(".bit/HEAD")
        .assert("ref: refs/heads/main\n");

    Ok(())
}

#[rstest]
fn untracked_files_survive_a_switch(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_bit_command(dir, &["branch", "feature"]).assert().success();
    init_repository_dir.child("notes.txt").write_str("scratch")?;

    run_bit_command(dir, &["switch", "feature"]).assert().success();

    init_repository_dir.child("notes.txt").assert("scratch");

    Ok(())
}
