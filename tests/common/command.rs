use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_NAME: &str = "Ada Lovelace";
pub const AUTHOR_EMAIL: &str = "ada@example.com";
pub const AUTHOR_DATE: &str = "2024-03-01 09:30:00 +0100";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Initialized repository holding one root commit of `a.txt` on `main`
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_bit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("a.txt"),
        "1".to_string(),
    ));
    run_bit_command(repository_dir.path(), &["add", "a.txt"])
        .assert()
        .success();
    bit_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_bit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("bit-core").expect("Failed to find bit-core binary");
    cmd.envs(vec![
        ("GIT_AUTHOR_NAME", AUTHOR_NAME),
        ("GIT_AUTHOR_EMAIL", AUTHOR_EMAIL),
        ("GIT_AUTHOR_DATE", AUTHOR_DATE),
        ("NO_COLOR", "1"),
    ]);
    cmd.env_remove("BIT_DEFAULT_BRANCH");
    cmd.env_remove("RUST_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn bit_commit(dir: &Path, message: &str) -> Command {
    run_bit_command(dir, &["commit", "-m", message])
}

/// Write `content` to `file`, stage it and commit it
pub fn commit_file(dir: &Path, file: &str, content: &str, message: &str) {
    write_file(FileSpec::new(dir.join(file), content.to_string()));
    run_bit_command(dir, &["add", file]).assert().success();
    bit_commit(dir, message).assert().success();
}

/// Full object id of the commit HEAD resolves to
pub fn head_commit_id(dir: &Path) -> String {
    let head = std::fs::read_to_string(dir.join(".bit").join("HEAD"))
        .expect("Failed to read HEAD");
    let head = head.trim();

    match head.strip_prefix("ref: ") {
        Some(reference) => std::fs::read_to_string(dir.join(".bit").join(reference))
            .expect("Failed to read branch ref")
            .trim()
            .to_string(),
        None => head.to_string(),
    }
}
