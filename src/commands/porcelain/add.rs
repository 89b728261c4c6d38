use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::path::{Path, PathBuf};

/// Why a path was left out of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Missing,
    OutsideWorkspace,
    NonUtf8,
    ContainsNewline,
    Unreadable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Missing => write!(f, "does not exist"),
            SkipReason::OutsideWorkspace => write!(f, "is outside the working tree"),
            SkipReason::NonUtf8 => write!(f, "is not valid UTF-8"),
            SkipReason::ContainsNewline => write!(f, "contains a newline"),
            SkipReason::Unreadable(reason) => write!(f, "could not be read: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Staged(PathBuf, ObjectId),
    Skipped(PathBuf, SkipReason),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    pub outcomes: Vec<AddOutcome>,
}

impl AddReport {
    pub fn staged(&self) -> impl Iterator<Item = (&PathBuf, &ObjectId)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            AddOutcome::Staged(path, oid) => Some((path, oid)),
            AddOutcome::Skipped(..) => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&PathBuf, &SkipReason)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            AddOutcome::Skipped(path, reason) => Some((path, reason)),
            AddOutcome::Staged(..) => None,
        })
    }

    fn skip(&mut self, path: &Path, reason: SkipReason) {
        tracing::warn!(path = %path.display(), %reason, "skipping path");
        self.outcomes
            .push(AddOutcome::Skipped(path.to_path_buf(), reason));
    }
}

impl std::fmt::Display for AddReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines = self
            .outcomes
            .iter()
            .map(|outcome| match outcome {
                AddOutcome::Staged(path, oid) => {
                    format!("add '{}' ({})", path.display(), oid.to_short_oid())
                }
                AddOutcome::Skipped(path, reason) => {
                    format!("skip '{}': {}", path.display(), reason)
                }
            })
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}

impl Repository {
    /// Stage files and directories, relative paths being taken from the
    /// repository root
    ///
    /// Paths that cannot be staged are reported, not treated as failures.
    pub fn add(&self, paths: &[impl AsRef<Path>]) -> Result<AddReport> {
        self.ensure_initialized()?;

        let mut index = self.load_index()?;
        let mut report = AddReport::default();

        for path in paths {
            let path = path.as_ref();
            let absolute_path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.path().join(path)
            };

            let absolute_path = match absolute_path.canonicalize() {
                Ok(absolute_path) => absolute_path,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    report.skip(path, SkipReason::Missing);
                    continue;
                }
                Err(e) => {
                    report.skip(path, SkipReason::Unreadable(e.to_string()));
                    continue;
                }
            };

            let Some(relative_path) = self.workspace().relative_path(&absolute_path) else {
                report.skip(path, SkipReason::OutsideWorkspace);
                continue;
            };

            let files = if absolute_path.is_dir() {
                self.workspace().list_files(&relative_path)
            } else {
                vec![Ok(relative_path)]
            };

            for file in files {
                match file {
                    Ok(file) => self.stage_file(&mut index, file, &mut report)?,
                    Err(unlisted) => {
                        report.skip(&unlisted.path, SkipReason::Unreadable(unlisted.reason))
                    }
                }
            }
        }

        index.write_updates()?;

        Ok(report)
    }

    fn stage_file(&self, index: &mut Index, file: PathBuf, report: &mut AddReport) -> Result<()> {
        let Some(name) = file.to_str() else {
            report.skip(&file, SkipReason::NonUtf8);
            return Ok(());
        };
        if name.contains('\n') {
            report.skip(&file, SkipReason::ContainsNewline);
            return Ok(());
        }

        let content = match self.workspace().read_file(&file) {
            Ok(content) => content,
            Err(e) => {
                report.skip(&file, SkipReason::Unreadable(e.to_string()));
                return Ok(());
            }
        };

        let oid = self.database().put(content)?;
        index.stage(file.clone(), oid.clone());
        report.outcomes.push(AddOutcome::Staged(file, oid));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::errors::BitError;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repository() -> (TempDir, Repository) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let repository = Repository::open(dir.path(), Config::default()).unwrap();
        repository.init().unwrap();
        (dir, repository)
    }

    fn count_objects(repository: &Repository) -> usize {
        walkdir::WalkDir::new(repository.database().objects_path())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .count()
    }

    #[cfg(unix)]
    #[rstest]
    fn unreadable_subdirectory_does_not_abort_the_add(repository: (TempDir, Repository)) {
        use std::os::unix::fs::PermissionsExt;

        let (dir, repository) = repository;
        dir.child("src/a.txt").write_str("a").unwrap();
        dir.child("src/locked/x.txt").write_str("x").unwrap();
        dir.child("src/z.txt").write_str("z").unwrap();
        let locked = dir.child("src/locked");
        std::fs::set_permissions(locked.path(), std::fs::Permissions::from_mode(0o000)).unwrap();
        let readable_anyway = std::fs::read_dir(locked.path()).is_ok();

        let report = repository.add(&["src"]);
        std::fs::set_permissions(locked.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        if readable_anyway {
            return;
        }
        let report = report.unwrap();
        let staged = report.staged().map(|(path, _)| path.clone()).collect::<Vec<_>>();
        assert_eq!(staged, vec![PathBuf::from("src/a.txt"), PathBuf::from("src/z.txt")]);
        let skipped = report.skipped().collect::<Vec<_>>();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, &PathBuf::from("src/locked"));
        assert!(matches!(skipped[0].1, SkipReason::Unreadable(_)));
        assert_eq!(repository.load_index().unwrap().len(), 2);
    }

    #[rstest]
    fn identical_files_share_one_object(repository: (TempDir, Repository)) {
        let (dir, repository) = repository;
        dir.child("a.txt").write_str("same").unwrap();
        dir.child("nested/b.txt").write_str("same").unwrap();

        let report = repository.add(&["a.txt", "nested/b.txt"]).unwrap();

        let oids = report.staged().map(|(_, oid)| oid.clone()).collect::<Vec<_>>();
        assert_eq!(oids.len(), 2);
        assert_eq!(oids[0], oids[1]);
        assert_eq!(count_objects(&repository), 1);
    }

    #[rstest]
    fn readding_an_unchanged_file_is_idempotent(repository: (TempDir, Repository)) {
        let (dir, repository) = repository;
        dir.child("f.txt").write_str("content").unwrap();

        let first = repository.add(&["f.txt"]).unwrap();
        let objects = count_objects(&repository);
        let second = repository.add(&["f.txt"]).unwrap();

        assert_eq!(first, second);
        assert_eq!(count_objects(&repository), objects);
        assert_eq!(repository.load_index().unwrap().len(), 1);
    }

    #[rstest]
    fn directories_are_expanded_without_metadata(repository: (TempDir, Repository)) {
        let (dir, repository) = repository;
        dir.child("src/lib.rs").write_str("lib").unwrap();
        dir.child("src/bin/main.rs").write_str("main").unwrap();
        dir.child("README").write_str("readme").unwrap();

        repository.add(&["."]).unwrap();

        let staged = repository
            .staged_files()
            .unwrap()
            .into_iter()
            .map(|(path, _)| path)
            .collect::<Vec<_>>();
        assert_eq!(
            staged,
            vec![
                PathBuf::from("README"),
                PathBuf::from("src/bin/main.rs"),
                PathBuf::from("src/lib.rs"),
            ]
        );
    }

    #[rstest]
    fn missing_and_outside_paths_are_skipped(repository: (TempDir, Repository)) {
        let (dir, repository) = repository;
        let outside = TempDir::new().unwrap();
        outside.child("elsewhere.txt").write_str("x").unwrap();
        dir.child("f.txt").write_str("f").unwrap();

        let report = repository
            .add(&[
                PathBuf::from("missing.txt"),
                outside.path().join("elsewhere.txt"),
                PathBuf::from("f.txt"),
            ])
            .unwrap();

        let reasons = report.skipped().map(|(_, reason)| reason.clone()).collect::<Vec<_>>();
        assert_eq!(reasons, vec![SkipReason::Missing, SkipReason::OutsideWorkspace]);
        assert_eq!(report.staged().count(), 1);
        assert!(report.to_string().contains("skip 'missing.txt': does not exist"));
    }

    #[test]
    fn add_outside_a_repository_fails() {
        let dir = TempDir::new().unwrap();
        let repository = Repository::open(dir.path(), Config::default()).unwrap();

        assert!(matches!(
            repository.add(&["f.txt"]),
            Err(BitError::NotARepository(_))
        ));
    }
}
