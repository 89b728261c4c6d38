use crate::artifacts::checkout::migration::{Action, Migration};
use crate::config::METADATA_DIR;
use crate::errors::{IoContext, Result};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Part of the working tree a directory walk could not get into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlistedPath {
    pub path: PathBuf,
    pub reason: String,
}

/// Working tree rooted at the repository path
///
/// All paths taken and returned are relative to the root, except for
/// [`Workspace::relative_path`] which maps absolute paths into it.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Relative path of `absolute_path` inside the working tree
    ///
    /// `None` for paths outside the tree or inside the metadata directory.
    pub fn relative_path(&self, absolute_path: &Path) -> Option<PathBuf> {
        let relative_path = absolute_path.strip_prefix(&self.path).ok()?;
        if Self::is_ignored(relative_path) {
            return None;
        }
        Some(relative_path.to_path_buf())
    }

    /// Files under `relative_root`, sorted, skipping the metadata directory
    ///
    /// A directory that cannot be read is reported in place and the walk
    /// carries on with its siblings.
    pub fn list_files(
        &self,
        relative_root: &Path,
    ) -> Vec<std::result::Result<PathBuf, UnlistedPath>> {
        let root = self.path.join(relative_root);

        WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != METADATA_DIR)
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    self.relative_path(entry.path()).map(Ok)
                }
                Ok(_) => None,
                Err(e) => {
                    let path = e
                        .path()
                        .and_then(|path| path.strip_prefix(&self.path).ok())
                        .map_or_else(|| relative_root.to_path_buf(), Path::to_path_buf);
                    let reason = e
                        .io_error()
                        .map_or_else(|| e.to_string(), ToString::to_string);
                    Some(Err(UnlistedPath { path, reason }))
                }
            })
            .collect()
    }

    pub fn read_file(&self, file_path: &Path) -> Result<Bytes> {
        let file_path = self.path.join(file_path);
        let content = std::fs::read(&file_path).io_context("read file", &file_path)?;

        Ok(Bytes::from(content))
    }

    /// Content of a regular file, `None` when nothing is there
    pub fn read_file_if_exists(&self, file_path: &Path) -> Result<Option<Bytes>> {
        let full_path = self.path.join(file_path);
        match std::fs::metadata(&full_path) {
            Ok(metadata) if metadata.is_file() => self.read_file(file_path).map(Some),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).io_context("stat file", &full_path),
        }
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        self.path.join(path).is_dir()
    }

    pub fn write_file(&self, file_path: &Path, content: &[u8]) -> Result<()> {
        let full_path = self.path.join(file_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).io_context("create directory", parent)?;
        }

        std::fs::write(&full_path, content).io_context("write file", &full_path)
    }

    /// Remove a file and any directories it leaves empty
    pub fn remove_file(&self, file_path: &Path) -> Result<()> {
        let full_path = self.path.join(file_path);
        match std::fs::remove_file(&full_path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                return Err(e).io_context("remove file", &full_path);
            }
            _ => {}
        }

        for ancestor in file_path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            // stops at the first directory that still has children
            if std::fs::remove_dir(self.path.join(ancestor)).is_err() {
                break;
            }
        }

        Ok(())
    }

    // Deletions go first so a file can replace a directory emptied by the
    // same migration.
    pub fn apply_migration(&self, migration: &Migration) -> Result<()> {
        for (file_path, action) in migration.actions() {
            if let Action::Delete = action {
                self.remove_file(file_path)?;
            }
        }

        for (file_path, action) in migration.actions() {
            match action {
                Action::Add(content) | Action::Modify(content) => {
                    self.write_file(file_path, content)?
                }
                Action::Delete => {}
            }
        }

        Ok(())
    }

    fn is_ignored(relative_path: &Path) -> bool {
        relative_path
            .components()
            .next()
            .is_some_and(|component| component.as_os_str() == METADATA_DIR)
    }
}
