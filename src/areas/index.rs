//! Staging area
//!
//! The index tracks which blob each path should have in the next commit.
//! Re-staging a path overwrites its entry; a commit consumes and clears it.
//!
//! ## Index File Format
//!
//! One `<path> <hash>` line per entry, sorted by path. Paths may contain
//! spaces (the hash is split off from the right) but never newlines.

use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use crate::areas::lockfile::replace_locked;
use crate::errors::{BitError, IoContext, Result};
use std::collections::BTreeMap;
use std::io::Read;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.bit/index`)
    path: Box<Path>,
    entries: BTreeMap<PathBuf, ObjectId>,
    /// Set when the entries differ from what is on disk
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the index from disk, replacing the in-memory entries
    ///
    /// A missing index file is an empty index.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> Result<()> {
        self.entries.clear();
        self.changed = false;

        let mut index_file = match std::fs::OpenOptions::new().read(true).open(self.path()) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e).io_context("open index", self.path()),
        };
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)
            .io_context("lock index", self.path())?;

        let mut content = String::new();
        lock.deref_mut()
            .read_to_string(&mut content)
            .io_context("read index", self.path())?;

        for (line_number, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }

            let (path, oid) = line.rsplit_once(' ').ok_or_else(|| BitError::Malformed {
                what: "index",
                path: self.path.to_path_buf(),
                reason: format!("line {} has no hash", line_number + 1),
            })?;
            let oid = ObjectId::try_parse(oid.to_string()).map_err(|_| BitError::Malformed {
                what: "index",
                path: self.path.to_path_buf(),
                reason: format!("line {} has an invalid hash", line_number + 1),
            })?;

            self.entries.insert(PathBuf::from(path), oid);
        }

        Ok(())
    }

    /// Upsert the entry for `path`
    pub fn stage(&mut self, path: PathBuf, oid: ObjectId) {
        if self.entries.get(&path) != Some(&oid) {
            self.changed = true;
        }
        self.entries.insert(path, oid);
    }

    pub fn get(&self, path: &Path) -> Option<&ObjectId> {
        self.entries.get(path)
    }

    /// Copy of the staged entries, leaving the index untouched
    pub fn snapshot(&self) -> Snapshot {
        self.entries.clone()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&PathBuf, &ObjectId)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.changed = true;
        }
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Persist the entries if they changed since the last load or write
    pub fn write_updates(&mut self) -> Result<()> {
        if !self.changed {
            return Ok(());
        }

        let content = self
            .entries
            .iter()
            .map(|(path, oid)| format!("{} {}\n", path.to_string_lossy(), oid))
            .collect::<String>();
        let temp_dir = self.path.parent().unwrap_or(Path::new("."));
        replace_locked(self.path(), temp_dir, content.as_bytes())?;

        self.changed = false;
        tracing::debug!(entries = self.entries.len(), "index written");

        Ok(())
    }
}
