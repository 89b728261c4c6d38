//! Working tree migration
//!
//! Moving the working tree from one snapshot to another happens in two
//! phases. Planning diffs the snapshots, loads the new blobs and checks each
//! affected path against the working tree. Applying only starts once the plan
//! is conflict free, so a rejected migration leaves every file untouched.
//!
//! ## Conflict Detection
//!
//! A working file is safe to replace or delete when its content matches the
//! old snapshot (it has no local edits) or the new one (it already has the
//! target content). Anything else would be lost, as would a directory that
//! sits where a file has to go.

use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object::Object;
use crate::errors::{BitError, Result};
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// File system action required for a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create a file that is not tracked yet
    Add(Bytes),
    Delete,
    /// Replace the content of a tracked file
    Modify(Bytes),
}

#[derive(Debug)]
pub struct Migration<'r> {
    repository: &'r Repository,
    actions: BTreeMap<PathBuf, Action>,
}

impl<'r> Migration<'r> {
    /// Plan the move from `old` to `new`, failing with `WorkingTreeConflict`
    /// if local changes would be lost
    pub fn plan(repository: &'r Repository, old: &Snapshot, new: &Snapshot) -> Result<Self> {
        let mut migration = Migration {
            repository,
            actions: BTreeMap::new(),
        };
        let mut conflicts = BTreeSet::new();

        let paths = old.keys().chain(new.keys()).collect::<BTreeSet<_>>();
        for path in paths {
            let old_oid = old.get(path);
            let new_oid = new.get(path);
            if old_oid == new_oid {
                continue;
            }

            if migration.has_local_changes(path, old, new)? {
                conflicts.insert(path.clone());
                continue;
            }

            let action = match (old_oid, new_oid) {
                (_, None) => Action::Delete,
                (None, Some(oid)) => Action::Add(repository.database().get(oid)?),
                (Some(_), Some(oid)) => Action::Modify(repository.database().get(oid)?),
            };
            migration.actions.insert(path.clone(), action);
        }

        if !conflicts.is_empty() {
            tracing::warn!(count = conflicts.len(), "migration blocked by local changes");
            return Err(BitError::WorkingTreeConflict(conflicts.into_iter().collect()));
        }

        tracing::debug!(actions = migration.actions.len(), "migration planned");
        Ok(migration)
    }

    pub fn actions(&self) -> &BTreeMap<PathBuf, Action> {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn apply_changes(&self) -> Result<()> {
        self.repository.workspace().apply_migration(self)
    }

    fn has_local_changes(&self, path: &Path, old: &Snapshot, new: &Snapshot) -> Result<bool> {
        let workspace = self.repository.workspace();

        if new.contains_key(path) && workspace.is_dir(path) {
            return Ok(true);
        }

        match workspace.read_file_if_exists(path)? {
            None => Ok(false),
            Some(content) => {
                let current = Blob::new(content).object_id();
                Ok(old.get(path) != Some(&current) && new.get(path) != Some(&current))
            }
        }
    }
}
