use crate::areas::index::Index;
use crate::areas::refs::HeadState;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::merge::engine::{MergeEngine, MergePlan};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{BitError, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub oid: ObjectId,
    /// Branch that moved, `None` on a detached HEAD
    pub branch: Option<String>,
    pub is_root: bool,
    pub short_message: String,
}

impl std::fmt::Display for CommitSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let position = self.branch.as_deref().unwrap_or("detached HEAD");
        let root = if self.is_root { " (root-commit)" } else { "" };

        write!(
            f,
            "[{}{} {}] {}",
            position,
            root,
            self.oid.to_short_oid(),
            self.short_message
        )
    }
}

impl Repository {
    /// Record the staged changes on top of HEAD
    ///
    /// With a merge pending, the commit concludes it instead and gets the
    /// merged branch as second parent.
    pub fn commit(&self, message: &str) -> Result<CommitSummary> {
        self.ensure_initialized()?;

        let mut index = self.load_index()?;
        let parent = self.refs().resolve_head()?;

        if let Some(merge_head) = self.refs().read_merge_head()? {
            let head = parent.ok_or(BitError::NoCommitsYet)?;
            return self.commit_merge(&mut index, message, head, merge_head);
        }

        if index.is_empty() {
            return Err(BitError::NothingStaged);
        }

        let graph = self.commit_graph();
        let mut snapshot = graph.snapshot_of(parent.as_ref())?;
        snapshot.extend(index.snapshot());

        let is_root = parent.is_none();
        let oid = graph.create_commit(
            message,
            self.config().author()?,
            parent.into_iter().collect(),
            snapshot,
        )?;
        self.refs().advance_head(&oid)?;

        index.clear();
        index.write_updates()?;

        self.commit_summary(oid, is_root, message)
    }

    fn commit_merge(
        &self,
        index: &mut Index,
        message: &str,
        head: ObjectId,
        merge_head: ObjectId,
    ) -> Result<CommitSummary> {
        let engine = MergeEngine::new(self);
        let prepared = match engine.prepare(&head, &merge_head)? {
            MergePlan::Prepared(prepared) => prepared,
            MergePlan::UpToDate => {
                tracing::warn!(%merge_head, "pending merge already part of history, dropping it");
                self.refs().clear_merge_head()?;
                return self.commit(message);
            }
        };

        let unresolved = prepared
            .conflicts
            .keys()
            .filter(|path| index.get(path).is_none())
            .cloned()
            .collect::<Vec<PathBuf>>();
        if !unresolved.is_empty() {
            return Err(BitError::UnresolvedConflicts(unresolved));
        }

        let mut snapshot = prepared.merged.clone();
        snapshot.extend(index.snapshot());

        // staged and conflicted paths already hold what the user wants
        let mut workspace_target = prepared.merged.clone();
        for path in prepared.conflicts.keys().chain(index.entries().map(|(path, _)| path)) {
            match prepared.ours_snapshot.get(path) {
                Some(oid) => workspace_target.insert(path.clone(), oid.clone()),
                None => workspace_target.remove(path),
            };
        }
        let migration = Migration::plan(self, &prepared.ours_snapshot, &workspace_target)?;

        let oid = engine.commit(&prepared, snapshot, message, self.config().author()?)?;
        self.refs().advance_head(&oid)?;
        self.refs().clear_merge_head()?;

        index.clear();
        index.write_updates()?;
        migration.apply_changes()?;

        self.commit_summary(oid, false, message)
    }

    fn commit_summary(&self, oid: ObjectId, is_root: bool, message: &str) -> Result<CommitSummary> {
        let branch = match self.refs().read_head()? {
            HeadState::Attached(branch) => Some(branch.to_string()),
            HeadState::Detached(_) => None,
        };

        Ok(CommitSummary {
            oid,
            branch,
            is_root,
            short_message: message.trim().lines().next().unwrap_or_default().to_string(),
        })
    }
}
