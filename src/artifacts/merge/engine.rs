//! Branch merges
//!
//! A merge finds the merge base of the two branch tips, reconciles the three
//! snapshots and either records a two-parent commit or reports conflicts.
//!
//! ## Conflicts
//!
//! Conflicts never reach the object store or the working tree: the target tip
//! is recorded in `MERGE_HEAD` and the report carries the synthesized marker
//! content for each path. Staging resolutions and committing completes the
//! merge.

use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::merge::common_ancestor::CommonAncestorFinder;
use crate::artifacts::merge::three_way::{ConflictSides, conflict_markers, reconcile};
use crate::artifacts::objects::commit::{Author, Snapshot};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{BitError, Result};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// What a conflicted path would have to contain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictDetail {
    /// Both versions wrapped in conflict markers
    Markers(Bytes),
    /// One of the versions could not be read back
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictReport {
    pub theirs: ObjectId,
    pub conflicts: BTreeMap<PathBuf, ConflictDetail>,
}

impl ConflictReport {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.conflicts.keys().cloned().collect()
    }
}

impl std::fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (path, detail) in &self.conflicts {
            match detail {
                ConflictDetail::Markers(_) => {
                    writeln!(f, "CONFLICT (content): Merge conflict in {}", path.display())?
                }
                ConflictDetail::Unreadable(reason) => writeln!(
                    f,
                    "CONFLICT (unreadable): Could not read {}: {}",
                    path.display(),
                    reason
                )?,
            }
        }
        write!(f, "Automatic merge failed; fix conflicts and then commit the result.")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeResult {
    Clean(ObjectId),
    Conflicts(ConflictReport),
    /// The target is already part of the current history
    UpToDate,
}

impl std::fmt::Display for MergeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeResult::Clean(oid) => write!(f, "Merge made commit {}", oid),
            MergeResult::Conflicts(report) => write!(f, "{}", report),
            MergeResult::UpToDate => write!(f, "Already up to date."),
        }
    }
}

/// Reconciled state of two tips, before anything is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedMerge {
    pub ours: ObjectId,
    pub theirs: ObjectId,
    pub base: ObjectId,
    /// Snapshot of the first parent
    pub ours_snapshot: Snapshot,
    /// Every cleanly merged path
    pub merged: Snapshot,
    pub conflicts: BTreeMap<PathBuf, ConflictDetail>,
}

impl PreparedMerge {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn report(&self) -> ConflictReport {
        ConflictReport {
            theirs: self.theirs.clone(),
            conflicts: self.conflicts.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergePlan {
    UpToDate,
    Prepared(PreparedMerge),
}

#[derive(Debug)]
pub struct MergeEngine<'r> {
    repository: &'r Repository,
}

impl<'r> MergeEngine<'r> {
    pub fn new(repository: &'r Repository) -> Self {
        MergeEngine { repository }
    }

    /// Merge `target` into `current`, moving `current` on success
    pub fn merge(
        &self,
        current: &BranchName,
        target: &BranchName,
        author: Author,
    ) -> Result<MergeResult> {
        if current == target {
            return Err(BitError::SelfMerge(current.clone()));
        }

        let refs = self.repository.refs();
        let ours = refs
            .read_branch(current)?
            .ok_or_else(|| BitError::EmptyBranch(current.clone()))?;
        let theirs = match refs.read_branch(target)? {
            Some(oid) => oid,
            None if refs.branch_exists(target) => return Err(BitError::EmptyBranch(target.clone())),
            None => return Err(BitError::NoSuchBranch(target.to_string())),
        };

        let prepared = match self.prepare(&ours, &theirs)? {
            MergePlan::UpToDate => return Ok(MergeResult::UpToDate),
            MergePlan::Prepared(prepared) => prepared,
        };

        if !prepared.is_clean() {
            refs.write_merge_head(&theirs)?;
            tracing::info!(%current, %target, conflicts = prepared.conflicts.len(), "merge stopped on conflicts");
            return Ok(MergeResult::Conflicts(prepared.report()));
        }

        let migration = Migration::plan(self.repository, &prepared.ours_snapshot, &prepared.merged)?;
        let message = format!("Merge branch '{}' into '{}'", target, current);
        let commit = self.commit(&prepared, prepared.merged.clone(), &message, author)?;
        refs.write_branch(current, &commit)?;
        migration.apply_changes()?;

        Ok(MergeResult::Clean(commit))
    }

    /// Reconcile `ours` with `theirs` without writing anything
    pub fn prepare(&self, ours: &ObjectId, theirs: &ObjectId) -> Result<MergePlan> {
        let graph = self.repository.commit_graph();

        if graph.is_ancestor(theirs, ours)? {
            tracing::debug!(%ours, %theirs, "target already merged");
            return Ok(MergePlan::UpToDate);
        }

        let base = self.merge_base(ours, theirs)?;
        let ours_snapshot = graph.snapshot_of(Some(ours))?;
        let reconciliation = reconcile(
            &graph.snapshot_of(Some(&base))?,
            &ours_snapshot,
            &graph.snapshot_of(Some(theirs))?,
        );

        let conflicts = reconciliation
            .conflicts
            .iter()
            .map(|(path, sides)| (path.clone(), self.conflict_detail(sides)))
            .collect::<BTreeMap<_, _>>();

        Ok(MergePlan::Prepared(PreparedMerge {
            ours: ours.clone(),
            theirs: theirs.clone(),
            base,
            ours_snapshot,
            merged: reconciliation.merged,
            conflicts,
        }))
    }

    pub fn merge_base(&self, ours: &ObjectId, theirs: &ObjectId) -> Result<ObjectId> {
        let graph = self.repository.commit_graph();
        let finder = CommonAncestorFinder::new(|oid| graph.parent_of(oid));

        finder
            .find(ours, theirs)?
            .ok_or_else(|| BitError::NoCommonAncestor {
                ours: ours.clone(),
                theirs: theirs.clone(),
            })
    }

    /// Record the two-parent commit for a prepared merge
    pub fn commit(
        &self,
        prepared: &PreparedMerge,
        snapshot: Snapshot,
        message: &str,
        author: Author,
    ) -> Result<ObjectId> {
        self.repository.commit_graph().create_commit(
            message,
            author,
            vec![prepared.ours.clone(), prepared.theirs.clone()],
            snapshot,
        )
    }

    fn conflict_detail(&self, sides: &ConflictSides) -> ConflictDetail {
        match (self.side_content(&sides.ours), self.side_content(&sides.theirs)) {
            (Ok(ours), Ok(theirs)) => ConflictDetail::Markers(conflict_markers(&ours, &theirs)),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "conflicted content is unreadable");
                ConflictDetail::Unreadable(e.to_string())
            }
        }
    }

    fn side_content(&self, oid: &Option<ObjectId>) -> Result<Bytes> {
        match oid {
            Some(oid) => self.repository.database().get(oid),
            None => Ok(Bytes::new()),
        }
    }
}
