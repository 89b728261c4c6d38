//! Commit graph
//!
//! Commits are stored in the object database and linked through their parent
//! IDs, forming a DAG: a root commit has no parent, a merge commit has two.
//! Because commit IDs are content hashes, a commit can only name parents that
//! existed before it, so walks over parent links always terminate.

use crate::areas::database::Database;
use crate::artifacts::objects::commit::{Author, Commit, Snapshot};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{BitError, Result};
use derive_new::new;
use std::collections::{HashSet, VecDeque};

/// Upper bound on parent links per commit
pub const MAX_PARENTS: usize = 2;

#[derive(Debug, Clone, Copy, new)]
pub struct CommitGraph<'d> {
    database: &'d Database,
}

impl<'d> CommitGraph<'d> {
    /// Persist a new commit and return its ID
    ///
    /// Every parent must already be a stored commit. A root commit needs at
    /// least one file.
    pub fn create_commit(
        &self,
        message: &str,
        author: Author,
        parents: Vec<ObjectId>,
        snapshot: Snapshot,
    ) -> Result<ObjectId> {
        if parents.len() > MAX_PARENTS {
            return Err(BitError::TooManyParents(parents.len()));
        }
        if parents.is_empty() && snapshot.is_empty() {
            return Err(BitError::EmptyCommit);
        }
        for parent in &parents {
            let object_type = self.database.object_type(parent)?;
            if object_type != ObjectType::Commit {
                return Err(BitError::UnexpectedObjectType {
                    oid: parent.clone(),
                    expected: ObjectType::Commit,
                    actual: object_type,
                });
            }
        }

        let commit = Commit::new(parents, author, message, snapshot);
        let oid = self.database.store(&commit)?;
        tracing::debug!(oid = %oid, parents = commit.parents().len(), "commit created");

        Ok(oid)
    }

    pub fn get_commit(&self, oid: &ObjectId) -> Result<Commit> {
        self.database.load_commit(oid)
    }

    /// First parent of `oid`
    pub fn parent_of(&self, oid: &ObjectId) -> Result<Option<ObjectId>> {
        Ok(self.get_commit(oid)?.parent().cloned())
    }

    /// Snapshot of `oid`, or the empty snapshot when there is no commit
    pub fn snapshot_of(&self, oid: Option<&ObjectId>) -> Result<Snapshot> {
        match oid {
            Some(oid) => Ok(self.get_commit(oid)?.into_snapshot()),
            None => Ok(Snapshot::new()),
        }
    }

    /// First-parent history from `start` down to a root commit
    ///
    /// The walk is lazy; each call starts over from `start`.
    pub fn history(&self, start: Option<ObjectId>) -> History<'d> {
        History {
            graph: *self,
            next: start,
        }
    }

    /// Every commit reachable from `oid` through any parent link, `oid` included
    pub fn ancestors_including(&self, oid: &ObjectId) -> Result<HashSet<ObjectId>> {
        let mut visited = HashSet::from([oid.clone()]);
        let mut queue = VecDeque::from([oid.clone()]);

        while let Some(current) = queue.pop_front() {
            for parent in self.get_commit(&current)?.parents() {
                if visited.insert(parent.clone()) {
                    queue.push_back(parent.clone());
                }
            }
        }

        tracing::debug!(start = %oid, count = visited.len(), "collected ancestors");
        Ok(visited)
    }

    /// Whether `ancestor` is reachable from `descendant` (or is the same commit)
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> Result<bool> {
        Ok(self.ancestors_including(descendant)?.contains(ancestor))
    }
}

/// Lazy first-parent walk yielding each commit with its ID
///
/// A failed load ends the walk after yielding the error.
#[derive(Debug, Clone)]
pub struct History<'d> {
    graph: CommitGraph<'d>,
    next: Option<ObjectId>,
}

impl Iterator for History<'_> {
    type Item = Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = self.next.take()?;

        match self.graph.get_commit(&oid) {
            Ok(commit) => {
                self.next = commit.parent().cloned();
                Some(Ok((oid, commit)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
