//! Error taxonomy for repository operations
//!
//! Every fallible operation in the library returns [`BitError`]. Each variant
//! maps onto one of five broad [`ErrorKind`]s so that a shell can react to the
//! category (missing thing, duplicate, wrong state, conflict, storage failure)
//! without matching on every variant.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BitError>;

/// Broad error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidState,
    Conflict,
    IoFailure,
}

#[derive(Debug, Error)]
pub enum BitError {
    #[error("not a bit repository (or any metadata found): {}", .0.display())]
    NotARepository(PathBuf),

    #[error("repository already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("object {oid} is a {actual}, expected a {expected}")]
    UnexpectedObjectType {
        oid: ObjectId,
        expected: ObjectType,
        actual: ObjectType,
    },

    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: ObjectId, reason: String },

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("invalid branch name: '{0}'")]
    InvalidBranchName(String),

    #[error("invalid author identity {identity:?}: {reason}")]
    InvalidAuthor {
        identity: String,
        reason: &'static str,
    },

    #[error("a branch named '{0}' already exists")]
    BranchExists(BranchName),

    #[error("branch '{0}' does not exist")]
    NoSuchBranch(String),

    #[error("HEAD does not point to any commit yet")]
    NoCommitsYet,

    #[error("nothing staged to commit")]
    NothingStaged,

    #[error("refusing to create a root commit with an empty snapshot")]
    EmptyCommit,

    #[error("a commit has at most two parents, got {0}")]
    TooManyParents(usize),

    #[error("HEAD is detached; {0} needs a checked-out branch")]
    DetachedHead(&'static str),

    #[error("cannot merge branch '{0}' into itself")]
    SelfMerge(BranchName),

    #[error("branch '{0}' has no commits")]
    EmptyBranch(BranchName),

    #[error("no common ancestor between {ours} and {theirs}")]
    NoCommonAncestor { ours: ObjectId, theirs: ObjectId },

    #[error("staged changes are pending; commit them before merging")]
    StagedChangesPending,

    #[error("a merge with {0} is in progress; resolve and commit it first")]
    MergeInProgress(ObjectId),

    #[error("unresolved merge conflicts in: {}", join_paths(.0))]
    UnresolvedConflicts(Vec<PathBuf>),

    #[error("local changes would be overwritten in: {}", join_paths(.0))]
    WorkingTreeConflict(Vec<PathBuf>),

    #[error("malformed {what} at {}: {reason}", .path.display())]
    Malformed {
        what: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("{op} failed for {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BitError::NotARepository(_)
            | BitError::ObjectNotFound(_)
            | BitError::NoSuchBranch(_) => ErrorKind::NotFound,
            BitError::AlreadyInitialized(_) | BitError::BranchExists(_) => {
                ErrorKind::AlreadyExists
            }
            BitError::UnexpectedObjectType { .. }
            | BitError::InvalidObjectId(_)
            | BitError::InvalidBranchName(_)
            | BitError::InvalidAuthor { .. }
            | BitError::NoCommitsYet
            | BitError::NothingStaged
            | BitError::EmptyCommit
            | BitError::TooManyParents(_)
            | BitError::DetachedHead(_)
            | BitError::SelfMerge(_)
            | BitError::EmptyBranch(_)
            | BitError::NoCommonAncestor { .. }
            | BitError::StagedChangesPending
            | BitError::MergeInProgress(_)
            | BitError::UnresolvedConflicts(_) => ErrorKind::InvalidState,
            BitError::WorkingTreeConflict(_) => ErrorKind::Conflict,
            BitError::CorruptObject { .. } | BitError::Malformed { .. } | BitError::Io { .. } => {
                ErrorKind::IoFailure
            }
        }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Attach the failing operation and path to a raw I/O error
pub(crate) trait IoContext<T> {
    fn io_context(self, op: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context(self, op: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| BitError::Io {
            op,
            path: path.to_path_buf(),
            source,
        })
    }
}
