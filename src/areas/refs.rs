//! References (branches and HEAD)
//!
//! References are human-readable names pointing to commits:
//! - Branches: `refs/heads/*` files holding a commit ID
//! - HEAD: either `ref: refs/heads/<name>` (attached) or a raw commit ID (detached)
//! - MERGE_HEAD: tip of the branch whose merge is waiting for conflict resolution
//!
//! A branch file only exists once the branch has a commit, so a freshly
//! initialized repository has a HEAD naming a branch with no ref file yet.
//!
//! Ref writes replace the whole file through a temporary file, holding an
//! exclusive lock on the old one. There is no lock spanning several refs;
//! concurrent writers are last-writer-wins.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{BitError, IoContext, Result};
use crate::areas::lockfile::replace_locked;
use derive_new::new;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

static SYMREF: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(SYMREF_REGEX).expect("symref regex is valid"));

pub const HEAD_REF_NAME: &str = "HEAD";
pub const MERGE_HEAD_REF_NAME: &str = "MERGE_HEAD";

/// Where HEAD currently points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    /// HEAD names a branch
    Attached(BranchName),
    /// HEAD holds a commit ID directly
    Detached(ObjectId),
}

impl std::fmt::Display for HeadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeadState::Attached(branch) => write!(f, "ref: {}", branch.to_sym_ref()),
            HeadState::Detached(oid) => write!(f, "{}", oid),
        }
    }
}

/// Internal representation of a reference value
#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_symref_or_oid(path: &Path) -> Result<Option<SymRefOrOid>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).io_context("read ref", path),
        };
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        if let Some(symref_match) = SYMREF.captures(content) {
            Ok(Some(SymRefOrOid::SymRef(symref_match[1].to_string())))
        } else {
            let oid = ObjectId::try_parse(content.to_string()).map_err(|_| BitError::Malformed {
                what: "ref",
                path: path.to_path_buf(),
                reason: format!("'{}' is neither a symbolic ref nor an object id", content),
            })?;
            Ok(Some(SymRefOrOid::Oid(oid)))
        }
    }
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (typically `.bit`)
    path: Box<Path>,
}

impl Refs {
    pub fn is_initialized(&self) -> bool {
        self.head_path().is_file()
    }

    /// Create the refs area and attach HEAD to `name`
    pub fn initialize_default_branch(&self, name: &BranchName) -> Result<()> {
        if self.is_initialized() {
            return Err(BitError::AlreadyInitialized(self.path.to_path_buf()));
        }

        let heads_path = self.heads_path();
        std::fs::create_dir_all(&heads_path).io_context("create refs directory", &heads_path)?;

        self.set_head(&HeadState::Attached(name.clone()))
    }

    pub fn read_head(&self) -> Result<HeadState> {
        let head_path = self.head_path();

        match SymRefOrOid::read_symref_or_oid(&head_path)? {
            Some(SymRefOrOid::SymRef(sym_ref)) => BranchName::try_parse_sym_ref(&sym_ref)
                .map(HeadState::Attached)
                .map_err(|_| BitError::Malformed {
                    what: "HEAD",
                    path: head_path.to_path_buf(),
                    reason: format!("'{}' is not a branch ref", sym_ref),
                }),
            Some(SymRefOrOid::Oid(oid)) => Ok(HeadState::Detached(oid)),
            None => Err(BitError::Malformed {
                what: "HEAD",
                path: head_path.to_path_buf(),
                reason: "missing or empty".to_string(),
            }),
        }
    }

    pub fn set_head(&self, state: &HeadState) -> Result<()> {
        self.update_ref_file(&self.head_path(), &state.to_string())?;
        tracing::info!(head = %state, "HEAD updated");
        Ok(())
    }

    /// Resolve HEAD to a commit ID, if it points at one
    pub fn resolve_head(&self) -> Result<Option<ObjectId>> {
        match self.read_head()? {
            HeadState::Attached(branch) => self.read_branch(&branch),
            HeadState::Detached(oid) => Ok(Some(oid)),
        }
    }

    /// Move whatever HEAD points at to `oid`
    ///
    /// Updates the branch when HEAD is attached, HEAD itself when detached.
    pub fn advance_head(&self, oid: &ObjectId) -> Result<()> {
        match self.read_head()? {
            HeadState::Attached(branch) => self.write_branch(&branch, oid),
            HeadState::Detached(_) => self.set_head(&HeadState::Detached(oid.clone())),
        }
    }

    pub fn read_branch(&self, name: &BranchName) -> Result<Option<ObjectId>> {
        let branch_path = self.path.join(name.to_ref_path());

        match SymRefOrOid::read_symref_or_oid(&branch_path)? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef(sym_ref)) => Err(BitError::Malformed {
                what: "branch ref",
                path: branch_path.to_path_buf(),
                reason: format!("unexpected symbolic ref to '{}'", sym_ref),
            }),
            None => Ok(None),
        }
    }

    pub fn write_branch(&self, name: &BranchName, oid: &ObjectId) -> Result<()> {
        self.update_ref_file(&self.path.join(name.to_ref_path()), oid.as_ref())?;
        tracing::info!(branch = %name, oid = %oid, "branch updated");
        Ok(())
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.path.join(name.to_ref_path()).is_file()
    }

    /// Point a new branch at the commit HEAD resolves to
    pub fn create_branch(&self, name: &BranchName) -> Result<ObjectId> {
        if self.branch_exists(name) {
            return Err(BitError::BranchExists(name.clone()));
        }

        let oid = self.resolve_head()?.ok_or(BitError::NoCommitsYet)?;
        self.write_branch(name, &oid)?;

        Ok(oid)
    }

    /// All branch names, sorted
    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        let heads_path = self.heads_path();
        let mut branches = Vec::new();

        for entry in WalkDir::new(&heads_path) {
            let entry = entry
                .map_err(std::io::Error::from)
                .io_context("list branches", &heads_path)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative_path = entry
                .path()
                .strip_prefix(&heads_path)
                .map_err(|_| BitError::Malformed {
                    what: "branch ref",
                    path: entry.path().to_path_buf(),
                    reason: "outside of refs/heads".to_string(),
                })?;
            let name = relative_path
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            branches.push(BranchName::try_parse(name)?);
        }

        branches.sort();
        Ok(branches)
    }

    pub fn read_merge_head(&self) -> Result<Option<ObjectId>> {
        match SymRefOrOid::read_symref_or_oid(&self.merge_head_path())? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef(_)) => Err(BitError::Malformed {
                what: "MERGE_HEAD",
                path: self.merge_head_path().to_path_buf(),
                reason: "expected an object id".to_string(),
            }),
            None => Ok(None),
        }
    }

    pub fn write_merge_head(&self, oid: &ObjectId) -> Result<()> {
        self.update_ref_file(&self.merge_head_path(), oid.as_ref())
    }

    pub fn clear_merge_head(&self) -> Result<()> {
        let merge_head_path = self.merge_head_path();
        match std::fs::remove_file(&merge_head_path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).io_context("remove MERGE_HEAD", &merge_head_path)
            }
            _ => Ok(()),
        }
    }

    fn update_ref_file(&self, path: &Path, raw_ref: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).io_context("create ref directory", parent)?;
        }

        replace_locked(path, &self.path, format!("{}\n", raw_ref).as_bytes())
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn merge_head_path(&self) -> Box<Path> {
        self.path.join(MERGE_HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}
