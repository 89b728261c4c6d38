use crate::areas::refs::HeadState;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{BitError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchStatus {
    AlreadyOn(BranchName),
    Switched(BranchName),
    Detached(ObjectId),
}

impl std::fmt::Display for SwitchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwitchStatus::AlreadyOn(branch) => write!(f, "Already on '{}'", branch),
            SwitchStatus::Switched(branch) => write!(f, "Switched to branch '{}'", branch),
            SwitchStatus::Detached(oid) => write!(f, "HEAD is now at {}", oid.to_short_oid()),
        }
    }
}

impl Repository {
    /// Check out a branch, or detach HEAD at a full commit ID
    ///
    /// The working tree follows; local edits that would be lost abort the
    /// switch before anything changes. A pending merge is abandoned.
    pub fn switch_branch(&self, target: &str) -> Result<SwitchStatus> {
        self.ensure_initialized()?;

        let current = self.refs().read_head()?;
        let (target_state, target_oid) = self.resolve_switch_target(target)?;

        if let HeadState::Attached(branch) = &target_state
            && current == target_state
        {
            return Ok(SwitchStatus::AlreadyOn(branch.clone()));
        }

        let graph = self.commit_graph();
        let old = graph.snapshot_of(self.refs().resolve_head()?.as_ref())?;
        let new = graph.snapshot_of(target_oid.as_ref())?;
        let migration = Migration::plan(self, &old, &new)?;

        if let Some(merge_head) = self.refs().read_merge_head()? {
            tracing::warn!(%merge_head, "abandoning pending merge");
            self.refs().clear_merge_head()?;
        }

        migration.apply_changes()?;
        self.refs().set_head(&target_state)?;

        Ok(match target_state {
            HeadState::Attached(branch) => SwitchStatus::Switched(branch),
            HeadState::Detached(oid) => SwitchStatus::Detached(oid),
        })
    }

    fn resolve_switch_target(&self, target: &str) -> Result<(HeadState, Option<ObjectId>)> {
        if let Ok(branch) = BranchName::try_parse(target.to_string())
            && self.refs().branch_exists(&branch)
        {
            let oid = self.refs().read_branch(&branch)?;
            return Ok((HeadState::Attached(branch), oid));
        }

        match ObjectId::try_parse(target.to_string()) {
            Ok(oid) => match self.commit_graph().get_commit(&oid) {
                Ok(_) => Ok((HeadState::Detached(oid.clone()), Some(oid))),
                Err(BitError::ObjectNotFound(_) | BitError::UnexpectedObjectType { .. }) => {
                    Err(BitError::NoSuchBranch(target.to_string()))
                }
                Err(e) => Err(e),
            },
            Err(_) => Err(BitError::NoSuchBranch(target.to_string())),
        }
    }
}
