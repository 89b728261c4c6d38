use crate::areas::refs::HeadState;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::merge::engine::{MergeEngine, MergeResult};
use crate::errors::{BitError, Result};

impl Repository {
    /// Merge `target` into the checked-out branch
    ///
    /// Needs an attached HEAD, an empty index and no merge already pending.
    pub fn merge(&self, target: &str) -> Result<MergeResult> {
        self.ensure_initialized()?;

        let current = match self.refs().read_head()? {
            HeadState::Attached(branch) => branch,
            HeadState::Detached(_) => return Err(BitError::DetachedHead("merge")),
        };
        if let Some(merge_head) = self.refs().read_merge_head()? {
            return Err(BitError::MergeInProgress(merge_head));
        }
        if !self.load_index()?.is_empty() {
            return Err(BitError::StagedChangesPending);
        }

        let target = BranchName::try_parse(target.to_string())
            .map_err(|_| BitError::NoSuchBranch(target.to_string()))?;

        MergeEngine::new(self).merge(&current, &target, self.config().author()?)
    }
}
