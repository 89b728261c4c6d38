use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::{IoContext, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitStatus {
    Initialized(PathBuf),
    AlreadyInitialized(PathBuf),
}

impl std::fmt::Display for InitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitStatus::Initialized(path) => {
                write!(f, "Initialized empty bit repository in {}", path.display())
            }
            InitStatus::AlreadyInitialized(path) => {
                write!(f, "bit repository already initialized in {}", path.display())
            }
        }
    }
}

impl Repository {
    /// Create the metadata directory with HEAD on the configured default branch
    ///
    /// Running it on an initialized repository changes nothing.
    pub fn init(&self) -> Result<InitStatus> {
        let metadata_path = self.metadata_path().to_path_buf();
        if self.is_initialized() {
            return Ok(InitStatus::AlreadyInitialized(metadata_path));
        }

        let default_branch = BranchName::try_parse(self.config().default_branch.clone())?;

        let objects_path = self.database().objects_path();
        std::fs::create_dir_all(objects_path).io_context("create objects directory", objects_path)?;
        self.refs().initialize_default_branch(&default_branch)?;

        tracing::info!(path = %metadata_path.display(), branch = %default_branch, "repository initialized");
        Ok(InitStatus::Initialized(metadata_path))
    }
}
