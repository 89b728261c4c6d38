use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::log::commit_graph::CommitGraph;
use crate::config::{Config, METADATA_DIR};
use crate::errors::{BitError, IoContext, Result};
use std::path::Path;

/// Handle on one repository, threaded through every operation
///
/// Opening does not require the repository to be initialized; every
/// operation except `init` checks that itself.
#[derive(Debug)]
pub struct Repository {
    path: Box<Path>,
    config: Config,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let path = path.as_ref();
        let path = path
            .canonicalize()
            .io_context("open repository", path)?
            .into_boxed_path();
        let metadata_path = path.join(METADATA_DIR);

        Ok(Repository {
            database: Database::new(metadata_path.join("objects").into_boxed_path()),
            workspace: Workspace::new(path.clone()),
            refs: Refs::new(metadata_path.into_boxed_path()),
            path,
            config,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata_path(&self) -> Box<Path> {
        self.path.join(METADATA_DIR).into_boxed_path()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn commit_graph(&self) -> CommitGraph<'_> {
        CommitGraph::new(&self.database)
    }

    /// Fresh copy of the staging index as it is on disk
    pub fn load_index(&self) -> Result<Index> {
        let mut index = Index::new(self.metadata_path().join("index").into_boxed_path());
        index.rehydrate()?;

        Ok(index)
    }

    pub fn is_initialized(&self) -> bool {
        self.refs.is_initialized()
    }

    pub(crate) fn ensure_initialized(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(BitError::NotARepository(self.path.to_path_buf()));
        }
        Ok(())
    }
}
