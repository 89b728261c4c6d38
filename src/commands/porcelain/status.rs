use crate::areas::refs::HeadState;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub head: HeadState,
    pub merge_head: Option<ObjectId>,
    pub staged: Vec<(PathBuf, ObjectId)>,
}

impl std::fmt::Display for StatusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.head {
            HeadState::Attached(branch) => writeln!(f, "On branch {}", branch)?,
            HeadState::Detached(oid) => writeln!(f, "HEAD detached at {}", oid.to_short_oid())?,
        }
        if let Some(merge_head) = &self.merge_head {
            writeln!(
                f,
                "Merging {}; stage the resolved files and commit",
                merge_head.to_short_oid()
            )?;
        }

        if self.staged.is_empty() {
            return write!(f, "nothing staged");
        }
        write!(f, "Changes to be committed:")?;
        for (path, oid) in &self.staged {
            write!(f, "\n\t{} ({})", path.display(), oid.to_short_oid())?;
        }
        Ok(())
    }
}

impl Repository {
    /// Entries of the staging index, ordered by path
    pub fn staged_files(&self) -> Result<Vec<(PathBuf, ObjectId)>> {
        self.ensure_initialized()?;

        Ok(self
            .load_index()?
            .entries()
            .map(|(path, oid)| (path.clone(), oid.clone()))
            .collect())
    }

    pub fn status(&self) -> Result<StatusReport> {
        Ok(StatusReport {
            staged: self.staged_files()?,
            head: self.refs().read_head()?,
            merge_head: self.refs().read_merge_head()?,
        })
    }
}
