use crate::areas::refs::HeadState;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use colored::Colorize;

/// Shown instead of a branch name when HEAD is not symbolic
pub const DETACHED_HEAD: &str = "detached HEAD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSummary {
    pub name: BranchName,
    pub oid: ObjectId,
}

impl std::fmt::Display for BranchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Created branch '{}' at {}", self.name, self.oid.to_short_oid())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchListing {
    pub current: Option<BranchName>,
    pub branches: Vec<BranchName>,
}

impl std::fmt::Display for BranchListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines = self
            .branches
            .iter()
            .map(|branch| {
                if self.current.as_ref() == Some(branch) {
                    format!("* {}", branch).green().to_string()
                } else {
                    format!("  {}", branch)
                }
            })
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}

impl Repository {
    /// Create a branch at the commit HEAD points to
    pub fn create_branch(&self, name: &str) -> Result<BranchSummary> {
        self.ensure_initialized()?;

        let name = BranchName::try_parse(name.to_string())?;
        let oid = self.refs().create_branch(&name)?;

        Ok(BranchSummary { name, oid })
    }

    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        self.ensure_initialized()?;
        self.refs().list_branches()
    }

    pub fn branch_listing(&self) -> Result<BranchListing> {
        let branches = self.list_branches()?;
        let current = match self.refs().read_head()? {
            HeadState::Attached(branch) => Some(branch),
            HeadState::Detached(_) => None,
        };

        Ok(BranchListing { current, branches })
    }

    /// Name of the checked-out branch, or [`DETACHED_HEAD`]
    pub fn current_branch(&self) -> Result<String> {
        self.ensure_initialized()?;

        match self.refs().read_head()? {
            HeadState::Attached(branch) => Ok(branch.to_string()),
            HeadState::Detached(_) => Ok(DETACHED_HEAD.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::errors::BitError;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repository() -> (TempDir, Repository) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let repository = Repository::open(dir.path(), Config::default()).unwrap();
        repository.init().unwrap();
        (dir, repository)
    }

    fn commit_file(dir: &TempDir, repository: &Repository, content: &str) -> ObjectId {
        dir.child("f.txt").write_str(content).unwrap();
        repository.add(&["f.txt"]).unwrap();
        repository.commit(content).unwrap().oid
    }

    #[rstest]
    fn branching_before_the_first_commit_fails(repository: (TempDir, Repository)) {
        let (_dir, repository) = repository;

        assert!(matches!(
            repository.create_branch("topic"),
            Err(BitError::NoCommitsYet)
        ));
    }

    #[rstest]
    fn new_branch_points_at_head(repository: (TempDir, Repository)) {
        let (dir, repository) = repository;
        let head = commit_file(&dir, &repository, "1");

        let summary = repository.create_branch("feature/login").unwrap();

        assert_eq!(summary.oid, head);
        assert_eq!(
            summary.to_string(),
            format!("Created branch 'feature/login' at {}", head.to_short_oid())
        );
        assert!(matches!(
            repository.create_branch("feature/login"),
            Err(BitError::BranchExists(_))
        ));
    }

    #[rstest]
    #[case("")]
    #[case("bad..name")]
    #[case("trailing/")]
    #[case("with space")]
    fn invalid_names_are_rejected(repository: (TempDir, Repository), #[case] name: &str) {
        let (dir, repository) = repository;
        commit_file(&dir, &repository, "1");

        assert!(matches!(
            repository.create_branch(name),
            Err(BitError::InvalidBranchName(_))
        ));
    }

    #[rstest]
    fn listing_is_sorted_and_marks_the_current_branch(repository: (TempDir, Repository)) {
        let (dir, repository) = repository;
        commit_file(&dir, &repository, "1");
        repository.create_branch("zeta").unwrap();
        repository.create_branch("alpha").unwrap();

        let listing = repository.branch_listing().unwrap();

        let names = listing.branches.iter().map(|b| b.to_string()).collect::<Vec<_>>();
        assert_eq!(names, vec!["alpha", "main", "zeta"]);
        assert_eq!(listing.current.map(|b| b.to_string()), Some("main".to_string()));
    }

    #[rstest]
    fn current_branch_reports_detached_head(repository: (TempDir, Repository)) {
        let (dir, repository) = repository;
        let head = commit_file(&dir, &repository, "1");
        assert_eq!(repository.current_branch().unwrap(), "main");

        repository.switch_branch(head.as_ref()).unwrap();

        assert_eq!(repository.current_branch().unwrap(), DETACHED_HEAD);
    }
}
