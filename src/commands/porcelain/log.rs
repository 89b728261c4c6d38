use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Medium,
    Oneline,
}

impl Repository {
    /// First-parent history from HEAD, newest first
    pub fn log(&self) -> Result<Vec<(ObjectId, Commit)>> {
        self.ensure_initialized()?;

        let head = self.refs().resolve_head()?;
        self.commit_graph().history(head).collect()
    }
}

pub fn display_commit(oid: &ObjectId, commit: &Commit, format: LogFormat) -> String {
    match format {
        LogFormat::Medium => show_commit_medium(oid, commit),
        LogFormat::Oneline => format!("{} {}", oid.to_short_oid(), commit.short_message()),
    }
}

fn show_commit_medium(oid: &ObjectId, commit: &Commit) -> String {
    let mut lines = vec![format!("commit {}", oid)];
    if commit.is_merge() {
        let parents = commit
            .parents()
            .iter()
            .map(|parent| parent.to_short_oid())
            .collect::<Vec<_>>();
        lines.push(format!("Merge: {}", parents.join(" ")));
    }
    lines.push(format!("Author: {}", commit.author().identity()));
    lines.push(format!("Date:   {}", commit.author().date_line()));
    lines.push(String::new());
    for message_line in commit.message().lines() {
        lines.push(format!("    {}", message_line));
    }

    lines.join("\n")
}
