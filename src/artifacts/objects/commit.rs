//! Commit object
//!
//! Commits record the full set of tracked paths at a point in time. They contain:
//! - Parent commit ID(s) (none for a root commit, two for a merge)
//! - Author information with timestamp
//! - The snapshot: a flat mapping of path to blob ID
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! file <blob-sha> <path>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::{Object, Packable, Unpackable, with_header};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::BitError;
use bytes::Bytes;
use chrono::SubsecRound;
use std::collections::BTreeMap;
use std::io::{BufRead, Read};
use std::path::PathBuf;

/// Flat mapping of tracked path to blob ID, ordered by path
pub type Snapshot = BTreeMap<PathBuf, ObjectId>;

/// Who made a commit and when, with the offset it was made in
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Stamped with the current local time, to the second
    pub fn new(name: String, email: String) -> crate::errors::Result<Self> {
        let now = chrono::Local::now().fixed_offset().trunc_subsecs(0);
        Self::new_with_timestamp(name, email, now)
    }

    /// Fails with `InvalidAuthor` when the name or email would not survive
    /// the `author` header unchanged
    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> crate::errors::Result<Self> {
        let author = Author {
            name,
            email,
            timestamp,
        };

        let reason = if [&author.name, &author.email]
            .iter()
            .any(|field| field.contains(['\n', '\r', '<', '>']))
        {
            Some("line breaks and angle brackets are not allowed")
        } else if author.name.trim_end() != author.name {
            Some("the name cannot end with whitespace")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(BitError::InvalidAuthor {
                identity: author.identity(),
                reason,
            }),
            None => Ok(author),
        }
    }

    /// `Name <email>`
    pub fn identity(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Date as `log` prints it, e.g. `Fri Mar 1 09:30:00 2024 +0100`
    pub fn date_line(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

/// The `author` header value: `Name <email> <unix-seconds> <±hhmm>`
impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.identity(),
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }
}

impl std::str::FromStr for Author {
    type Err = String;

    fn from_str(header: &str) -> Result<Self, Self::Err> {
        let mut fields = header.rsplitn(3, ' ');
        let (Some(offset), Some(seconds), Some(identity)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(format!("author header '{header}' is incomplete"));
        };

        let seconds = seconds
            .parse::<i64>()
            .map_err(|_| format!("author timestamp '{seconds}' is not a number"))?;
        let (name, email) = identity
            .strip_suffix('>')
            .and_then(|identity| identity.split_once('<'))
            .ok_or_else(|| format!("author identity '{identity}' lacks an <email>"))?;

        let offset = chrono::DateTime::parse_from_str(
            &format!("1970-01-01T00:00:00{offset}"),
            "%Y-%m-%dT%H:%M:%S%z",
        )
            .map_err(|_| format!("author offset '{offset}' is invalid"))?
            .offset()
            .to_owned();
        let timestamp = chrono::DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| format!("author timestamp {seconds} is out of range"))?
            .with_timezone(&offset);

        Author::new_with_timestamp(name.trim_end().to_string(), email.to_string(), timestamp)
            .map_err(|e| e.to_string())
    }
}

/// Commit object
///
/// Immutable once written: the object ID is derived from every field, so
/// editing any of them yields a different commit.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs (empty for a root commit, two for a merge commit)
    parents: Vec<ObjectId>,
    author: Author,
    message: String,
    snapshot: Snapshot,
}

impl Commit {
    /// Create a new commit; surrounding whitespace is stripped from the message
    pub fn new(parents: Vec<ObjectId>, author: Author, message: &str, snapshot: Snapshot) -> Self {
        Commit {
            parents,
            author,
            message: message.trim().to_string(),
            snapshot,
        }
    }

    /// Get the first line of the commit message
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// First parent, the edge followed by linear history walks
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.author.timestamp()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    fn payload_lines(&self) -> Vec<String> {
        let mut lines = vec![];

        for parent in &self.parents {
            lines.push(format!("parent {}", parent));
        }
        lines.push(format!("author {}", self.author));
        for (path, oid) in &self.snapshot {
            lines.push(format!("file {} {}", oid, path.to_string_lossy()));
        }
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Bytes {
        let payload = self.payload_lines().join("\n");
        with_header(self.object_type(), payload.as_bytes())
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> Result<Self, String> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|e| format!("commit payload is not UTF-8: {e}"))?;
        // Headers end at the first blank line; the message after it is kept
        // byte for byte so the commit rehashes to the same ID
        let (headers, message) = content.split_once("\n\n").unwrap_or((&content, ""));
        let mut lines = headers.split('\n');

        // Parse all parent lines (there can be 0, 1 or 2 parents)
        let mut parents = Vec::new();
        let mut next_line = lines.next().ok_or("missing author line")?;

        while let Some(parent_oid) = next_line.strip_prefix("parent ") {
            parents.push(
                ObjectId::try_parse(parent_oid.to_string()).map_err(|e| e.to_string())?,
            );
            next_line = lines.next().ok_or("missing author line")?;
        }

        let author = next_line
            .strip_prefix("author ")
            .ok_or("invalid author line")?;
        let author = author.parse::<Author>()?;

        let mut snapshot = Snapshot::new();
        for line in lines {
            let entry = line.strip_prefix("file ").ok_or("invalid file line")?;
            let (oid, path) = entry.split_once(' ').ok_or("invalid file line")?;
            let oid = ObjectId::try_parse(oid.to_string()).map_err(|e| e.to_string())?;
            snapshot.insert(PathBuf::from(path), oid);
        }

        let message = message.to_string();
        Ok(Commit {
            parents,
            author,
            message,
            snapshot,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
