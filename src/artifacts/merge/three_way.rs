//! Three-way reconciliation of snapshots
//!
//! Works on blob IDs only: a path is clean when at most one side moved away
//! from the base (or both moved to the same blob), and conflicted otherwise.
//! Absence is a value like any other, so additions and deletions follow the
//! same rules as modifications.

use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

pub const OURS_MARKER: &str = "<<<<<<< OURS";
pub const SEPARATOR_MARKER: &str = "=======";
pub const THEIRS_MARKER: &str = ">>>>>>> THEIRS";

/// The three versions of a conflicted path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSides {
    pub base: Option<ObjectId>,
    pub ours: Option<ObjectId>,
    pub theirs: Option<ObjectId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Every path that merged cleanly and still exists
    pub merged: Snapshot,
    pub conflicts: BTreeMap<PathBuf, ConflictSides>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

pub fn reconcile(base: &Snapshot, ours: &Snapshot, theirs: &Snapshot) -> Reconciliation {
    let paths = base
        .keys()
        .chain(ours.keys())
        .chain(theirs.keys())
        .collect::<BTreeSet<_>>();
    let mut reconciliation = Reconciliation::default();

    for path in paths {
        let base_oid = base.get(path);
        let ours_oid = ours.get(path);
        let theirs_oid = theirs.get(path);

        let resolved = if ours_oid == theirs_oid {
            ours_oid
        } else if ours_oid == base_oid {
            theirs_oid
        } else if theirs_oid == base_oid {
            ours_oid
        } else {
            reconciliation.conflicts.insert(
                path.clone(),
                ConflictSides {
                    base: base_oid.cloned(),
                    ours: ours_oid.cloned(),
                    theirs: theirs_oid.cloned(),
                },
            );
            continue;
        };

        if let Some(oid) = resolved {
            reconciliation.merged.insert(path.clone(), oid.clone());
        }
    }

    reconciliation
}

/// Content embedding both versions of a conflicted file
///
/// A side that deleted the file contributes empty content.
pub fn conflict_markers(ours: &[u8], theirs: &[u8]) -> Bytes {
    let mut content = Vec::with_capacity(ours.len() + theirs.len() + 48);
    content.extend_from_slice(OURS_MARKER.as_bytes());
    content.push(b'\n');
    content.extend_from_slice(ours);
    content.push(b'\n');
    content.extend_from_slice(SEPARATOR_MARKER.as_bytes());
    content.push(b'\n');
    content.extend_from_slice(theirs);
    content.push(b'\n');
    content.extend_from_slice(THEIRS_MARKER.as_bytes());

    Bytes::from(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::object::Object;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn oid(content: &str) -> ObjectId {
        Blob::new(content.to_string()).object_id()
    }

    fn single(content: Option<&str>) -> Snapshot {
        content
            .map(|content| Snapshot::from([(PathBuf::from("f.txt"), oid(content))]))
            .unwrap_or_default()
    }

    #[rstest]
    #[case::untouched(Some("1"), Some("1"), Some("1"), Some("1"))]
    #[case::same_change(Some("1"), Some("2"), Some("2"), Some("2"))]
    #[case::only_ours_changed(Some("1"), Some("2"), Some("1"), Some("2"))]
    #[case::only_theirs_changed(Some("1"), Some("1"), Some("3"), Some("3"))]
    #[case::added_by_ours(None, Some("2"), None, Some("2"))]
    #[case::added_by_theirs(None, None, Some("3"), Some("3"))]
    #[case::added_identically(None, Some("2"), Some("2"), Some("2"))]
    #[case::deleted_by_theirs(Some("1"), Some("1"), None, None)]
    #[case::deleted_by_both(Some("1"), None, None, None)]
    fn clean_outcomes(
        #[case] base: Option<&str>,
        #[case] ours: Option<&str>,
        #[case] theirs: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let reconciliation = reconcile(&single(base), &single(ours), &single(theirs));

        assert!(reconciliation.is_clean());
        assert_eq!(reconciliation.merged, single(expected));
    }

    #[rstest]
    #[case::divergent_edits(Some("1"), Some("2"), Some("3"))]
    #[case::divergent_additions(None, Some("2"), Some("3"))]
    #[case::edit_against_delete(Some("1"), Some("2"), None)]
    fn conflicting_outcomes(
        #[case] base: Option<&str>,
        #[case] ours: Option<&str>,
        #[case] theirs: Option<&str>,
    ) {
        let reconciliation = reconcile(&single(base), &single(ours), &single(theirs));

        assert!(reconciliation.merged.is_empty());
        assert_eq!(
            reconciliation.conflicts,
            BTreeMap::from([(
                PathBuf::from("f.txt"),
                ConflictSides {
                    base: base.map(oid),
                    ours: ours.map(oid),
                    theirs: theirs.map(oid),
                }
            )])
        );
    }

    #[test]
    fn unrelated_paths_are_kept_alongside_conflicts() {
        let base = Snapshot::from([(PathBuf::from("f.txt"), oid("1"))]);
        let mut ours = Snapshot::from([(PathBuf::from("f.txt"), oid("2"))]);
        ours.insert(PathBuf::from("ours.txt"), oid("o"));
        let mut theirs = Snapshot::from([(PathBuf::from("f.txt"), oid("3"))]);
        theirs.insert(PathBuf::from("theirs.txt"), oid("t"));

        let reconciliation = reconcile(&base, &ours, &theirs);

        assert_eq!(
            reconciliation.merged,
            Snapshot::from([
                (PathBuf::from("ours.txt"), oid("o")),
                (PathBuf::from("theirs.txt"), oid("t")),
            ])
        );
        assert_eq!(reconciliation.conflicts.len(), 1);
    }

    #[test]
    fn markers_embed_both_sides() {
        let content = conflict_markers(b"2", b"3");

        assert_eq!(
            content,
            Bytes::from_static(b"<<<<<<< OURS\n2\n=======\n3\n>>>>>>> THEIRS")
        );
    }
}
