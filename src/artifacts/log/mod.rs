//! Commit history
//!
//! [`commit_graph::CommitGraph`] creates commits and walks their parent links.

pub mod commit_graph;
