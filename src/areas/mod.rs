//! Core repository components
//!
//! - `database`: content-addressed store for blobs and commits
//! - `index`: staging area of path to blob entries for the next commit
//! - `lockfile`: locked whole-file replacement shared by refs and the index
//! - `refs`: HEAD, branch pointers and the pending-merge marker
//! - `repository`: handle tying the areas together
//! - `workspace`: working directory file system operations

pub mod database;
pub mod index;
pub(crate) mod lockfile;
pub mod refs;
pub mod repository;
pub mod workspace;
