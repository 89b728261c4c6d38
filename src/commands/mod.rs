//! Command implementations
//!
//! - `plumbing`: Low-level commands for direct object access (cat-file, hash-object)
//! - `porcelain`: User-facing commands for version control workflows (add, commit, merge, etc.)

pub mod plumbing;
pub mod porcelain;
