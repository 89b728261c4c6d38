//! Data structures and algorithms
//!
//! - `branch`: Branch name validation
//! - `checkout`: Working tree migration between snapshots
//! - `log`: Commit creation and history traversal
//! - `merge`: Merge base search and three-way merges
//! - `objects`: Object types (blob, commit) and their IDs

pub mod branch;
pub mod checkout;
pub mod log;
pub mod merge;
pub mod objects;
