//! Porcelain commands (user-facing operations)
//!
//! Each command is an `impl Repository` block returning a status value whose
//! `Display` form is what a shell shows the user.
//!
//! ## Commands
//!
//! - `init`: Initialize a new repository
//! - `add`: Stage files for commit
//! - `commit`: Create a new commit, or conclude a pending merge
//! - `branch`: Create and list branches, report the current one
//! - `switch`: Check out a branch or a commit
//! - `log`: Show first-parent history
//! - `merge`: Merge a branch into the current one
//! - `status`: Show the staging index

pub mod add;
pub mod branch;
pub mod commit;
pub mod init;
pub mod log;
pub mod merge;
pub mod status;
pub mod switch;
