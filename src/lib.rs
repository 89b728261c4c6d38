//! Minimal local version control engine
//!
//! Content-addressed objects, branch references, a staging index, a commit
//! graph and three-way merges, all reached through [`Repository`].
//!
//! ```rust,ignore
//! let repository = Repository::open(".", Config::from_env())?;
//! repository.init()?;
//! repository.add(&["notes.txt"])?;
//! println!("{}", repository.commit("Add notes")?);
//! ```

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod errors;

pub use areas::refs::HeadState;
pub use areas::repository::Repository;
pub use artifacts::merge::engine::{ConflictDetail, ConflictReport, MergeResult};
pub use commands::porcelain::log::LogFormat;
pub use config::Config;
pub use errors::{BitError, ErrorKind, Result};
