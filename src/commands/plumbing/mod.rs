//! Plumbing commands (low-level operations)
//!
//! Direct access to the object database, mostly useful for scripting and
//! inspecting what the porcelain commands wrote.
//!
//! ## Commands
//!
//! - `cat-file`: Print the payload of a stored object
//! - `hash-object`: Compute a blob ID and optionally store the blob

pub mod cat_file;
pub mod hash_object;
