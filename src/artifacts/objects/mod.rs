//! Object types and operations
//!
//! All content is stored as objects identified by SHA-256 hashes:
//!
//! - **Blob**: File content (raw bytes)
//! - **Commit**: Snapshot of tracked paths with metadata (author, message, parents)
//!
//! All objects serialize to `<type> <size>\0<payload>`; the object ID is the
//! digest of that byte form.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-256 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 64;
