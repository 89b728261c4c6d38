//! Merge algorithms
//!
//! - `common_ancestor`: merge base search over first-parent links
//! - `three_way`: path-level reconciliation of base, ours and theirs
//! - `engine`: branch merges built on the two

pub mod common_ancestor;
pub mod engine;
pub mod three_way;
