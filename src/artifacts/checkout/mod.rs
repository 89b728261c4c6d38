//! Working tree updates for switch and merge
//!
//! A [`migration::Migration`] is planned in full, and checked against local
//! changes, before any file is touched.

pub mod migration;
