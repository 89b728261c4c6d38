//! Whole-file replacement for refs and the index
//!
//! New content goes to a temporary file beside the metadata directory and is
//! renamed over the target, so readers see either the old or the new
//! content, never a truncated file. The previous file, when there is one,
//! stays exclusively locked until the rename lands.

use crate::errors::{IoContext, Result};
use fake::rand;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Replace `target` with `content`, staging the write in `temp_dir`
///
/// `temp_dir` must be on the same file system as `target`.
pub(crate) fn replace_locked(target: &Path, temp_dir: &Path, content: &[u8]) -> Result<()> {
    let mut existing = match std::fs::OpenOptions::new().write(true).open(target) {
        Ok(file) => Some(file),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e).io_context("open", target),
    };
    let _lock = existing
        .as_mut()
        .map(|file| file_guard::lock(file, file_guard::Lock::Exclusive, 0, 1))
        .transpose()
        .io_context("lock", target)?;

    let temp_path = temp_dir.join(temp_name());
    let written = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .and_then(|mut file| file.write_all(content).and_then(|_| file.sync_all()))
        .and_then(|_| std::fs::rename(&temp_path, target));

    if let Err(e) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e).io_context("replace", target);
    }

    Ok(())
}

fn temp_name() -> PathBuf {
    PathBuf::from(format!("tmp-{}", rand::random::<u32>()))
}
