//! Storage module for persisting crawl progress
//!
//! This module handles the durable side of resumption:
//! - The per-source progress mapping and its JSON artifact
//! - Crash-safe replacement of artifacts on disk

mod progress;
mod traits;

pub use progress::JsonProgressStore;
pub use traits::{ProgressError, ProgressResult, ProgressStore};

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replaces the file at `path` with `contents`
///
/// The bytes go to a temporary file in the same directory, which is synced
/// and then renamed over the target, so a crash leaves either the old or
/// the new file and never a truncated one.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.flush()?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    Ok(())
}
