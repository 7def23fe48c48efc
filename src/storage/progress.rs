//! JSON progress store
//!
//! The artifact is a flat JSON object mapping each source URL to the number
//! of records captured for it, e.g. `{"https://shop.example.com/collections/a": 48}`.

use crate::storage::traits::{ProgressResult, ProgressStore};
use crate::storage::write_atomic;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Progress store backed by a JSON file
#[derive(Debug)]
pub struct JsonProgressStore {
    path: PathBuf,
    counts: BTreeMap<String, u64>,
}

impl JsonProgressStore {
    /// Opens the store, loading whatever the artifact currently holds
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            counts: read_counts(path),
        }
    }

    /// Writes an empty mapping if the artifact does not exist yet
    pub fn ensure_exists(&self) -> ProgressResult<()> {
        if !self.path.exists() {
            write_atomic(&self.path, b"{}")?;
            tracing::info!("Created empty progress file {}", self.path.display());
        }
        Ok(())
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&mut self) -> &BTreeMap<String, u64> {
        self.counts = read_counts(&self.path);
        &self.counts
    }

    fn has(&self, source: &str) -> bool {
        self.counts.contains_key(source)
    }

    fn count(&self, source: &str) -> Option<u64> {
        self.counts.get(source).copied()
    }

    fn record_count(&mut self, source: &str, count: u64) {
        self.counts.insert(source.to_string(), count);
    }

    fn persist(&self) -> ProgressResult<()> {
        let json = serde_json::to_vec_pretty(&self.counts)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    fn entries(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }
}

/// Reads the progress artifact, treating every failure as "nothing done yet"
fn read_counts(path: &Path) -> BTreeMap<String, u64> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::warn!(
                "Could not read progress file {}: {}; starting from scratch",
                path.display(),
                e
            );
            return BTreeMap::new();
        }
    };

    if content.trim().is_empty() {
        return BTreeMap::new();
    }

    match serde_json::from_str(&content) {
        Ok(counts) => counts,
        Err(e) => {
            tracing::warn!(
                "Progress file {} is corrupt ({}); starting from scratch",
                path.display(),
                e
            );
            BTreeMap::new()
        }
    }
}
