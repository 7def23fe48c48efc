//! Progress store trait and error types
//!
//! This module defines the trait interface for progress backends and
//! associated error types.

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur while persisting progress
///
/// Loading never produces one of these; an unreadable artifact loads as empty.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for progress operations
pub type ProgressResult<T> = Result<T, ProgressError>;

/// Durable mapping from source URL to the number of records captured for it
///
/// A source present in the store is considered harvested and is never
/// crawled again by a later run.
pub trait ProgressStore {
    /// Re-reads the backing artifact, replacing the in-memory mapping
    ///
    /// Absent or corrupt artifacts load as an empty mapping.
    fn load(&mut self) -> &BTreeMap<String, u64>;

    /// Returns true if the source has been recorded
    fn has(&self, source: &str) -> bool;

    /// Returns the recorded count for a source
    fn count(&self, source: &str) -> Option<u64>;

    /// Sets the cumulative record count for a source, overwriting any previous value
    fn record_count(&mut self, source: &str, count: u64);

    /// Writes the mapping to the backing artifact
    fn persist(&self) -> ProgressResult<()>;

    /// Returns every recorded source and its count
    fn entries(&self) -> &BTreeMap<String, u64>;
}
