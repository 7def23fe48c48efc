//! Source list reader
//!
//! The source list is plain text, one collection URL per line. Blank lines
//! and `#` comments are ignored.

use crate::storage::ProgressStore;
use crate::SourceError;
use std::collections::HashSet;
use std::path::Path;

/// Written to a missing source list so the operator has something to fill in
pub const SOURCES_TEMPLATE: &str = "# Add your collection URLs here (one per line)\n";

/// Loads the source list from disk
///
/// A missing file is replaced by [`SOURCES_TEMPLATE`] and reported as
/// [`SourceError::Missing`]; a file with no URLs is [`SourceError::Empty`].
/// Both are fatal for the run.
pub fn load_sources(path: &Path) -> Result<Vec<String>, SourceError> {
    let display = path.display().to_string();

    if !path.exists() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SourceError::Io {
                path: display.clone(),
                source,
            })?;
        }
        std::fs::write(path, SOURCES_TEMPLATE).map_err(|source| SourceError::Io {
            path: display.clone(),
            source,
        })?;
        return Err(SourceError::Missing { path: display });
    }

    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: display.clone(),
        source,
    })?;

    let sources = parse_sources(&content);
    if sources.is_empty() {
        return Err(SourceError::Empty { path: display });
    }

    tracing::debug!("Read {} sources from {}", sources.len(), path.display());
    Ok(sources)
}

/// Parses source list content, keeping input order
pub fn parse_sources(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Drops repeated sources, keeping the first occurrence of each
pub fn distinct_sources(sources: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .filter(|source| seen.insert(source.as_str()))
        .cloned()
        .collect()
}

/// Distinct sources the progress store does not know about yet
///
/// This runs once per crawl, before the first navigation.
pub fn pending_sources(sources: &[String], progress: &dyn ProgressStore) -> Vec<String> {
    distinct_sources(sources)
        .into_iter()
        .filter(|source| !progress.has(source))
        .collect()
}
