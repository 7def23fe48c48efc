//! Statistics over harvest progress
//!
//! This module summarizes the progress store for the `--stats` command.

use crate::storage::ProgressStore;

/// Harvest statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestStatistics {
    /// Number of sources recorded as harvested
    pub sources_harvested: usize,

    /// Sum of recorded counts over all sources
    pub total_records: u64,

    /// Sources recorded with zero records
    pub empty_sources: Vec<String>,

    /// Per-source counts, largest first
    pub per_source: Vec<(String, u64)>,

    /// Sources in the input list not yet harvested, if the list was available
    pub pending_sources: Option<usize>,
}

/// Builds statistics from a progress store
///
/// # Arguments
///
/// * `progress` - The progress store to summarize
/// * `sources` - The current source list, used to count pending sources
pub fn load_statistics(progress: &dyn ProgressStore, sources: Option<&[String]>) -> HarvestStatistics {
    let entries = progress.entries();

    let mut per_source: Vec<(String, u64)> = entries
        .iter()
        .map(|(source, count)| (source.clone(), *count))
        .collect();
    per_source.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let empty_sources = per_source
        .iter()
        .filter(|(_, count)| *count == 0)
        .map(|(source, _)| source.clone())
        .collect();

    let pending_sources =
        sources.map(|list| list.iter().filter(|source| !progress.has(source)).count());

    HarvestStatistics {
        sources_harvested: entries.len(),
        total_records: entries.values().sum(),
        empty_sources,
        per_source,
        pending_sources,
    }
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Sources harvested: {}", stats.sources_harvested);
    println!("Records captured:  {}", stats.total_records);
    if let Some(pending) = stats.pending_sources {
        println!("Sources pending:   {}", pending);
    }

    if !stats.per_source.is_empty() {
        println!("\nRecords per source:");
        for (source, count) in &stats.per_source {
            println!("  {:>6}  {}", count, source);
        }
    }

    if !stats.empty_sources.is_empty() {
        println!(
            "\nSources recorded with no records ({}):",
            stats.empty_sources.len()
        );
        for source in &stats.empty_sources {
            println!("  - {}", source);
        }
    }
}
