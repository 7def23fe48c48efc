//! Crawler module for catalog collection processing
//!
//! This module contains the core crawling logic, including:
//! - The compiled selector table
//! - Pagination discovery on a source's first page
//! - Per-field product card extraction
//! - The crawl driver that ties rendering, extraction and persistence together

mod coordinator;
mod extractor;
mod pagination;
mod selectors;

pub use coordinator::{Coordinator, RunSummary};
pub use extractor::{
    extract_discount, extract_fields, extract_image, extract_link, extract_text,
    last_srcset_candidate, normalize_schema_relative, ProductFields,
};
pub use pagination::{discover, max_page, parse_page_label, PaginationMetadata};
pub use selectors::{CompiledSelector, SelectorTable};

use crate::config::Config;
use crate::sources::load_sources;
use crate::HarvestError;
use std::path::Path;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Read the source list
/// 2. Open the progress and dataset artifacts and the renderer
/// 3. Crawl every source not yet in progress
///
/// The source list is read first, so a missing or empty list fails the run
/// before any artifact or renderer is touched.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed
/// * `Err(HarvestError)` - A fatal setup error
pub async fn crawl(config: &Config) -> Result<RunSummary, HarvestError> {
    let sources = load_sources(Path::new(&config.input.sources_path))?;
    let mut coordinator = Coordinator::new(config).await?;
    coordinator.run(&sources).await
}
