//! Source handling for Catalog-Harvest
//!
//! This module reads the operator's list of collection URLs and builds
//! the per-page URLs the crawler navigates to.

mod page_url;
mod reader;

pub use page_url::page_url;
pub use reader::{
    distinct_sources, load_sources, parse_sources, pending_sources, SOURCES_TEMPLATE,
};
