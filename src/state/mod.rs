//! State module for tracking crawl progress
//!
//! This module provides the phase machine the crawl driver walks for every
//! source and page. Durable per-source progress lives in `storage`.

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
