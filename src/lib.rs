//! Catalog-Harvest: a resumable catalog crawler
//!
//! This crate walks paginated product collections, extracts one record per product card,
//! and rewrites its dataset and progress artifacts after every page so an interrupted run
//! resumes where it left off.

pub mod config;
pub mod crawler;
pub mod output;
pub mod render;
pub mod sources;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Catalog-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source list error: {0}")]
    Sources(#[from] SourceError),

    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),

    #[error("Progress error: {0}")]
    Progress(#[from] storage::ProgressError),

    #[error("Dataset error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("Invalid source URL {source_url}: {message}")]
    InvalidSource { source_url: String, message: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector for {field}: {message}")]
    InvalidSelector { field: String, message: String },
}

/// Source list errors. All of them are fatal for the run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source list {path} did not exist; a template was created, add catalog URLs to it")]
    Missing { path: String },

    #[error("Source list {path} contains no catalog URLs")]
    Empty { path: String },

    #[error("Failed to read source list {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for Catalog-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, RunSummary};
pub use output::Record;
pub use state::CrawlPhase;
