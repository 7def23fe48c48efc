//! Configuration module for Catalog-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Running without a file is allowed; every section has defaults.
//!
//! # Example
//!
//! ```no_run
//! use catalog_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Dataset goes to: {}", config.output.dataset_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DatasetFormat, FieldSelector, InputConfig, OutputConfig,
    RendererConfig, RendererKind, SelectorConfig,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default};
pub use validation::validate;
