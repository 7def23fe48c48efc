//! Output module for the harvested dataset
//!
//! This module handles:
//! - The record type written to the dataset
//! - CSV, SQLite and Excel dataset sinks
//! - Progress statistics for the `--stats` command

mod csv_sink;
mod record;
mod schema;
mod sqlite_sink;
pub mod stats;
mod traits;
mod xlsx_sink;

pub use csv_sink::CsvSink;
pub use record::Record;
pub use sqlite_sink::SqliteSink;
pub use stats::{load_statistics, print_statistics, HarvestStatistics};
pub use traits::{DatasetSink, SinkError, SinkResult};
pub use xlsx_sink::XlsxSink;

use crate::config::{DatasetFormat, OutputConfig};
use std::path::Path;

/// Opens the dataset sink selected by the output configuration
///
/// # Arguments
///
/// * `config` - The output configuration
///
/// # Returns
///
/// * `Ok(Box<dyn DatasetSink>)` - A sink ready to load and write records
/// * `Err(SinkError)` - The dataset could not be opened
pub fn open_sink(config: &OutputConfig) -> SinkResult<Box<dyn DatasetSink>> {
    let path = Path::new(&config.dataset_path);
    let sink: Box<dyn DatasetSink> = match config.format {
        DatasetFormat::Csv => Box::new(CsvSink::new(path)),
        DatasetFormat::Sqlite => Box::new(SqliteSink::new(path)?),
        DatasetFormat::Xlsx => Box::new(XlsxSink::new(path)),
    };
    Ok(sink)
}
