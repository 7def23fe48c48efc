//! Dataset sink trait and error types

use crate::output::Record;
use thiserror::Error;

/// Errors that can occur while writing the dataset
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Workbook write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Workbook read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    #[error("Malformed dataset row {0}")]
    BadRow(usize),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Trait for dataset backends
///
/// The crawler hands the sink its whole record buffer after every page; the
/// sink replaces the artifact's contents with exactly those records.
pub trait DatasetSink {
    /// Reads the records currently stored in the artifact
    ///
    /// Absent or unreadable artifacts yield an empty list.
    fn load(&self) -> Vec<Record>;

    /// Replaces the artifact's contents with `records`
    fn write_all(&mut self, records: &[Record]) -> SinkResult<()>;

    /// Human-readable location of the artifact, for logging
    fn location(&self) -> String;
}
