//! CSV dataset sink
//!
//! Writes one row per record under a fixed header. The file is rebuilt in
//! memory and swapped in atomically, so readers never see a half-written table.

use crate::output::traits::{DatasetSink, SinkError, SinkResult};
use crate::output::Record;
use crate::storage::write_atomic;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Dataset sink that writes a CSV file
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Serializes records to CSV bytes, header first
    fn encode(records: &[Record]) -> SinkResult<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(Record::COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }

        writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl DatasetSink for CsvSink {
    fn load(&self) -> Vec<Record> {
        let mut reader = match csv::Reader::from_path(&self.path) {
            Ok(reader) => reader,
            Err(e) => {
                let missing = matches!(e.kind(), csv::ErrorKind::Io(io) if io.kind() == ErrorKind::NotFound);
                if !missing {
                    tracing::warn!("Could not open dataset {}: {}", self.path.display(), e);
                }
                return Vec::new();
            }
        };

        match reader.deserialize().collect::<Result<Vec<Record>, _>>() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    "Dataset {} is unreadable ({}); starting with an empty dataset",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn write_all(&mut self, records: &[Record]) -> SinkResult<()> {
        let bytes = Self::encode(records)?;
        write_atomic(&self.path, &bytes)?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
