//! Excel dataset sink
//!
//! Writes the dataset as a single worksheet with the same header and column
//! order as the CSV sink. The workbook is built in memory and swapped in
//! atomically.

use crate::output::traits::{DatasetSink, SinkError, SinkResult};
use crate::output::Record;
use crate::storage::write_atomic;
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

/// Dataset sink that writes an `.xlsx` workbook
#[derive(Debug)]
pub struct XlsxSink {
    path: PathBuf,
}

impl XlsxSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn encode(records: &[Record]) -> SinkResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        for (col, name) in Record::COLUMNS.iter().enumerate() {
            sheet.write_string(0, col as u16, *name)?;
        }

        for (index, record) in records.iter().enumerate() {
            let row = index as u32 + 1;
            let text = [
                (0, &record.category),
                (2, &record.image),
                (3, &record.name),
                (4, &record.link),
                (5, &record.current_price),
                (6, &record.original_price),
                (7, &record.discount),
            ];
            sheet.write_number(row, 1, record.page)?;
            for (col, value) in text {
                if let Some(value) = value {
                    sheet.write_string(row, col, value)?;
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }

    fn read_records(&self) -> SinkResult<Vec<Record>> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range?,
            None => return Ok(Vec::new()),
        };

        range
            .rows()
            .skip(1)
            .enumerate()
            .map(|(index, row)| decode_row(row).ok_or(SinkError::BadRow(index + 2)))
            .collect()
    }
}

fn decode_row(row: &[Data]) -> Option<Record> {
    let text = |col: usize| match row.get(col) {
        Some(Data::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    };
    let page = match row.get(1)? {
        Data::Float(f) if *f >= 1.0 && f.fract() == 0.0 => *f as u32,
        Data::Int(i) => u32::try_from(*i).ok()?,
        _ => return None,
    };

    Some(Record {
        category: text(0),
        page,
        image: text(2),
        name: text(3),
        link: text(4),
        current_price: text(5),
        original_price: text(6),
        discount: text(7),
    })
}

impl DatasetSink for XlsxSink {
    fn load(&self) -> Vec<Record> {
        if !self.path.exists() {
            return Vec::new();
        }

        match self.read_records() {
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
