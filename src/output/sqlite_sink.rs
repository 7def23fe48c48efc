//! SQLite dataset sink
//!
//! This module provides a sink that keeps the dataset in a `records` table.
//! Each write replaces the table's rows inside a single transaction.

use crate::output::schema::initialize_schema;
use crate::output::traits::{DatasetSink, SinkResult};
use crate::output::Record;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// SQLite dataset backend
pub struct SqliteSink {
    conn: Connection,
    path: PathBuf,
}

impl SqliteSink {
    /// Opens or creates the dataset database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteSink)` - Successfully opened/created database
    /// * `Err(SinkError)` - Failed to open database
    pub fn new(path: &Path) -> SinkResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    fn read_records(&self) -> SinkResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, page, image, name, link, current_price, original_price, discount
             FROM records ORDER BY id",
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(Record {
                    category: row.get(0)?,
                    page: row.get(1)?,
                    image: row.get(2)?,
                    name: row.get(3)?,
                    link: row.get(4)?,
                    current_price: row.get(5)?,
                    original_price: row.get(6)?,
                    discount: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

impl DatasetSink for SqliteSink {
    fn load(&self) -> Vec<Record> {
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
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM records", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records
                 (category, page, image, name, link, current_price, original_price, discount)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.category,
                    record.page,
                    record.image,
                    record.name,
                    record.link,
                    record.current_price,
                    record.original_price,
                    record.discount,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
