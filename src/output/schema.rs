//! Database schema for the SQLite dataset
//!
//! This module contains the SQL schema definitions for the records table.

/// SQL schema for the dataset database
pub const SCHEMA_SQL: &str = r#"
-- One row per extracted product, in harvest order
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT,
    page INTEGER NOT NULL,
    image TEXT,
    name TEXT,
    link TEXT,
    current_price TEXT,
    original_price TEXT,
    discount TEXT
);

CREATE INDEX IF NOT EXISTS idx_records_category ON records(category);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
