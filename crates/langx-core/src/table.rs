//! Raw persisted translation table: header plus string rows

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Column names every table starts with, in order
pub const FIXED_COLUMNS: [&str; 4] = ["key", "status", "occurs", "default value"];

/// Language columns of a freshly created table
pub const DEFAULT_LANGUAGES: [&str; 2] = ["en", "de"];

pub const KEY_COLUMN: usize = 0;
pub const STATUS_COLUMN: usize = 1;
pub const OCCURRENCE_COLUMN: usize = 2;
pub const DEFAULT_COLUMN: usize = 3;
pub const FIRST_LANG_COLUMN: usize = 4;

/// A persisted table as read from disk, before interpretation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Column definitions from the header row
    pub columns: Vec<Column>,
    /// Data rows, possibly shorter than the header
    pub rows: Vec<Row>,
    /// Source file path
    pub source_path: PathBuf,
}

impl Table {
    /// Create a new empty table
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            source_path,
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Find a row by key
    pub fn find_row(&self, key: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.key() == key)
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Language columns, i.e. everything after the fixed columns
    pub fn languages(&self) -> &[Column] {
        self.columns.get(FIRST_LANG_COLUMN..).unwrap_or(&[])
    }
}

/// A column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name (a fixed column name or a language code)
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of raw fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<String>,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Get a field by column index; missing trailing fields are `None`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    pub fn key(&self) -> &str {
        self.get(KEY_COLUMN).unwrap_or_default()
    }

    /// True for rows with a single blank field
    pub fn is_blank(&self) -> bool {
        self.cells.len() <= 1 && self.key().trim().is_empty()
    }
}

/// Header of a table that does not exist yet
pub fn default_columns() -> Vec<String> {
    FIXED_COLUMNS
        .iter()
        .chain(DEFAULT_LANGUAGES.iter())
        .map(|s| s.to_string())
        .collect()
}
