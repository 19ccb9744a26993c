//! CSV reader for persisted translation tables

use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::table::{Column, Row, Table};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a table is encoded on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvFormat {
    pub encoding: Encoding,
    /// Field delimiter
    pub delimiter: u8,
}

impl CsvFormat {
    pub fn new(encoding: Encoding, delimiter: u8) -> Self {
        Self {
            encoding,
            delimiter,
        }
    }

    /// Parse a delimiter given as text, e.g. `","` or `";"`
    pub fn parse_delimiter(s: &str) -> Result<u8> {
        let s = if s == "\\t" { "\t" } else { s };
        match s.as_bytes() {
            [b] if b.is_ascii() && *b != b'"' && *b != b'\r' && *b != b'\n' => Ok(*b),
            _ => Err(Error::InvalidDelimiter(s.to_string())),
        }
    }
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self::new(Encoding::Utf8, b',')
    }
}

/// Parse a persisted table file
pub fn parse_table<P: AsRef<Path>>(path: P, format: CsvFormat) -> Result<Table> {
    let path = path.as_ref();
    let content = format.encoding.read_file(path)?;
    parse_table_content(&content, path.to_path_buf(), format.delimiter)
}

/// Parse a table from a string (useful for testing)
pub fn parse_table_str(content: &str, source_name: &str, delimiter: u8) -> Result<Table> {
    parse_table_content(content, PathBuf::from(source_name), delimiter)
}

fn parse_table_content(content: &str, path: PathBuf, delimiter: u8) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Rows may omit trailing columns
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: path.clone(),
        source: e,
    })?;

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.to_string(), i))
        .collect();

    let mut rows = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;

        let mut row = Row::new(record.iter().map(str::to_string).collect());
        if row.is_blank() {
            continue;
        }

        if row.cells.len() > columns.len() {
            tracing::warn!(
                "row {} in {} has more fields than columns, truncating",
                row_idx + 1,
                path.display()
            );
            row.cells.truncate(columns.len());
        }

        rows.push(row);
    }

    Ok(Table {
        columns,
        rows,
        source_path: path,
    })
}
