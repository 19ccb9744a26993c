//! Three-way merge of fresh extraction results with a persisted table

use crate::error::{Error, Result};
use crate::message::{Message, Messages, Status};
use crate::parser::{parse_table, CsvFormat};
use crate::table::{default_columns, Table, DEFAULT_COLUMN, FIRST_LANG_COLUMN, STATUS_COLUMN};
use crate::writer::write_table;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

/// The table to persist: header columns plus messages sorted by key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedTable {
    /// Fixed columns followed by language codes
    pub columns: Vec<String>,
    pub messages: Messages,
}

impl MergedTable {
    pub fn languages(&self) -> &[String] {
        self.columns.get(FIRST_LANG_COLUMN..).unwrap_or(&[])
    }

    /// Number of messages per status: (found, not found, manual)
    pub fn status_counts(&self) -> (usize, usize, usize) {
        self.messages
            .values()
            .fold((0, 0, 0), |(f, n, m), msg| match msg.status {
                Status::Found => (f + 1, n, m),
                Status::NotFound => (f, n + 1, m),
                Status::Manual => (f, n, m + 1),
            })
    }
}

/// Merge freshly extracted `fresh` messages into the `persisted` table
///
/// - Manual status is never changed.
/// - A persisted default value wins over the extracted one. This keeps hand
///   edits but also ignores changed default text in the sources; clear the
///   cell to pick up the new text.
/// - Translations are copied from the persisted row unchanged.
/// - Persisted keys without a fresh match are kept as `NotFound` with empty
///   occurrences.
/// - Fresh keys without a persisted row are added as `Found`.
pub fn merge_tables(persisted: Option<&Table>, fresh: &Messages) -> MergedTable {
    let persisted = persisted.filter(|t| t.column_count() > 0);
    let columns = match persisted {
        Some(table) => table.column_names(),
        None => default_columns(),
    };

    let mut messages = Messages::new();

    if let Some(table) = persisted {
        for row in &table.rows {
            let key = row.key();
            let persisted_status = Status::from_field(row.get(STATUS_COLUMN).unwrap_or_default());
            let persisted_default = row
                .get(DEFAULT_COLUMN)
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            let mut merged = match fresh.get(key) {
                Some(found) => {
                    let status = match persisted_status {
                        Status::Manual => Status::Manual,
                        _ => Status::Found,
                    };
                    let default_value = persisted_default.or_else(|| found.default_value.clone());
                    let mut merged = Message::new(key, status, default_value);
                    merged.occurrences = found.occurrences.clone();
                    merged
                }
                None => {
                    let status = match persisted_status {
                        Status::Manual => Status::Manual,
                        _ => Status::NotFound,
                    };
                    Message::new(key, status, persisted_default)
                }
            };

            for lang in table.languages() {
                if let Some(value) = row.get(lang.index).filter(|v| !v.is_empty()) {
                    merged.set_value(lang.name.clone(), value);
                }
            }

            messages.insert(key.to_string(), merged);
        }
    }

    for (key, message) in fresh {
        messages
            .entry(key.clone())
            .or_insert_with(|| message.clone());
    }

    MergedTable { columns, messages }
}

/// Merge `fresh` into the table at `path` (if it exists and is not empty) and
/// write the result back
pub fn persist<P: AsRef<Path>>(path: P, fresh: &Messages, format: CsvFormat) -> Result<MergedTable> {
    let path = path.as_ref();
    let persisted = match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Some(parse_table(path, format)?),
        Ok(_) => None,
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            return Err(Error::FileRead {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let merged = merge_tables(persisted.as_ref(), fresh);
    write_table(path, &merged, format)?;
    Ok(merged)
}
