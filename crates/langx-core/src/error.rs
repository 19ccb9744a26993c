//! Error types for langx-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in langx-core
#[derive(Debug, Error)]
pub enum Error {
    /// A scan pattern declares no capture group
    #[error("regex must contain at least one capture group: '{0}'")]
    MissingCaptureGroup(String),

    /// A scan pattern failed to compile
    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An include or exclude pattern failed to compile
    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Encoding name not supported
    #[error("unknown encoding '{0}' (supported: utf-8, iso-8859-1)")]
    UnknownEncoding(String),

    /// Delimiter must be a single ASCII character
    #[error("invalid delimiter '{0}': expected a single ASCII character")]
    InvalidDelimiter(String),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
