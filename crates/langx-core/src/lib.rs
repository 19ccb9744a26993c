//! langx-core: Core library for extracting message keys and maintaining
//! translation tables
//!
//! This library provides functionality to:
//! - Crawl source trees and scan them with capture-group regexes
//! - Build a message table from keys and default values, flagging
//!   duplicate keys and duplicate values
//! - Collect literals that were not extracted ("negatives")
//! - Merge fresh results into a persisted CSV table without losing
//!   manual edits or translations

pub mod config;
pub mod encoding;
pub mod error;
pub mod extractor;
pub mod finding;
pub mod matcher;
pub mod merger;
pub mod message;
pub mod negatives;
pub mod parser;
pub mod position;
pub mod properties;
pub mod replace;
pub mod scanner;
pub mod table;
pub mod transform;
pub mod writer;

pub use config::{Job, ScanConfig};
pub use encoding::Encoding;
pub use error::{Error, Result};
pub use extractor::{ConflictPair, Extractor};
pub use finding::{FindResult, Finding, SourcePosition};
pub use matcher::{RegexScanner, ScanFlags};
pub use merger::{merge_tables, persist, MergedTable};
pub use message::{Message, Messages, Status};
pub use negatives::NegativePolicy;
pub use parser::{parse_table, parse_table_str, CsvFormat};
pub use position::PositionTracker;
pub use replace::{replace_in_files, ReplaceResult};
pub use scanner::{crawl, CrawlPattern, SourceFile};
pub use table::{Column, Row, Table};
pub use transform::{NewlineRemover, Transform};
pub use writer::{render_table, write_table};
