//! Match results produced by a regex scan

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a match was found
///
/// Ordering is by source file, then start offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Source file
    pub source: PathBuf,
    /// Character offset of the match start
    pub start: usize,
    /// Character offset just past the match end
    pub end: usize,
    /// 1-based line of the match start
    pub line: usize,
    /// Column of the match start
    pub column: usize,
}

impl SourcePosition {
    pub fn new(source: impl Into<PathBuf>, start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            source: source.into(),
            start,
            end,
            line,
            column,
        }
    }

    /// File name without directories, as written to the occurrences column
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.to_string_lossy().into_owned())
    }

    /// True if `other` lies within this position's interval
    pub fn contains(&self, other: &SourcePosition) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}

impl Ord for SourcePosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.source
            .cmp(&other.source)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
    }
}

impl PartialOrd for SourcePosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source.display(), self.line, self.column)
    }
}

/// Captured groups of one match
///
/// Group 1 is the key, group 2 (if declared) the default value. Further
/// groups are kept but not interpreted. A group that did not take part in
/// the match is absent; for the key this reads as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    key: String,
    value: Option<String>,
    extra: Vec<Option<String>>,
}

impl Finding {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
            extra: Vec::new(),
        }
    }

    /// Build from groups in declaration order; `groups` must not be empty
    pub(crate) fn from_groups(groups: Vec<Option<String>>) -> Self {
        let mut groups = groups.into_iter();
        let key = groups.next().flatten().unwrap_or_default();
        let value = groups.next().flatten();
        Self {
            key,
            value,
            extra: groups.collect(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Groups after the second
    pub fn extra(&self) -> &[Option<String>] {
        &self.extra
    }
}

/// A match together with its position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindResult {
    pub position: SourcePosition,
    pub finding: Finding,
}

impl FindResult {
    pub fn new(position: SourcePosition, finding: Finding) -> Self {
        Self { position, finding }
    }

    pub fn key(&self) -> &str {
        self.finding.key()
    }

    pub fn value(&self) -> Option<&str> {
        self.finding.value()
    }

    pub fn source(&self) -> &Path {
        &self.position.source
    }

    /// `source:line:column`
    pub fn location(&self) -> String {
        self.position.to_string()
    }
}
