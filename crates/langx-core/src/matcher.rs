//! Regex scanning with match validation

use crate::error::{Error, Result};
use crate::finding::{FindResult, Finding, SourcePosition};
use crate::position::{CharCursor, PositionTracker};
use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options applied to every match of a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFlags {
    /// Keep matches whose first group is empty
    #[serde(default)]
    pub allow_empty: bool,
    /// Strip surrounding whitespace from every captured group
    #[serde(default)]
    pub trim: bool,
}

impl ScanFlags {
    pub fn new(allow_empty: bool, trim: bool) -> Self {
        Self { allow_empty, trim }
    }
}

/// A compiled scan pattern with its validity filters
///
/// Patterns are matched against the whole file content with `.` matching
/// newlines, so a match may span lines.
#[derive(Debug, Clone)]
pub struct RegexScanner {
    regex: Regex,
    ignore: Option<Regex>,
    flags: ScanFlags,
}

impl RegexScanner {
    /// Compile `pattern` and the optional `ignore` pattern
    ///
    /// Fails if `pattern` declares no capture group.
    pub fn new(pattern: &str, ignore: Option<&str>, flags: ScanFlags) -> Result<Self> {
        let regex = compile(pattern)?;
        if regex.captures_len() < 2 {
            return Err(Error::MissingCaptureGroup(pattern.to_string()));
        }
        // The ignore pattern must match the whole capture.
        let ignore = ignore
            .map(|p| {
                compile(&format!("^(?:{})$", p)).map_err(|e| match e {
                    Error::InvalidRegex { source, .. } => Error::InvalidRegex {
                        pattern: p.to_string(),
                        source,
                    },
                    other => other,
                })
            })
            .transpose()?;

        Ok(Self {
            regex,
            ignore,
            flags,
        })
    }

    /// All valid matches of `content`, in ascending start offset
    ///
    /// Positions are character offsets into `content`.
    pub fn scan(&self, source: &Path, content: &str) -> Vec<FindResult> {
        let tracker = PositionTracker::new(content);
        let mut cursor = CharCursor::new(content);
        let mut results = Vec::new();

        for caps in self.regex.captures_iter(content) {
            if !self.is_valid(&caps) {
                continue;
            }

            let groups = (1..caps.len()).map(|i| self.group(&caps, i)).collect();
            let (start, end) = match caps.get(0) {
                Some(m) => (cursor.char_offset(m.start()), cursor.char_offset(m.end())),
                None => continue,
            };

            results.push(FindResult::new(
                SourcePosition::new(
                    source,
                    start,
                    end,
                    tracker.line_of(start),
                    tracker.column_of(start),
                ),
                Finding::from_groups(groups),
            ));
        }

        tracing::debug!(
            source = %source.display(),
            matches = results.len(),
            "scanned file"
        );
        results
    }

    /// Rewrite `content`, replacing every valid match with `replacer`'s output
    ///
    /// Unmatched spans and invalid matches are copied verbatim. Returns the new
    /// content and the number of replacements made.
    pub fn replace<F>(&self, content: &str, mut replacer: F) -> (String, usize)
    where
        F: FnMut(&Captures<'_>) -> String,
    {
        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        let mut count = 0;

        for caps in self.regex.captures_iter(content) {
            let Some(m) = caps.get(0) else { continue };
            if !self.is_valid(&caps) {
                continue;
            }
            out.push_str(&content[last..m.start()]);
            out.push_str(&replacer(&caps));
            last = m.end();
            count += 1;
        }
        out.push_str(&content[last..]);

        (out, count)
    }

    fn is_valid(&self, caps: &Captures<'_>) -> bool {
        let first = self.group(caps, 1).unwrap_or_default();
        if !self.flags.allow_empty && first.is_empty() {
            return false;
        }
        match &self.ignore {
            Some(ignore) => !ignore.is_match(&first),
            None => true,
        }
    }

    fn group(&self, caps: &Captures<'_>, index: usize) -> Option<String> {
        caps.get(index).map(|m| {
            if self.flags.trim {
                m.as_str().trim().to_string()
            } else {
                m.as_str().to_string()
            }
        })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| Error::InvalidRegex {
            pattern: pattern.to_string(),
            source: e,
        })
}
