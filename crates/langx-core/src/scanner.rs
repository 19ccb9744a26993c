//! Directory crawler yielding decoded source files

use crate::encoding::Encoding;
use crate::error::{Error, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Which files to crawl and how to decode them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlPattern {
    /// Directory to walk
    pub base_dir: PathBuf,
    /// Glob patterns relative to `base_dir`; empty means every file
    #[serde(default)]
    pub includes: Vec<String>,
    /// Glob patterns relative to `base_dir` that are skipped
    #[serde(default)]
    pub excludes: Vec<String>,
    /// Encoding of the crawled files
    #[serde(default)]
    pub encoding: Encoding,
}

impl CrawlPattern {
    pub fn new(base_dir: impl Into<PathBuf>, encoding: Encoding) -> Self {
        Self {
            base_dir: base_dir.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
            encoding,
        }
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.includes.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }
}

/// One crawled file with its decoded content
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Path relative to the crawl base directory
    pub relative: PathBuf,
    /// Decoded content
    pub content: String,
}

impl SourceFile {
    /// An in-memory source, identified by `path`
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            relative: path.clone(),
            path,
            content: content.into(),
        }
    }
}

/// Walk `pattern.base_dir` and read every matching file, in path order
pub fn crawl(pattern: &CrawlPattern) -> Result<Vec<SourceFile>> {
    let includes = compile_patterns(&pattern.includes)?;
    let excludes = compile_patterns(&pattern.excludes)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(&pattern.base_dir)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(&pattern.base_dir).unwrap_or(path);
        if !is_selected(relative, &includes, &excludes) {
            continue;
        }

        let content = pattern.encoding.read_file(path)?;
        files.push(SourceFile {
            path: path.to_path_buf(),
            relative: relative.to_path_buf(),
            content,
        });
    }

    tracing::debug!(
        base_dir = %pattern.base_dir.display(),
        files = files.len(),
        "crawl finished"
    );
    Ok(files)
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| Error::InvalidGlob {
                pattern: p.clone(),
                source: e,
            })
        })
        .collect()
}

fn is_selected(relative: &Path, includes: &[Pattern], excludes: &[Pattern]) -> bool {
    // Patterns are written with forward slashes on every platform.
    let relative = relative.to_string_lossy().replace('\\', "/");
    let included = includes.is_empty() || includes.iter().any(|p| p.matches(&relative));
    included && !excludes.iter().any(|p| p.matches(&relative))
}
