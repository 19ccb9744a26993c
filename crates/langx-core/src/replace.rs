//! Rewriting source files by replacing regex matches

use crate::error::{Error, Result};
use crate::matcher::RegexScanner;
use crate::scanner::{crawl, CrawlPattern, SourceFile};
use regex::Captures;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a replace run
#[derive(Debug, Clone, Default)]
pub struct ReplaceResult {
    /// Files that were written
    pub files_written: Vec<PathBuf>,
    /// Total number of matches replaced
    pub replacements: usize,
}

/// Crawl `pattern` and write every file, with valid matches of `scanner`
/// replaced, to the same relative path under `target_dir`
///
/// Files are written with the crawl encoding. The first failure aborts the run.
pub fn replace_in_files<F>(
    pattern: &CrawlPattern,
    scanner: &RegexScanner,
    target_dir: &Path,
    replacer: F,
) -> Result<ReplaceResult>
where
    F: FnMut(&Captures<'_>) -> String,
{
    let sources = crawl(pattern)?;
    replace_in_sources(&sources, scanner, target_dir, pattern, replacer)
}

fn replace_in_sources<F>(
    sources: &[SourceFile],
    scanner: &RegexScanner,
    target_dir: &Path,
    pattern: &CrawlPattern,
    mut replacer: F,
) -> Result<ReplaceResult>
where
    F: FnMut(&Captures<'_>) -> String,
{
    let mut result = ReplaceResult::default();

    for source in sources {
        let (content, count) = scanner.replace(&source.content, &mut replacer);
        let output_path = target_dir.join(&source.relative);

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        pattern.encoding.write_file(&output_path, &content)?;

        tracing::debug!(
            source = %source.path.display(),
            target = %output_path.display(),
            replacements = count,
            "rewrote file"
        );
        result.replacements += count;
        result.files_written.push(output_path);
    }

    tracing::info!(
        files = result.files_written.len(),
        replacements = result.replacements,
        "replace finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Encoding;
    use crate::matcher::ScanFlags;

    #[test]
    fn test_replace_mirrors_directory_structure() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("ui")).unwrap();
        fs::write(src.join("ui/View.java"), "label(\"Save\"); label(\"Quit\");").unwrap();
        fs::write(src.join("Main.java"), "no labels").unwrap();

        let pattern = CrawlPattern::new(&src, Encoding::Utf8).include("**/*.java");
        let scanner = RegexScanner::new(r#"label\("([^"]*)"\)"#, None, ScanFlags::default()).unwrap();
        let out = dir.path().join("out");

        let result = replace_in_files(&pattern, &scanner, &out, |caps| {
            format!("msg(\"{}\")", caps[1].to_lowercase())
        })
        .unwrap();

        assert_eq!(result.replacements, 2);
        assert_eq!(result.files_written.len(), 2);
        assert_eq!(
            fs::read_to_string(out.join("ui/View.java")).unwrap(),
            "msg(\"save\"); msg(\"quit\");"
        );
        assert_eq!(fs::read_to_string(out.join("Main.java")).unwrap(), "no labels");
    }

    #[test]
    fn test_replace_keeps_latin1() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.txt"), [b'[', b'x', b']', b' ', 0xE9]).unwrap();

        let pattern = CrawlPattern::new(&src, Encoding::Latin1);
        let scanner = RegexScanner::new(r"\[(\w)\]", None, ScanFlags::default()).unwrap();
        let out = dir.path().join("out");

        replace_in_files(&pattern, &scanner, &out, |caps| caps[1].to_uppercase()).unwrap();
        assert_eq!(fs::read(out.join("a.txt")).unwrap(), vec![b'X', b' ', 0xE9]);
    }
}
