//! Job files describing an extraction run

use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::extractor::Extractor;
use crate::matcher::{RegexScanner, ScanFlags};
use crate::negatives::NegativePolicy;
use crate::parser::CsvFormat;
use crate::scanner::CrawlPattern;
use crate::transform::NewlineRemover;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One regex scan over a set of files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Glob patterns relative to the job's base directory
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    /// Pattern with at least one capture group
    pub regex: String,
    /// Matches whose first group fully matches this pattern are skipped
    #[serde(default)]
    pub ignore_regex: Option<String>,
    #[serde(flatten)]
    pub flags: ScanFlags,
}

impl ScanConfig {
    /// Compile the scan patterns
    pub fn scanner(&self) -> Result<RegexScanner> {
        RegexScanner::new(&self.regex, self.ignore_regex.as_deref(), self.flags)
    }

    pub fn crawl_pattern(&self, base_dir: &Path, encoding: Encoding) -> CrawlPattern {
        CrawlPattern {
            base_dir: base_dir.to_path_buf(),
            includes: self.includes.clone(),
            excludes: self.excludes.clone(),
            encoding,
        }
    }
}

/// A complete extraction job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Directory scans and bundle locations are relative to
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Encoding of sources, bundles and the table
    #[serde(default)]
    pub encoding: Encoding,
    /// Table field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Translation table to merge into
    pub output: PathBuf,
    /// Scans producing keys and default values
    #[serde(default)]
    pub positive: Vec<ScanConfig>,
    /// Scans producing candidate untranslated literals
    #[serde(default)]
    pub negative: Vec<ScanConfig>,
    #[serde(default)]
    pub negative_policy: NegativePolicy,
    /// Legacy `.properties` bundles seeding the table
    #[serde(default)]
    pub properties: Vec<String>,
    /// Replace line breaks in all values before writing
    #[serde(default)]
    pub remove_newlines: bool,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl Job {
    /// Load a job file from JSON
    ///
    /// Relative `base_dir` and `output` paths are resolved against the job
    /// file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut job: Job = serde_json::from_str(&content)?;

        if let Some(dir) = path.parent() {
            if job.base_dir.is_relative() {
                job.base_dir = dir.join(&job.base_dir);
            }
            if job.output.is_relative() {
                job.output = dir.join(&job.output);
            }
        }
        Ok(job)
    }

    /// Save the job file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// A starting point for a new job
    pub fn template() -> Self {
        Self {
            base_dir: default_base_dir(),
            encoding: Encoding::Utf8,
            delimiter: default_delimiter(),
            output: PathBuf::from("src/main/resources/messages.csv"),
            positive: vec![ScanConfig {
                includes: vec!["src/**/*.java".to_string()],
                excludes: vec!["src/test/**".to_string()],
                regex: r#"msg\("([^"]+)"\s*,\s*"([^"]*)"\)"#.to_string(),
                ignore_regex: None,
                flags: ScanFlags::default(),
            }],
            negative: vec![ScanConfig {
                includes: vec!["src/**/*.java".to_string()],
                excludes: vec!["src/test/**".to_string()],
                regex: r#""([^"]*)""#.to_string(),
                ignore_regex: Some(r"\w+(?:\.\w+)+|\s*".to_string()),
                flags: ScanFlags::default(),
            }],
            negative_policy: NegativePolicy::LastWins,
            properties: Vec::new(),
            remove_newlines: false,
        }
    }

    pub fn csv_format(&self) -> Result<CsvFormat> {
        Ok(CsvFormat::new(self.encoding, CsvFormat::parse_delimiter(&self.delimiter)?))
    }

    /// Compile every scan before any file is read
    fn scanners(scans: &[ScanConfig]) -> Result<Vec<RegexScanner>> {
        scans.iter().map(ScanConfig::scanner).collect()
    }

    /// Run all scans and transforms, leaving the table unwritten
    pub fn run(&self) -> Result<Extractor> {
        self.csv_format()?;
        let positive = Self::scanners(&self.positive)?;
        let negative = Self::scanners(&self.negative)?;

        let mut extractor = Extractor::with_negative_policy(self.negative_policy);
        if !self.properties.is_empty() {
            extractor.load_properties(&self.base_dir, &self.properties, self.encoding)?;
        }
        for (scan, scanner) in self.positive.iter().zip(&positive) {
            extractor.extract(&scan.crawl_pattern(&self.base_dir, self.encoding), scanner)?;
        }
        for (scan, scanner) in self.negative.iter().zip(&negative) {
            extractor.extract_negatives(&scan.crawl_pattern(&self.base_dir, self.encoding), scanner)?;
        }
        if self.remove_newlines {
            extractor.transform(&NewlineRemover);
        }
        Ok(extractor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Status;

    #[test]
    fn test_template_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        Job::template().save(&path).unwrap();

        let job = Job::load(&path).unwrap();
        assert_eq!(job.base_dir, dir.path().join("."));
        assert_eq!(job.output, dir.path().join("src/main/resources/messages.csv"));
        assert_eq!(job.positive.len(), 1);
        assert_eq!(job.negative[0].ignore_regex.as_deref(), Some(r"[\w.]*|\s*"));
        assert!(job.positive[0].scanner().is_ok());
    }

    #[test]
    fn test_minimal_job_defaults() {
        let json = r#"{
            "output": "messages.csv",
            "positive": [{ "regex": "t\\(\"([^\"]+)\"\\)", "trim": true }]
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();

        assert_eq!(job.encoding, Encoding::Utf8);
        assert_eq!(job.delimiter, ",");
        assert_eq!(job.negative_policy, NegativePolicy::LastWins);
        assert!(job.positive[0].flags.trim);
        assert!(!job.positive[0].flags.allow_empty);
    }

    #[test]
    fn test_job_options_parse() {
        let json = r#"{
            "output": "m.csv",
            "encoding": "iso-8859-1",
            "delimiter": ";",
            "negative_policy": "aggregate"
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.encoding, Encoding::Latin1);
        assert_eq!(job.negative_policy, NegativePolicy::Aggregate);
        assert_eq!(job.csv_format().unwrap().delimiter, b';');
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let json = r#"{ "output": "m.csv", "encoding": "klingon" }"#;
        assert!(serde_json::from_str::<Job>(json).is_err());
    }

    #[test]
    fn test_missing_group_fails_before_scanning() {
        let mut job = Job::template();
        job.base_dir = PathBuf::from("/nonexistent/never/read");
        job.positive[0].regex = r"msg\(\w+\)".to_string();

        assert!(matches!(job.run(), Err(Error::MissingCaptureGroup(_))));
    }

    #[test]
    fn test_template_negative_scan_ignores_keys_only() {
        let scanner = Job::template().negative[0].scanner().unwrap();
        let content = r#"a("view.title") b("Oops") c("Save file") d("  ") e("x.y.z")"#;
        let found: Vec<String> = scanner
            .scan(Path::new("View.java"), content)
            .iter()
            .map(|r| r.key().to_string())
            .collect();
        assert_eq!(found, vec!["Oops", "Save file"]);
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src/ui");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            src.join("View.java"),
            "class View {\n  String a = msg(\"view.title\", \"Main\nWindow\");\n  String b = \"Oops\";\n  String c = \"view.hint\";\n  String d = \" \";\n}\n",
        )
        .unwrap();

        let mut job = Job::template();
        job.base_dir = dir.path().to_path_buf();
        job.remove_newlines = true;

        let mut extractor = job.run().unwrap();
        let message = &extractor.messages()["view.title"];
        assert_eq!(message.status, Status::Found);
        assert_eq!(message.default_value.as_deref(), Some("Main Window"));
        assert_eq!(message.occurrences[0].line, 2);

        let negatives: Vec<String> = extractor
            .negatives()
            .iter()
            .map(|r| r.key().to_string())
            .collect();
        assert_eq!(negatives, vec!["Oops"]);
    }
}
