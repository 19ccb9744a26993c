//! Extraction of message keys and negative candidates from source files
//!
//! The extractor owns the message table for one run:
//! - positive scans create messages and record duplicate-key and
//!   duplicate-value conflicts
//! - negative scans collect candidate literals that were not extracted
//! - negatives are cleaned on first read after any scan

use crate::encoding::Encoding;
use crate::error::Result;
use crate::finding::{FindResult, SourcePosition};
use crate::matcher::RegexScanner;
use crate::merger::{persist, MergedTable};
use crate::message::{Message, Messages, Status};
use crate::negatives::{NegativeCandidates, NegativePolicy};
use crate::parser::CsvFormat;
use crate::properties::load_properties;
use crate::scanner::{crawl, CrawlPattern, SourceFile};
use crate::transform::Transform;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Two matches that disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictPair {
    /// The match seen earlier
    pub first: FindResult,
    /// The match that conflicts with it
    pub second: FindResult,
}

/// Collects messages, conflicts and negatives over any number of scans
#[derive(Debug, Default)]
pub struct Extractor {
    messages: Messages,
    ignored_values: HashSet<String>,
    positives: BTreeMap<PathBuf, Vec<SourcePosition>>,
    negatives: NegativeCandidates,
    negatives_cleaned: bool,
    last_by_key: HashMap<String, FindResult>,
    last_by_value: HashMap<String, FindResult>,
    same_key: Vec<ConflictPair>,
    same_value: Vec<ConflictPair>,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_negative_policy(policy: NegativePolicy) -> Self {
        Self {
            negatives: NegativeCandidates::new(policy),
            ..Self::default()
        }
    }

    /// Crawl `pattern` and extract keys and default values with `scanner`
    pub fn extract(&mut self, pattern: &CrawlPattern, scanner: &RegexScanner) -> Result<usize> {
        let sources = crawl(pattern)?;
        Ok(self.extract_sources(&sources, scanner))
    }

    /// Extract keys and default values from already loaded sources
    pub fn extract_sources(&mut self, sources: &[SourceFile], scanner: &RegexScanner) -> usize {
        let mut count = 0;
        for source in sources {
            for result in scanner.scan(&source.path, &source.content) {
                self.add_result(result);
                count += 1;
            }
        }
        tracing::info!(matches = count, messages = self.messages.len(), "positive scan done");
        count
    }

    /// Record one positive match
    ///
    /// An empty key marks its value as ignored instead of creating a message.
    pub fn add_result(&mut self, result: FindResult) {
        self.negatives_cleaned = false;

        if result.key().is_empty() {
            if let Some(value) = result.value() {
                self.ignored_values.insert(value.to_string());
            }
            return;
        }

        self.check_same_key(&result);
        self.check_same_value(&result);

        let message = self
            .messages
            .entry(result.key().to_string())
            .or_insert_with(|| Message::new(result.key(), Status::Found, None));
        if message.default_value.is_none() {
            message.default_value = result.value().map(str::to_string);
        }
        message.add_occurrence(result.position.clone());

        self.positives
            .entry(result.position.source.clone())
            .or_default()
            .push(result.position);
    }

    /// Crawl `pattern` and collect negative candidates with `scanner`
    pub fn extract_negatives(&mut self, pattern: &CrawlPattern, scanner: &RegexScanner) -> Result<usize> {
        let sources = crawl(pattern)?;
        Ok(self.extract_negative_sources(&sources, scanner))
    }

    /// Collect negative candidates from already loaded sources
    pub fn extract_negative_sources(&mut self, sources: &[SourceFile], scanner: &RegexScanner) -> usize {
        let mut count = 0;
        for source in sources {
            for result in scanner.scan(&source.path, &source.content) {
                self.add_negative(result);
                count += 1;
            }
        }
        tracing::info!(matches = count, "negative scan done");
        count
    }

    pub fn add_negative(&mut self, result: FindResult) {
        self.negatives_cleaned = false;
        self.negatives.add(result);
    }

    fn check_same_key(&mut self, result: &FindResult) {
        if let Some(prior) = self.last_by_key.get(result.key()) {
            if prior.value() != result.value() {
                self.same_key.push(ConflictPair {
                    first: prior.clone(),
                    second: result.clone(),
                });
            }
        }
        self.last_by_key.insert(result.key().to_string(), result.clone());
    }

    fn check_same_value(&mut self, result: &FindResult) {
        let Some(value) = result.value() else {
            return;
        };
        if let Some(prior) = self.last_by_value.get(value) {
            if prior.key() != result.key() {
                self.same_value.push(ConflictPair {
                    first: prior.clone(),
                    second: result.clone(),
                });
            }
        }
        self.last_by_value.insert(value.to_string(), result.clone());
    }

    /// Pairs of matches with the same key but different values
    pub fn same_key_conflicts(&self) -> &[ConflictPair] {
        &self.same_key
    }

    /// Pairs of matches with the same value but different keys
    pub fn same_value_conflicts(&self) -> &[ConflictPair] {
        &self.same_value
    }

    /// Values marked as ignored by empty-key matches
    pub fn ignored_values(&self) -> &HashSet<String> {
        &self.ignored_values
    }

    /// Negative candidates that survived cleanup, by source file and line
    pub fn negatives(&mut self) -> Vec<FindResult> {
        self.clean_negatives();
        self.negatives.sorted()
    }

    fn clean_negatives(&mut self) {
        if self.negatives_cleaned {
            return;
        }
        self.negatives_cleaned = true;

        let before = self.negatives.len();
        self.negatives.suppress_nested(&mut self.positives);

        let mut values: HashSet<&str> = self.ignored_values.iter().map(String::as_str).collect();
        values.extend(
            self.messages
                .values()
                .filter_map(|m| m.default_value.as_deref()),
        );
        self.negatives.suppress_values(&values);

        tracing::debug!(
            before,
            after = self.negatives.len(),
            "negative candidates cleaned"
        );
    }

    /// Seed messages from legacy `.properties` files
    ///
    /// Extracted messages keep their default value; seeded translations are
    /// added where missing.
    pub fn load_properties(&mut self, base_dir: &Path, locations: &[String], encoding: Encoding) -> Result<usize> {
        let seeded = load_properties(base_dir, locations, encoding)?;
        let count = seeded.len();
        for (key, seed) in seeded {
            let message = self
                .messages
                .entry(key)
                .or_insert_with(|| Message::new(seed.key.clone(), Status::Found, None));
            if message.default_value.is_none() {
                message.default_value = seed.default_value.clone();
            }
            for (lang, value) in seed.values() {
                if message.value(lang).is_none() {
                    message.set_value(lang, value);
                }
            }
        }
        self.negatives_cleaned = false;
        tracing::info!(messages = count, "legacy properties loaded");
        Ok(count)
    }

    /// Apply `transform` to every value of every message
    pub fn transform<T: Transform + ?Sized>(&mut self, transform: &T) {
        for message in self.messages.values_mut() {
            message.map_values(|v| transform.apply(v));
        }
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Merge the messages into the table at `path` and write it
    pub fn persist<P: AsRef<Path>>(&self, path: P, format: CsvFormat) -> Result<MergedTable> {
        persist(path, &self.messages, format)
    }
}
