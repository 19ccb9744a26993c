//! Message entity: one row of the translation table

use crate::finding::SourcePosition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The in-memory message table, sorted by key
pub type Messages = BTreeMap<String, Message>;

/// Whether a key was seen in the latest extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Seen in this run
    Found,
    /// Persisted earlier but not seen in this run
    NotFound,
    /// Maintained by hand; never changed by a merge
    Manual,
}

impl Status {
    pub const FOUND_SYMBOL: char = 'F';
    pub const MANUAL_SYMBOL: char = 'M';

    /// Symbol written to the status column; `None` is written as a blank field
    pub fn symbol(self) -> Option<char> {
        match self {
            Status::Found => Some(Self::FOUND_SYMBOL),
            Status::NotFound => None,
            Status::Manual => Some(Self::MANUAL_SYMBOL),
        }
    }

    /// Decode a status column
    ///
    /// Blank decodes to `NotFound`. Only the first character is significant.
    /// Unknown symbols decode to `NotFound` with a warning.
    pub fn from_field(field: &str) -> Self {
        match field.trim().chars().next() {
            None => Status::NotFound,
            Some(Self::FOUND_SYMBOL) => Status::Found,
            Some(Self::MANUAL_SYMBOL) => Status::Manual,
            Some(other) => {
                tracing::warn!("unknown status symbol '{}', treating as not found", other);
                Status::NotFound
            }
        }
    }

    pub fn field(self) -> String {
        self.symbol().map(String::from).unwrap_or_default()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Found => write!(f, "found"),
            Status::NotFound => write!(f, "not found"),
            Status::Manual => write!(f, "manual"),
        }
    }
}

/// One translation-table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub key: String,
    pub status: Status,
    pub default_value: Option<String>,
    /// Translations in column order
    values: Vec<(String, String)>,
    pub occurrences: Vec<SourcePosition>,
}

impl Message {
    pub fn new(key: impl Into<String>, status: Status, default_value: Option<String>) -> Self {
        Self {
            key: key.into(),
            status,
            default_value,
            values: Vec::new(),
            occurrences: Vec::new(),
        }
    }

    /// Translated value for a language
    pub fn value(&self, lang: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(l, _)| l == lang)
            .map(|(_, v)| v.as_str())
    }

    /// Set the translation for `lang`, keeping its column position if present
    pub fn set_value(&mut self, lang: impl Into<String>, value: impl Into<String>) {
        let lang = lang.into();
        let value = value.into();
        match self.values.iter_mut().find(|(l, _)| *l == lang) {
            Some(entry) => entry.1 = value,
            None => self.values.push((lang, value)),
        }
    }

    /// All translations in column order
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn add_occurrence(&mut self, position: SourcePosition) {
        self.occurrences.push(position);
    }

    /// Distinct file names of the occurrences, in first-seen order, comma-joined
    pub fn occurrence_files(&self) -> String {
        let mut names: Vec<String> = Vec::new();
        for occurrence in &self.occurrences {
            let name = occurrence.file_name();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names.join(",")
    }

    /// Apply `f` to the default value and every translation
    pub fn map_values<F>(&mut self, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        if let Some(default) = &self.default_value {
            self.default_value = Some(f(default));
        }
        for (_, value) in &mut self.values {
            *value = f(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_field() {
        assert_eq!(Status::from_field(""), Status::NotFound);
        assert_eq!(Status::from_field("  "), Status::NotFound);
        assert_eq!(Status::from_field("F"), Status::Found);
        assert_eq!(Status::from_field("M"), Status::Manual);
        assert_eq!(Status::from_field("Mx"), Status::Manual);
        assert_eq!(Status::from_field("?"), Status::NotFound);
    }

    #[test]
    fn test_status_field_round_trip() {
        for status in [Status::Found, Status::NotFound, Status::Manual] {
            assert_eq!(Status::from_field(&status.field()), status);
        }
    }

    #[test]
    fn test_values_keep_insertion_order() {
        let mut message = Message::new("k", Status::Found, None);
        message.set_value("en", "Hello");
        message.set_value("de", "Hallo");
        message.set_value("en", "Hi");

        let values: Vec<(&str, &str)> = message.values().collect();
        assert_eq!(values, vec![("en", "Hi"), ("de", "Hallo")]);
        assert_eq!(message.value("de"), Some("Hallo"));
        assert_eq!(message.value("fr"), None);
    }

    #[test]
    fn test_occurrence_files_are_distinct_names() {
        let mut message = Message::new("k", Status::Found, None);
        message.add_occurrence(SourcePosition::new("src/b/B.java", 0, 1, 1, 0));
        message.add_occurrence(SourcePosition::new("src/a/A.java", 0, 1, 1, 0));
        message.add_occurrence(SourcePosition::new("src/b/B.java", 9, 10, 4, 2));

        assert_eq!(message.occurrence_files(), "B.java,A.java");
    }

    #[test]
    fn test_map_values() {
        let mut message = Message::new("k", Status::Found, Some("a\nb".to_string()));
        message.set_value("en", "c\nd");
        message.map_values(|v| v.replace('\n', " "));

        assert_eq!(message.default_value.as_deref(), Some("a b"));
        assert_eq!(message.value("en"), Some("c d"));
    }
}
