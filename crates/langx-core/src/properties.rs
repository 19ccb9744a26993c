//! Loader for legacy `.properties` message bundles
//!
//! `<base>.properties` provides default values, `<base>_<lang>.properties`
//! (e.g. `messages_de.properties`, `messages_de_CH.properties`) provides
//! translations for `<lang>`.

use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::message::{Message, Messages, Status};
use std::path::{Path, PathBuf};

/// One `key=value` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesEntry {
    pub key: String,
    pub value: String,
    /// 1-based line the entry starts on
    pub line: usize,
}

/// Load every bundle matching `locations` (glob patterns relative to
/// `base_dir`) into a message table
pub fn load_properties(base_dir: &Path, locations: &[String], encoding: Encoding) -> Result<Messages> {
    let mut messages = Messages::new();

    for location in locations {
        for path in find_bundles(base_dir, location)? {
            let content = encoding.read_file(&path)?;
            let lang = language_of(&path);
            let entries = parse_properties(&content);
            tracing::debug!(
                path = %path.display(),
                lang = lang.as_deref().unwrap_or("default"),
                entries = entries.len(),
                "read properties bundle"
            );

            for entry in entries {
                let message = messages
                    .entry(entry.key.clone())
                    .or_insert_with(|| Message::new(entry.key.clone(), Status::Found, None));
                match &lang {
                    Some(lang) => message.set_value(lang.clone(), entry.value),
                    None => message.default_value = Some(entry.value),
                }
            }
        }
    }

    Ok(messages)
}

fn find_bundles(base_dir: &Path, location: &str) -> Result<Vec<PathBuf>> {
    let pattern = base_dir.join(location);
    let pattern = pattern.to_string_lossy();
    let paths = glob::glob(&pattern).map_err(|e| Error::InvalidGlob {
        pattern: location.to_string(),
        source: e,
    })?;

    let mut bundles = Vec::new();
    for path in paths {
        let path = path.map_err(|e| Error::Io(e.into_error()))?;
        if path.is_file() {
            bundles.push(path);
        }
    }
    bundles.sort();
    Ok(bundles)
}

/// Language code from a bundle file name, `None` for the default bundle
fn language_of(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split('_').collect();

    let is_lang = |s: &str| (2..=3).contains(&s.len()) && s.chars().all(|c| c.is_ascii_lowercase());
    let is_country = |s: &str| s.len() == 2 && s.chars().all(|c| c.is_ascii_uppercase());

    match parts.as_slice() {
        [_, .., lang, country] if is_lang(*lang) && is_country(*country) => {
            Some(format!("{}_{}", lang, country))
        }
        [_, .., lang] if is_lang(*lang) => Some(lang.to_string()),
        _ => None,
    }
}

/// Parse `.properties` content into entries
///
/// Supports `=`, `:` and whitespace separators, `#`/`!` comments, backslash
/// line continuations and the usual escapes including `\uXXXX`.
pub fn parse_properties(content: &str) -> Vec<PropertiesEntry> {
    let lines: Vec<&str> = content.lines().collect();
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let start_line = i + 1;
        let trimmed = lines[i].trim_start();
        i += 1;

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) && i < lines.len() {
            logical.pop();
            logical.push_str(lines[i].trim_start());
            i += 1;
        }
        if ends_with_continuation(&logical) {
            logical.pop();
        }

        let (key, value) = split_key_value(&logical);
        entries.push(PropertiesEntry {
            key: unescape(key),
            value: unescape(value),
            line: start_line,
        });
    }

    entries
}

/// An odd number of trailing backslashes continues the line
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..i], line[i + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[i..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                return (&line[..i], rest.trim_start());
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
