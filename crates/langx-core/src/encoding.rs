//! Character encodings for source files and translation tables

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Encoding declared for a crawl or a persisted table
///
/// Mismatches between the declared encoding and the actual bytes are not
/// detected: invalid UTF-8 is replaced and Latin-1 accepts any byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl Encoding {
    /// Decode raw bytes into a string
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }

    /// Encode a string into raw bytes
    pub fn encode(self, s: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 => s.as_bytes().to_vec(),
            Encoding::Latin1 => s
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }

    /// Read and decode a whole file
    pub fn read_file<P: AsRef<Path>>(self, path: P) -> Result<String> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(self.decode(&bytes))
    }

    /// Encode and write a whole file
    pub fn write_file<P: AsRef<Path>>(self, path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.encode(content)).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "iso-8859-1",
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin-1" | "latin1" => Ok(Encoding::Latin1),
            _ => Err(Error::UnknownEncoding(s.to_string())),
        }
    }
}

impl TryFrom<String> for Encoding {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Encoding> for String {
    fn from(encoding: Encoding) -> Self {
        encoding.name().to_string()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("iso-8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("latin_1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert!("ebcdic".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_latin1_round_trip() {
        let bytes = [b'K', 0xE4, b's', b'e'];
        let s = Encoding::Latin1.decode(&bytes);
        assert_eq!(s, "Käse");
        assert_eq!(Encoding::Latin1.encode(&s), bytes.to_vec());
    }

    #[test]
    fn test_latin1_unrepresentable() {
        assert_eq!(Encoding::Latin1.encode("a€b"), b"a?b".to_vec());
    }

    #[test]
    fn test_utf8_mismatch_is_lossy() {
        let s = Encoding::Utf8.decode(&[b'a', 0xE4, b'b']);
        assert_eq!(s, "a\u{FFFD}b");
    }
}
