//! CSV writer for translation tables

use crate::error::{Error, Result};
use crate::merger::MergedTable;
use crate::parser::CsvFormat;
use crate::table::FIRST_LANG_COLUMN;
use std::fs;
use std::path::Path;

const RECORD_SEPARATOR: &str = "\r\n";

/// Escape a value for CSV output
///
/// Fields containing a quote, a comma, the delimiter or a line break are
/// quoted with inner quotes doubled; everything else is written literally.
pub fn escape_field(s: &str, delimiter: u8) -> String {
    let needs_quotes = s
        .bytes()
        .any(|b| matches!(b, b'"' | b',' | b'\n' | b'\r') || b == delimiter);
    if needs_quotes {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn write_record<'a, I>(out: &mut String, fields: I, delimiter: u8)
where
    I: IntoIterator<Item = &'a str>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(char::from(delimiter));
        }
        out.push_str(&escape_field(field, delimiter));
    }
    out.push_str(RECORD_SEPARATOR);
}

/// Render a merged table: header, then one row per message in key order
pub fn render_table(table: &MergedTable, delimiter: u8) -> String {
    let mut out = String::new();
    write_record(&mut out, table.columns.iter().map(String::as_str), delimiter);

    let languages = table.columns.get(FIRST_LANG_COLUMN..).unwrap_or(&[]);
    for message in table.messages.values() {
        let status = message.status.field();
        let occurrences = message.occurrence_files();
        let mut fields: Vec<&str> = vec![
            message.key.as_str(),
            status.as_str(),
            occurrences.as_str(),
            message.default_value.as_deref().unwrap_or_default(),
        ];
        fields.extend(
            languages
                .iter()
                .map(|lang| message.value(lang).unwrap_or_default()),
        );
        write_record(&mut out, fields, delimiter);
    }

    out
}

/// Render and write `table` to `path`
///
/// The content is written to a sibling temporary file first and then renamed
/// over `path`, so a failed run never leaves a half-written table behind.
pub fn write_table<P: AsRef<Path>>(path: P, table: &MergedTable, format: CsvFormat) -> Result<()> {
    let path = path.as_ref();
    let content = render_table(table, format.delimiter);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let written = format.encoding.write_file(&tmp, &content).and_then(|()| {
        fs::rename(&tmp, path).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    tracing::info!(
        path = %path.display(),
        rows = table.messages.len(),
        "translation table written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, Messages, Status};
    use crate::parser::parse_table_str;
    use crate::table::default_columns;

    fn table_with(messages: Vec<Message>) -> MergedTable {
        MergedTable {
            columns: default_columns(),
            messages: messages.into_iter().map(|m| (m.key.clone(), m)).collect::<Messages>(),
        }
    }

    #[test]
    fn test_escape_plain() {
        assert_eq!(escape_field("hello world", b','), "hello world");
        assert_eq!(escape_field("", b','), "");
    }

    #[test]
    fn test_escape_special() {
        assert_eq!(escape_field("a,b", b','), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\"", b','), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("a\nb", b','), "\"a\nb\"");
        assert_eq!(escape_field("a\rb", b','), "\"a\rb\"");
        assert_eq!(escape_field("a;b", b';'), "\"a;b\"");
        assert_eq!(escape_field("a,b", b';'), "\"a,b\"");
    }

    #[test]
    fn test_escape_round_trip_through_reader() {
        let original = "He said \"stop, now\"\nthen left";
        let mut message = Message::new("k", Status::Manual, Some(original.to_string()));
        message.set_value("de", original);

        let rendered = render_table(&table_with(vec![message]), b',');
        assert!(rendered.contains("\"He said \"\"stop, now\"\"\nthen left\""));

        let parsed = parse_table_str(&rendered, "t.csv", b',').unwrap();
        assert_eq!(parsed.rows[0].get(3), Some(original));
        assert_eq!(parsed.rows[0].get(5), Some(original));
    }

    #[test]
    fn test_render_layout() {
        let mut message = Message::new("b.key", Status::Found, Some("Bee".to_string()));
        message.set_value("de", "Biene");
        let tombstone = Message::new("a.key", Status::NotFound, None);

        let rendered = render_table(&table_with(vec![message, tombstone]), b',');
        assert_eq!(
            rendered,
            "key,status,occurs,default value,en,de\r\n\
             a.key,,,,,\r\n\
             b.key,F,,Bee,,Biene\r\n"
        );
    }

    #[test]
    fn test_write_table_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/messages.csv");
        let table = table_with(vec![Message::new("k", Status::Manual, None)]);

        write_table(&path, &table, CsvFormat::default()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "key,status,occurs,default value,en,de\r\nk,M,,,,\r\n");
        assert!(!dir.path().join("out/messages.csv.tmp").exists());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.csv");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();
        let table = table_with(vec![Message::new("k", Status::Found, None)]);

        let err = write_table(&path, &table, CsvFormat::default()).unwrap_err();
        assert!(matches!(err, Error::FileWrite { .. }));
        assert!(!dir.path().join("messages.csv.tmp").exists());
    }
}
