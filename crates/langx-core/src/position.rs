//! Offset to line/column conversion

/// Converts character offsets within one file's content into line and column
///
/// Newline offsets are computed once per file; lookups are binary searches.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    newlines: Vec<usize>,
}

impl PositionTracker {
    /// Index all newline offsets of `content`, counted in characters
    pub fn new(content: &str) -> Self {
        let newlines = content
            .chars()
            .enumerate()
            .filter(|&(_, c)| c == '\n')
            .map(|(i, _)| i)
            .collect();
        Self { newlines }
    }

    /// 1-based line: the number of newlines strictly before `offset`, plus one
    pub fn line_of(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&n| n < offset) + 1
    }

    /// Column of `offset`
    ///
    /// On the first line this is the offset itself. On later lines it is the
    /// distance from the preceding newline, so the first character after a
    /// newline is column 1.
    pub fn column_of(&self, offset: usize) -> usize {
        match self.line_of(offset) {
            1 => offset,
            line => offset - self.newlines[line - 2],
        }
    }

    /// Number of lines in the indexed content
    pub fn line_count(&self) -> usize {
        self.newlines.len() + 1
    }
}

/// Maps byte offsets on char boundaries to character offsets
///
/// Offsets are expected in ascending order; going backwards restarts the
/// count from the beginning of the content.
#[derive(Debug)]
pub(crate) struct CharCursor<'a> {
    content: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    pub(crate) fn new(content: &'a str) -> Self {
        Self {
            content,
            byte: 0,
            chars: 0,
        }
    }

    pub(crate) fn char_offset(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.content[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Naive reference: walk the content character by character.
    fn reference(content: &str, offset: usize) -> (usize, usize) {
        let mut line = 1;
        let mut last_newline = None;
        for (i, c) in content.chars().enumerate() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                last_newline = Some(i);
            }
        }
        let column = match last_newline {
            Some(n) => offset - n,
            None => offset,
        };
        (line, column)
    }

    #[test]
    fn test_first_line() {
        let tracker = PositionTracker::new("hello\nworld");
        assert_eq!(tracker.line_of(0), 1);
        assert_eq!(tracker.column_of(0), 0);
        assert_eq!(tracker.column_of(4), 4);
    }

    #[test]
    fn test_after_newline() {
        let tracker = PositionTracker::new("hello\nworld");
        assert_eq!(tracker.line_of(6), 2);
        assert_eq!(tracker.column_of(6), 1);
        assert_eq!(tracker.column_of(10), 5);
    }

    #[test]
    fn test_newline_belongs_to_its_line() {
        let tracker = PositionTracker::new("ab\ncd");
        assert_eq!(tracker.line_of(2), 1);
        assert_eq!(tracker.line_of(3), 2);
    }

    #[test]
    fn test_matches_reference_for_every_offset() {
        let content = "first\n\nthird line\r\n  key(\"a\",\"b\")\nlast";
        let tracker = PositionTracker::new(content);
        for offset in 0..=content.chars().count() {
            assert_eq!(
                (tracker.line_of(offset), tracker.column_of(offset)),
                reference(content, offset),
                "offset {}",
                offset
            );
        }
    }

    #[test]
    fn test_empty_content() {
        let tracker = PositionTracker::new("");
        assert_eq!(tracker.line_count(), 1);
        assert_eq!(tracker.line_of(0), 1);
        assert_eq!(tracker.column_of(0), 0);
    }

    #[test]
    fn test_non_ascii_matches_reference() {
        let content = "Grüße\nçà va? key(\"a\")\n日本語 x";
        let tracker = PositionTracker::new(content);
        for offset in 0..=content.chars().count() {
            assert_eq!(
                (tracker.line_of(offset), tracker.column_of(offset)),
                reference(content, offset),
                "offset {}",
                offset
            );
        }
        assert_eq!(tracker.line_of(6), 2);
        assert_eq!(tracker.column_of(6), 1);
    }

    #[test]
    fn test_char_cursor() {
        let content = "aé日b";
        let mut cursor = CharCursor::new(content);
        assert_eq!(cursor.char_offset(0), 0);
        assert_eq!(cursor.char_offset(1), 1);
        assert_eq!(cursor.char_offset(3), 2);
        assert_eq!(cursor.char_offset(7), 4);
        assert_eq!(cursor.char_offset(3), 2);
    }
}
