//! Bulk value transforms applied before persisting

/// Rewrites a single value
pub trait Transform {
    fn apply(&self, value: &str) -> String;
}

impl<F> Transform for F
where
    F: Fn(&str) -> String,
{
    fn apply(&self, value: &str) -> String {
        self(value)
    }
}

/// Replaces embedded line breaks with a single space
#[derive(Debug, Clone, Copy, Default)]
pub struct NewlineRemover;

impl Transform for NewlineRemover {
    fn apply(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for part in value.split(['\r', '\n']).filter(|p| !p.is_empty()) {
            if !out.is_empty() && !out.ends_with(' ') && !part.starts_with(' ') {
                out.push(' ');
            }
            out.push_str(part);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_remover() {
        assert_eq!(NewlineRemover.apply("one\ntwo"), "one two");
        assert_eq!(NewlineRemover.apply("one\r\ntwo\rthree"), "one two three");
        assert_eq!(NewlineRemover.apply("one \ntwo"), "one two");
        assert_eq!(NewlineRemover.apply("no breaks"), "no breaks");
        assert_eq!(NewlineRemover.apply("\n"), "");
    }

    #[test]
    fn test_closure_transform() {
        let upper = |v: &str| v.to_uppercase();
        assert_eq!(upper.apply("abc"), "ABC");
    }
}
