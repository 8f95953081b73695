//! Content records: a `---` delimited YAML header followed by free text.
//!
//! Parsing keeps the header's key order and the body verbatim. Rendering
//! writes the header back in the flat `key: "value"` form used across the
//! reading log, so every header value must be a scalar.

use crate::error::{Result, ReadlogError};
use serde_yaml::{Mapping, Value};

pub const MARKER: &str = "---";
const END_MARKER_ALT: &str = "...";

// ---------------------------------------------------------------------------
// Well-known header keys
// ---------------------------------------------------------------------------

pub const TITLE: &str = "title";
pub const ISBN13: &str = "isbn13";
pub const AUTHOR_NAME: &str = "author_name";
pub const DATE: &str = "date";
pub const UPDATED_AT: &str = "updated_at";

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Ordered front-matter fields with string keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header(Mapping);

impl Header {
    pub fn new() -> Self {
        Self(Mapping::new())
    }

    fn from_mapping(mapping: Mapping) -> Result<Self> {
        let mut header = Mapping::with_capacity(mapping.len());
        for (key, value) in mapping {
            let key = scalar_to_string(&key).ok_or_else(|| {
                ReadlogError::InvalidFrontMatter("header keys must be scalars".to_string())
            })?;
            header.insert(Value::String(key), value);
        }
        Ok(Self(header))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The field as text, or `None` when absent, null, empty, or nested.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(scalar_to_string)
            .filter(|s| !s.trim().is_empty())
    }

    /// Whether the field holds a value that counts as set. Null, `false`,
    /// numeric zero and blank strings do not.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }

    /// Set `key` to a string value. An existing key keeps its position.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0
            .insert(Value::String(key.to_string()), Value::String(value.into()));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.0.keys().filter_map(scalar_to_string)
    }

    /// Render the header block, including both markers and the trailing
    /// blank line.
    pub fn render(&self) -> Result<String> {
        self.render_with(LineEnding::Lf)
    }

    /// Render with the given line ending.
    ///
    /// Values lose any `"` and `~` and are written double-quoted, with
    /// backslashes and control characters escaped so the block parses back
    /// to the same text.
    pub fn render_with(&self, newline: LineEnding) -> Result<String> {
        let nl = newline.as_str();
        let mut out = String::new();
        out.push_str(MARKER);
        out.push_str(nl);
        for (key, value) in &self.0 {
            let key = scalar_to_string(key).unwrap_or_default();
            let value =
                scalar_to_string(value).ok_or_else(|| ReadlogError::NestedHeaderValue(key.clone()))?;
            let value: String = value.chars().filter(|c| !matches!(c, '"' | '~')).collect();
            if is_plain_key(&key) {
                out.push_str(&key);
            } else {
                push_quoted(&mut out, &key);
            }
            out.push_str(": ");
            push_quoted(&mut out, &value);
            out.push_str(nl);
        }
        out.push_str(MARKER);
        out.push_str(nl);
        out.push_str(nl);
        Ok(out)
    }
}

/// Identifier-like keys are written bare. Anything else is quoted so YAML
/// reads it back as the same string.
fn is_plain_key(key: &str) -> bool {
    key.starts_with(|c: char| c.is_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        && !matches!(key, "null" | "Null" | "NULL")
}

/// Append `text` as a YAML double-quoted scalar.
fn push_quoted(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() || is_yaml_break_or_special(c) => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn is_yaml_break_or_special(c: char) -> bool {
    matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffe}' | '\u{ffff}')
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.trim().is_empty(),
        Value::Tagged(tagged) => is_truthy(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => true,
    }
}

/// Text form of a scalar YAML value. `None` for sequences and mappings.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

// ---------------------------------------------------------------------------
// ContentRecord
// ---------------------------------------------------------------------------

/// Line ending of a record, taken from its opening marker line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    pub header: Header,
    pub body: String,
    /// Used for the rendered header; the body keeps its own endings.
    pub line_ending: LineEnding,
}

impl ContentRecord {
    /// Parse a record from its on-disk text.
    pub fn parse(raw: &str) -> Result<Self> {
        let (front, body, line_ending) =
            split_front_matter(raw).ok_or(ReadlogError::MissingFrontMatter)?;
        if front.trim().is_empty() {
            return Ok(Self {
                header: Header::new(),
                body: body.to_string(),
                line_ending,
            });
        }
        let header = match serde_yaml::from_str::<Value>(front) {
            Ok(Value::Null) => Header::new(),
            Ok(Value::Mapping(mapping)) => Header::from_mapping(mapping)?,
            Ok(_) => {
                return Err(ReadlogError::InvalidFrontMatter(
                    "header is not a key/value mapping".to_string(),
                ))
            }
            Err(e) => return Err(ReadlogError::InvalidFrontMatter(e.to_string())),
        };
        Ok(Self {
            header,
            body: body.to_string(),
            line_ending,
        })
    }

    /// Render back to on-disk text. Leading blank lines of the body collapse
    /// into the single blank line after the closing marker.
    pub fn render(&self) -> Result<String> {
        let mut out = self.header.render_with(self.line_ending)?;
        out.push_str(self.body.trim_start_matches(['\r', '\n']));
        Ok(out)
    }
}

/// Split `raw` into header text and body text.
///
/// The header must open on the first line (after an optional BOM) and close
/// with a `---` or `...` line. The body is everything after the closing
/// line.
fn split_front_matter(raw: &str) -> Option<(&str, &str, LineEnding)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let rest = raw.strip_prefix(MARKER)?;
    let (rest, line_ending) = match rest.strip_prefix("\r\n") {
        Some(rest) => (rest, LineEnding::CrLf),
        None => (rest.strip_prefix('\n')?, LineEnding::Lf),
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == MARKER || trimmed == END_MARKER_ALT {
            return Some((&rest[..offset], &rest[offset + line.len()..], line_ending));
        }
        offset += line.len();
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_header_and_body() {
        let raw = "---\ntitle: Structure and Interpretation\nisbn13: 9780262510875\n---\n\nGreat book.\n";
        let record = ContentRecord::parse(raw).unwrap();
        assert_eq!(
            record.header.text(TITLE).as_deref(),
            Some("Structure and Interpretation")
        );
        assert_eq!(record.header.text(ISBN13).as_deref(), Some("9780262510875"));
        assert_eq!(record.body, "\nGreat book.\n");
    }

    #[test]
    fn parse_keeps_key_order() {
        let raw = "---\nzeta: 1\nalpha: 2\nmid: 3\n---\n";
        let record = ContentRecord::parse(raw).unwrap();
        let keys: Vec<String> = record.header.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn parse_crlf_and_bom() {
        let raw = "\u{feff}---\r\ntitle: Dune\r\n---\r\nBody\r\n";
        let record = ContentRecord::parse(raw).unwrap();
        assert_eq!(record.header.text(TITLE).as_deref(), Some("Dune"));
        assert_eq!(record.body, "Body\r\n");
    }

    #[test]
    fn parse_accepts_dots_terminator() {
        let raw = "---\ntitle: Dune\n...\nBody";
        let record = ContentRecord::parse(raw).unwrap();
        assert_eq!(record.body, "Body");
    }

    #[test]
    fn parse_empty_header() {
        let record = ContentRecord::parse("---\n---\nJust text").unwrap();
        assert!(record.header.is_empty());
        assert_eq!(record.body, "Just text");
    }

    #[test]
    fn parse_without_marker_fails() {
        let err = ContentRecord::parse("title: Dune\n\nBody").unwrap_err();
        assert!(matches!(err, ReadlogError::MissingFrontMatter));
    }

    #[test]
    fn parse_unclosed_header_fails() {
        let err = ContentRecord::parse("---\ntitle: Dune\nBody").unwrap_err();
        assert!(matches!(err, ReadlogError::MissingFrontMatter));
    }

    #[test]
    fn parse_non_mapping_header_fails() {
        let err = ContentRecord::parse("---\n- a\n- b\n---\n").unwrap_err();
        assert!(matches!(err, ReadlogError::InvalidFrontMatter(_)));
    }

    #[test]
    fn text_ignores_empty_and_null() {
        let record = ContentRecord::parse("---\na: \"\"\nb:\nc: x\n---\n").unwrap();
        assert!(record.header.contains_key("a"));
        assert_eq!(record.header.text("a"), None);
        assert_eq!(record.header.text("b"), None);
        assert_eq!(record.header.text("c").as_deref(), Some("x"));
    }

    #[test]
    fn render_quotes_and_strips() {
        let mut header = Header::new();
        header.insert("title", "The \"Best\" Book ~ Ever");
        header.insert("pages", "200");
        let record = ContentRecord {
            header,
            body: "\n\nNotes here.\n".to_string(),
            line_ending: LineEnding::Lf,
        };
        assert_eq!(
            record.render().unwrap(),
            "---\ntitle: \"The Best Book  Ever\"\npages: \"200\"\n---\n\nNotes here.\n"
        );
    }

    #[test]
    fn render_numbers_and_bools_as_strings() {
        let record = ContentRecord::parse("---\npages: 200\nread: true\n---\n").unwrap();
        assert_eq!(
            record.header.render().unwrap(),
            "---\npages: \"200\"\nread: \"true\"\n---\n\n"
        );
    }

    #[test]
    fn render_rejects_nested_values() {
        let record = ContentRecord::parse("---\ntitle: Dune\ntags:\n  - sf\n---\n").unwrap();
        let err = record.render().unwrap_err();
        assert!(matches!(err, ReadlogError::NestedHeaderValue(ref k) if k == "tags"));
    }

    #[test]
    fn insert_existing_key_keeps_position() {
        let mut record = ContentRecord::parse("---\ndate: 2016/03/01\ntitle: Dune\n---\n").unwrap();
        record.header.insert(DATE, "2016-03-01");
        let keys: Vec<String> = record.header.keys().collect();
        assert_eq!(keys, vec!["date", "title"]);
        assert_eq!(record.header.text(DATE).as_deref(), Some("2016-03-01"));
    }

    fn reparse(header: Header) -> Header {
        let rendered = ContentRecord {
            header,
            body: "Body\n".to_string(),
            line_ending: LineEnding::Lf,
        }
        .render()
        .unwrap();
        ContentRecord::parse(&rendered).unwrap().header
    }

    #[test]
    fn render_escapes_backslashes_and_control_chars() {
        let mut header = Header::new();
        header.insert("size", "8.5\\x5.5");
        header.insert("notes", "line one\nline two\r\n\tend");
        assert_eq!(
            header.render().unwrap(),
            "---\nsize: \"8.5\\\\x5.5\"\nnotes: \"line one\\nline two\\r\\n\\tend\"\n---\n\n"
        );
    }

    #[test]
    fn rendered_values_parse_back_unchanged() {
        let values = [
            "8.5\\x5.5",
            "C:\\Users\\me\\",
            "\\u0041 is not an escape",
            "line one\nline two\n",
            "windows\r\nlines",
            "tab\tseparated",
            "Part 1: Arrakis",
            "key: value # not a comment",
            "# leading hash",
            "- looks like a list",
            "[not, a, list]",
            "{not: a map}",
            "'single quoted'",
            "&anchor *alias !tag %directive @at `tick` |pipe >fold",
            "null",
            "true",
            "0x1F",
            "2016-03-01",
            " padded ",
            "bell\u{7} and delete\u{7f}",
            "line\u{2028}separator",
            "naïve café, 東京",
        ];
        for value in values {
            let mut header = Header::new();
            header.insert("v", value);
            let back = reparse(header);
            assert_eq!(
                back.get("v"),
                Some(&Value::String(value.to_string())),
                "value {value:?}"
            );
        }
    }

    #[test]
    fn odd_keys_are_quoted_and_parse_back() {
        let keys = ["odd: key", "# hash", "123", "null", "-dash", "with space"];
        for key in keys {
            let mut header = Header::new();
            header.insert(key, "x");
            let back = reparse(header);
            assert_eq!(back.keys().collect::<Vec<_>>(), vec![key.to_string()]);
            assert_eq!(back.text(key).as_deref(), Some("x"), "key {key:?}");
        }
    }

    #[test]
    fn block_scalar_survives_render() {
        let record =
            ContentRecord::parse("---\ntitle: Dune\nnotes: |\n  line one\n  line two\n---\nBody\n")
                .unwrap();
        assert_eq!(
            record.header.text("notes").as_deref(),
            Some("line one\nline two\n")
        );
        let back = ContentRecord::parse(&record.render().unwrap()).unwrap();
        assert_eq!(back.header, record.header);
        assert_eq!(back.body, "Body\n");
    }

    #[test]
    fn crlf_record_renders_crlf() {
        let record = ContentRecord::parse("---\r\ntitle: Dune\r\n---\r\n\r\nBody\r\nMore\r\n").unwrap();
        assert_eq!(record.line_ending, LineEnding::CrLf);
        let rendered = record.render().unwrap();
        assert_eq!(rendered, "---\r\ntitle: \"Dune\"\r\n---\r\n\r\nBody\r\nMore\r\n");
        assert!(!rendered.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn lf_record_renders_lf() {
        let record = ContentRecord::parse("---\ntitle: Dune\n---\nBody\n").unwrap();
        assert_eq!(record.line_ending, LineEnding::Lf);
        assert!(!record.render().unwrap().contains('\r'));
    }

    #[test]
    fn is_set_follows_truthiness() {
        let record = ContentRecord::parse(
            "---\na: false\nb: 0\nc: 0.0\nd: \"\"\ne:\nf: 2020-01-01\ng: true\nh: 1\ni: \"0\"\n---\n",
        )
        .unwrap();
        for key in ["a", "b", "c", "d", "e", "missing"] {
            assert!(!record.header.is_set(key), "{key} should not count as set");
        }
        for key in ["f", "g", "h", "i"] {
            assert!(record.header.is_set(key), "{key} should count as set");
        }
    }
}
