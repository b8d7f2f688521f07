//! Front matter: a `---` delimited `key: value` header.
//!
//! ```text
//! ---
//! title: Access review
//! version: 3
//! owners: ["sec", "it"]
//! ---
//! # Body
//! ```
//!
//! Values are typed loosely: quoted strings are unquoted verbatim (no escape
//! sequences), `[`/`{` values are
//! tried as JSON, `true`/`false`/`null` and JSON numbers are typed, anything
//! else is a string. Nothing here ever fails; a value that does not parse is
//! kept as literal text.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

const DELIMITER: &str = "---";

static JSON_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?$")
        .expect("invalid number regex")
});

/// Ordered front matter record.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FrontMatter(Map<String, Value>);

impl FrontMatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the lines between the delimiters. Lines without `:` or with an
    /// empty key are skipped; a repeated key keeps its last value.
    #[must_use]
    pub fn parse(block: &str) -> Self {
        let mut map = Map::new();
        for line in block.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            map.insert(key.to_owned(), parse_value(value.trim()));
        }
        Self(map)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Insert a raw `key: value` string, typed the same way as parsing.
    pub fn insert_raw(&mut self, key: impl Into<String>, raw: &str) -> Option<Value> {
        self.insert(key, parse_value(raw.trim()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Add every entry of `other`, replacing existing keys.
    pub fn extend(&mut self, other: FrontMatter) {
        self.0.extend(other.0);
    }

    /// The delimited block, including the trailing newline. Empty when there
    /// are no entries.
    #[must_use]
    pub fn to_block(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut out = format!("{DELIMITER}\n");
        for (key, value) in &self.0 {
            writeln!(out, "{key}: {}", format_value(value)).unwrap();
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }
}

impl From<Map<String, Value>> for FrontMatter {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A Markdown document with optional front matter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub front_matter: FrontMatter,
    pub body: String,
}

impl Document {
    /// Split a leading front matter block from the body.
    ///
    /// The block must start on the first line and be closed by a `---` line;
    /// otherwise the whole input is the body.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let Some((block, body)) = split_front_matter(source) else {
            return Self {
                front_matter: FrontMatter::new(),
                body: source.to_owned(),
            };
        };
        Self {
            front_matter: FrontMatter::parse(block),
            body: body.to_owned(),
        }
    }

    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = self.front_matter.to_block();
        out.push_str(&self.body);
        out
    }
}

/// (block, body) when `source` opens with a closed front matter block.
fn split_front_matter(source: &str) -> Option<(&str, &str)> {
    let first_line_end = source.find('\n')?;
    if source[..first_line_end].trim_end() != DELIMITER {
        return None;
    }

    let content_start = first_line_end + 1;
    let mut offset = content_start;
    for line in source[content_start..].split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let block = &source[content_start..offset];
            let body = &source[offset + line.len()..];
            return Some((block, body));
        }
        offset += line.len();
    }
    None
}

fn parse_value(raw: &str) -> Value {
    if let Some(inner) = strip_quotes(raw, '"').or_else(|| strip_quotes(raw, '\'')) {
        return Value::String(inner.to_owned());
    }
    if raw.starts_with('[') || raw.starts_with('{') {
        return serde_json::from_str(raw).unwrap_or_else(|error| {
            tracing::debug!(%error, value = raw, "Front matter value kept as text");
            Value::String(raw.to_owned())
        });
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ if JSON_NUMBER.is_match(raw) => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
        }
        _ => Value::String(raw.to_owned()),
    }
}

fn strip_quotes(raw: &str, quote: char) -> Option<&str> {
    raw.strip_prefix(quote)?.strip_suffix(quote)
}

/// Write a value so that [`parse_value`] reads it back unchanged.
///
/// Strings are left bare when that is unambiguous and double-quoted
/// otherwise. A string with a line break has no single-line form and is
/// written as JSON.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.contains('\n') => value.to_string(),
        Value::String(s) if s.trim() == s && parse_value(s) == *value => s.clone(),
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_typed_values() {
        let fm = FrontMatter::parse(
            "title: Access review\nquoted: \"a: b\"\nsingle: 'x'\nversion: 3\nratio: 0.5\n\
             draft: false\ntags: [\"sec\", \"it\"]\nbroken: [oops\nzip: 007\nnothing",
        );
        assert_eq!(fm.get("title"), Some(&json!("Access review")));
        assert_eq!(fm.get("quoted"), Some(&json!("a: b")));
        assert_eq!(fm.get("single"), Some(&json!("x")));
        assert_eq!(fm.get("version"), Some(&json!(3)));
        assert_eq!(fm.get("ratio"), Some(&json!(0.5)));
        assert_eq!(fm.get("draft"), Some(&json!(false)));
        assert_eq!(fm.get("tags"), Some(&json!(["sec", "it"])));
        assert_eq!(fm.get("broken"), Some(&json!("[oops")));
        assert_eq!(fm.get("zip"), Some(&json!("007")));
        assert_eq!(fm.len(), 9);
    }

    #[test]
    fn test_to_block_round_trip() {
        let mut fm = FrontMatter::new();
        fm.insert("title", json!("Plain"));
        fm.insert("count", json!(2));
        fm.insert("looks_numeric", json!("42"));
        fm.insert("padded", json!(" x "));
        fm.insert("meta", json!({"a": [1, true]}));

        let block = fm.to_block();
        assert_eq!(
            block,
            "---\ntitle: Plain\ncount: 2\nlooks_numeric: \"42\"\npadded: \" x \"\nmeta: {\"a\":[1,true]}\n---\n"
        );

        let reparsed = Document::parse(&block);
        assert_eq!(reparsed.front_matter, fm);
        assert_eq!(reparsed.body, "");
    }

    #[test]
    fn test_quoted_values_are_literal() {
        let fm = FrontMatter::parse(
            "path: \"C:\\temp\\new\"\nsay: \"she said \"hi\"\"\nraw: 'a\\nb'",
        );
        assert_eq!(fm.get("path"), Some(&json!("C:\\temp\\new")));
        assert_eq!(fm.get("say"), Some(&json!("she said \"hi\"")));
        assert_eq!(fm.get("raw"), Some(&json!("a\\nb")));
    }

    #[test]
    fn test_to_block_keeps_backslashes_and_quotes() {
        let mut fm = FrontMatter::new();
        fm.insert("path", json!("C:\\temp\\new"));
        fm.insert("quote", json!("\"quoted\""));
        fm.insert("mixed", json!(" it's \"x\" "));

        let block = fm.to_block();
        assert_eq!(
            block,
            "---\npath: C:\\temp\\new\nquote: \"\"quoted\"\"\nmixed: \" it's \"x\" \"\n---\n"
        );
        assert_eq!(Document::parse(&block).front_matter, fm);
    }

    #[test]
    fn test_document_split() {
        let doc = Document::parse("---\ntitle: T\n---\n# Body\n\ntext");
        assert_eq!(doc.front_matter.get("title"), Some(&json!("T")));
        assert_eq!(doc.body, "# Body\n\ntext");
        assert_eq!(doc.to_markdown(), "---\ntitle: T\n---\n# Body\n\ntext");
    }

    #[test]
    fn test_unclosed_front_matter_is_body() {
        let source = "---\ntitle: T\n# Body";
        let doc = Document::parse(source);
        assert!(doc.front_matter.is_empty());
        assert_eq!(doc.body, source);
    }

    #[test]
    fn test_no_front_matter() {
        let doc = Document::parse("# Title\n---\n");
        assert!(doc.front_matter.is_empty());
        assert_eq!(doc.to_markdown(), "# Title\n---\n");
    }

    #[test]
    fn test_crlf_delimiters() {
        let doc = Document::parse("---\r\ntitle: T\r\n---\r\nbody");
        assert_eq!(doc.front_matter.get("title"), Some(&json!("T")));
        assert_eq!(doc.body, "body");
    }
}
