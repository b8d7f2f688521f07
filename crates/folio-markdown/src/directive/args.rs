//! Directive attribute parsing and writing.
//!
//! Parses the `key="value" key='value' key=value` list found inside a
//! directive's braces. Double-quoted values may contain `\"` and `\\`.

use std::collections::HashMap;

/// Parsed `key=value` attributes from directive braces.
///
/// # Example
///
/// ```
/// use folio_markdown::directive::DirectiveArgs;
///
/// let args = DirectiveArgs::parse(r#"id="c-1" text='Done' size=3"#);
/// assert_eq!(args.get("id"), Some("c-1"));
/// assert_eq!(args.get("text"), Some("Done"));
/// assert_eq!(args.get("size"), Some("3"));
/// ```
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DirectiveArgs {
    attrs: HashMap<String, String>,
}

impl DirectiveArgs {
    /// Parse an attribute string (without braces).
    ///
    /// The first occurrence of a key wins. Tokens that are not `key=value`
    /// pairs are skipped.
    #[must_use]
    pub fn parse(attrs_str: &str) -> Self {
        let mut args = Self::default();
        let mut remaining = attrs_str.trim();

        while !remaining.is_empty() {
            remaining = remaining.trim_start();

            if let Some((key, value, rest)) = parse_key_value(remaining) {
                args.attrs.entry(key.to_owned()).or_insert(value);
                remaining = rest;
            } else {
                // Skip the unrecognized token
                let end = remaining
                    .find(char::is_whitespace)
                    .unwrap_or(remaining.len());
                remaining = &remaining[end..];
            }
        }

        args
    }

    /// Get an attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Get a non-empty, trimmed attribute value.
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// Parse a key-value pair from the start of `s`.
///
/// Supports: `key="value"`, `key='value'`, `key=value`
fn parse_key_value(s: &str) -> Option<(&str, String, &str)> {
    let key_end = s.find(|c: char| c == '=' || c.is_whitespace())?;
    if !s[key_end..].starts_with('=') {
        return None;
    }
    let key = &s[..key_end];
    if key.is_empty() {
        return None;
    }

    let after_eq = &s[key_end + 1..];

    if let Some(quoted) = after_eq.strip_prefix('"') {
        let (value, consumed) = read_double_quoted(quoted)?;
        Some((key, value, &quoted[consumed..]))
    } else if let Some(quoted) = after_eq.strip_prefix('\'') {
        let end_quote = quoted.find('\'')?;
        Some((key, quoted[..end_quote].to_owned(), &quoted[end_quote + 1..]))
    } else {
        // Unquoted value (until whitespace)
        let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
        Some((key, after_eq[..end].to_owned(), &after_eq[end..]))
    }
}

/// Read a double-quoted value body. Returns the unescaped value and the
/// bytes consumed including the closing quote.
fn read_double_quoted(s: &str) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = s.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, i + 1)),
            '\\' => match chars.next() {
                Some((_, next @ ('"' | '\\'))) => value.push(next),
                Some((_, next)) => {
                    value.push('\\');
                    value.push(next);
                }
                None => value.push('\\'),
            },
            _ => value.push(c),
        }
    }

    None
}

/// Append ` key="value"`, escaping `\` and `"`.
pub(crate) fn push_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_args() {
        let args = DirectiveArgs::parse("");
        assert!(args.is_empty());
    }

    #[test]
    fn test_double_quoted_value() {
        let args = DirectiveArgs::parse(r#"title="Hello World""#);
        assert_eq!(args.get("title"), Some("Hello World"));
    }

    #[test]
    fn test_single_quoted_value() {
        let args = DirectiveArgs::parse("title='Hello World'");
        assert_eq!(args.get("title"), Some("Hello World"));
    }

    #[test]
    fn test_unquoted_value() {
        let args = DirectiveArgs::parse("type=pdf");
        assert_eq!(args.get("type"), Some("pdf"));
    }

    #[test]
    fn test_escaped_quote() {
        let args = DirectiveArgs::parse(r#"title="Say \"hi\" \\ bye""#);
        assert_eq!(args.get("title"), Some(r#"Say "hi" \ bye"#));
    }

    #[test]
    fn test_braces_inside_value() {
        let args = DirectiveArgs::parse(r#"text="{not a directive}" id=a"#);
        assert_eq!(args.get("text"), Some("{not a directive}"));
        assert_eq!(args.get("id"), Some("a"));
    }

    #[test]
    fn test_first_key_wins() {
        let args = DirectiveArgs::parse("id=a id=b");
        assert_eq!(args.get("id"), Some("a"));
    }

    #[test]
    fn test_junk_tokens_skipped() {
        let args = DirectiveArgs::parse(r#"stray id="x" ="y" also"#);
        assert_eq!(args.get("id"), Some("x"));
        assert_eq!(args.get("also"), None);
    }

    #[test]
    fn test_unterminated_quote_skipped() {
        let args = DirectiveArgs::parse(r#"title="open id=x"#);
        assert_eq!(args.get("title"), None);
    }

    #[test]
    fn test_empty_quoted_value() {
        let args = DirectiveArgs::parse(r#"text="""#);
        assert_eq!(args.get("text"), Some(""));
        assert_eq!(args.get_non_empty("text"), None);
    }

    #[test]
    fn test_push_attr_round_trip() {
        let mut out = String::new();
        push_attr(&mut out, "title", r#"a "b" \ c"#);
        assert_eq!(out, r#" title="a \"b\" \\ c""#);
        let args = DirectiveArgs::parse(out.trim());
        assert_eq!(args.get("title"), Some(r#"a "b" \ c"#));
    }
}
