//! Text escaping and the helpers that build on it.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

use crate::policy::has_forbidden_scheme;

/// Shortest query token that gets highlighted.
const MIN_TOKEN_CHARS: usize = 2;

/// Entity-encode every character that could open markup or break out of an
/// attribute value: `& < > " ' / \` =`.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            '/' => result.push_str("&#x2F;"),
            '`' => result.push_str("&#x60;"),
            '=' => result.push_str("&#x3D;"),
            _ => result.push(c),
        }
    }
    result
}

/// Empty string for a URL with a forbidden scheme, otherwise the trimmed URL.
#[must_use]
pub fn sanitize_url(url: &str) -> String {
    let trimmed = url.trim();
    if has_forbidden_scheme(trimmed) {
        return String::new();
    }
    trimmed.to_owned()
}

/// Escape `text` and wrap case-insensitive matches of each query token in
/// `<mark>`.
///
/// Matching runs on the raw text; only escaped slices are written, so the
/// query can never reintroduce markup.
#[must_use]
pub fn highlight_search_match(text: &str, query: &str) -> String {
    let Some(pattern) = query_pattern(query) else {
        return escape_html(text);
    };

    let mut result = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for m in pattern.find_iter(text) {
        if m.is_empty() {
            continue;
        }
        result.push_str(&escape_html(&text[last..m.start()]));
        result.push_str("<mark>");
        result.push_str(&escape_html(m.as_str()));
        result.push_str("</mark>");
        last = m.end();
    }
    result.push_str(&escape_html(&text[last..]));
    result
}

/// Alternation of query tokens, longest first so overlapping tokens prefer
/// the longer match.
fn query_pattern(query: &str) -> Option<Regex> {
    let mut seen = HashSet::new();
    let mut tokens: Vec<String> = query
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
        .filter(|token| seen.insert(token.clone()))
        .collect();

    if tokens.is_empty() {
        return None;
    }
    tokens.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));

    let alternation = tokens
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");

    match RegexBuilder::new(&alternation).case_insensitive(true).build() {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            tracing::debug!(error = %e, "Search highlight pattern rejected");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_escape_html_all_characters() {
        assert_eq!(
            escape_html(r#"& < > " ' / ` ="#),
            "&amp; &lt; &gt; &quot; &#x27; &#x2F; &#x60; &#x3D;"
        );
    }

    #[test]
    fn test_escape_html_script() {
        let escaped = escape_html("<script>alert(1)</script>");
        assert!(!escaped.contains('<'));
        assert!(!escaped.contains('>'));
    }

    #[test]
    fn test_escape_html_passthrough() {
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_sanitize_url_forbidden() {
        assert_eq!(sanitize_url("javascript:alert(1)"), "");
        assert_eq!(sanitize_url("  JAVASCRIPT:alert(1)"), "");
        assert_eq!(sanitize_url("data:text/html;base64,xx"), "");
        assert_eq!(sanitize_url("vbscript:msgbox"), "");
        assert_eq!(sanitize_url("java\tscript:alert(1)"), "");
    }

    #[test]
    fn test_sanitize_url_zero_padded_reference() {
        assert_eq!(sanitize_url("&#00000106;avascript:alert(1)"), "");
        assert_eq!(sanitize_url("&#x0000006A;avascript:alert(1)"), "");
        assert_eq!(sanitize_url("javascript&#0000058;alert(1)"), "");
    }

    #[test]
    fn test_sanitize_url_allowed() {
        assert_eq!(sanitize_url("https://example.com"), "https://example.com");
        assert_eq!(sanitize_url("  /docs/a  "), "/docs/a");
        assert_eq!(sanitize_url("#top"), "#top");
    }

    #[test]
    fn test_highlight_case_insensitive() {
        assert_eq!(
            highlight_search_match("Data Privacy policy", "privacy"),
            "Data <mark>Privacy</mark> policy"
        );
    }

    #[test]
    fn test_highlight_partial_word() {
        assert_eq!(
            highlight_search_match("compliance", "pli"),
            "com<mark>pli</mark>ance"
        );
    }

    #[test]
    fn test_highlight_short_tokens_ignored() {
        assert_eq!(highlight_search_match("a b c", "a b"), "a b c");
    }

    #[test]
    fn test_highlight_escapes_text_and_match() {
        assert_eq!(
            highlight_search_match("<b>bold</b>", "<b>"),
            "<mark>&lt;b&gt;</mark>bold&lt;&#x2F;b&gt;"
        );
    }

    #[test]
    fn test_highlight_regex_metacharacters() {
        assert_eq!(highlight_search_match("cost (usd)", "(usd)"), "cost <mark>(usd)</mark>");
    }

    #[test]
    fn test_highlight_longest_token_first() {
        assert_eq!(
            highlight_search_match("policyholder", "policy policyholder"),
            "<mark>policyholder</mark>"
        );
    }

    #[test]
    fn test_highlight_empty_query() {
        assert_eq!(highlight_search_match("a<b", "  "), "a&lt;b");
    }
}
