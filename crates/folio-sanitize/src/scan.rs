//! DOM-less sanitizer backend.
//!
//! Works on the raw string with a tag-matching scanner, so it runs in edge
//! runtimes that have no HTML parser. Every `<` in the output belongs to a
//! tag this module rebuilt from the policy; all other `<` are encoded.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::backend::{BackendKind, SanitizeBackend};
use crate::entities::decode_entities;
use crate::policy::{CONTENT_STRIPPED_TAGS, LINK_REL, Policy, PolicyKind};

/// `<script>`/`<style>` blocks including their content, across newlines.
/// An unclosed block runs to the end of input, as it would in a browser.
static STRIPPED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?(?:</(?:script|style)\s*>|\z)")
        .expect("invalid stripped block regex")
});

/// HTML comments, including an unterminated trailing one.
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)").expect("invalid comment regex"));

/// Declarations, CDATA sections and processing instructions.
static DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[!?][^>]*>").expect("invalid declaration regex"));

/// A start or end tag. Quoted attribute values may contain `>`.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*?)(/?)>"#)
        .expect("invalid tag regex")
});

/// One attribute: double-quoted, single-quoted, unquoted or valueless.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'<>`]+)))?"#)
        .expect("invalid attribute regex")
});

/// Regex/state-machine backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanBackend;

impl ScanBackend {
    /// Create the scan backend.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SanitizeBackend for ScanBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Scan
    }

    fn sanitize(&self, input: &str, policy: PolicyKind) -> String {
        scan(input, policy.policy())
    }
}

/// Sanitize `input` against `policy` without a DOM.
pub(crate) fn scan(input: &str, policy: &Policy) -> String {
    let without_blocks = STRIPPED_BLOCK.replace_all(input, "");
    let without_comments = COMMENT.replace_all(&without_blocks, "");
    let cleaned = DECLARATION.replace_all(&without_comments, "");

    let mut out = String::with_capacity(cleaned.len());
    let mut last = 0;

    for caps in TAG.captures_iter(&cleaned) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&cleaned[last..whole.start()], &mut out);
        last = whole.end();

        let name = caps[2].to_ascii_lowercase();
        if !policy.allows_tag(&name) || CONTENT_STRIPPED_TAGS.contains(&name.as_str()) {
            continue;
        }

        let closing = !caps[1].is_empty();
        if closing {
            if !Policy::is_void(&name) {
                write!(out, "</{name}>").unwrap();
            }
            continue;
        }

        out.push('<');
        out.push_str(&name);
        push_attributes(&name, &caps[3], policy, &mut out);
        if Policy::is_void(&name) {
            out.push_str(" />");
        } else {
            out.push('>');
        }
    }
    push_text(&cleaned[last..], &mut out);

    out
}

/// Copy text between tags. A `<` here never starts a tag we kept.
fn push_text(text: &str, out: &mut String) {
    for c in text.chars() {
        if c == '<' {
            out.push_str("&lt;");
        } else {
            out.push(c);
        }
    }
}

fn push_attributes(tag: &str, raw: &str, policy: &Policy, out: &mut String) {
    let mut seen: Vec<String> = Vec::new();

    for caps in ATTRIBUTE.captures_iter(raw) {
        let name = caps[1].to_ascii_lowercase();
        if seen.contains(&name) {
            continue;
        }
        seen.push(name.clone());

        if !policy.allows_attribute(&name) {
            continue;
        }
        if policy.force_link_target && tag == "a" && (name == "target" || name == "rel") {
            continue;
        }

        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str());

        match value {
            Some(value) => {
                let value = if policy.is_url_attribute(&name) && !policy.allows_url(value) {
                    String::new()
                } else {
                    decode_entities(value).trim().to_owned()
                };
                write!(out, r#" {name}="{}""#, escape_attribute(&value)).unwrap();
            }
            None => {
                out.push(' ');
                out.push_str(&name);
            }
        }
    }

    if policy.force_link_target && tag == "a" {
        write!(out, r#" target="_blank" rel="{LINK_REL}""#).unwrap();
    }
}

/// Canonical attribute escaping. Values are decoded before this runs, so
/// repeated sanitization yields the same bytes.
fn escape_attribute(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::policy::{COMMENT_POLICY, DOCUMENT_POLICY};

    fn doc(input: &str) -> String {
        scan(input, &DOCUMENT_POLICY)
    }

    #[test]
    fn test_allowed_markup_unchanged() {
        assert_eq!(
            doc(r#"<p>Hello <strong>world</strong></p>"#),
            "<p>Hello <strong>world</strong></p>"
        );
    }

    #[test]
    fn test_script_block_removed_across_lines() {
        assert_eq!(doc("<p>a</p><script>\nalert(1)\n</script><p>b</p>"), "<p>a</p><p>b</p>");
        assert_eq!(doc("<STYLE type=x>p{}</STYLE>ok"), "ok");
    }

    #[test]
    fn test_unclosed_script_runs_to_end() {
        assert_eq!(doc("<p>a</p><script>alert(1)"), "<p>a</p>");
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(doc("a<!-- <script>x</script> -->b"), "ab");
        assert_eq!(doc("a<!-- unterminated"), "a");
    }

    #[test]
    fn test_disallowed_tag_dropped_content_kept() {
        assert_eq!(doc("<iframe src=x>inner</iframe>"), "inner");
        assert_eq!(doc("<marquee>hi</marquee>"), "hi");
    }

    #[test]
    fn test_event_handler_dropped() {
        assert_eq!(
            doc(r#"<img src=x onerror="alert(1)">"#),
            r#"<img src="x" />"#
        );
    }

    #[test]
    fn test_style_attribute_dropped() {
        assert_eq!(doc(r#"<p style="color:red" class='a'>x</p>"#), r#"<p class="a">x</p>"#);
    }

    #[test]
    fn test_javascript_href_emptied() {
        assert_eq!(
            doc(r#"<a href="JavaScript:alert(1)">x</a>"#),
            r#"<a href="">x</a>"#
        );
        assert_eq!(
            doc(r#"<a href="javascript&colon;alert(1)">x</a>"#),
            r#"<a href="">x</a>"#
        );
    }

    #[test]
    fn test_data_attributes_kept() {
        assert_eq!(
            doc(r#"<span data-privacy-mask data-mask-type="pii">x</span>"#),
            r#"<span data-privacy-mask data-mask-type="pii">x</span>"#
        );
    }

    #[test]
    fn test_void_elements_self_closing() {
        assert_eq!(doc("a<br>b<hr/><col></br>"), "a<br />b<hr /><col />");
    }

    #[test]
    fn test_quoted_gt_inside_attribute() {
        assert_eq!(doc(r#"<a title="a>b" href="/x">y</a>"#), r#"<a title="a&gt;b" href="/x">y</a>"#);
    }

    #[test]
    fn test_stray_lt_encoded() {
        assert_eq!(doc("1 < 2"), "1 &lt; 2");
        assert_eq!(doc("<<x>b onclick=1>"), "&lt;b onclick=1>");
        assert_eq!(doc("<img src=x onerror=alert(1)"), "&lt;img src=x onerror=alert(1)");
    }

    #[test]
    fn test_duplicate_attribute_first_wins() {
        assert_eq!(doc(r#"<a href="/a" href="javascript:x">y</a>"#), r#"<a href="/a">y</a>"#);
    }

    #[test]
    fn test_comment_policy_forces_link_target() {
        assert_eq!(
            scan(r#"<a href="https://x.test" target="_self" rel="opener">x</a>"#, &COMMENT_POLICY),
            r#"<a href="https://x.test" target="_blank" rel="noopener noreferrer">x</a>"#
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            r#"<p title="a &amp; b">x &amp; y</p>"#,
            r#"<a href=/x?a=1&b=2>q</a>"#,
            "<<x>b>",
            "<div><p>nested<br></p></div>",
        ];
        for input in inputs {
            let once = doc(input);
            assert_eq!(doc(&once), once, "not idempotent for {input}");
        }
    }
}
