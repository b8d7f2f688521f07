//! Lightweight HTML tree for the HTML→Markdown converter.
//!
//! The input is a constrained, already sanitized subset, so a tolerant
//! tokenizer plus an explicit open-element stack is enough; no DOM is
//! required.

mod parser;

use std::sync::LazyLock;

use regex::Regex;

pub(crate) use parser::parse_tree;

/// Any tag, for plain-text extraction.
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("invalid tag regex"));

/// Node of the parsed tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
}

/// Element with lowercase tag and attribute names, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Element {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) children: Vec<Node>,
}

impl Element {
    pub(crate) fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Value of attribute `name`; valueless attributes yield `""`.
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed, non-empty attribute value.
    pub(crate) fn attr_non_empty(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub(crate) fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Concatenated descendant text.
    pub(crate) fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Child elements, skipping text.
    pub(crate) fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Append text, merging with a preceding text node.
    pub(crate) fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_owned()));
        }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
        }
    }
}

/// Parse `html` into a tree rooted at a synthetic `root` element.
///
/// Tokenizer errors are logged and the input degrades to its text content.
pub(crate) fn parse(html: &str) -> Element {
    match parse_tree(html) {
        Ok(root) => root,
        Err(error) => {
            tracing::warn!(%error, "HTML tokenizer failed, falling back to plain text");
            plain_text(html)
        }
    }
}

/// Tag-stripped, entity-decoded text in a single paragraph.
fn plain_text(html: &str) -> Element {
    let stripped = TAG_PATTERN.replace_all(html, " ");
    let mut paragraph = Element::new("p");
    paragraph.push_text(&folio_sanitize::decode_entities(&stripped));

    let mut root = Element::new("root");
    root.children.push(Node::Element(paragraph));
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_helpers() {
        let mut element = Element::new("span");
        element.attrs.push(("class".to_owned(), "a callout-title b".to_owned()));
        element.attrs.push(("data-evidence".to_owned(), String::new()));
        element.push_text("one ");
        element.push_text("two");

        assert!(element.has_class("callout-title"));
        assert!(!element.has_class("callout"));
        assert!(element.has_attr("data-evidence"));
        assert_eq!(element.attr_non_empty("data-evidence"), None);
        assert_eq!(element.children.len(), 1);
        assert_eq!(element.text(), "one two");
    }

    #[test]
    fn test_plain_text_fallback() {
        let root = plain_text("<p>a &amp; <b>b</b></p>");
        assert_eq!(root.text().split_whitespace().collect::<Vec<_>>(), ["a", "&", "b"]);
    }
}
