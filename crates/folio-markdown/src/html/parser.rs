//! Tolerant HTML tokenizing on top of quick-xml.
//!
//! HTML is not XML, so the input is normalized first: named entities become
//! text, stray `&` and `<` are escaped. Void elements may appear without
//! `/>`, end tags that close nothing are ignored, and unclosed elements are
//! closed at the end of input.

use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;

use super::{Element, Node};
use crate::error::HtmlParseError;

/// Character reference or bare `&`.
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#0*[0-9]{1,7};?|#[xX]0*[0-9a-fA-F]{1,6};?|[a-zA-Z][a-zA-Z0-9]{0,31};)?")
        .expect("invalid reference regex")
});

/// `<` that cannot start a tag, comment or declaration.
static STRAY_LT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^a-zA-Z/!?]|$)").expect("invalid stray lt regex"));

/// Parse `html` into an element tree.
///
/// # Errors
///
/// Returns an error if quick-xml rejects the normalized input.
pub(crate) fn parse_tree(html: &str) -> Result<Element, HtmlParseError> {
    let normalized = normalize(html);
    let mut reader = Reader::from_str(&normalized);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut stack = vec![Element::new("root")];

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let element = start_element(&reader, &e)?;
                if folio_sanitize::Policy::is_void(&element.tag) {
                    append(&mut stack, Node::Element(element));
                } else {
                    stack.push(element);
                }
            }
            Event::Empty(e) => {
                let element = start_element(&reader, &e)?;
                append(&mut stack, Node::Element(element));
            }
            Event::End(e) => {
                let name = reader.decoder().decode(e.name().as_ref())?.to_ascii_lowercase();
                close(&mut stack, &name);
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                top(&mut stack).push_text(&text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                let text = folio_sanitize::decode_reference(&entity)
                    .unwrap_or_else(|| format!("&{entity};"));
                top(&mut stack).push_text(&text);
            }
            Event::CData(e) => {
                top(&mut stack).push_text(&String::from_utf8_lossy(&e));
            }
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    while stack.len() > 1 {
        pop_into_parent(&mut stack);
    }
    Ok(stack.pop().unwrap_or_else(|| Element::new("root")))
}

/// Rewrite HTML-only syntax into something the XML tokenizer accepts.
fn normalize(html: &str) -> String {
    let escaped_lt = STRAY_LT_PATTERN.replace_all(html, "&lt;$1");
    REFERENCE_PATTERN
        .replace_all(&escaped_lt, |caps: &regex::Captures| {
            let Some(body) = caps.get(1) else {
                return "&amp;".to_owned();
            };
            let name = body.as_str().trim_end_matches(';');
            match folio_sanitize::decode_reference(name) {
                Some(text) => escape_xml(&text),
                None => format!("&amp;{}", body.as_str()),
            }
        })
        .into_owned()
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn start_element(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<Element, HtmlParseError> {
    let tag = reader.decoder().decode(e.name().as_ref())?.to_ascii_lowercase();
    let mut element = Element::new(tag);

    let mut attributes = e.html_attributes();
    attributes.with_checks(false);
    for attr in attributes.flatten() {
        let key = reader.decoder().decode(attr.key.as_ref())?.to_ascii_lowercase();
        if element.has_attr(&key) {
            continue;
        }
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        element.attrs.push((key, value));
    }

    Ok(element)
}

fn top(stack: &mut [Element]) -> &mut Element {
    let last = stack.len() - 1;
    &mut stack[last]
}

fn append(stack: &mut [Element], node: Node) {
    top(stack).children.push(node);
}

fn pop_into_parent(stack: &mut Vec<Element>) {
    if let Some(element) = stack.pop() {
        append(stack, Node::Element(element));
    }
}

/// Close the innermost open element named `name`, and everything opened
/// inside it. End tags without an open element are ignored.
fn close(stack: &mut Vec<Element>, name: &str) {
    let Some(position) = stack.iter().skip(1).rposition(|element| element.tag == name) else {
        return;
    };
    let depth = position + 1;
    while stack.len() > depth {
        pop_into_parent(stack);
    }
}
