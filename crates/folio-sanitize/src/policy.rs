//! The allowlist shared by every sanitizer backend.
//!
//! Both backends read tag, attribute and URL decisions from a [`Policy`];
//! neither keeps lists of its own.

use std::sync::LazyLock;

use regex::Regex;

use crate::entities::decode_entities;

/// Elements that never have content and are always written self-closing.
pub const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "col"];

/// Elements removed together with everything inside them.
pub const CONTENT_STRIPPED_TAGS: &[&str] = &["script", "style"];

/// `rel` value forced onto links that open in a new browsing context.
pub const LINK_REL: &str = "noopener noreferrer";

/// Event handlers and inline styles.
static FORBIDDEN_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:on.*|style)$").expect("invalid forbidden attribute regex")
});

/// Schemes that are never allowed, whatever the policy lists.
static FORBIDDEN_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:javascript|data|vbscript):").expect("invalid forbidden scheme regex")
});

static URL_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.\-]*):").expect("invalid url scheme regex")
});

/// Tag, attribute and URL allowlist.
#[derive(Debug)]
pub struct Policy {
    /// Policy name used in log fields.
    pub name: &'static str,
    /// Permitted element names (lowercase).
    pub tags: &'static [&'static str],
    /// Permitted attribute names (lowercase), on any permitted element.
    pub attributes: &'static [&'static str],
    /// Whether the whole `data-*` namespace is permitted.
    pub data_attributes: bool,
    /// Attributes whose values are URLs.
    pub url_attributes: &'static [&'static str],
    /// Permitted URL schemes. Scheme-less URLs are always permitted.
    pub url_schemes: &'static [&'static str],
    /// Force `target="_blank"` and [`LINK_REL`] onto every `<a>`.
    pub force_link_target: bool,
}

/// Allowlist for document bodies.
pub static DOCUMENT_POLICY: Policy = Policy {
    name: "document",
    tags: &[
        "p", "br", "hr", "h1", "h2", "h3", "h4", "h5", "h6", "strong", "b", "em", "i", "u", "s",
        "strike", "del", "ins", "mark", "sub", "sup", "small", "abbr", "kbd", "code", "pre",
        "blockquote", "ul", "ol", "li", "dl", "dt", "dd", "a", "img", "table", "thead", "tbody",
        "tfoot", "tr", "th", "td", "caption", "colgroup", "col", "div", "span", "nav", "section",
        "article", "header", "footer", "aside", "figure", "figcaption", "details", "summary",
        "input", "label",
    ],
    attributes: &[
        "href", "src", "alt", "title", "class", "id", "target", "rel", "width", "height",
        "colspan", "rowspan", "align", "start", "type", "checked", "disabled", "lang", "dir",
        "open",
    ],
    data_attributes: true,
    url_attributes: &["href", "src"],
    url_schemes: &["http", "https", "mailto", "tel"],
    force_link_target: false,
};

/// Allowlist for user comments: inline formatting and links only.
pub static COMMENT_POLICY: Policy = Policy {
    name: "comment",
    tags: &[
        "p", "br", "strong", "b", "em", "i", "u", "s", "del", "code", "a",
    ],
    attributes: &["href", "title"],
    data_attributes: false,
    url_attributes: &["href"],
    url_schemes: &["http", "https", "mailto", "tel"],
    force_link_target: true,
};

/// Selects one of the process-wide policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// [`DOCUMENT_POLICY`].
    Document,
    /// [`COMMENT_POLICY`].
    Comment,
}

impl PolicyKind {
    /// The policy table for this kind.
    #[must_use]
    pub fn policy(self) -> &'static Policy {
        match self {
            Self::Document => &DOCUMENT_POLICY,
            Self::Comment => &COMMENT_POLICY,
        }
    }
}

impl Policy {
    /// Whether the element `name` (lowercase) may appear in output.
    #[must_use]
    pub fn allows_tag(&self, name: &str) -> bool {
        self.tags.contains(&name)
    }

    /// Whether the attribute `name` (lowercase) may appear in output.
    #[must_use]
    pub fn allows_attribute(&self, name: &str) -> bool {
        if is_forbidden_attribute(name) {
            return false;
        }
        self.attributes.contains(&name) || (self.data_attributes && is_data_attribute(name))
    }

    /// Whether the attribute's value must pass [`allows_url`](Self::allows_url).
    #[must_use]
    pub fn is_url_attribute(&self, name: &str) -> bool {
        self.url_attributes.contains(&name)
    }

    /// Whether a raw (possibly entity-encoded) URL value is acceptable.
    #[must_use]
    pub fn allows_url(&self, raw: &str) -> bool {
        let url = normalize_url(raw);
        if FORBIDDEN_SCHEME.is_match(&url) {
            return false;
        }
        match URL_SCHEME.captures(&url) {
            Some(caps) => {
                let scheme = caps[1].to_ascii_lowercase();
                self.url_schemes.contains(&scheme.as_str())
            }
            None => true,
        }
    }

    /// Whether `name` is a void element.
    #[must_use]
    pub fn is_void(name: &str) -> bool {
        VOID_TAGS.contains(&name)
    }
}

/// Whether an attribute name matches the forbidden pattern (`on*`, `style`).
#[must_use]
pub fn is_forbidden_attribute(name: &str) -> bool {
    FORBIDDEN_ATTRIBUTE.is_match(name)
}

/// Whether a URL matches the forbidden scheme pattern after normalization.
#[must_use]
pub fn has_forbidden_scheme(raw: &str) -> bool {
    FORBIDDEN_SCHEME.is_match(&normalize_url(raw))
}

fn is_data_attribute(name: &str) -> bool {
    name.len() > "data-".len() && name.starts_with("data-")
}

/// Decode references and drop the whitespace/control characters browsers
/// ignore inside a scheme (`java\tscript:`).
fn normalize_url(raw: &str) -> String {
    decode_entities(raw)
        .chars()
        .filter(|c| !c.is_ascii_control() && !c.is_whitespace())
        .collect()
}
