//! Closed registry of dialect directives.
//!
//! Each [`DirectiveKind`] owns a static [`DirectiveSchema`] describing its
//! Markdown grammar, canonical HTML mapping and attribute schema. Lookup is
//! a pure table read; an unknown name is not an error, it simply means no
//! directive applies.

use super::values::{CalloutType, ComplianceStatus, MaskType};

/// Where a directive may appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Occupies whole lines and may contain nested block content.
    Block,
    /// Embedded in a line of text.
    Inline,
}

/// Allowed values of a typed attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeType {
    /// Free text.
    Text,
    /// One of a fixed set of names.
    Enum(&'static [&'static str]),
}

/// One attribute in a directive's schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Name in Markdown syntax.
    pub name: &'static str,
    /// HTML attribute (or `None` when the value becomes element content).
    pub html_attribute: Option<&'static str>,
    pub kind: AttributeType,
    pub required: bool,
    /// Fixed default. Derived defaults (status labels, per-type
    /// placeholders, evidence hrefs) are documented on the value types.
    pub default: Option<&'static str>,
}

/// Static description of one directive.
#[derive(Debug)]
pub struct DirectiveSchema {
    pub kind: DirectiveKind,
    pub level: Level,
    /// Literal syntax recognized in Markdown.
    pub markdown_pattern: &'static str,
    /// Token that identifies the directive at a parse position.
    pub marker: &'static str,
    pub html_tag: &'static str,
    /// Attributes that identify the canonical HTML element.
    pub html_signature: &'static [&'static str],
    pub attributes: &'static [AttributeSpec],
}

/// Closed set of directives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Callout,
    StatusBadge,
    EvidenceLink,
    PrivacyMask,
    TableOfContents,
}

const CALLOUT_TYPES: &[&str] = &["info", "warning", "danger", "success", "note"];
const STATUS_VALUES: &[&str] = &[
    "compliant",
    "non-compliant",
    "in-progress",
    "not-applicable",
    "pending-review",
];
const MASK_TYPES: &[&str] = &["pii", "internal", "financial", "technical", "custom"];

static CALLOUT: DirectiveSchema = DirectiveSchema {
    kind: DirectiveKind::Callout,
    level: Level::Block,
    markdown_pattern: ":::type{title=\"...\"}\\n...\\n:::",
    marker: ":::",
    html_tag: "div",
    html_signature: &["data-callout-type"],
    attributes: &[
        AttributeSpec {
            name: "type",
            html_attribute: Some("data-callout-type"),
            kind: AttributeType::Enum(CALLOUT_TYPES),
            required: false,
            default: Some("info"),
        },
        AttributeSpec {
            name: "title",
            html_attribute: Some("data-callout-title"),
            kind: AttributeType::Text,
            required: false,
            default: None,
        },
    ],
};

static STATUS_BADGE: DirectiveSchema = DirectiveSchema {
    kind: DirectiveKind::StatusBadge,
    level: Level::Inline,
    markdown_pattern: "{status:value id=\"...\" text=\"...\"}",
    marker: "{status:",
    html_tag: "span",
    html_signature: &["data-status"],
    attributes: &[
        AttributeSpec {
            name: "status",
            html_attribute: Some("data-status"),
            kind: AttributeType::Enum(STATUS_VALUES),
            required: true,
            default: Some("pending-review"),
        },
        AttributeSpec {
            name: "id",
            html_attribute: Some("data-status-id"),
            kind: AttributeType::Text,
            required: false,
            default: None,
        },
        AttributeSpec {
            name: "text",
            html_attribute: None,
            kind: AttributeType::Text,
            required: false,
            default: None,
        },
    ],
};

static EVIDENCE_LINK: DirectiveSchema = DirectiveSchema {
    kind: DirectiveKind::EvidenceLink,
    level: Level::Inline,
    markdown_pattern: "[label]{evidence id=\"...\" type=\"...\"}",
    marker: "]{evidence",
    html_tag: "a",
    html_signature: &["data-evidence", "data-evidence-id"],
    attributes: &[
        AttributeSpec {
            name: "id",
            html_attribute: Some("data-evidence-id"),
            kind: AttributeType::Text,
            required: true,
            default: None,
        },
        AttributeSpec {
            name: "type",
            html_attribute: Some("data-file-type"),
            kind: AttributeType::Text,
            required: false,
            default: None,
        },
        AttributeSpec {
            name: "href",
            html_attribute: Some("href"),
            kind: AttributeType::Text,
            required: false,
            default: None,
        },
    ],
};

static PRIVACY_MASK: DirectiveSchema = DirectiveSchema {
    kind: DirectiveKind::PrivacyMask,
    level: Level::Inline,
    markdown_pattern: "{mask type=\"pii\" placeholder=\"...\"}content{/mask}",
    marker: "{mask",
    html_tag: "span",
    html_signature: &["data-privacy-mask"],
    attributes: &[
        AttributeSpec {
            name: "type",
            html_attribute: Some("data-mask-type"),
            kind: AttributeType::Enum(MASK_TYPES),
            required: false,
            default: Some("pii"),
        },
        AttributeSpec {
            name: "placeholder",
            html_attribute: Some("data-placeholder"),
            kind: AttributeType::Text,
            required: false,
            default: None,
        },
    ],
};

static TABLE_OF_CONTENTS: DirectiveSchema = DirectiveSchema {
    kind: DirectiveKind::TableOfContents,
    level: Level::Block,
    markdown_pattern: "[[toc]]",
    marker: "[[toc]]",
    html_tag: "nav",
    html_signature: &["data-toc"],
    attributes: &[],
};

impl DirectiveSchema {
    /// Whether an element with `tag` and the given attribute test carries
    /// this directive's canonical signature.
    #[must_use]
    pub fn matches_element(&self, tag: &str, has_attribute: impl Fn(&str) -> bool) -> bool {
        self.html_tag == tag && self.html_signature.iter().all(|name| has_attribute(name))
    }
}

impl DirectiveKind {
    /// Registration order; tokenizers try directives in this order.
    pub const ALL: [Self; 5] = [
        Self::Callout,
        Self::TableOfContents,
        Self::StatusBadge,
        Self::EvidenceLink,
        Self::PrivacyMask,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Callout => "callout",
            Self::StatusBadge => "statusBadge",
            Self::EvidenceLink => "evidenceLink",
            Self::PrivacyMask => "privacyMask",
            Self::TableOfContents => "tableOfContents",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    #[must_use]
    pub fn schema(self) -> &'static DirectiveSchema {
        match self {
            Self::Callout => &CALLOUT,
            Self::StatusBadge => &STATUS_BADGE,
            Self::EvidenceLink => &EVIDENCE_LINK,
            Self::PrivacyMask => &PRIVACY_MASK,
            Self::TableOfContents => &TABLE_OF_CONTENTS,
        }
    }

    #[must_use]
    pub fn level(self) -> Level {
        self.schema().level
    }
}

/// Look up a directive schema by name. `None` means "no directive".
#[must_use]
pub fn schema(name: &str) -> Option<&'static DirectiveSchema> {
    DirectiveKind::from_name(name).map(DirectiveKind::schema)
}

// Keep the enum schemas in step with the value types.
const _: () = {
    assert!(CALLOUT_TYPES.len() == CalloutType::ALL.len());
    assert!(STATUS_VALUES.len() == ComplianceStatus::ALL.len());
    assert!(MASK_TYPES.len() == MaskType::ALL.len());
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        for kind in DirectiveKind::ALL {
            assert_eq!(DirectiveKind::from_name(kind.name()), Some(kind));
            assert_eq!(schema(kind.name()).map(|s| s.kind), Some(kind));
        }
        assert!(schema("tabs").is_none());
    }

    #[test]
    fn test_markers_are_unambiguous() {
        for a in DirectiveKind::ALL {
            for b in DirectiveKind::ALL {
                if a == b {
                    continue;
                }
                let (ma, mb) = (a.schema().marker, b.schema().marker);
                assert!(
                    !ma.starts_with(mb),
                    "{} marker {ma:?} shadows {} marker {mb:?}",
                    b.name(),
                    a.name()
                );
            }
        }
    }

    #[test]
    fn test_enum_schemas_match_value_types() {
        let callout_type = &CALLOUT.attributes[0];
        let AttributeType::Enum(values) = callout_type.kind else {
            panic!("callout type must be an enum");
        };
        for (name, kind) in values.iter().zip(CalloutType::ALL) {
            assert_eq!(*name, kind.as_str());
        }

        let AttributeType::Enum(values) = STATUS_BADGE.attributes[0].kind else {
            panic!("status must be an enum");
        };
        for (name, status) in values.iter().zip(ComplianceStatus::ALL) {
            assert_eq!(*name, status.as_str());
        }

        let AttributeType::Enum(values) = PRIVACY_MASK.attributes[0].kind else {
            panic!("mask type must be an enum");
        };
        for (name, kind) in values.iter().zip(MaskType::ALL) {
            assert_eq!(*name, kind.as_str());
        }
    }

    #[test]
    fn test_html_signature() {
        let attrs = ["data-evidence", "data-evidence-id", "href"];
        let has = |name: &str| attrs.contains(&name);
        assert!(EVIDENCE_LINK.matches_element("a", has));
        assert!(!EVIDENCE_LINK.matches_element("span", has));
        assert!(!EVIDENCE_LINK.matches_element("a", |name| name == "data-evidence"));
        assert!(TABLE_OF_CONTENTS.matches_element("nav", |name| name == "data-toc"));
    }

    #[test]
    fn test_levels() {
        assert_eq!(DirectiveKind::Callout.level(), Level::Block);
        assert_eq!(DirectiveKind::TableOfContents.level(), Level::Block);
        assert_eq!(DirectiveKind::StatusBadge.level(), Level::Inline);
        assert_eq!(DirectiveKind::EvidenceLink.level(), Level::Inline);
        assert_eq!(DirectiveKind::PrivacyMask.level(), Level::Inline);
    }

    #[test]
    fn test_defaults_are_valid_enum_values() {
        for kind in DirectiveKind::ALL {
            for attr in kind.schema().attributes {
                if let (AttributeType::Enum(values), Some(default)) = (attr.kind, attr.default) {
                    assert!(values.contains(&default), "{}.{}", kind.name(), attr.name);
                }
            }
        }
    }
}
