//! Directive instances and their two canonical forms.
//!
//! Every directive knows how to write itself as dialect Markdown (with
//! omit-if-default attributes) and as its canonical HTML element. Both
//! converters go through these methods, so the mapping lives in one place.

use std::borrow::Cow;
use std::fmt::Write;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::args::push_attr;
use super::registry::DirectiveKind;
use super::values::{CalloutType, ComplianceStatus, MaskType};
use crate::render::escape_html;

/// Characters left unencoded in evidence ids inside the default href.
const EVIDENCE_ID: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Prefix of the default evidence href.
pub const EVIDENCE_ENDPOINT: &str = "/api/evidence/";

/// A parsed directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    Callout(Callout),
    StatusBadge(StatusBadge),
    EvidenceLink(EvidenceLink),
    PrivacyMask(PrivacyMask),
    TableOfContents,
}

impl Directive {
    #[must_use]
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Self::Callout(_) => DirectiveKind::Callout,
            Self::StatusBadge(_) => DirectiveKind::StatusBadge,
            Self::EvidenceLink(_) => DirectiveKind::EvidenceLink,
            Self::PrivacyMask(_) => DirectiveKind::PrivacyMask,
            Self::TableOfContents => DirectiveKind::TableOfContents,
        }
    }
}

/// `:::type{title="..."}` block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Callout {
    pub kind: CalloutType,
    pub title: Option<String>,
}

impl Callout {
    /// Opening marker line, without the body.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = format!(":::{}", self.kind.as_str());
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            let mut attrs = String::new();
            push_attr(&mut attrs, "title", title);
            write!(out, "{{{}}}", attrs.trim_start()).unwrap();
        }
        out
    }

    /// Opening HTML, up to and including the content wrapper.
    #[must_use]
    pub fn html_open(&self) -> String {
        let mut out = format!(r#"<div data-callout-type="{}""#, self.kind.as_str());
        match self.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => {
                let title = escape_html(title);
                write!(out, r#" data-callout-title="{title}">"#).unwrap();
                write!(out, "\n<div class=\"callout-title\">{title}</div>").unwrap();
            }
            None => out.push('>'),
        }
        out.push_str("\n<div class=\"callout-content\">");
        out
    }

    #[must_use]
    pub fn html_close() -> &'static str {
        "</div></div>"
    }
}

/// `{status:value id="..." text="..."}` badge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusBadge {
    pub status: ComplianceStatus,
    pub id: Option<String>,
    pub text: Option<String>,
}

impl StatusBadge {
    /// Display text: explicit `text`, else the status label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.text.as_deref().unwrap_or(self.status.label())
    }

    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = format!("{{status:{}", self.status.as_str());
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            push_attr(&mut out, "id", id);
        }
        if let Some(text) = self.text.as_deref().filter(|t| *t != self.status.label()) {
            push_attr(&mut out, "text", text);
        }
        out.push('}');
        out
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = format!(r#"<span data-status="{}""#, self.status.as_str());
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            write!(out, r#" data-status-id="{}""#, escape_html(id)).unwrap();
        }
        write!(out, ">{}</span>", escape_html(self.label())).unwrap();
        out
    }
}

/// `[label]{evidence id="..." type="..."}` link.
///
/// `label` holds Markdown source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvidenceLink {
    pub label: String,
    pub id: String,
    pub file_type: Option<String>,
    pub href: Option<String>,
}

impl EvidenceLink {
    /// `/api/evidence/{id}` with the id percent-encoded.
    #[must_use]
    pub fn default_href(id: &str) -> String {
        format!("{EVIDENCE_ENDPOINT}{}", utf8_percent_encode(id, EVIDENCE_ID))
    }

    /// Explicit `href`, else the default evidence endpoint.
    #[must_use]
    pub fn href(&self) -> Cow<'_, str> {
        match self.href.as_deref().filter(|h| !h.is_empty()) {
            Some(href) => Cow::Borrowed(href),
            None => Cow::Owned(Self::default_href(&self.id)),
        }
    }

    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = format!("[{}]{{evidence", self.label);
        push_attr(&mut out, "id", &self.id);
        if let Some(file_type) = self.file_type.as_deref().filter(|t| !t.is_empty()) {
            push_attr(&mut out, "type", file_type);
        }
        if let Some(href) = self
            .href
            .as_deref()
            .filter(|h| !h.is_empty() && *h != Self::default_href(&self.id))
        {
            push_attr(&mut out, "href", href);
        }
        out.push('}');
        out
    }

    /// Opening `<a>`; the label follows as content.
    #[must_use]
    pub fn html_open(&self) -> String {
        let mut out = format!(
            r#"<a data-evidence data-evidence-id="{}""#,
            escape_html(&self.id)
        );
        if let Some(file_type) = self.file_type.as_deref().filter(|t| !t.is_empty()) {
            write!(out, r#" data-file-type="{}""#, escape_html(file_type)).unwrap();
        }
        write!(out, r#" href="{}">"#, escape_html(&self.href())).unwrap();
        out
    }
}

/// `{mask type="..." placeholder="..."}content{/mask}` span.
///
/// `content` holds Markdown source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrivacyMask {
    pub mask_type: MaskType,
    pub placeholder: Option<String>,
    pub content: String,
}

impl PrivacyMask {
    /// Explicit placeholder, else the type's redaction string.
    #[must_use]
    pub fn placeholder(&self) -> &str {
        self.placeholder
            .as_deref()
            .unwrap_or(self.mask_type.default_placeholder())
    }

    /// The type is always written; the placeholder only when it differs
    /// from the type's default.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("{mask");
        push_attr(&mut out, "type", self.mask_type.as_str());
        if let Some(placeholder) = self
            .placeholder
            .as_deref()
            .filter(|p| *p != self.mask_type.default_placeholder())
        {
            push_attr(&mut out, "placeholder", placeholder);
        }
        write!(out, "}}{}{{/mask}}", self.content).unwrap();
        out
    }

    /// Opening `<span>`; the content follows.
    #[must_use]
    pub fn html_open(&self) -> String {
        format!(
            r#"<span data-privacy-mask data-mask-type="{}" data-placeholder="{}">"#,
            self.mask_type.as_str(),
            escape_html(self.placeholder())
        )
    }
}

/// Canonical table-of-contents scaffold. Headings are filled in downstream.
pub const TOC_HTML: &str = r#"<nav data-toc class="table-of-contents"></nav>"#;

/// Dialect marker for a table of contents.
pub const TOC_MARKER: &str = "[[toc]]";

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_callout_markdown() {
        let callout = Callout {
            kind: CalloutType::Warning,
            title: Some("Note".to_owned()),
        };
        assert_eq!(callout.to_markdown(), r#":::warning{title="Note"}"#);
        assert_eq!(Callout::default().to_markdown(), ":::info");
    }

    #[test]
    fn test_callout_markdown_escapes_title() {
        let callout = Callout {
            kind: CalloutType::Note,
            title: Some(r#"Say "hi""#.to_owned()),
        };
        assert_eq!(callout.to_markdown(), r#":::note{title="Say \"hi\""}"#);
    }

    #[test]
    fn test_callout_html_escapes_title() {
        let callout = Callout {
            kind: CalloutType::Danger,
            title: Some(r#""><script>"#.to_owned()),
        };
        let html = callout.html_open();
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"data-callout-title="&quot;&gt;&lt;script&gt;""#));
    }

    #[test]
    fn test_status_default_label_omitted() {
        let badge = StatusBadge {
            status: ComplianceStatus::Compliant,
            id: None,
            text: Some("Compliant".to_owned()),
        };
        assert_eq!(badge.to_markdown(), "{status:compliant}");
    }

    #[test]
    fn test_status_html() {
        let badge = StatusBadge {
            status: ComplianceStatus::InProgress,
            id: Some("ctl-4".to_owned()),
            text: None,
        };
        assert_eq!(
            badge.to_html(),
            r#"<span data-status="in-progress" data-status-id="ctl-4">In Progress</span>"#
        );
        assert_eq!(badge.to_markdown(), r#"{status:in-progress id="ctl-4"}"#);
    }

    #[test]
    fn test_evidence_default_href() {
        assert_eq!(EvidenceLink::default_href("E 1/2"), "/api/evidence/E%201%2F2");
        let link = EvidenceLink {
            label: "Policy".to_owned(),
            id: "E 1/2".to_owned(),
            file_type: Some("pdf".to_owned()),
            href: Some("/api/evidence/E%201%2F2".to_owned()),
        };
        assert_eq!(link.to_markdown(), r#"[Policy]{evidence id="E 1/2" type="pdf"}"#);
    }

    #[test]
    fn test_evidence_custom_href_kept() {
        let link = EvidenceLink {
            label: "Doc".to_owned(),
            id: "7".to_owned(),
            file_type: None,
            href: Some("https://files.example.com/7".to_owned()),
        };
        assert_eq!(
            link.to_markdown(),
            r#"[Doc]{evidence id="7" href="https://files.example.com/7"}"#
        );
        assert_eq!(
            link.html_open(),
            r#"<a data-evidence data-evidence-id="7" href="https://files.example.com/7">"#
        );
    }

    #[test]
    fn test_mask_markdown() {
        let mask = PrivacyMask {
            mask_type: MaskType::Financial,
            placeholder: Some("[FINANCIAL DATA REDACTED]".to_owned()),
            content: "1234-5678".to_owned(),
        };
        assert_eq!(mask.to_markdown(), r#"{mask type="financial"}1234-5678{/mask}"#);
    }

    #[test]
    fn test_mask_html_default_placeholder() {
        let mask = PrivacyMask {
            mask_type: MaskType::Financial,
            placeholder: None,
            content: String::new(),
        };
        assert_eq!(
            mask.html_open(),
            r#"<span data-privacy-mask data-mask-type="financial" data-placeholder="[FINANCIAL DATA REDACTED]">"#
        );
    }
}
