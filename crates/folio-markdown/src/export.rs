//! Export and import of whole documents.
//!
//! Export turns stored HTML into a Markdown file with front matter, applying
//! the privacy and table-of-contents options. Import is the reverse: split
//! off front matter and render the body to sanitized HTML.

use serde::Serialize;

use crate::front_matter::{Document, FrontMatter};
use crate::preprocess::Warning;
use crate::render::{Heading, render_markdown};
use crate::to_markdown::{HtmlToMarkdown, PrivacyMode};

/// Options for [`export_markdown`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
    /// Keep masked content; when `false` it is replaced by the placeholder.
    pub reveal_privacy: bool,
    /// Keep `[[toc]]` markers.
    pub include_toc: bool,
    /// Prepended as a front matter block when non-empty.
    pub front_matter: FrontMatter,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            reveal_privacy: false,
            include_toc: true,
            front_matter: FrontMatter::new(),
        }
    }
}

impl ExportOptions {
    fn converter(&self) -> HtmlToMarkdown {
        let privacy = if self.reveal_privacy {
            PrivacyMode::Reveal
        } else {
            PrivacyMode::Redact
        };
        HtmlToMarkdown::new()
            .with_privacy(privacy)
            .with_toc(self.include_toc)
    }
}

/// Convert stored HTML into an exportable Markdown document.
///
/// # Example
///
/// ```
/// use folio_markdown::{ExportOptions, export_markdown};
///
/// let html = r#"<p>Card <span data-privacy-mask data-mask-type="financial" data-placeholder="[FINANCIAL DATA REDACTED]">1234</span></p>"#;
/// let markdown = export_markdown(html, &ExportOptions::default());
/// assert!(!markdown.contains("1234"));
/// ```
#[must_use]
pub fn export_markdown(html: &str, options: &ExportOptions) -> String {
    let mut body = options.converter().convert(html);
    if !body.is_empty() {
        body.push('\n');
    }

    tracing::debug!(
        reveal_privacy = options.reveal_privacy,
        include_toc = options.include_toc,
        front_matter_keys = options.front_matter.len(),
        "Exported document"
    );

    Document {
        front_matter: options.front_matter.clone(),
        body,
    }
    .to_markdown()
}

/// Result of [`import_markdown`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Imported {
    pub front_matter: FrontMatter,
    /// Sanitized HTML of the body.
    pub html: String,
    pub headings: Vec<Heading>,
    #[serde(skip)]
    pub warnings: Vec<Warning>,
}

/// Split front matter from `markdown` and render the body.
#[must_use]
pub fn import_markdown(markdown: &str) -> Imported {
    let document = Document::parse(markdown);
    let rendered = render_markdown(&document.body);
    Imported {
        front_matter: document.front_matter,
        html: rendered.html,
        headings: rendered.headings,
        warnings: rendered.warnings,
    }
}
