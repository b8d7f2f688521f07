//! Markdown dialect for compliance documents.
//!
//! Plain CommonMark (with GFM tables, strikethrough and task lists) plus a
//! closed set of content directives: callouts, status badges, evidence
//! links, privacy masks and a table-of-contents marker. See [`directive`] for
//! the grammar.
//!
//! # Conversions
//!
//! - [`markdown_to_html`] / [`render_markdown`]: directives are rewritten to
//!   canonical HTML, the document is rendered with pulldown-cmark and the
//!   result is sanitized with the document policy.
//! - [`html_to_markdown`] / [`HtmlToMarkdown`]: stored HTML is parsed
//!   tolerantly and written back as dialect Markdown, recognizing directive
//!   elements by their canonical attributes.
//! - [`export_markdown`] / [`import_markdown`]: whole documents with front
//!   matter.
//!
//! # Example
//!
//! ```
//! let html = folio_markdown::markdown_to_html(":::warning\nRotate keys\n:::");
//! assert!(html.contains(r#"data-callout-type="warning""#));
//!
//! let markdown = folio_markdown::html_to_markdown(&html);
//! assert_eq!(markdown, ":::warning\nRotate keys\n:::");
//! ```

pub mod directive;
mod error;
mod export;
mod fence;
mod front_matter;
mod html;
mod preprocess;
mod render;
mod to_markdown;

pub use export::{ExportOptions, Imported, export_markdown, import_markdown};
pub use front_matter::{Document, FrontMatter};
pub use preprocess::Warning;
pub use render::{Heading, Rendered, render_markdown, slugify};
pub use to_markdown::{HtmlToMarkdown, PrivacyMode};

/// Render dialect Markdown to sanitized HTML.
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    render_markdown(markdown).html
}

/// Convert HTML back to dialect Markdown, keeping masked content.
#[must_use]
pub fn html_to_markdown(html: &str) -> String {
    HtmlToMarkdown::new().convert(html)
}
