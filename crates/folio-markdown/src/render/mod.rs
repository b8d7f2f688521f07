//! Markdown→HTML conversion.
//!
//! Directive syntax is first rewritten into canonical HTML by
//! [`preprocess`](crate::preprocess), then pulldown-cmark events are turned
//! into HTML here, and finally the whole document goes through the document
//! sanitizer. Callers never see unsanitized output.

mod state;

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::preprocess::{Warning, preprocess};
pub use state::{Heading, slugify};
pub(crate) use state::escape_html;
use state::{CodeBlockState, HeadingState, ImageState, TableState};

/// Output of [`render_markdown`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    /// Sanitized HTML.
    pub html: String,
    /// Document outline in source order.
    pub headings: Vec<Heading>,
    /// Recovered directive grammar mismatches.
    pub warnings: Vec<Warning>,
}

/// Render dialect Markdown to sanitized HTML, keeping the heading outline
/// and any directive warnings.
///
/// # Example
///
/// ```
/// let rendered = folio_markdown::render_markdown("# Scope\n\n{status:compliant}");
/// assert_eq!(rendered.headings[0].id, "scope");
/// assert!(rendered.html.contains(r#"data-status="compliant""#));
/// ```
#[must_use]
pub fn render_markdown(markdown: &str) -> Rendered {
    let preprocessed = preprocess(markdown);
    let parser = Parser::new_ext(&preprocessed.markdown, parser_options());
    let (html, headings) = HtmlRenderer::new().render(parser);

    Rendered {
        html: folio_sanitize::sanitize_html(html.as_str()),
        headings,
        warnings: preprocessed.warnings,
    }
}

/// GFM tables, strikethrough and task lists on top of CommonMark.
fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Event-driven HTML writer.
struct HtmlRenderer {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    /// Image (src, title) waiting for its alt text.
    pending_image: Option<(String, String)>,
}

impl HtmlRenderer {
    fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
            pending_image: None,
        }
    }

    fn render<'a, I>(mut self, events: I) -> (String, Vec<Heading>)
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }
        (self.output, self.heading.take_headings())
    }

    /// Push content to the heading buffer when inside a heading. Markup
    /// inside image alt text is dropped.
    fn push_inline(&mut self, content: &str) {
        if self.image.is_active() {
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) => self.output.push_str(&html),
            Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => self.output.push_str(if checked {
                r#"<input type="checkbox" checked disabled> "#
            } else {
                r#"<input type="checkbox" disabled> "#
            }),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Written in end_tag once the id is known
                self.heading.start_heading(heading_level(level));
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(language);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_attr();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = format!(r#"<a href="{}""#, escape_html(&dest_url));
                if !title.is_empty() {
                    write!(link, r#" title="{}""#, escape_html(&title)).unwrap();
                }
                link.push('>');
                self.push_inline(&link);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image.start();
                self.pending_image = Some((dest_url.into_string(), title.into_string()));
            }
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.complete_heading() {
                    write!(
                        self.output,
                        r#"<h{level} id="{id}">{}</h{level}>"#,
                        html.trim()
                    )
                    .unwrap();
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                let (language, content) = self.code.end();
                if let Some(language) = language {
                    write!(
                        self.output,
                        r#"<pre><code class="language-{}">{}</code></pre>"#,
                        escape_html(&language),
                        escape_html(&content)
                    )
                    .unwrap();
                } else {
                    write!(self.output, "<pre><code>{}</code></pre>", escape_html(&content)).unwrap();
                }
            }
            TagEnd::List(ordered) => self.output.push_str(if ordered { "</ol>" } else { "</ul>" }),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    let mut img = format!(r#"<img src="{}" alt="{}""#, escape_html(&src), escape_html(&alt));
                    if !title.is_empty() {
                        write!(img, r#" title="{}""#, escape_html(&title)).unwrap();
                    }
                    img.push('>');
                    self.push_inline(&img);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn text(&mut self, text: &str) {
        // Priority: code > image > heading > normal text
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        self.push_inline(&format!("<code>{}</code>", escape_html(code)));
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            self.heading.push_html("\n");
        } else {
            self.output.push('\n');
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Render without the sanitizer so the writer itself is under test.
    fn raw(markdown: &str) -> String {
        let preprocessed = preprocess(markdown);
        let parser = Parser::new_ext(&preprocessed.markdown, parser_options());
        HtmlRenderer::new().render(parser).0
    }

    #[test]
    fn test_paragraph_and_emphasis() {
        assert_eq!(
            raw("Hello **bold** and *em* and ~~gone~~"),
            "<p>Hello <strong>bold</strong> and <em>em</em> and <s>gone</s></p>"
        );
    }

    #[test]
    fn test_heading_with_inline_markup() {
        let rendered = render_markdown("## The `scope` of *work*");
        assert_eq!(
            rendered.html,
            r#"<h2 id="the-scope-of-work">The <code>scope</code> of <em>work</em></h2>"#
        );
        assert_eq!(
            rendered.headings,
            vec![Heading {
                level: 2,
                title: "The scope of work".to_owned(),
                id: "the-scope-of-work".to_owned(),
            }]
        );
    }

    #[test]
    fn test_heading_with_status_badge() {
        let rendered = render_markdown("# Access {status:compliant}");
        assert!(rendered.html.starts_with(r#"<h1 id="access-compliant">Access <span"#));
        assert!(rendered.html.contains(">Compliant</span></h1>"));
    }

    #[test]
    fn test_code_block_language() {
        assert_eq!(
            raw("```rust\nfn main() {}\n```"),
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
        );
    }

    #[test]
    fn test_table_alignment() {
        let html = raw("| a | b |\n|:--|--:|\n| 1 | 2 |");
        assert_eq!(
            html,
            r#"<table><thead><tr><th align="left">a</th><th align="right">b</th></tr></thead><tbody><tr><td align="left">1</td><td align="right">2</td></tr></tbody></table>"#
        );
    }

    #[test]
    fn test_task_list() {
        let html = raw("- [x] done\n- [ ] todo");
        assert!(html.contains(r#"<li><input type="checkbox" checked disabled> done</li>"#));
        assert!(html.contains(r#"<li><input type="checkbox" disabled> todo</li>"#));
    }

    #[test]
    fn test_ordered_list_start() {
        assert_eq!(raw("3. c\n4. d"), r#"<ol start="3"><li>c</li><li>d</li></ol>"#);
    }

    #[test]
    fn test_link_and_image() {
        assert_eq!(
            raw(r#"[site](https://example.com "Home") ![a *b*](x.png)"#),
            r#"<p><a href="https://example.com" title="Home">site</a> <img src="x.png" alt="a b"></p>"#
        );
    }

    #[test]
    fn test_callout_body_is_markdown() {
        let html = raw(":::danger{title=\"Stop\"}\n**Bold** body\n:::");
        assert_eq!(
            html,
            "<div data-callout-type=\"danger\" data-callout-title=\"Stop\">\n\
             <div class=\"callout-title\">Stop</div>\n\
             <div class=\"callout-content\">\n\
             <p><strong>Bold</strong> body</p>\
             </div></div>\n"
        );
    }

    #[test]
    fn test_mask_default_placeholder() {
        let rendered = render_markdown(r#"{mask type="financial"}1234-5678{/mask}"#);
        assert!(
            rendered
                .html
                .contains(r#"data-placeholder="[FINANCIAL DATA REDACTED]""#)
        );
    }

    #[test]
    fn test_render_sanitizes_raw_html() {
        let rendered = render_markdown("<img src=x onerror=\"alert(1)\">\n\n[x](javascript:alert(1))");
        assert!(!rendered.html.contains("onerror"));
        assert!(!rendered.html.contains("javascript:"));
    }

    #[test]
    fn test_warnings_reported() {
        let rendered = render_markdown("text\n:::");
        assert_eq!(rendered.warnings.len(), 1);
        assert!(rendered.html.contains(":::"));
    }
}
