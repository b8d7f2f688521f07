//! HTML→Markdown conversion.
//!
//! Walks the constrained HTML subset and writes dialect Markdown. Elements
//! carrying a directive's canonical signature are written back as directive
//! syntax with default-valued attributes omitted, so repeated round trips do
//! not accumulate explicit attributes. Everything else falls back to generic
//! Markdown (headings, emphasis, lists, code, tables).

use std::fmt::Write;

use crate::directive::model::TOC_MARKER;
use crate::directive::{
    Callout, CalloutType, ComplianceStatus, DirectiveKind, EvidenceLink, MaskType, PrivacyMask,
    StatusBadge,
};
use crate::html::{self, Element, Node};

/// What to do with privacy-masked content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrivacyMode {
    /// Keep the masked content.
    #[default]
    Reveal,
    /// Replace the content with the mask's placeholder. The mask directive
    /// itself is kept.
    Redact,
}

/// Configurable HTML→Markdown converter.
///
/// # Example
///
/// ```
/// use folio_markdown::{HtmlToMarkdown, PrivacyMode};
///
/// let html = r#"<p>Owner: <span data-privacy-mask data-mask-type="pii" data-placeholder="[PERSONAL INFO REDACTED]">Jane</span></p>"#;
/// let markdown = HtmlToMarkdown::new()
///     .with_privacy(PrivacyMode::Redact)
///     .convert(html);
/// assert_eq!(markdown, r#"Owner: {mask type="pii"}\[PERSONAL INFO REDACTED\]{/mask}"#);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct HtmlToMarkdown {
    privacy: PrivacyMode,
    include_toc: bool,
}

impl Default for HtmlToMarkdown {
    fn default() -> Self {
        Self {
            privacy: PrivacyMode::Reveal,
            include_toc: true,
        }
    }
}

impl HtmlToMarkdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_privacy(mut self, privacy: PrivacyMode) -> Self {
        self.privacy = privacy;
        self
    }

    /// Whether `<nav data-toc>` is written as `[[toc]]` or dropped.
    #[must_use]
    pub fn with_toc(mut self, include_toc: bool) -> Self {
        self.include_toc = include_toc;
        self
    }

    /// Convert an HTML fragment. Output has no trailing newline.
    #[must_use]
    pub fn convert(&self, html: &str) -> String {
        let root = html::parse(html);
        self.render_blocks(&root.children)
    }

    fn render_blocks(&self, nodes: &[Node]) -> String {
        let mut blocks = Vec::new();
        self.blocks(nodes, &mut blocks);
        blocks.join("\n\n")
    }

    /// Write block-level content. Runs of inline nodes become paragraphs.
    fn blocks(&self, nodes: &[Node], out: &mut Vec<String>) {
        let mut inline = String::new();
        for node in nodes {
            match node {
                Node::Element(element) if is_block(&element.tag) => {
                    flush_paragraph(&mut inline, out);
                    self.block(element, out);
                }
                node => self.inline(node, &mut inline),
            }
        }
        flush_paragraph(&mut inline, out);
    }

    fn block(&self, element: &Element, out: &mut Vec<String>) {
        match directive_kind(element) {
            Some(DirectiveKind::Callout) => {
                out.push(self.callout(element));
                return;
            }
            Some(DirectiveKind::TableOfContents) => {
                if self.include_toc {
                    out.push(TOC_MARKER.to_owned());
                }
                return;
            }
            Some(DirectiveKind::StatusBadge | DirectiveKind::EvidenceLink | DirectiveKind::PrivacyMask)
            | None => {}
        }

        match element.tag.as_str() {
            "p" => {
                let mut inline = String::new();
                self.inline_children(element, &mut inline);
                flush_paragraph(&mut inline, out);
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = usize::from(element.tag.as_bytes()[1] - b'0');
                let mut text = String::new();
                self.inline_children(element, &mut text);
                let text = text.replace("\\\n", " ").replace('\n', " ");
                let text = text.trim();
                if !text.is_empty() {
                    out.push(format!("{} {text}", "#".repeat(level)));
                }
            }
            "hr" => out.push("---".to_owned()),
            "pre" => out.push(code_fence(element)),
            "blockquote" => {
                let inner = self.render_blocks(&element.children);
                if !inner.is_empty() {
                    out.push(quote(&inner));
                }
            }
            "ul" | "ol" => {
                let list = self.list(element);
                if !list.is_empty() {
                    out.push(list);
                }
            }
            "table" => {
                if let Some(table) = self.table(element) {
                    out.push(table);
                }
            }
            _ => self.blocks(&element.children, out),
        }
    }

    fn callout(&self, element: &Element) -> String {
        let callout = Callout {
            kind: CalloutType::parse_or_default(element.attr("data-callout-type").unwrap_or_default()),
            title: element.attr_non_empty("data-callout-title").map(str::to_owned),
        };

        let content = element
            .elements()
            .find(|child| child.tag == "div" && child.has_class("callout-content"));
        let inner = match content {
            Some(content) => self.render_blocks(&content.children),
            None => {
                let body: Vec<Node> = element
                    .children
                    .iter()
                    .filter(|node| !is_callout_title(node))
                    .cloned()
                    .collect();
                self.render_blocks(strip_legacy_title(&body, callout.title.as_deref()))
            }
        };

        let mut out = callout.to_markdown();
        out.push('\n');
        if !inner.is_empty() {
            out.push_str(&inner);
            out.push('\n');
        }
        out.push_str(":::");
        out
    }

    fn list(&self, element: &Element) -> String {
        let ordered = element.tag == "ol";
        let mut number = element
            .attr("start")
            .and_then(|start| start.trim().parse::<u64>().ok())
            .unwrap_or(1);
        let items: Vec<&Element> = element.elements().filter(|child| child.tag == "li").collect();
        let loose = items
            .iter()
            .any(|item| item.elements().any(|child| child.tag == "p"));

        let mut rendered = Vec::with_capacity(items.len());
        for item in items {
            let marker = if ordered {
                let marker = format!("{number}. ");
                number += 1;
                marker
            } else {
                "- ".to_owned()
            };
            rendered.push(self.list_item(item, &marker, loose));
        }
        rendered.join(if loose { "\n\n" } else { "\n" })
    }

    fn list_item(&self, item: &Element, marker: &str, loose: bool) -> String {
        let (task, children) = task_marker(&item.children);
        let mut blocks = Vec::new();
        self.blocks(children, &mut blocks);
        let body = blocks.join(if loose { "\n\n" } else { "\n" });

        let mut out = marker.to_owned();
        if let Some(checked) = task {
            out.push_str(if checked { "[x] " } else { "[ ] " });
        }
        let indent = " ".repeat(marker.len());
        for (index, line) in body.lines().enumerate() {
            if index > 0 {
                out.push('\n');
                if !line.is_empty() {
                    out.push_str(&indent);
                }
            }
            out.push_str(line);
        }
        out.trim_end().to_owned()
    }

    fn table(&self, element: &Element) -> Option<String> {
        let mut rows = Vec::new();
        collect_rows(element, &mut rows);
        let header = *rows.first()?;

        let cells = |row: &Element| -> Vec<String> {
            row.elements()
                .filter(|cell| cell.tag == "th" || cell.tag == "td")
                .map(|cell| self.table_cell(cell))
                .collect()
        };
        let alignments: Vec<&'static str> = header
            .elements()
            .filter(|cell| cell.tag == "th" || cell.tag == "td")
            .map(|cell| match cell.attr("align").map(str::trim) {
                Some("left") => ":---",
                Some("center") => ":---:",
                Some("right") => "---:",
                _ => "---",
            })
            .collect();

        let rows: Vec<Vec<String>> = rows.into_iter().map(cells).collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);

        let mut out = String::new();
        for (index, row) in rows.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            push_table_row(&mut out, (0..width).map(|i| row.get(i).map_or("", String::as_str)));
            if index == 0 {
                out.push('\n');
                push_table_row(
                    &mut out,
                    (0..width).map(|i| alignments.get(i).copied().unwrap_or("---")),
                );
            }
        }
        Some(out)
    }

    fn table_cell(&self, cell: &Element) -> String {
        let mut text = String::new();
        self.inline_children(cell, &mut text);
        text.replace("\\\n", " ")
            .replace('\n', " ")
            .replace('|', "\\|")
            .trim()
            .to_owned()
    }

    fn inline_children(&self, element: &Element, out: &mut String) {
        for child in &element.children {
            self.inline(child, out);
        }
    }

    fn inline(&self, node: &Node, out: &mut String) {
        match node {
            Node::Text(text) => push_text(out, text),
            Node::Element(element) => self.inline_element(element, out),
        }
    }

    fn inline_element(&self, element: &Element, out: &mut String) {
        match directive_kind(element) {
            Some(DirectiveKind::StatusBadge) => return status_badge(element, out),
            Some(DirectiveKind::EvidenceLink) => {
                if self.evidence_link(element, out) {
                    return;
                }
            }
            Some(DirectiveKind::PrivacyMask) => return self.privacy_mask(element, out),
            Some(DirectiveKind::Callout | DirectiveKind::TableOfContents) | None => {}
        }

        match element.tag.as_str() {
            "strong" | "b" => self.wrap(element, "**", out),
            "em" | "i" => self.wrap(element, "*", out),
            "s" | "del" | "strike" => self.wrap(element, "~~", out),
            "code" => push_code_span(out, &element.text()),
            "br" => out.push_str("\\\n"),
            "img" => push_image(element, out),
            "a" => self.link(element, out),
            "input" | "script" | "style" => {}
            _ => self.inline_children(element, out),
        }
    }

    /// Surround the element's content with `delimiter`, keeping outer
    /// whitespace outside the delimiters.
    fn wrap(&self, element: &Element, delimiter: &str, out: &mut String) {
        let mut inner = String::new();
        self.inline_children(element, &mut inner);
        let trimmed = inner.trim();
        if trimmed.is_empty() {
            if !inner.is_empty() && !ends_with_space(out) {
                out.push(' ');
            }
            return;
        }
        if inner.starts_with(char::is_whitespace) && !ends_with_space(out) {
            out.push(' ');
        }
        out.push_str(delimiter);
        out.push_str(trimmed);
        out.push_str(delimiter);
        if inner.ends_with(char::is_whitespace) {
            out.push(' ');
        }
    }

    fn link(&self, element: &Element, out: &mut String) {
        let mut text = String::new();
        self.inline_children(element, &mut text);
        let Some(href) = element.attr_non_empty("href") else {
            out.push_str(&text);
            return;
        };

        write!(out, "[{}](", text.trim()).unwrap();
        push_destination(out, href);
        if let Some(title) = element.attr_non_empty("title") {
            write!(out, " \"{}\"", escape_title(title)).unwrap();
        }
        out.push(')');
    }

    /// Returns `false` when the anchor lacks an evidence id and should be
    /// written as a plain link.
    fn evidence_link(&self, element: &Element, out: &mut String) -> bool {
        let Some(id) = element.attr_non_empty("data-evidence-id") else {
            return false;
        };
        let mut label = String::new();
        self.inline_children(element, &mut label);

        let link = EvidenceLink {
            label: label.trim().to_owned(),
            id: id.to_owned(),
            file_type: element.attr_non_empty("data-file-type").map(str::to_owned),
            href: element.attr_non_empty("href").map(str::to_owned),
        };
        out.push_str(&link.to_markdown());
        true
    }

    fn privacy_mask(&self, element: &Element, out: &mut String) {
        let mut mask = PrivacyMask {
            mask_type: MaskType::parse_or_default(element.attr("data-mask-type").unwrap_or_default()),
            placeholder: element.attr_non_empty("data-placeholder").map(str::to_owned),
            content: String::new(),
        };

        let mut content = String::new();
        match self.privacy {
            PrivacyMode::Reveal => self.inline_children(element, &mut content),
            PrivacyMode::Redact => push_text(&mut content, mask.placeholder()),
        }
        mask.content = content.trim().to_owned();
        out.push_str(&mask.to_markdown());
    }
}

/// Directive whose canonical HTML signature `element` carries.
fn directive_kind(element: &Element) -> Option<DirectiveKind> {
    DirectiveKind::ALL.into_iter().find(|kind| {
        kind.schema()
            .matches_element(&element.tag, |name| element.has_attr(name))
    })
}

fn status_badge(element: &Element, out: &mut String) {
    let text = element.text().split_whitespace().collect::<Vec<_>>().join(" ");
    let badge = StatusBadge {
        status: ComplianceStatus::parse_or_default(element.attr("data-status").unwrap_or_default()),
        id: element.attr_non_empty("data-status-id").map(str::to_owned),
        text: Some(text).filter(|text| !text.is_empty()),
    };
    out.push_str(&badge.to_markdown());
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "li"
            | "blockquote"
            | "pre"
            | "table"
            | "hr"
            | "div"
            | "nav"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "aside"
            | "figure"
            | "figcaption"
            | "details"
            | "summary"
            | "dl"
            | "dt"
            | "dd"
    )
}

fn is_callout_title(node: &Node) -> bool {
    matches!(node, Node::Element(element) if element.has_class("callout-title"))
}

/// Drop a leading body paragraph that repeats the callout title.
///
/// Only HTML saved by older renderers has this shape; current output keeps
/// the title in a separate `callout-title` element that is never read back.
fn strip_legacy_title<'a>(body: &'a [Node], title: Option<&str>) -> &'a [Node] {
    let Some(title) = title.map(comparable_title) else {
        return body;
    };
    let Some(first) = body
        .iter()
        .position(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()))
    else {
        return body;
    };

    match &body[first] {
        Node::Element(paragraph)
            if paragraph.tag == "p" && comparable_title(&paragraph.text()) == title =>
        {
            tracing::debug!(title, "Dropped duplicate callout title paragraph");
            &body[first + 1..]
        }
        _ => body,
    }
}

/// Title text without leading symbols or emoji.
fn comparable_title(text: &str) -> &str {
    text.trim_start_matches(|c: char| !c.is_alphanumeric()).trim_end()
}

/// Leading task-list checkbox of a list item, and the remaining children.
fn task_marker(children: &[Node]) -> (Option<bool>, &[Node]) {
    let first = children
        .iter()
        .position(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()));
    if let Some(index) = first
        && let Node::Element(input) = &children[index]
        && input.tag == "input"
        && input.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
    {
        return (Some(input.has_attr("checked")), &children[index + 1..]);
    }
    (None, children)
}

fn collect_rows<'a>(element: &'a Element, rows: &mut Vec<&'a Element>) {
    for child in element.elements() {
        match child.tag.as_str() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => collect_rows(child, rows),
            _ => {}
        }
    }
}

fn push_table_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for cell in cells {
        write!(out, " {cell} |").unwrap();
    }
}

fn code_fence(pre: &Element) -> String {
    let code = pre.elements().find(|child| child.tag == "code");
    let language = code
        .and_then(|code| code.attr("class"))
        .and_then(|classes| {
            classes
                .split_whitespace()
                .find_map(|class| class.strip_prefix("language-"))
        })
        .unwrap_or_default();
    let text = code.map_or_else(|| pre.text(), Element::text);
    let body = text.strip_suffix('\n').unwrap_or(&text);

    let fence = "`".repeat(longest_run(body, '`').max(2) + 1);
    format!("{fence}{language}\n{body}\n{fence}")
}

fn quote(inner: &str) -> String {
    inner
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_owned()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_code_span(out: &mut String, code: &str) {
    let code = code.replace('\n', " ");
    if code.is_empty() {
        return;
    }
    let fence = "`".repeat(longest_run(&code, '`') + 1);
    let pad = if code.starts_with('`')
        || code.ends_with('`')
        || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty())
    {
        " "
    } else {
        ""
    };
    write!(out, "{fence}{pad}{code}{pad}{fence}").unwrap();
}

fn push_image(element: &Element, out: &mut String) {
    let Some(src) = element.attr_non_empty("src") else {
        return;
    };
    let mut alt = String::new();
    push_text(&mut alt, element.attr("alt").unwrap_or_default());
    write!(out, "![{}](", alt.trim()).unwrap();
    push_destination(out, src);
    if let Some(title) = element.attr_non_empty("title") {
        write!(out, " \"{}\"", escape_title(title)).unwrap();
    }
    out.push(')');
}

/// Link destination, in angle brackets when it would not parse bare.
fn push_destination(out: &mut String, url: &str) {
    if url.contains([' ', '(', ')', '<', '>']) {
        write!(out, "<{}>", url.replace('<', "%3C").replace('>', "%3E")).unwrap();
    } else {
        out.push_str(url);
    }
}

fn escape_title(title: &str) -> String {
    title.replace('\\', "\\\\").replace('"', "\\\"")
}

fn longest_run(text: &str, c: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == c {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn ends_with_space(out: &str) -> bool {
    out.ends_with(' ') || out.ends_with('\n')
}

/// Append text with whitespace collapsed and Markdown-significant
/// characters backslash-escaped.
fn push_text(out: &mut String, text: &str) {
    let mut pending_space = false;
    for (index, c) in text.char_indices() {
        if c.is_ascii_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !ends_with_space(out) {
            out.push(' ');
        }
        pending_space = false;

        match c {
            '\\' | '*' | '_' | '`' | '[' | ']' | '{' | '}' | '<' | '~' => out.push('\\'),
            '&' if looks_like_reference(&text[index + 1..]) => out.push('\\'),
            _ => {}
        }
        out.push(c);
    }
    if pending_space && !ends_with_space(out) {
        out.push(' ');
    }
}

/// Whether text after `&` would be read as a character reference.
fn looks_like_reference(rest: &str) -> bool {
    let body = rest.strip_prefix('#').unwrap_or(rest);
    let len = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    len > 0 && body[len..].starts_with(';')
}

/// Trim a paragraph and escape line-start characters that would otherwise
/// start a block construct.
fn flush_paragraph(inline: &mut String, out: &mut Vec<String>) {
    let text = std::mem::take(inline);
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    let lines: Vec<String> = text.lines().map(|line| escape_line_start(line.trim())).collect();
    out.push(lines.join("\n"));
}

fn escape_line_start(line: &str) -> String {
    match line.chars().next() {
        Some('#' | '>' | '-' | '+' | '=' | ':' | '|') => format!("\\{line}"),
        Some(c) if c.is_ascii_digit() => {
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            match line[digits..].chars().next() {
                Some('.' | ')') => format!("{}\\{}", &line[..digits], &line[digits..]),
                _ => line.to_owned(),
            }
        }
        _ => line.to_owned(),
    }
}
