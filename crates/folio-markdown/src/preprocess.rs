//! Directive preprocessing for Markdown→HTML.
//!
//! Directive syntax is rewritten into canonical HTML that pulldown-cmark
//! passes through unchanged:
//!
//! - Callout markers become `<div>` openers/closers surrounded by blank
//!   lines, so the body between them is still parsed as Markdown.
//! - `[[toc]]` becomes an empty `<nav>` block.
//! - Inline directives become inline HTML; evidence labels and mask content
//!   stay Markdown and are expanded recursively.
//!
//! Fenced code, code spans and backslash-escaped `\{` / `\[` are left alone.
//! Unmatched callout markers stay literal text and produce a [`Warning`].

use std::fmt;
use std::ops::Range;

use crate::directive::model::{Callout, Directive, TOC_HTML};
use crate::directive::syntax::{BlockLine, InlineIndex, InlineMatch, parse_block_line};
use crate::directive::DirectiveKind;
use crate::fence::FenceTracker;

/// A recovered grammar mismatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    /// 1-based source line.
    pub line: usize,
    pub directive: DirectiveKind,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Output of the directive pass.
#[derive(Debug, Default)]
pub(crate) struct Preprocessed {
    pub(crate) markdown: String,
    pub(crate) warnings: Vec<Warning>,
}

struct SourceLine<'a> {
    text: &'a str,
    code: bool,
    block: Option<BlockLine>,
}

/// Rewrite directive syntax in `source` into intermediate HTML.
pub(crate) fn preprocess(source: &str) -> Preprocessed {
    let mut tracker = FenceTracker::new();
    let lines: Vec<SourceLine<'_>> = source
        .lines()
        .map(|text| {
            let code = tracker.classify(text).is_code();
            let block = if code { None } else { parse_block_line(text) };
            SourceLine { text, code, block }
        })
        .collect();

    let mut warnings = Vec::new();
    let active = match_callouts(&lines, &mut warnings);

    let mut markdown = String::with_capacity(source.len() + source.len() / 4);
    for (line, is_active) in lines.iter().zip(active) {
        match (&line.block, is_active) {
            _ if line.code => {
                markdown.push_str(line.text);
                markdown.push('\n');
            }
            (Some(BlockLine::CalloutOpen(callout)), true) => {
                push_block(&mut markdown, &callout.html_open());
            }
            (Some(BlockLine::CalloutClose), true) => {
                push_block(&mut markdown, Callout::html_close());
            }
            (Some(BlockLine::TableOfContents), _) => {
                push_block(&mut markdown, TOC_HTML);
            }
            _ => {
                expand_inline(line.text, &mut markdown);
                markdown.push('\n');
            }
        }
    }

    Preprocessed { markdown, warnings }
}

/// Emit an HTML block on its own, separated by blank lines.
fn push_block(out: &mut String, html: &str) {
    out.push('\n');
    out.push_str(html);
    out.push_str("\n\n");
}

/// Pair callout openers with closers. Returns, per line, whether the line's
/// block marker takes effect.
fn match_callouts(lines: &[SourceLine<'_>], warnings: &mut Vec<Warning>) -> Vec<bool> {
    let mut active = vec![false; lines.len()];
    let mut open = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        match line.block {
            Some(BlockLine::CalloutOpen(_)) => open.push(index),
            Some(BlockLine::CalloutClose) => {
                if let Some(start) = open.pop() {
                    active[start] = true;
                    active[index] = true;
                } else {
                    warnings.push(callout_warning(index, "closing ':::' without an open callout"));
                }
            }
            Some(BlockLine::TableOfContents) => active[index] = true,
            None => {}
        }
    }

    for start in open {
        warnings.push(callout_warning(start, "callout is never closed"));
    }
    warnings.sort_by_key(|w| w.line);

    active
}

fn callout_warning(index: usize, message: &str) -> Warning {
    let line = index + 1;
    tracing::debug!(directive = "callout", line, message, "Unmatched callout marker kept as text");
    Warning {
        line,
        directive: DirectiveKind::Callout,
        message: message.to_owned(),
    }
}

/// Expand inline directives in one line of Markdown.
pub(crate) fn expand_inline(line: &str, out: &mut String) {
    let index = InlineIndex::new(line);
    expand_range(&index, 0..line.len(), out);
}

/// Expand one span of an indexed line; nested labels and mask content
/// reuse the same index.
fn expand_range(index: &InlineIndex<'_>, range: Range<usize>, out: &mut String) {
    let line = index.line();
    let bytes = line.as_bytes();
    let Range { start, end } = range;
    let mut last = start;
    let mut i = start;

    while i < end {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                let run = bytes[i..end].iter().take_while(|&&b| b == b'`').count();
                i = index.code_span_end(i + run, run, end).unwrap_or(i + run);
            }
            b'{' | b'[' => {
                if let Some(found) = index.parse_at(i, end) {
                    out.push_str(&line[last..i]);
                    push_inline_directive(index, &found, out);
                    i = found.end;
                    last = i;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    out.push_str(&line[last..end]);
}

/// Write an inline directive as canonical HTML.
fn push_inline_directive(index: &InlineIndex<'_>, found: &InlineMatch, out: &mut String) {
    let close = match &found.directive {
        Directive::StatusBadge(badge) => {
            out.push_str(&badge.to_html());
            return;
        }
        Directive::EvidenceLink(link) => {
            out.push_str(&link.html_open());
            "</a>"
        }
        Directive::PrivacyMask(mask) => {
            out.push_str(&mask.html_open());
            "</span>"
        }
        // Block directives are handled line by line
        Directive::Callout(_) | Directive::TableOfContents => return,
    };
    if let Some(inner) = found.inner.clone() {
        expand_range(index, inner, out);
    }
    out.push_str(close);
}
