//! Dialect syntax recognition.
//!
//! Block directives (`:::type{...}`, `:::`, `[[toc]]`) occupy a whole line.
//! Inline directives are recognized at a `{` or `[` position through a
//! per-line [`InlineIndex`] of closer positions; the first
//! grammar that matches wins, and a grammar mismatch simply yields `None`.

use std::collections::HashMap;
use std::ops::Range;

use super::DirectiveArgs;
use super::model::{Callout, Directive, EvidenceLink, PrivacyMask, StatusBadge, TOC_MARKER};
use super::values::{CalloutType, ComplianceStatus, MaskType};

const STATUS_OPEN: &str = "{status:";
const MASK_OPEN: &str = "{mask";
const MASK_CLOSE: &str = "{/mask}";
const EVIDENCE_OPEN: &str = "{evidence";

/// A line that is entirely a block directive marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BlockLine {
    /// `:::type{title="..."}`
    CalloutOpen(Callout),
    /// `:::`
    CalloutClose,
    /// `[[toc]]`
    TableOfContents,
}

/// Parse a whole line for a block directive marker.
pub(crate) fn parse_block_line(line: &str) -> Option<BlockLine> {
    let trimmed = line.trim();

    if trimmed.eq_ignore_ascii_case(TOC_MARKER) {
        return Some(BlockLine::TableOfContents);
    }

    if !trimmed.starts_with(":::") {
        return None;
    }

    let colon_count = trimmed.chars().take_while(|&c| c == ':').count();
    let after_colons = trimmed[colon_count..].trim_start();

    if after_colons.is_empty() {
        return Some(BlockLine::CalloutClose);
    }

    let name_end = after_colons
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(after_colons.len());
    let name = &after_colons[..name_end];
    if name.starts_with(|c: char| !c.is_ascii_alphabetic()) {
        return None;
    }

    let rest = after_colons[name_end..].trim_start();
    let args = if rest.is_empty() {
        DirectiveArgs::default()
    } else {
        let (inner, consumed) = parse_braces(rest)?;
        if !rest[consumed..].trim().is_empty() {
            return None;
        }
        DirectiveArgs::parse(inner)
    };

    if name.is_empty() && args.is_empty() && rest.is_empty() {
        return None;
    }

    Some(BlockLine::CalloutOpen(Callout {
        kind: CalloutType::parse_or_default(name),
        title: args.get_non_empty("title").map(str::to_owned),
    }))
}

/// A recognized inline directive.
#[derive(Debug)]
pub(crate) struct InlineMatch {
    pub(crate) directive: Directive,
    /// Byte offset just past the directive.
    pub(crate) end: usize,
    /// Span of nested Markdown: the evidence label or the mask content.
    pub(crate) inner: Option<Range<usize>>,
}

/// Closer positions for one line, computed up front so that trying a
/// directive at any offset costs constant time.
pub(crate) struct InlineIndex<'a> {
    line: &'a str,
    /// Matching `}` for each `{`.
    braces: Vec<Option<usize>>,
    /// Matching `]` for each `[`.
    brackets: Vec<Option<usize>>,
    /// Starts of every `{/mask}`.
    mask_closes: Vec<usize>,
    /// Starts of maximal backtick runs, by run length.
    backtick_runs: HashMap<usize, Vec<usize>>,
}

impl<'a> InlineIndex<'a> {
    pub(crate) fn new(line: &'a str) -> Self {
        let bytes = line.as_bytes();

        let mut backtick_runs: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'`' {
                let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
                backtick_runs.entry(run).or_default().push(i);
                i += run;
            } else {
                i += 1;
            }
        }

        Self {
            line,
            braces: match_pairs(bytes, b'{', b'}', brace_step),
            brackets: match_pairs(bytes, b'[', b']', bracket_step),
            mask_closes: line.match_indices(MASK_CLOSE).map(|(i, _)| i).collect(),
            backtick_runs,
        }
    }

    pub(crate) fn line(&self) -> &'a str {
        self.line
    }

    /// Try each inline grammar at `start`, looking no further than `end`.
    pub(crate) fn parse_at(&self, start: usize, end: usize) -> Option<InlineMatch> {
        let s = &self.line[start..end];
        if s.starts_with(STATUS_OPEN) {
            return self.parse_status(start, end);
        }
        if keyword_at(s, MASK_OPEN) {
            return self.parse_mask(start, end);
        }
        if s.starts_with('[') {
            return self.parse_evidence(start, end);
        }
        None
    }

    /// End of a code span whose opening run of `run` backticks ends at
    /// `from`: just past the next run of exactly the same length.
    pub(crate) fn code_span_end(&self, from: usize, run: usize, end: usize) -> Option<usize> {
        let starts = self.backtick_runs.get(&run)?;
        let close = *starts.get(starts.partition_point(|&p| p < from))?;
        (close + run <= end).then_some(close + run)
    }

    fn closing_brace(&self, open: usize, end: usize) -> Option<usize> {
        self.braces[open].filter(|&close| close < end)
    }

    /// `{status:value attrs}`
    fn parse_status(&self, start: usize, end: usize) -> Option<InlineMatch> {
        let close = self.closing_brace(start, end)?;
        let body = &self.line[start + STATUS_OPEN.len()..close];
        let value_end = body.find(char::is_whitespace).unwrap_or(body.len());
        let value = &body[..value_end];
        if value.is_empty() {
            return None;
        }

        let args = DirectiveArgs::parse(&body[value_end..]);
        let badge = StatusBadge {
            status: ComplianceStatus::parse_or_default(value),
            id: args.get_non_empty("id").map(str::to_owned),
            text: args.get("text").map(str::to_owned),
        };
        Some(InlineMatch {
            directive: Directive::StatusBadge(badge),
            end: close + 1,
            inner: None,
        })
    }

    /// `{mask attrs}content{/mask}`
    fn parse_mask(&self, start: usize, end: usize) -> Option<InlineMatch> {
        let open_close = self.closing_brace(start, end)?;
        let content_start = open_close + 1;
        let content_end = *self
            .mask_closes
            .get(self.mask_closes.partition_point(|&p| p < content_start))?;
        if content_end + MASK_CLOSE.len() > end {
            return None;
        }

        let args = DirectiveArgs::parse(&self.line[start + MASK_OPEN.len()..open_close]);
        let mask = PrivacyMask {
            mask_type: args
                .get("type")
                .map_or_else(MaskType::default, MaskType::parse_or_default),
            placeholder: args.get_non_empty("placeholder").map(str::to_owned),
            content: self.line[content_start..content_end].to_owned(),
        };
        Some(InlineMatch {
            directive: Directive::PrivacyMask(mask),
            end: content_end + MASK_CLOSE.len(),
            inner: Some(content_start..content_end),
        })
    }

    /// `[label]{evidence attrs}`; a link without `id` does not match.
    fn parse_evidence(&self, start: usize, end: usize) -> Option<InlineMatch> {
        let label_close = self.brackets[start].filter(|&close| close < end)?;
        let attrs_start = label_close + 1;
        if !keyword_at(&self.line[attrs_start..end], EVIDENCE_OPEN) {
            return None;
        }

        let attrs_close = self.closing_brace(attrs_start, end)?;
        let args = DirectiveArgs::parse(&self.line[attrs_start + EVIDENCE_OPEN.len()..attrs_close]);
        let id = args.get_non_empty("id")?;

        let link = EvidenceLink {
            label: self.line[start + 1..label_close].to_owned(),
            id: id.to_owned(),
            file_type: args.get_non_empty("type").map(str::to_owned),
            href: args.get_non_empty("href").map(str::to_owned),
        };
        Some(InlineMatch {
            directive: Directive::EvidenceLink(link),
            end: attrs_close + 1,
            inner: Some(start + 1..label_close),
        })
    }
}

/// Whether `s` starts with `open` followed by whitespace or `}`.
fn keyword_at(s: &str, open: &str) -> bool {
    s.strip_prefix(open)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c == '}' || c.is_whitespace())
}

/// Scanner states. Openers and closers only count in `PLAIN`.
const PLAIN: usize = 0;
const ESCAPED: usize = 1;
const DOUBLE_QUOTED: usize = 2;
const SINGLE_QUOTED: usize = 3;
const STATES: usize = 4;

/// Inside braces, quoted values hide braces; `\"` does not end a double
/// quoted value.
fn brace_step(state: usize, byte: u8) -> usize {
    match (state, byte) {
        (PLAIN, b'"') | (ESCAPED, _) => DOUBLE_QUOTED,
        (PLAIN, b'\'') => SINGLE_QUOTED,
        (DOUBLE_QUOTED, b'\\') => ESCAPED,
        (DOUBLE_QUOTED, b'"') | (SINGLE_QUOTED, b'\'') => PLAIN,
        (state, _) => state,
    }
}

/// Inside brackets, a backslash escapes the next byte.
fn bracket_step(state: usize, byte: u8) -> usize {
    match (state, byte) {
        (PLAIN, b'\\') => ESCAPED,
        _ => PLAIN,
    }
}

/// For every `open` byte, the closer a scan starting there would stop at.
///
/// The scan state depends on where a scan starts, but two scans in the same
/// state at the same byte behave alike from then on. Open positions are
/// therefore kept in stacks grouped by state: a closer pops the top of
/// every stack in the plain group. One pass covers every start position.
fn match_pairs(
    bytes: &[u8],
    open: u8,
    close: u8,
    step: fn(usize, u8) -> usize,
) -> Vec<Option<usize>> {
    let mut matches = vec![None; bytes.len()];
    let mut groups: [Vec<Vec<usize>>; STATES] = Default::default();

    for (i, &byte) in bytes.iter().enumerate() {
        let mut next: [Vec<Vec<usize>>; STATES] = Default::default();
        for (state, mut stacks) in groups.into_iter().enumerate() {
            if stacks.is_empty() {
                continue;
            }
            if state == PLAIN && byte == close {
                for stack in &mut stacks {
                    if let Some(start) = stack.pop() {
                        matches[start] = Some(i);
                    }
                }
                stacks.retain(|stack| !stack.is_empty());
            }
            merge_stacks(&mut next[step(state, byte)], stacks);
        }
        if byte == open {
            match next[PLAIN].last_mut() {
                Some(stack) => stack.push(i),
                None => next[PLAIN].push(vec![i]),
            }
        }
        groups = next;
    }

    matches
}

fn merge_stacks(into: &mut Vec<Vec<usize>>, mut from: Vec<Vec<usize>>) {
    if into.len() < from.len() {
        std::mem::swap(into, &mut from);
    }
    into.append(&mut from);
}

/// Parse attributes from braces: `{...}`
///
/// Braces inside quoted values do not count. Returns (inner, `bytes_consumed`).
fn parse_braces(s: &str) -> Option<(&str, usize)> {
    if !s.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' && q == '"' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&s[1..i], i + 1));
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_inline(s: &str) -> Option<(Directive, usize)> {
        InlineIndex::new(s)
            .parse_at(0, s.len())
            .map(|found| (found.directive, found.end))
    }

    fn inline(s: &str) -> Option<Directive> {
        parse_inline(s).map(|(d, _)| d)
    }

    #[test]
    fn test_callout_open() {
        assert_eq!(
            parse_block_line(r#":::warning{title="Heads up"}"#),
            Some(BlockLine::CalloutOpen(Callout {
                kind: CalloutType::Warning,
                title: Some("Heads up".to_owned()),
            }))
        );
    }

    #[test]
    fn test_callout_open_without_type() {
        assert_eq!(
            parse_block_line(r#":::{title="T"}"#),
            Some(BlockLine::CalloutOpen(Callout {
                kind: CalloutType::Info,
                title: Some("T".to_owned()),
            }))
        );
    }

    #[test]
    fn test_callout_unknown_type_defaults_to_info() {
        assert_eq!(
            parse_block_line(":::tip"),
            Some(BlockLine::CalloutOpen(Callout::default()))
        );
    }

    #[test]
    fn test_callout_close() {
        assert_eq!(parse_block_line(":::"), Some(BlockLine::CalloutClose));
        assert_eq!(parse_block_line("  :::  "), Some(BlockLine::CalloutClose));
    }

    #[test]
    fn test_callout_trailing_text_is_not_a_marker() {
        assert_eq!(parse_block_line(r#":::info{title="a"} extra"#), None);
        assert_eq!(parse_block_line(":::info{title=\"a\""), None);
        assert_eq!(parse_block_line(":::1abc"), None);
    }

    #[test]
    fn test_toc_marker() {
        assert_eq!(parse_block_line("[[toc]]"), Some(BlockLine::TableOfContents));
        assert_eq!(parse_block_line("see [[toc]]"), None);
    }

    #[test]
    fn test_status_badge() {
        let (directive, len) = parse_inline(r#"{status:non-compliant id="c1"} rest"#).unwrap();
        assert_eq!(len, r#"{status:non-compliant id="c1"}"#.len());
        assert_eq!(
            directive,
            Directive::StatusBadge(StatusBadge {
                status: ComplianceStatus::NonCompliant,
                id: Some("c1".to_owned()),
                text: None,
            })
        );
    }

    #[test]
    fn test_status_unknown_value_falls_back() {
        let Some(Directive::StatusBadge(badge)) = inline("{status:approved}") else {
            panic!("expected status badge");
        };
        assert_eq!(badge.status, ComplianceStatus::PendingReview);
    }

    #[test]
    fn test_status_requires_value_and_close() {
        assert_eq!(inline("{status:}"), None);
        assert_eq!(inline("{status:compliant"), None);
    }

    #[test]
    fn test_status_text_with_brace() {
        let Some(Directive::StatusBadge(badge)) = inline(r#"{status:compliant text="a}b"}"#)
        else {
            panic!("expected status badge");
        };
        assert_eq!(badge.text.as_deref(), Some("a}b"));
    }

    #[test]
    fn test_mask() {
        let source = r#"{mask type="financial"}1234-5678{/mask} tail"#;
        let (directive, len) = parse_inline(source).unwrap();
        assert_eq!(&source[len..], " tail");
        assert_eq!(
            directive,
            Directive::PrivacyMask(PrivacyMask {
                mask_type: MaskType::Financial,
                placeholder: None,
                content: "1234-5678".to_owned(),
            })
        );
    }

    #[test]
    fn test_mask_without_attributes() {
        let Some(Directive::PrivacyMask(mask)) = inline("{mask}Jane{/mask}") else {
            panic!("expected mask");
        };
        assert_eq!(mask.mask_type, MaskType::Pii);
        assert_eq!(mask.content, "Jane");
    }

    #[test]
    fn test_mask_unclosed_is_mismatch() {
        assert_eq!(inline("{mask}Jane"), None);
        assert_eq!(inline("{masked}x{/mask}"), None);
    }

    #[test]
    fn test_evidence() {
        let source = r#"[SOC 2 report]{evidence id="E-9" type="pdf"}"#;
        let (directive, len) = parse_inline(source).unwrap();
        assert_eq!(len, source.len());
        assert_eq!(
            directive,
            Directive::EvidenceLink(EvidenceLink {
                label: "SOC 2 report".to_owned(),
                id: "E-9".to_owned(),
                file_type: Some("pdf".to_owned()),
                href: None,
            })
        );
    }

    #[test]
    fn test_evidence_requires_id() {
        assert_eq!(inline(r#"[doc]{evidence type="pdf"}"#), None);
    }

    #[test]
    fn test_plain_link_is_not_evidence() {
        assert_eq!(inline("[doc](https://example.com)"), None);
        assert_eq!(inline("[doc]{evidenced id=1}"), None);
    }

    #[test]
    fn test_nested_brackets_in_label() {
        let Some(Directive::EvidenceLink(link)) = inline(r#"[a [b] c]{evidence id=1}"#) else {
            panic!("expected evidence link");
        };
        assert_eq!(link.label, "a [b] c");
    }

    #[test]
    fn test_brace_matches_depend_on_start() {
        // From the first brace the quote never closes; from the second
        // there is no quote at all.
        let line = r#"{"x {status:compliant}"#;
        let braces = match_pairs(line.as_bytes(), b'{', b'}', brace_step);
        assert_eq!(braces[0], None);
        assert_eq!(braces[4], Some(line.len() - 1));

        let found = InlineIndex::new(line).parse_at(4, line.len()).unwrap();
        assert_eq!(found.end, line.len());
    }

    #[test]
    fn test_brace_matches_nest() {
        let braces = match_pairs(b"{a {b} 'c}' \"d\\\"}\"}", b'{', b'}', brace_step);
        assert_eq!(braces[0], Some(18));
        assert_eq!(braces[3], Some(5));
    }

    #[test]
    fn test_bracket_escape() {
        let brackets = match_pairs(br"[a \] b]", b'[', b']', bracket_step);
        assert_eq!(brackets[0], Some(7));
    }

    #[test]
    fn test_parse_at_respects_end() {
        let line = "{status:compliant}";
        let index = InlineIndex::new(line);
        assert!(index.parse_at(0, line.len() - 1).is_none());
        assert!(index.parse_at(0, line.len()).is_some());
    }

    #[test]
    fn test_inner_span_of_label_and_content() {
        let line = r#"[lab]{evidence id=1} {mask}m{/mask}"#;
        let index = InlineIndex::new(line);
        let link = index.parse_at(0, line.len()).unwrap();
        assert_eq!(&line[link.inner.unwrap()], "lab");

        let mask = index.parse_at(21, line.len()).unwrap();
        assert_eq!(&line[mask.inner.unwrap()], "m");
        assert_eq!(mask.end, line.len());
    }

    #[test]
    fn test_code_span_end_needs_equal_run() {
        let line = "`` a ` b ``c";
        let index = InlineIndex::new(line);
        assert_eq!(index.code_span_end(2, 2, line.len()), Some(11));
        assert_eq!(index.code_span_end(2, 2, 10), None);
        assert_eq!(index.code_span_end(2, 3, line.len()), None);
    }
}
