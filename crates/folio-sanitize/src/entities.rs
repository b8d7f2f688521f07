//! HTML character reference decoding.
//!
//! Used wherever an attribute value must be inspected the way a browser would
//! see it (URL scheme checks) and by the HTML→Markdown tokenizer.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Numeric or named character reference. The trailing semicolon is optional
/// because browsers accept `&#106avascript:` as well.
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#0*[0-9]{1,7}|#[xX]0*[0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});?")
        .expect("invalid character reference regex")
});

/// Decode all numeric and known named character references in `s`.
///
/// Unknown named references are left untouched.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    REFERENCE_PATTERN.replace_all(s, |caps: &regex::Captures| {
        decode_reference(&caps[1]).unwrap_or_else(|| caps[0].to_owned())
    })
}

/// Decode a single reference body (the part between `&` and `;`).
pub fn decode_reference(reference: &str) -> Option<String> {
    if let Some(numeric) = reference.strip_prefix('#') {
        let code = if let Some(hex) = numeric
            .strip_prefix('x')
            .or_else(|| numeric.strip_prefix('X'))
        {
            u32::from_str_radix(hex, 16).ok()
        } else {
            numeric.parse::<u32>().ok()
        };
        return code
            .and_then(char::from_u32)
            .map(|c| if c == '\0' { '\u{fffd}' } else { c })
            .map(String::from);
    }

    named_entity(reference).map(String::from)
}

/// Map an HTML entity name to its Unicode text.
#[must_use]
pub fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        // XML
        "amp" | "AMP" => "&",
        "lt" | "LT" => "<",
        "gt" | "GT" => ">",
        "quot" | "QUOT" => "\"",
        "apos" => "'",

        // Punctuation that appears in scheme obfuscation
        "colon" => ":",
        "Tab" => "\t",
        "NewLine" => "\n",
        "sol" => "/",
        "lpar" => "(",
        "rpar" => ")",
        "period" => ".",
        "comma" => ",",
        "excl" => "!",
        "num" => "#",
        "equals" => "=",
        "grave" => "`",

        "nbsp" => "\u{00a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "bull" => "\u{2022}",
        "hellip" => "\u{2026}",

        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "harr" => "\u{2194}",
        "uarr" => "\u{2191}",
        "darr" => "\u{2193}",

        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "ne" => "\u{2260}",
        "plusmn" => "\u{00b1}",
        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",

        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",

        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",
        "yen" => "\u{00a5}",
        "cent" => "\u{00a2}",

        "deg" => "\u{00b0}",
        "para" => "\u{00b6}",
        "sect" => "\u{00a7}",
        "middot" => "\u{00b7}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "check" => "\u{2713}",

        _ => return None,
    })
}
