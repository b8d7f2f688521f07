//! Allowlist HTML sanitizer.
//!
//! Every interpolation of stored or user-supplied content into HTML goes
//! through one of the five functions exported here:
//!
//! - [`sanitize_html`]: document bodies, full allowlist.
//! - [`sanitize_comment`]: user comments, inline formatting and links only.
//! - [`escape_html`]: no markup at all.
//! - [`sanitize_url`]: a single URL.
//! - [`highlight_search_match`]: escaped text with `<mark>`ed query tokens.
//!
//! # Backends
//!
//! Both policies are enforced by one of two interchangeable backends that
//! read the same [`Policy`] tables. The backend is chosen once per process,
//! either explicitly with [`init`] or on first use (DOM when the `dom`
//! feature is compiled in, scan otherwise).
//!
//! # Example
//!
//! ```
//! let html = folio_sanitize::sanitize_html(r#"<img src=x onerror="alert(1)">"#);
//! assert!(!html.contains("onerror"));
//!
//! assert_eq!(folio_sanitize::sanitize_html(None), "");
//! ```

mod backend;
#[cfg(feature = "dom")]
mod dom;
mod entities;
mod escape;
mod policy;
mod scan;

use std::sync::OnceLock;

pub use backend::{BackendKind, BackendPreference, SanitizeBackend, Sanitizer, UnknownBackend};
#[cfg(feature = "dom")]
pub use dom::DomBackend;
pub use entities::{decode_entities, decode_reference, named_entity};
pub use policy::{COMMENT_POLICY, DOCUMENT_POLICY, LINK_REL, Policy, PolicyKind, VOID_TAGS};
pub use scan::ScanBackend;

static SANITIZER: OnceLock<Sanitizer> = OnceLock::new();

/// Select the process-wide backend.
///
/// Returns `false` if a backend was already selected, either by an earlier
/// call or by a sanitization call that resolved `Auto`.
pub fn init(preference: BackendPreference) -> bool {
    let mut installed = false;
    SANITIZER.get_or_init(|| {
        installed = true;
        select(preference)
    });
    if !installed {
        tracing::debug!(requested = ?preference, active = %global().kind(), "Sanitizer backend already selected");
    }
    installed
}

/// The process-wide sanitizer.
pub fn global() -> &'static Sanitizer {
    SANITIZER.get_or_init(|| select(BackendPreference::Auto))
}

fn select(preference: BackendPreference) -> Sanitizer {
    let sanitizer = Sanitizer::from_preference(preference);
    tracing::info!(requested = ?preference, backend = %sanitizer.kind(), "Sanitizer backend selected");
    sanitizer
}

/// Sanitize a document body. `None` or empty input yields an empty string.
pub fn sanitize_html<'a>(input: impl Into<Option<&'a str>>) -> String {
    input
        .into()
        .map(|s| global().sanitize_html(s))
        .unwrap_or_default()
}

/// Sanitize a user comment: inline formatting and links only, and every
/// surviving link opens in a new context with `rel="noopener noreferrer"`.
pub fn sanitize_comment<'a>(input: impl Into<Option<&'a str>>) -> String {
    input
        .into()
        .map(|s| global().sanitize_comment(s))
        .unwrap_or_default()
}

/// Entity-encode `& < > " ' / \` =` so no markup renders.
pub fn escape_html<'a>(text: impl Into<Option<&'a str>>) -> String {
    text.into().map(escape::escape_html).unwrap_or_default()
}

/// Empty string for a forbidden scheme (`javascript:`, `data:`,
/// `vbscript:`), otherwise the trimmed URL.
pub fn sanitize_url<'a>(url: impl Into<Option<&'a str>>) -> String {
    url.into().map(escape::sanitize_url).unwrap_or_default()
}

/// Fully escape `text`, then wrap case-insensitive matches of each query
/// token (two or more characters) in `<mark>`.
pub fn highlight_search_match<'a>(
    text: impl Into<Option<&'a str>>,
    query: impl Into<Option<&'a str>>,
) -> String {
    let Some(text) = text.into() else {
        return String::new();
    };
    escape::highlight_search_match(text, query.into().unwrap_or_default())
}
