//! Backend strategy trait and backend selection.
//!
//! A backend turns untrusted HTML into HTML that only contains what a
//! [`Policy`](crate::Policy) permits. Two strategies exist:
//!
//! - [`DomBackend`](crate::DomBackend): parse into a DOM and walk it
//!   (requires the `dom` feature).
//! - [`ScanBackend`](crate::ScanBackend): tag-matching scan over the raw
//!   string, for runtimes without an HTML parser.

use std::fmt;
use std::str::FromStr;

use crate::policy::PolicyKind;
use crate::scan::ScanBackend;

/// Strategy that enforces a policy on an HTML fragment.
pub trait SanitizeBackend: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> BackendKind;

    /// Sanitize a non-empty fragment against the given policy.
    fn sanitize(&self, input: &str, policy: PolicyKind) -> String;
}

/// Concrete backend strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Parse-and-walk over an html5ever DOM.
    Dom,
    /// Regex scan over the raw string.
    Scan,
}

impl BackendKind {
    /// Lowercase name used in configuration and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dom => "dom",
            Self::Scan => "scan",
        }
    }

    /// Whether this backend was compiled in.
    #[must_use]
    pub fn is_available(self) -> bool {
        match self {
            Self::Dom => cfg!(feature = "dom"),
            Self::Scan => true,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Requested backend, before capability detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackendPreference {
    /// DOM when compiled in, otherwise scan.
    #[default]
    Auto,
    Dom,
    Scan,
}

impl BackendPreference {
    /// Resolve to a concrete backend.
    ///
    /// An explicit `Dom` request in a build without the `dom` feature
    /// resolves to `Scan`.
    #[must_use]
    pub fn resolve(self) -> BackendKind {
        match self {
            Self::Dom if BackendKind::Dom.is_available() => BackendKind::Dom,
            Self::Auto if BackendKind::Dom.is_available() => BackendKind::Dom,
            Self::Auto | Self::Dom | Self::Scan => BackendKind::Scan,
        }
    }
}

/// Error returned when parsing an unknown backend name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sanitizer backend '{0}' (expected auto, dom or scan)")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendPreference {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "dom" => Ok(Self::Dom),
            "scan" => Ok(Self::Scan),
            _ => Err(UnknownBackend(s.to_owned())),
        }
    }
}

/// A sanitizer bound to one backend.
pub struct Sanitizer {
    backend: Box<dyn SanitizeBackend>,
}

impl Sanitizer {
    /// Build a sanitizer for a concrete backend.
    ///
    /// `Dom` falls back to `Scan` when the `dom` feature is disabled.
    #[must_use]
    pub fn with_backend(kind: BackendKind) -> Self {
        let backend: Box<dyn SanitizeBackend> = match kind {
            #[cfg(feature = "dom")]
            BackendKind::Dom => Box::new(crate::dom::DomBackend::new()),
            _ => Box::new(ScanBackend::new()),
        };
        Self { backend }
    }

    /// Build a sanitizer from a preference, resolving `Auto`.
    #[must_use]
    pub fn from_preference(preference: BackendPreference) -> Self {
        Self::with_backend(preference.resolve())
    }

    /// The backend in use.
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Sanitize against [`DOCUMENT_POLICY`](crate::DOCUMENT_POLICY).
    #[must_use]
    pub fn sanitize_html(&self, input: &str) -> String {
        self.run(input, PolicyKind::Document)
    }

    /// Sanitize against [`COMMENT_POLICY`](crate::COMMENT_POLICY).
    #[must_use]
    pub fn sanitize_comment(&self, input: &str) -> String {
        self.run(input, PolicyKind::Comment)
    }

    fn run(&self, input: &str, policy: PolicyKind) -> String {
        if input.is_empty() {
            return String::new();
        }
        self.backend.sanitize(input, policy)
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sanitizer")
            .field("backend", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_from_str() {
        assert_eq!("auto".parse::<BackendPreference>(), Ok(BackendPreference::Auto));
        assert_eq!(" DOM ".parse::<BackendPreference>(), Ok(BackendPreference::Dom));
        assert_eq!("scan".parse::<BackendPreference>(), Ok(BackendPreference::Scan));
        assert_eq!(
            "lol".parse::<BackendPreference>(),
            Err(UnknownBackend("lol".to_owned()))
        );
    }

    #[test]
    fn test_unknown_backend_message() {
        let err = "regex".parse::<BackendPreference>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown sanitizer backend 'regex' (expected auto, dom or scan)"
        );
    }

    #[test]
    fn test_scan_preference_resolves_to_scan() {
        assert_eq!(BackendPreference::Scan.resolve(), BackendKind::Scan);
    }

    #[cfg(feature = "dom")]
    #[test]
    fn test_auto_prefers_dom_when_available() {
        assert_eq!(BackendPreference::Auto.resolve(), BackendKind::Dom);
        assert_eq!(Sanitizer::from_preference(BackendPreference::Auto).kind(), BackendKind::Dom);
    }

    #[cfg(not(feature = "dom"))]
    #[test]
    fn test_dom_unavailable_falls_back_to_scan() {
        assert_eq!(BackendPreference::Dom.resolve(), BackendKind::Scan);
        assert_eq!(Sanitizer::with_backend(BackendKind::Dom).kind(), BackendKind::Scan);
    }

    #[test]
    fn test_empty_input() {
        let sanitizer = Sanitizer::with_backend(BackendKind::Scan);
        assert_eq!(sanitizer.sanitize_html(""), "");
        assert_eq!(sanitizer.sanitize_comment(""), "");
    }
}
