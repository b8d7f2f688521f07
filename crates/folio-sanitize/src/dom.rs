//! Parse-and-walk sanitizer backend on top of `ammonia`.
//!
//! The fragment is parsed by html5ever, so malformed markup is repaired the
//! same way a browser would repair it before the allowlist is applied.

use std::borrow::Cow;
use std::collections::HashSet;

use ammonia::{Builder, UrlRelative};

use crate::backend::{BackendKind, SanitizeBackend};
use crate::policy::{CONTENT_STRIPPED_TAGS, LINK_REL, Policy, PolicyKind};

/// DOM backend with one prebuilt cleaner per policy.
pub struct DomBackend {
    document: Builder<'static>,
    comment: Builder<'static>,
}

impl DomBackend {
    /// Build cleaners for both policies.
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: builder(PolicyKind::Document.policy()),
            comment: builder(PolicyKind::Comment.policy()),
        }
    }
}

impl Default for DomBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SanitizeBackend for DomBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Dom
    }

    fn sanitize(&self, input: &str, policy: PolicyKind) -> String {
        let cleaner = match policy {
            PolicyKind::Document => &self.document,
            PolicyKind::Comment => &self.comment,
        };
        cleaner.clean(input).to_string()
    }
}

/// Translate a policy table into an ammonia builder.
fn builder(policy: &'static Policy) -> Builder<'static> {
    let mut builder = Builder::empty();

    builder
        .tags(policy.tags.iter().copied().collect())
        .clean_content_tags(CONTENT_STRIPPED_TAGS.iter().copied().collect())
        .generic_attributes(policy.attributes.iter().copied().collect())
        .url_schemes(policy.url_schemes.iter().copied().collect())
        .url_relative(UrlRelative::PassThrough)
        .strip_comments(true)
        .link_rel(None)
        .attribute_filter(move |_element, attribute, value| {
            if policy.is_url_attribute(attribute) && !policy.allows_url(value) {
                None
            } else {
                Some(Cow::Borrowed(value))
            }
        });

    if policy.data_attributes {
        builder.generic_attribute_prefixes(HashSet::from(["data-"]));
    }

    if policy.force_link_target {
        builder
            .link_rel(Some(LINK_REL))
            .set_tag_attribute_value("a", "target", "_blank");
    }

    builder
}
