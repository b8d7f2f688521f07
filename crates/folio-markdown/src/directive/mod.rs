//! Content directives of the Markdown dialect.
//!
//! The set of directives is closed: [`DirectiveKind`] enumerates them, the
//! registry describes each one's grammar and HTML mapping, and [`Directive`]
//! carries a parsed instance. The Markdown tokenizer and the HTML serializer
//! both match on these enums exhaustively.
//!
//! | Directive | Markdown | HTML |
//! |---|---|---|
//! | callout | `:::type{title="T"}` … `:::` | `<div data-callout-type>` |
//! | statusBadge | `{status:value id="I" text="T"}` | `<span data-status>` |
//! | evidenceLink | `[label]{evidence id="I" type="T"}` | `<a data-evidence>` |
//! | privacyMask | `{mask type="T" placeholder="P"}…{/mask}` | `<span data-privacy-mask>` |
//! | tableOfContents | `[[toc]]` | `<nav data-toc>` |

mod args;
pub mod model;
pub mod registry;
pub(crate) mod syntax;
pub mod values;

pub use args::DirectiveArgs;
pub use model::{Callout, Directive, EvidenceLink, PrivacyMask, StatusBadge};
pub use registry::{AttributeSpec, AttributeType, DirectiveKind, DirectiveSchema, Level, schema};
pub use values::{CalloutType, ComplianceStatus, MaskType};
