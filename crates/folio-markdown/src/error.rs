//! Error types.

/// Failure while tokenizing HTML for the HTML→Markdown converter.
///
/// Never escapes the crate: the converter logs it and falls back to plain
/// text extraction.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HtmlParseError {
    /// XML tokenizer error.
    #[error("HTML parse error")]
    Xml(#[from] quick_xml::Error),

    /// Encoding error while decoding names or text.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
