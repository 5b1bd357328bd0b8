//! XML reading errors.

use thiserror::Error;

/// Errors while turning a response body into an element tree.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The document is not well-formed.
    #[error("XML syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),

    /// An attribute could not be read.
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// An entity or character reference could not be resolved.
    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// Text was not valid UTF-8.
    #[error("XML is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The document ended while an element was still open.
    #[error("Unclosed element <{name}>")]
    Unclosed {
        /// The element left open.
        name: String,
    },

    /// The document has no root element.
    #[error("Empty XML document")]
    Empty,

    /// A required element is absent.
    #[error("Missing <{name}> element")]
    MissingElement {
        /// The element that was expected.
        name: String,
    },
}

impl XmlError {
    /// Creates a missing element error.
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingElement { name: name.into() }
    }
}
