//! Response handling module.
//!
//! Every FogBugz command answers with a `<response>` document. This module
//! locates that node, detects the `<error>` case and otherwise hands the
//! tree back untouched, since command payloads have no schema the client
//! knows about.

mod descriptor;
mod xml;

use std::fmt;

pub use descriptor::ApiDescriptor;
pub use xml::{XmlElement, XmlNode};

use crate::error::{ApiError, XmlError};

/// Name of the top-level node of every API document.
const RESPONSE_ELEMENT: &str = "response";

/// Name of the node carrying a service-side failure.
const ERROR_ELEMENT: &str = "error";

/// A parsed `<response>` node.
///
/// ## Examples
///
/// ```rust
/// use fogbugz::response::Response;
///
/// let response = Response::parse(b"<response><token>abc</token></response>").unwrap();
/// assert_eq!(response.text_of("token").as_deref(), Some("abc"));
/// assert!(response.error().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    element: XmlElement,
}

impl Response {
    /// Parses a body and locates its `<response>` node.
    ///
    /// The node is normally the document root; otherwise the first
    /// descendant with that name is used.
    ///
    /// ## Errors
    ///
    /// Returns an error if the body is not XML or has no `<response>` node.
    pub fn parse(body: &[u8]) -> Result<Self, XmlError> {
        let root = XmlElement::parse(body)?;
        if root.name() == RESPONSE_ELEMENT {
            return Ok(Self { element: root });
        }
        root.find(RESPONSE_ELEMENT)
            .cloned()
            .map(|element| Self { element })
            .ok_or_else(|| XmlError::missing(RESPONSE_ELEMENT))
    }

    /// The service error carried by this response, if any.
    pub fn error(&self) -> Option<ApiError> {
        let error = self.element.child(ERROR_ELEMENT)?;
        Some(ApiError::new(
            error.attribute("code").unwrap_or_default(),
            error.text().trim(),
        ))
    }

    /// Converts an error response into an [`ApiError`].
    ///
    /// ## Errors
    ///
    /// Returns the service error when the response contains an `<error>` node.
    pub fn into_result(self) -> Result<Self, ApiError> {
        match self.error() {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }

    /// The `<response>` element itself.
    pub fn root(&self) -> &XmlElement {
        &self.element
    }

    /// Consumes the response, returning the `<response>` element.
    pub fn into_element(self) -> XmlElement {
        self.element
    }

    /// The first child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.element.child(name)
    }

    /// Every child element with the given name.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.element.children(name)
    }

    /// The trimmed text of the first child with the given name.
    pub fn text_of(&self, name: &str) -> Option<String> {
        self.child(name).map(|child| child.text().trim().to_owned())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.element, f)
    }
}
