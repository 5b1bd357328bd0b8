//! Owned XML element tree.
//!
//! FogBugz command results have no fixed schema, so responses are read into
//! a small generic tree instead of being deserialized into typed structs.
//! Text and CDATA sections are merged into the same text node, which makes
//! `<token>abc</token>` and `<token><![CDATA[abc]]></token>` indistinguishable.

use std::fmt;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::XmlError;

/// A node inside an [`XmlElement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// A nested element.
    Element(XmlElement),
    /// Character data, with entities resolved and CDATA unwrapped.
    Text(String),
}

/// An XML element with its attributes and children, in document order.
///
/// ## Examples
///
/// ```rust
/// use fogbugz::response::XmlElement;
///
/// let doc = XmlElement::parse(br#"<case ixBug="7"><sTitle>Crash</sTitle></case>"#).unwrap();
/// assert_eq!(doc.attribute("ixBug"), Some("7"));
/// assert_eq!(doc.child("sTitle").map(|t| t.text()), Some("Crash".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Appends text content.
    pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
        self.push_text(text.as_ref());
        self
    }

    /// Parses a document and returns its root element.
    ///
    /// Declarations, comments and processing instructions are skipped.
    /// Anything after the first root element is ignored.
    ///
    /// ## Errors
    ///
    /// Returns an error if the document is not well-formed or has no root.
    pub fn parse(input: &[u8]) -> Result<Self, XmlError> {
        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    close(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        close(&mut stack, &mut root, element);
                    }
                }
                Event::Text(text) => {
                    let text = unescape(std::str::from_utf8(&text)?)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(std::str::from_utf8(&data)?);
                    }
                }
                Event::GeneralRef(reference) => {
                    let name = std::str::from_utf8(&reference)?;
                    let resolved = unescape(&format!("&{name};"))?.into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(&resolved);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed { name: open.name });
        }
        root.ok_or(XmlError::Empty)
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_owned();
        let mut element = Self::new(name);
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = std::str::from_utf8(attribute.key.as_ref())?.to_owned();
            let value = unescape(std::str::from_utf8(&attribute.value)?)?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.children.last_mut() {
            Some(XmlNode::Text(existing)) => existing.push_str(text),
            _ => self.children.push(XmlNode::Text(text.to_owned())),
        }
    }

    /// The element's tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// All child nodes in document order.
    pub fn nodes(&self) -> &[XmlNode] {
        &self.children
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// The first child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.name == name)
    }

    /// Every child element with the given name.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |element| element.name == name)
    }

    /// Depth-first search for the first descendant (or self) with the given name.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name {
            return Some(self);
        }
        self.elements().find_map(|element| element.find(name))
    }

    /// All text beneath this element, concatenated in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
            }
        }
    }
}

/// Attaches a finished element to its parent, or makes it the root.
fn close(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(f, " {key}=\"{}\"", escape(value.as_str()))?;
        }
        if self.children.is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for node in &self.children {
            match node {
                XmlNode::Element(element) => write!(f, "{element}")?,
                XmlNode::Text(text) => f.write_str(&escape(text.as_str()))?,
            }
        }
        write!(f, "</{}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let doc = XmlElement::parse(
            br#"<?xml version="1.0" encoding="UTF-8"?>
<response><cases count="2"><case ixBug="1"/><case ixBug="2"/></cases></response>"#,
        )
        .unwrap();

        assert_eq!(doc.name(), "response");
        let cases = doc.child("cases").unwrap();
        assert_eq!(cases.attribute("count"), Some("2"));
        let ids: Vec<_> = cases
            .children("case")
            .filter_map(|case| case.attribute("ixBug"))
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_cdata_and_plain_text_match() {
        let plain = XmlElement::parse(b"<token>abc123</token>").unwrap();
        let cdata = XmlElement::parse(b"<token><![CDATA[abc123]]></token>").unwrap();
        assert_eq!(plain, cdata);
        assert_eq!(cdata.text(), "abc123");
    }

    #[test]
    fn test_entities_resolved() {
        let doc = XmlElement::parse(b"<title a=\"x &amp; y\">Fish &amp; Chips &#65;</title>").unwrap();
        assert_eq!(doc.text(), "Fish & Chips A");
        assert_eq!(doc.attribute("a"), Some("x & y"));
    }

    #[test]
    fn test_find_descendant() {
        let doc = XmlElement::parse(b"<html><body><response><url>api.asp?</url></response></body></html>")
            .unwrap();
        let response = doc.find("response").unwrap();
        assert_eq!(response.child("url").unwrap().text(), "api.asp?");
        assert!(doc.find("missing").is_none());
    }

    #[test]
    fn test_unclosed_element() {
        let result = XmlElement::parse(b"<response><cases>");
        assert!(matches!(
            result,
            Err(XmlError::Unclosed { .. }) | Err(XmlError::Syntax(_))
        ));
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(XmlElement::parse(b""), Err(XmlError::Empty)));
        assert!(matches!(
            XmlElement::parse(b"<?xml version=\"1.0\"?>"),
            Err(XmlError::Empty)
        ));
    }

    #[test]
    fn test_mismatched_end_tag() {
        let result = XmlElement::parse(b"<response></cases>");
        assert!(matches!(result, Err(XmlError::Syntax(_))));
    }

    #[test]
    fn test_display_round_trips_structure() {
        let element = XmlElement::new("response")
            .with_child(XmlElement::new("case").with_attribute("ixBug", "3"))
            .with_child(XmlElement::new("sTitle").with_text("a < b"));
        let rendered = element.to_string();
        assert_eq!(
            rendered,
            r#"<response><case ixBug="3"/><sTitle>a &lt; b</sTitle></response>"#
        );
        assert_eq!(XmlElement::parse(rendered.as_bytes()).unwrap(), element);
    }
}
